//! API error handling.
//!
//! We define our own error to use for all resolvers. It has `From` impls to be
//! created from the other errors that occur (ID decoding, node resolution,
//! store failures). This module also offers a couple macros to easily create
//! an error.
//!
//! Each error carries a coarse "error kind" that is sent to the client in the
//! `extensions` of the GraphQL error, plus an optional, more specific "key".

use juniper::{FieldError, IntoFieldError, ScalarValue, graphql_value};

use crate::prelude::*;
use super::{id::IdError, node::ResolveError};


pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) msg: String,
    pub(crate) kind: ApiErrorKind,
    pub(crate) key: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    /// The arguments passed to an endpoint are invalid somehow.
    InvalidInput,

    /// A global ID could not be decoded.
    MalformedId,

    /// A global ID refers to a type that has no registered store.
    UnknownType,

    /// Some server error out of control of the API user.
    InternalServerError,
}

impl ApiErrorKind {
    fn kind_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::MalformedId => "MALFORMED_ID",
            Self::UnknownType => "UNKNOWN_TYPE",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    fn message_prefix(&self) -> &str {
        match self {
            Self::InvalidInput => "Invalid input",
            Self::MalformedId => "Malformed ID",
            Self::UnknownType => "Unknown type",
            Self::InternalServerError => "Internal server error",
        }
    }
}

impl From<IdError> for ApiError {
    fn from(src: IdError) -> Self {
        match src {
            IdError::MalformedIdentifier(reason) => Self {
                msg: format!("given ID is not a valid global ID ({reason})"),
                kind: ApiErrorKind::MalformedId,
                key: Some("id.malformed"),
            },
            IdError::InvalidArgument(reason) => Self {
                msg: format!("cannot create global ID: {reason}"),
                kind: ApiErrorKind::InvalidInput,
                key: None,
            },
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(src: ResolveError) -> Self {
        match src {
            ResolveError::Id(e) => e.into(),
            ResolveError::UnknownType(name) => Self {
                msg: format!("no node type '{name}' exists"),
                kind: ApiErrorKind::UnknownType,
                key: Some("id.unknown-type"),
            },
            ResolveError::Store(e) => e.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(src: anyhow::Error) -> Self {
        // Logging the error here is not ideal but probably totally fine for us.
        // At this point, it's very likely that the error is sent back to the
        // user. And this is the last time we can get detailed information
        // about it.
        error!("Store error when resolving API request: {src}");
        debug!("Detailed error: {src:?}");

        Self {
            msg: format!("store error: {src}"),
            kind: ApiErrorKind::InternalServerError,
            key: None,
        }
    }
}

impl<S: ScalarValue> IntoFieldError<S> for ApiError {
    fn into_field_error(self) -> FieldError<S> {
        let msg = format!("{}: {}", self.kind.message_prefix(), self.msg);
        let ext = if let Some(key) = self.key {
            graphql_value!({
                "kind": (self.kind.kind_str()),
                "key": key,
            })
        } else {
            graphql_value!({
                "kind": (self.kind.kind_str()),
            })
        };

        FieldError::new(msg, ext)
    }
}


// ===== Helper macros to easily create errors ==================================================

/// Creates an `ApiError` with a `format!` like syntax.
macro_rules! api_err {
    ($kind:ident, key = $key:literal, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::api::err::ApiError {
            msg: format!($fmt $(, $arg)*),
            kind: $crate::api::err::ApiErrorKind::$kind,
            key: Some($key),
        }
    };
    ($kind:ident, $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::api::err::ApiError {
            msg: format!($fmt $(, $arg)*),
            kind: $crate::api::err::ApiErrorKind::$kind,
            key: None,
        }
    };
}

macro_rules! invalid_input {
    ($($t:tt)+) => { $crate::api::err::api_err!(InvalidInput, $($t)*) };
}

pub(crate) use api_err;
pub(crate) use invalid_input;
