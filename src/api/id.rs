use base64::{Engine, engine::general_purpose::STANDARD};
use juniper::{GraphQLScalar, InputValue, ScalarValue};

use super::node::NodeKind;


/// An opaque, globally-unique identifier for all "nodes" that the GraphQL API
/// might return.
///
/// The ID should be treated as completely opaque by clients. Internally, it
/// is the standard base64 encoding of `<type name>:<local id>`, the format
/// Relay clients and `graphql-relay` servers use. The type name tells us which
/// store to ask, and the local ID is the key within that store.
///
/// Any string is accepted as `ID` input. Whether it actually is a well-formed
/// global ID is only checked when decoding it, such that we can report a
/// proper error instead of a generic "invalid scalar".
#[derive(Debug, Clone, PartialEq, Eq, Hash, GraphQLScalar)]
#[graphql(
    name = "ID",
    description = "An opaque, globally-unique identifier",
    parse_token(String, i32),
)]
pub(crate) struct Id(String);

/// The two parts of a global ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DecodedId {
    /// Always lowercase.
    pub(crate) type_name: String,
    pub(crate) local_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum IdError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("malformed identifier: {0}")]
    MalformedIdentifier(&'static str),
}

const SEPARATOR: char = ':';

impl Id {
    /// Combines a type name and a local ID into an opaque global ID.
    pub(crate) fn encode(type_name: &str, local_id: &str) -> Result<Self, IdError> {
        if type_name.is_empty() {
            return Err(IdError::InvalidArgument("type name must not be empty"));
        }

        // Decoding splits at the first separator, so it must not be part of
        // the type name. The local ID may contain it just fine.
        if type_name.contains(SEPARATOR) {
            return Err(IdError::InvalidArgument("type name must not contain ':'"));
        }

        Ok(Self(STANDARD.encode(format!("{type_name}{SEPARATOR}{local_id}"))))
    }

    /// Returns the ID of the node with the given kind and local ID. All kinds
    /// have valid type names, so this cannot fail.
    pub(crate) fn node(kind: NodeKind, local_id: &str) -> Self {
        Self::encode(kind.type_name(), local_id)
            .unwrap_or_else(|e| unreachable!("node kind with invalid type name: {e}"))
    }

    /// Inverse of [`Self::encode`], except that the type name is normalized
    /// to lowercase.
    pub(crate) fn decode(&self) -> Result<DecodedId, IdError> {
        let bytes = STANDARD.decode(&self.0)
            .map_err(|_| IdError::MalformedIdentifier("invalid base64"))?;
        let raw = String::from_utf8(bytes)
            .map_err(|_| IdError::MalformedIdentifier("not valid UTF-8"))?;
        let (type_name, local_id) = raw.split_once(SEPARATOR)
            .ok_or(IdError::MalformedIdentifier("missing separator"))?;

        if type_name.is_empty() {
            return Err(IdError::MalformedIdentifier("empty type name"));
        }

        Ok(DecodedId {
            type_name: type_name.to_lowercase(),
            local_id: local_id.to_owned(),
        })
    }

    /// The raw string as sent by the client.
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    fn to_output<S: ScalarValue>(&self) -> juniper::Value<S> {
        juniper::Value::scalar(self.0.clone())
    }

    /// Like in other GraphQL servers, integer literals are accepted as IDs.
    fn from_input<S: ScalarValue>(input: &InputValue<S>) -> Result<Self, String> {
        input.as_string_value()
            .map(str::to_owned)
            .or_else(|| input.as_int_value().map(|i| i.to_string()))
            .map(Self)
            .ok_or_else(|| "expected string or integer".to_owned())
    }
}

#[cfg(test)]
impl From<&str> for Id {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}
