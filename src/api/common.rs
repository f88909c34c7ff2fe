use base64::{Engine, engine::general_purpose::STANDARD};
use juniper::{GraphQLScalar, InputValue, ScalarValue};

use super::err::{invalid_input, ApiResult};


#[derive(Debug, Clone, PartialEq, Eq, juniper::GraphQLObject)]
pub(crate) struct PageInfo {
    pub(crate) has_next_page: bool,
    pub(crate) has_previous_page: bool,
    pub(crate) start_cursor: Option<Cursor>,
    pub(crate) end_cursor: Option<Cursor>,
}

/// Opaque cursor for pagination. Serializes as string.
///
/// A cursor is a position in the list of all items of a connection. It's
/// encoded like `graphql-relay` array connection cursors: the base64 encoding
/// of `arrayconnection:<offset>`. That way, cursors handed out by other Relay
/// servers for the same list remain valid.
#[derive(Debug, Clone, PartialEq, Eq, GraphQLScalar)]
#[graphql(
    name = "Cursor",
    description = "An opaque cursor used for pagination",
    parse_token(String),
)]
pub(crate) struct Cursor(String);

const CURSOR_PREFIX: &str = "arrayconnection:";

impl Cursor {
    pub(crate) fn from_offset(offset: usize) -> Self {
        Self(STANDARD.encode(format!("{CURSOR_PREFIX}{offset}")))
    }

    pub(crate) fn offset(&self) -> ApiResult<usize> {
        let invalid = || invalid_input!(key = "cursor.invalid", "given cursor '{}' is invalid", self.0);

        let bytes = STANDARD.decode(&self.0).map_err(|_| invalid())?;
        std::str::from_utf8(&bytes).ok()
            .and_then(|s| s.strip_prefix(CURSOR_PREFIX))
            .and_then(|offset| offset.parse().ok())
            .ok_or_else(invalid)
    }

    fn to_output<S: ScalarValue>(&self) -> juniper::Value<S> {
        juniper::Value::scalar(self.0.clone())
    }

    fn from_input<S: ScalarValue>(input: &InputValue<S>) -> Result<Self, String> {
        let s = input.as_string_value().ok_or("expected string")?;
        Ok(Self(s.to_owned()))
    }
}

#[cfg(test)]
impl From<&str> for Cursor {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}
