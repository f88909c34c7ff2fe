//! This module and its children define the GraphQL types of all objects the
//! API can return.

pub(crate) mod video;
