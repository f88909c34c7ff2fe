//! Definition of the GraphQL API.

use std::time::Duration;

use juniper::EmptySubscription;

use self::{
    mutation::Mutation,
    query::Query,
};

pub(crate) mod err;
pub(crate) mod model;

mod common;
mod connection;
mod context;
mod id;
mod mutation;
mod node;
mod query;


pub(crate) use self::{
    id::Id,
    context::Context,
    common::Cursor,
    node::{Node, NodeKind, NodeRegistry, NodeValue},
};


/// API configuration.
#[derive(Debug, Clone, confique::Config)]
pub(crate) struct ApiConfig {
    /// Artificial delay before `createVideo` actually creates the video.
    /// Useful to see how clients deal with slow mutations. Set to "0" to
    /// disable.
    #[config(default = "500ms", deserialize_with = crate::config::deserialize_duration)]
    pub(crate) create_delay: Duration,

    /// Whether to fill the catalog with two example videos on startup.
    #[config(default = true)]
    pub(crate) seed: bool,
}


/// Creates and returns the API root node.
pub(crate) fn root_node() -> RootNode {
    RootNode::new(Query, Mutation, EmptySubscription::new())
}

/// Type of our API root node.
pub(crate) type RootNode = juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;
