use std::sync::Arc;

use crate::{
    prelude::*,
    store::RecordStore,
};
use super::{ApiConfig, NodeKind, NodeRegistry};


/// The context that is accessible to every resolver in our API.
///
/// It is created once at startup and shared by all requests.
pub(crate) struct Context {
    pub(crate) videos: Arc<dyn RecordStore>,
    pub(crate) nodes: NodeRegistry,
    pub(crate) config: ApiConfig,
}

impl juniper::Context for Context {}

impl Context {
    /// Creates the context and registers all stores as node sources.
    pub(crate) fn new(videos: Arc<dyn RecordStore>, config: ApiConfig) -> Result<Self> {
        let mut nodes = NodeRegistry::new();
        nodes.register(NodeKind::Video.type_name(), NodeKind::Video, Arc::clone(&videos))
            .context("failed to register video store")?;

        Ok(Self { videos, nodes, config })
    }
}
