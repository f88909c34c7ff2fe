//! Global object identification: finding an object by its global ID and
//! figuring out which GraphQL type a record belongs to.
//!
//! These are two independent directions. [`NodeRegistry::resolve_global_id`]
//! goes from ID to record by decoding the ID and asking the store registered
//! for that type. [`NodeRegistry::resolve_record_type`] goes from record to
//! type by checking the membership predicate of each registered kind. The
//! latter is needed because records do not carry their type with them.

use std::sync::Arc;

use crate::{
    prelude::*,
    store::{Record, RecordStore},
};
use super::{
    Context,
    id::{Id, IdError},
    model::video::Video,
};


/// A node with a globally unique ID. Mostly useful for relay.
#[juniper::graphql_interface(Context = Context, for = [Video])]
pub(crate) trait Node {
    fn id(&self) -> Id;
}

/// All kinds of nodes our API knows about, i.e. all GraphQL types
/// implementing `Node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum NodeKind {
    Video,
}

impl NodeKind {
    #[cfg(test)]
    pub(crate) const ALL: &'static [Self] = &[Self::Video];

    /// The name of the GraphQL type. This is what's encoded in global IDs.
    pub(crate) fn type_name(self) -> &'static str {
        match self {
            Self::Video => "Video",
        }
    }

    /// Whether the given record is an instance of this kind.
    fn matches(self, record: &Record) -> bool {
        match self {
            Self::Video => record.has_field("title"),
        }
    }

    /// Wraps the record into the GraphQL type of this kind. The record is not
    /// checked against `matches`.
    pub(crate) fn into_node(self, record: Record) -> NodeValue {
        match self {
            Self::Video => NodeValue::from(Video::from(record)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ResolveError {
    #[error(transparent)]
    Id(#[from] IdError),

    #[error("no node type '{0}' is registered")]
    UnknownType(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

struct Entry {
    /// Lowercase.
    name: String,
    kind: NodeKind,
    store: Arc<dyn RecordStore>,
}

/// Maps type names to the stores holding the records of that type. Built once
/// at startup.
#[derive(Default)]
pub(crate) struct NodeRegistry {
    // Registration order matters for `resolve_record_type`.
    entries: Vec<Entry>,
}

impl NodeRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers `store` as the source of all records of type `name`. The name
    /// is case-insensitive.
    pub(crate) fn register(
        &mut self,
        name: &str,
        kind: NodeKind,
        store: Arc<dyn RecordStore>,
    ) -> Result<()> {
        let name = name.to_lowercase();
        if name.is_empty() {
            bail!("cannot register node type with empty name");
        }
        if self.lookup(&name).is_some() {
            bail!("node type '{name}' is already registered");
        }

        debug!("Registering node type '{name}' as {kind:?}");
        self.entries.push(Entry { name, kind, store });
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Decodes the given global ID and fetches the record it refers to.
    /// Returns `Ok(None)` if the ID is valid and refers to a known type, but
    /// no record with that local ID exists.
    pub(crate) async fn resolve_global_id(&self, id: &Id) -> Result<Option<Record>, ResolveError> {
        let decoded = id.decode()?;
        let entry = self.lookup(&decoded.type_name)
            .ok_or_else(|| ResolveError::UnknownType(decoded.type_name.clone()))?;

        let out = entry.store.fetch_by_id(&decoded.local_id).await?;
        trace!(
            kind = ?entry.kind,
            local_id = %decoded.local_id,
            found = out.is_some(),
            "Resolved global ID",
        );

        Ok(out)
    }

    /// Returns the kind of the first registered type the record matches, or
    /// `None` if it doesn't match any.
    pub(crate) fn resolve_record_type(&self, record: &Record) -> Option<NodeKind> {
        self.entries.iter()
            .map(|e| e.kind)
            .find(|kind| kind.matches(record))
    }

    /// Combines both directions: fetches the record with the given global ID
    /// and wraps it into the GraphQL type it belongs to.
    pub(crate) async fn load_node(&self, id: &Id) -> Result<Option<NodeValue>, ResolveError> {
        let Some(record) = self.resolve_global_id(id).await? else {
            return Ok(None);
        };

        match self.resolve_record_type(&record) {
            Some(kind) => Ok(Some(kind.into_node(record))),
            None => {
                warn!(local_id = %record.id, "Could not determine the type of record");
                Ok(None)
            }
        }
    }
}
