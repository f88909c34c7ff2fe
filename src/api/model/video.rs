use juniper::{GraphQLInputObject, GraphQLObject, graphql_object};
use serde_json::Value;

use crate::{
    api::{
        Context, Cursor, Id, Node, NodeValue,
        common::PageInfo,
        connection::{self, ConnectionArgs},
        err::ApiResult,
        node::NodeKind,
    },
    prelude::*,
    store::{Fields, Record},
};


#[derive(Debug, Clone)]
pub(crate) struct Video {
    record: Record,
}

impl From<Record> for Video {
    fn from(record: Record) -> Self {
        Self { record }
    }
}

impl Node for Video {
    fn id(&self) -> Id {
        Id::node(NodeKind::Video, &self.record.id)
    }
}

/// A video in the catalog.
#[graphql_object(Context = Context, impl = NodeValue)]
impl Video {
    fn id(&self) -> Id {
        Node::id(self)
    }

    /// The title of the video.
    fn title(&self) -> Option<&str> {
        self.record.str_field("title")
    }

    /// The duration of the video in seconds.
    fn duration(&self) -> Option<i32> {
        self.record.int_field("duration").and_then(|d| d.try_into().ok())
    }

    /// Whether or not the viewer has watched the video.
    fn watched(&self) -> Option<bool> {
        self.record.bool_field("watched")
    }
}

impl Video {
    pub(crate) fn local_id(&self) -> &str {
        &self.record.id
    }

    /// Loads a video by its local ID (not the global `Id`!).
    pub(crate) async fn load_by_local_id(id: &str, context: &Context) -> ApiResult<Option<Self>> {
        let record = context.videos.fetch_by_id(id).await?;
        Ok(record.map(Self::from))
    }

    pub(crate) async fn load_connection(
        args: ConnectionArgs,
        context: &Context,
    ) -> ApiResult<VideoConnection> {
        let all = context.videos.fetch_all().await?;
        let page = connection::paginate(all, &args)?;

        Ok(VideoConnection {
            edges: page.edges.into_iter()
                .map(|(cursor, record)| VideoEdge { cursor, node: record.into() })
                .collect(),
            page_info: page.page_info,
            total_count: page.total_count.try_into().unwrap_or(i32::MAX),
        })
    }

    /// Adds a new video and returns its edge in the list of all videos.
    pub(crate) async fn create(input: AddVideoInput, context: &Context) -> ApiResult<AddVideoPayload> {
        let delay = context.config.create_delay;
        if !delay.is_zero() {
            trace!("Delaying creation of video by {delay:?}");
            tokio::time::sleep(delay).await;
        }

        let mut fields = Fields::new();
        fields.insert("title".into(), input.title.map_or(Value::Null, Value::from));
        fields.insert("duration".into(), input.duration.map_or(Value::Null, Value::from));
        fields.insert("watched".into(), input.watched.map_or(Value::Null, Value::from));
        let video = Self::from(context.videos.insert(fields)?);
        info!(id = video.local_id(), title = video.record.str_field("title"), "Created video");

        // The cursor is determined against the list as it is after inserting.
        let all = context.videos.fetch_all().await?;
        let edge = connection::cursor_for(&all, |r| r.id == video.local_id())
            .map(|cursor| VideoEdge { cursor, node: video });

        Ok(AddVideoPayload {
            video_edge: edge,
            client_mutation_id: input.client_mutation_id,
        })
    }
}

#[derive(Debug, GraphQLObject)]
#[graphql(Context = Context)]
pub(crate) struct VideoConnection {
    pub(crate) edges: Vec<VideoEdge>,
    pub(crate) page_info: PageInfo,

    /// A count of the total number of objects in this connection.
    pub(crate) total_count: i32,
}

#[derive(Debug, GraphQLObject)]
#[graphql(Context = Context)]
pub(crate) struct VideoEdge {
    pub(crate) cursor: Cursor,
    pub(crate) node: Video,
}

#[derive(Debug, GraphQLInputObject)]
pub(crate) struct AddVideoInput {
    /// The title of the video.
    pub(crate) title: Option<String>,

    /// The duration of the video in seconds.
    pub(crate) duration: Option<i32>,

    /// Whether or not the viewer has watched the video.
    pub(crate) watched: Option<bool>,

    pub(crate) client_mutation_id: Option<String>,
}

#[derive(Debug, GraphQLObject)]
#[graphql(Context = Context)]
pub(crate) struct AddVideoPayload {
    /// The new video and its position in the list of all videos. `null` if
    /// the video vanished before its position could be determined.
    pub(crate) video_edge: Option<VideoEdge>,

    /// Same value as passed in `AddVideoInput`.
    pub(crate) client_mutation_id: Option<String>,
}
