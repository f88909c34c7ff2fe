use juniper::graphql_object;

use super::{
    Context,
    Cursor,
    Id,
    NodeValue,
    connection::ConnectionArgs,
    err::ApiResult,
    model::video::{Video, VideoConnection},
};


/// The root query object.
pub(crate) struct Query;

#[graphql_object(Context = Context)]
impl Query {
    /// Retrieve a node by globally unique ID. Mostly useful for relay.
    ///
    /// Returns `null` if no object with that ID exists. Errors if the ID is
    /// malformed or refers to a type that does not exist.
    async fn node(id: Id, context: &Context) -> ApiResult<Option<NodeValue>> {
        Ok(context.nodes.load_node(&id).await?)
    }

    /// Returns the video with the given local ID (not its global ID!) or
    /// `null` if it does not exist.
    async fn video(id: Id, context: &Context) -> ApiResult<Option<Video>> {
        Video::load_by_local_id(id.as_str(), context).await
    }

    /// Returns a page of all videos in the order they were added.
    async fn videos(
        first: Option<i32>,
        after: Option<Cursor>,
        last: Option<i32>,
        before: Option<Cursor>,
        context: &Context,
    ) -> ApiResult<VideoConnection> {
        Video::load_connection(ConnectionArgs { first, after, last, before }, context).await
    }
}
