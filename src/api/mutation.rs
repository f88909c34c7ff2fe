use juniper::graphql_object;

use super::{
    Context,
    err::ApiResult,
    model::video::{AddVideoInput, AddVideoPayload, Video},
};


/// The root mutation object.
pub(crate) struct Mutation;

#[graphql_object(Context = Context)]
impl Mutation {
    /// Adds a new video to the catalog.
    ///
    /// The `clientMutationId` of the input is returned unchanged in the
    /// payload.
    async fn create_video(input: AddVideoInput, context: &Context) -> ApiResult<AddVideoPayload> {
        Video::create(input, context).await
    }
}
