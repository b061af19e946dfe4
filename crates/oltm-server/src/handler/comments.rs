//! Comment thread handlers.
//!
//! Reads are public; posting requires a session.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use oltm_core::{CommentId, CommentService, Target};

use crate::extract::{AuthState, Json, Path, ValidateJson};
use crate::handler::{ErrorKind, Result};
use crate::handler::request::{CommentPathParams, CreateComment, PostPathParams, VehiclePathParams};
use crate::handler::response::{Comment, CommentCreated, Comments, ErrorResponse, Thread, ThreadNode};
use crate::service::ServiceState;

const TRACING_TARGET: &str = "oltm_server::handler::comments";

async fn list_flat(service: &CommentService, target: Target) -> Result<Json<Comments>> {
    let comments = service.list_flat(target).await?;
    tracing::debug!(target: TRACING_TARGET, count = comments.len(), "Comments listed");
    Ok(Json(Comment::from_comments(&comments)))
}

async fn list_thread(service: &CommentService, target: Target) -> Result<Json<Thread>> {
    let forest = service.list_thread(target).await?;
    tracing::debug!(target: TRACING_TARGET, roots = forest.len(), "Thread listed");
    Ok(Json(ThreadNode::from_forest(&forest)))
}

/// Path ids must be positive; `0` and negatives never name a target.
fn vehicle(vehicle_id: i64) -> Result<Target> {
    Target::from_parts(Some(vehicle_id), None)
        .map_err(|_| ErrorKind::InvalidTarget.with_message("Invalid vehicleId"))
}

fn post(post_id: i64) -> Result<Target> {
    Target::from_parts(None, Some(post_id))
        .map_err(|_| ErrorKind::InvalidTarget.with_message("Invalid postId"))
}

#[tracing::instrument(skip_all, fields(vehicle_id = path_params.vehicle_id))]
async fn list_vehicle_comments(
    State(service): State<CommentService>,
    Path(path_params): Path<VehiclePathParams>,
) -> Result<Json<Comments>> {
    list_flat(&service, vehicle(path_params.vehicle_id)?).await
}

fn list_vehicle_comments_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List vehicle comments")
        .description("Returns every comment on a vehicle, newest first, without nesting.")
        .response::<200, Json<Comments>>()
        .response::<400, Json<ErrorResponse>>()
}

#[tracing::instrument(skip_all, fields(post_id = path_params.post_id))]
async fn list_post_comments(
    State(service): State<CommentService>,
    Path(path_params): Path<PostPathParams>,
) -> Result<Json<Comments>> {
    list_flat(&service, post(path_params.post_id)?).await
}

fn list_post_comments_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List post comments")
        .description("Returns every comment on a post, newest first, without nesting.")
        .response::<200, Json<Comments>>()
        .response::<400, Json<ErrorResponse>>()
}

#[tracing::instrument(skip_all, fields(vehicle_id = path_params.vehicle_id))]
async fn vehicle_thread(
    State(service): State<CommentService>,
    Path(path_params): Path<VehiclePathParams>,
) -> Result<Json<Thread>> {
    list_thread(&service, vehicle(path_params.vehicle_id)?).await
}

fn vehicle_thread_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get vehicle thread")
        .description("Returns the comments on a vehicle as a reply tree.")
        .response::<200, Json<Thread>>()
        .response::<400, Json<ErrorResponse>>()
}

#[tracing::instrument(skip_all, fields(post_id = path_params.post_id))]
async fn post_thread(
    State(service): State<CommentService>,
    Path(path_params): Path<PostPathParams>,
) -> Result<Json<Thread>> {
    list_thread(&service, post(path_params.post_id)?).await
}

fn post_thread_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get post thread")
        .description("Returns the comments on a post as a reply tree.")
        .response::<200, Json<Thread>>()
        .response::<400, Json<ErrorResponse>>()
}

#[tracing::instrument(skip_all, fields(comment_id = path_params.comment_id))]
async fn read_comment(
    State(service): State<CommentService>,
    Path(path_params): Path<CommentPathParams>,
) -> Result<Json<Comment>> {
    let comment = service.get(CommentId(path_params.comment_id)).await?;
    Ok(Json(Comment::from_comment(&comment)))
}

fn read_comment_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get comment")
        .description("Returns a single comment by ID.")
        .response::<200, Json<Comment>>()
        .response::<404, Json<ErrorResponse>>()
}

#[tracing::instrument(skip_all, fields(comment_id = path_params.comment_id))]
async fn list_replies(
    State(service): State<CommentService>,
    Path(path_params): Path<CommentPathParams>,
) -> Result<Json<Comments>> {
    let replies = service
        .list_direct_replies(CommentId(path_params.comment_id))
        .await?;

    tracing::debug!(target: TRACING_TARGET, count = replies.len(), "Replies listed");
    Ok(Json(Comment::from_comments(&replies)))
}

fn list_replies_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List replies")
        .description("Returns the direct replies to a comment, oldest first.")
        .response::<200, Json<Comments>>()
}

#[tracing::instrument(skip_all, fields(user_id = %auth_state.user_id()))]
async fn post_comment(
    State(service): State<CommentService>,
    auth_state: AuthState,
    ValidateJson(request): ValidateJson<CreateComment>,
) -> Result<(StatusCode, Json<CommentCreated>)> {
    tracing::debug!(target: TRACING_TARGET, "Creating comment");

    let candidate = request.into_candidate(auth_state.user_id());
    let id = service.create(candidate).await?;

    tracing::info!(target: TRACING_TARGET, comment_id = %id, "Comment created");
    Ok((StatusCode::CREATED, Json(CommentCreated { id: id.0 })))
}

fn post_comment_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create comment")
        .description(
            "Posts a comment on a vehicle or a post. Set `parentCommentId` to reply to an \
            existing comment of the same thread.",
        )
        .response::<201, Json<CommentCreated>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/api/comments", post_with(post_comment, post_comment_docs))
        .api_route(
            "/api/comments/by-vehicle/{vehicleId}",
            get_with(list_vehicle_comments, list_vehicle_comments_docs),
        )
        .api_route(
            "/api/comments/by-post/{postId}",
            get_with(list_post_comments, list_post_comments_docs),
        )
        .api_route(
            "/api/comments/thread/by-vehicle/{vehicleId}",
            get_with(vehicle_thread, vehicle_thread_docs),
        )
        .api_route(
            "/api/comments/thread/by-post/{postId}",
            get_with(post_thread, post_thread_docs),
        )
        .api_route(
            "/api/comments/{commentId}",
            get_with(read_comment, read_comment_docs),
        )
        .api_route(
            "/api/comments/{commentId}/replies",
            get_with(list_replies, list_replies_docs),
        )
        .with_path_items(|item| item.tag("Comments"))
}
