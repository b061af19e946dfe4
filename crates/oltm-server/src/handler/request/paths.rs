//! Path parameter types for HTTP handlers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path parameters for vehicle threads.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePathParams {
    /// Identifier of the vehicle.
    pub vehicle_id: i64,
}

/// Path parameters for post threads.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostPathParams {
    /// Identifier of the post.
    pub post_id: i64,
}

/// Path parameters for single-comment operations.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentPathParams {
    /// Identifier of the comment.
    pub comment_id: i64,
}
