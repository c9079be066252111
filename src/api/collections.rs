//! Collection endpoints: ordered, user-owned groupings of posts.

use serde_json::json;

use super::posts::post_path;
use super::types::{AddedAck, Collection, CollectionDetail, CollectionList, PostCollections, RemovedAck};
use crate::net::error::ApiError;
use crate::net::gateway::{ApiRequest, Gateway};

pub const COLLECTIONS_PATH: &str = "/api/collections";
pub const MY_COLLECTIONS_PATH: &str = "/api/collections/mine";

#[must_use]
pub fn collection_path(id: i64) -> String {
    format!("{COLLECTIONS_PATH}/{id}")
}

/// # Errors
///
/// Returns the server or transport error.
pub async fn create_collection(gateway: &Gateway, name: &str, description: &str) -> Result<Collection, ApiError> {
    let request = ApiRequest::post(COLLECTIONS_PATH).json(json!({ "name": name, "description": description }));
    gateway.send_json(&request).await
}

/// # Errors
///
/// Returns the server or transport error.
pub async fn list_my_collections(gateway: &Gateway) -> Result<CollectionList, ApiError> {
    gateway.send_json(&ApiRequest::get(MY_COLLECTIONS_PATH)).await
}

/// Public view of a collection and its posts in order.
///
/// # Errors
///
/// Returns `COLLECTION_NOT_FOUND` (404) for unknown collections.
pub async fn get_collection(gateway: &Gateway, id: i64) -> Result<CollectionDetail, ApiError> {
    gateway.send_json(&ApiRequest::get(collection_path(id)).skip_auth()).await
}

/// Append a post to the end of a collection the caller owns.
///
/// # Errors
///
/// Returns the server or transport error.
pub async fn add_post_to_collection(gateway: &Gateway, collection_id: i64, post_id: i64) -> Result<AddedAck, ApiError> {
    let request = ApiRequest::post(format!("{}/posts", collection_path(collection_id)))
        .json(json!({ "postId": post_id }));
    gateway.send_json(&request).await
}

/// # Errors
///
/// Returns the server or transport error.
pub async fn remove_post_from_collection(
    gateway: &Gateway,
    collection_id: i64,
    post_id: i64,
) -> Result<RemovedAck, ApiError> {
    let path = format!("{}/posts/{post_id}", collection_path(collection_id));
    gateway.send_json(&ApiRequest::delete(path)).await
}

/// Collections containing a post. With `collection_id`, the response also
/// carries prev/next navigation inside that collection.
///
/// # Errors
///
/// Returns the server or transport error.
pub async fn get_post_collections(
    gateway: &Gateway,
    post_id: i64,
    collection_id: Option<i64>,
) -> Result<PostCollections, ApiError> {
    let base = format!("{}/collections", post_path(post_id));
    let path = match collection_id {
        Some(collection_id) => format!("{base}?collectionId={collection_id}"),
        None => base,
    };
    gateway.send_json(&ApiRequest::get(path).skip_auth()).await
}

#[cfg(test)]
#[path = "collections_test.rs"]
mod tests;
