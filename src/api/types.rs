//! Wire DTOs for the blog REST API.
//!
//! DESIGN
//! ======
//! Field names follow the backend's camelCase JSON. Optional fields carry
//! `#[serde(default)]` so older/newer server revisions that omit them still
//! decode.

use serde::{Deserialize, Serialize};

pub use crate::session::{Role, UserProfile};

/// `{accessToken, user}` returned by login, register, refresh and password change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub access_token: String,
    pub user: UserProfile,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content_markdown: String,
    pub author_id: i64,
    pub author_username: String,
    pub created_at: String,
    pub updated_at: String,
    /// Present when listed from a favorites view.
    #[serde(default)]
    pub favorited_at: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    /// Position inside a collection when listed from one.
    #[serde(default)]
    pub collection_position: Option<i64>,
}

/// Sort direction reported by paged listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedPosts {
    pub items: Vec<Post>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    /// Echo of the search query, for search results.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub order: Option<SortOrder>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub owner_id: i64,
    pub owner_username: String,
    pub created_at: String,
    pub updated_at: String,
    pub post_count: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionList {
    pub items: Vec<Collection>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDetail {
    pub collection: Collection,
    pub posts: Vec<Post>,
    pub total: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCollectionMembership {
    pub collection_id: i64,
    pub collection_name: String,
    pub position: i64,
}

/// Neighbours of a post inside one collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionNavigation {
    pub collection_id: i64,
    pub current_position: i64,
    pub prev: Option<Post>,
    pub next: Option<Post>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCollections {
    pub items: Vec<PostCollectionMembership>,
    #[serde(default)]
    pub navigation: Option<CollectionNavigation>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionSummary {
    pub like_count: u64,
    pub favorite_count: u64,
    pub comment_count: u64,
    pub liked_by_me: bool,
    pub favorited_by_me: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentItem {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub username: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub is_deleted: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedComments {
    pub items: Vec<CommentItem>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedUsers {
    pub items: Vec<UserProfile>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

// =============================================================================
// ACKNOWLEDGEMENTS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedAck {
    pub deleted: bool,
    pub id: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedAck {
    pub added: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedAck {
    pub removed: bool,
    pub collection_id: i64,
    pub post_id: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutAck {
    pub ok: bool,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
