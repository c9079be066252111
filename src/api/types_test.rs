use serde_json::json;

use super::*;

// =============================================================
// Helpers
// =============================================================

fn post_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "title": "Ownership, briefly",
        "contentMarkdown": "# Hi",
        "authorId": 3,
        "authorUsername": "ferris",
        "createdAt": "2024-01-01 00:00:00",
        "updatedAt": "2024-01-02 00:00:00",
        "isDeleted": false
    })
}

// =============================================================
// Decoding
// =============================================================

#[test]
fn post_decodes_without_optional_fields() {
    let post: Post = serde_json::from_value(post_json(1)).unwrap();
    assert_eq!(post.author_username, "ferris");
    assert_eq!(post.favorited_at, None);
    assert_eq!(post.collection_position, None);
}

#[test]
fn post_decodes_collection_position() {
    let mut value = post_json(2);
    value["collectionPosition"] = json!(4);
    let post: Post = serde_json::from_value(value).unwrap();
    assert_eq!(post.collection_position, Some(4));
}

#[test]
fn paged_posts_reads_search_echo_and_order() {
    let paged: PagedPosts = serde_json::from_value(json!({
        "items": [post_json(1)],
        "page": 1,
        "pageSize": 10,
        "total": 1,
        "q": "rust",
        "order": "desc"
    }))
    .unwrap();
    assert_eq!(paged.q.as_deref(), Some("rust"));
    assert_eq!(paged.order, Some(SortOrder::Desc));
    assert_eq!(paged.items.len(), 1);
}

#[test]
fn post_collections_navigation_may_be_null() {
    let data: PostCollections = serde_json::from_value(json!({
        "items": [{ "collectionId": 5, "collectionName": "Series", "position": 2 }],
        "navigation": null
    }))
    .unwrap();
    assert_eq!(data.items[0].collection_name, "Series");
    assert_eq!(data.navigation, None);
}

#[test]
fn navigation_carries_neighbours() {
    let nav: CollectionNavigation = serde_json::from_value(json!({
        "collectionId": 5,
        "currentPosition": 2,
        "prev": post_json(1),
        "next": null
    }))
    .unwrap();
    assert_eq!(nav.prev.map(|p| p.id), Some(1));
    assert!(nav.next.is_none());
}

#[test]
fn role_uses_lowercase_wire_names() {
    assert_eq!(serde_json::to_value(Role::Admin).unwrap(), json!("admin"));
    assert_eq!(serde_json::from_value::<Role>(json!("user")).unwrap(), Role::User);
    assert!(serde_json::from_value::<Role>(json!("Admin")).is_err());
}

#[test]
fn auth_payload_requires_user() {
    assert!(serde_json::from_value::<AuthPayload>(json!({ "accessToken": "t" })).is_err());
}

#[test]
fn removed_ack_uses_camel_case() {
    let ack: RemovedAck =
        serde_json::from_value(json!({ "removed": true, "collectionId": 1, "postId": 9 })).unwrap();
    assert_eq!(ack, RemovedAck { removed: true, collection_id: 1, post_id: 9 });
}
