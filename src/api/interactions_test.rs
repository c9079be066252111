use reqwest::Method;
use serde_json::json;

use super::*;
use crate::session::{Role, Session};
use crate::test_helpers::{MockBackend, authed_store, fail, gateway_for, ok};

fn summary(liked: bool, favorited: bool) -> serde_json::Value {
    json!({
        "likeCount": u64::from(liked),
        "favoriteCount": u64::from(favorited),
        "commentCount": 0,
        "likedByMe": liked,
        "favoritedByMe": favorited
    })
}

#[tokio::test]
async fn like_and_favorite_toggle_with_put_and_delete() {
    let backend = MockBackend::new(|req| ok(summary(req.method == Method::PUT, false)));
    let store = authed_store("tok", Role::User);
    let gateway = gateway_for(&backend, &store);

    assert!(like_post(&gateway, 4).await.unwrap().liked_by_me);
    assert!(!unlike_post(&gateway, 4).await.unwrap().liked_by_me);
    favorite_post(&gateway, 4).await.unwrap();
    unfavorite_post(&gateway, 4).await.unwrap();

    let calls: Vec<_> = backend
        .requests()
        .into_iter()
        .map(|r| (r.method, r.path))
        .collect();
    assert_eq!(
        calls,
        vec![
            (Method::PUT, "/api/posts/4/like".to_owned()),
            (Method::DELETE, "/api/posts/4/like".to_owned()),
            (Method::PUT, "/api/posts/4/favorite".to_owned()),
            (Method::DELETE, "/api/posts/4/favorite".to_owned()),
        ]
    );
}

#[tokio::test]
async fn interactions_are_authenticated() {
    let backend = MockBackend::new(|_| ok(summary(false, true)));
    let store = authed_store("tok", Role::User);
    let gateway = gateway_for(&backend, &store);

    let got = get_post_interactions(&gateway, 4).await.unwrap();
    assert!(got.favorited_by_me);
    assert_eq!(backend.requests()[0].path, "/api/posts/4/interactions");
    assert_eq!(backend.requests()[0].bearer.as_deref(), Some("tok"));
}

#[tokio::test]
async fn comments_list_public_and_create_authenticated() {
    let backend = MockBackend::new(|req| {
        if req.method == Method::GET {
            ok(json!({ "items": [], "page": 1, "pageSize": 10, "total": 0 }))
        } else {
            ok(json!({
                "id": 1,
                "postId": 4,
                "userId": 42,
                "username": "grace",
                "content": "nice",
                "createdAt": "2024-05-01 08:30:00",
                "updatedAt": "2024-05-01 08:30:00"
            }))
        }
    });
    let store = authed_store("tok", Role::User);
    let gateway = gateway_for(&backend, &store);

    list_comments(&gateway, 4, None, None).await.unwrap();
    let comment = create_comment(&gateway, 4, "nice").await.unwrap();
    assert_eq!(comment.content, "nice");

    let requests = backend.requests();
    assert_eq!(requests[0].path, "/api/posts/4/comments?page=1&pageSize=10");
    assert_eq!(requests[0].bearer, None);
    assert_eq!(requests[1].body, Some(json!({ "content": "nice" })));
    assert_eq!(requests[1].bearer.as_deref(), Some("tok"));
}

#[tokio::test]
async fn banned_user_liking_loses_session() {
    let backend = MockBackend::new(|_| fail(403, "USER_BANNED"));
    let store = authed_store("tok", Role::User);
    let gateway = gateway_for(&backend, &store);

    assert!(like_post(&gateway, 4).await.is_err());
    assert_eq!(store.state(), Session::Anonymous);
}

#[tokio::test]
async fn delete_comment_uses_comment_path() {
    let backend = MockBackend::new(|_| ok(json!({ "deleted": true, "id": 12 })));
    let store = authed_store("tok", Role::User);
    let gateway = gateway_for(&backend, &store);

    assert!(delete_comment(&gateway, 12).await.unwrap().deleted);
    assert_eq!(backend.requests()[0].path, "/api/comments/12");
}
