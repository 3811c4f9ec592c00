mod common;

use axum::http::StatusCode;
use common::{make_mailing, request, signup, spawn_app};

#[tokio::test]
async fn register_and_login_round_trip() {
    let t = spawn_app().await;
    let (status, user) = request(
        &t.app,
        "POST",
        "/users/register",
        None,
        Some(serde_json::json!({
            "email": "new@example.com",
            "full_name": "New User",
            "password": "long enough"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["email"], "new@example.com");
    assert!(user.get("password_hash").is_none());

    let (status, login) = request(
        &t.app,
        "POST",
        "/users/login",
        None,
        Some(serde_json::json!({ "email": "new@example.com", "password": "long enough" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = login["token"].as_str().unwrap().to_string();

    let (status, _) = request(&t.app, "GET", "/recipients", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &t.app,
        "POST",
        "/users/login",
        None,
        Some(serde_json::json!({ "email": "new@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_recipient_email_is_rejected_before_persistence() {
    let t = spawn_app().await;
    let (_, token) = signup(&t.pool, "owner@example.com").await;
    let payload = serde_json::json!({ "email": "dup@example.com", "full_name": "First" });

    let (status, _) = request(&t.app, "POST", "/recipients", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);

    // Uniqueness is global, so even another user collides.
    let (_, other_token) = signup(&t.pool, "other@example.com").await;
    let (status, body) = request(
        &t.app,
        "POST",
        "/recipients",
        Some(&other_token),
        Some(serde_json::json!({ "email": "dup@example.com", "full_name": "Second" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("dup@example.com"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipients")
        .fetch_one(&t.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn malformed_recipient_email_is_rejected() {
    let t = spawn_app().await;
    let (_, token) = signup(&t.pool, "owner@example.com").await;
    let (status, _) = request(
        &t.app,
        "POST",
        "/recipients",
        Some(&token),
        Some(serde_json::json!({ "email": "not-an-address", "full_name": "Broken" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipients")
        .fetch_one(&t.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn recipient_update_keeps_email_unique() {
    let t = spawn_app().await;
    let (_, token) = signup(&t.pool, "owner@example.com").await;

    let (_, first) = request(
        &t.app,
        "POST",
        "/recipients",
        Some(&token),
        Some(serde_json::json!({ "email": "a@example.com", "full_name": "A" })),
    )
    .await;
    request(
        &t.app,
        "POST",
        "/recipients",
        Some(&token),
        Some(serde_json::json!({ "email": "b@example.com", "full_name": "B" })),
    )
    .await;

    let uri = format!("/recipients/{}", first["id"].as_i64().unwrap());
    let (status, _) = request(
        &t.app,
        "PATCH",
        &uri,
        Some(&token),
        Some(serde_json::json!({ "email": "b@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Re-saving with its own address is fine.
    let (status, updated) = request(
        &t.app,
        "PATCH",
        &uri,
        Some(&token),
        Some(serde_json::json!({ "email": "a@example.com", "full_name": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["full_name"], "Renamed");
}

#[tokio::test]
async fn deleting_a_message_cascades_to_its_mailings() {
    let t = spawn_app().await;
    let (_, token) = signup(&t.pool, "owner@example.com").await;
    let (message_id, mailing_id) =
        make_mailing(&t.app, &token, "Hi", "Body", &["r1@example.com"]).await;

    let (status, _) = request(
        &t.app,
        "DELETE",
        &format!("/messages/{message_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(
        &t.app,
        "GET",
        &format!("/mailings/{mailing_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The recipient itself survives the cascade.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipients")
        .fetch_one(&t.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn deleting_a_recipient_only_shrinks_the_mailing() {
    let t = spawn_app().await;
    let (_, token) = signup(&t.pool, "owner@example.com").await;
    let (_, mailing_id) = make_mailing(
        &t.app,
        &token,
        "Hi",
        "Body",
        &["gone@example.com", "stays@example.com"],
    )
    .await;

    let gone_id: i64 = sqlx::query_scalar("SELECT id FROM recipients WHERE email = ?")
        .bind("gone@example.com")
        .fetch_one(&t.pool)
        .await
        .unwrap();
    let (status, _) = request(
        &t.app,
        "DELETE",
        &format!("/recipients/{gone_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, detail) = request(
        &t.app,
        "GET",
        &format!("/mailings/{mailing_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let recipients = detail["recipients"].as_array().unwrap();
    assert_eq!(recipients.len(), 1);
    assert_eq!(recipients[0]["email"], "stays@example.com");
}

#[tokio::test]
async fn mailing_creation_requires_existing_message_and_recipients() {
    let t = spawn_app().await;
    let (_, token) = signup(&t.pool, "owner@example.com").await;

    let (status, _) = request(
        &t.app,
        "POST",
        "/mailings",
        Some(&token),
        Some(serde_json::json!({ "message_id": 42, "recipient_ids": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, message) = request(
        &t.app,
        "POST",
        "/messages",
        Some(&token),
        Some(serde_json::json!({ "subject": "Hi", "body": "Body" })),
    )
    .await;
    let message_id = message["id"].as_i64().unwrap();
    let (status, _) = request(
        &t.app,
        "POST",
        "/mailings",
        Some(&token),
        Some(serde_json::json!({ "message_id": message_id, "recipient_ids": [42] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mailings")
        .fetch_one(&t.pool)
        .await
        .unwrap();
    assert_eq!(count, 0, "failed creation must leave no partial rows");
}

#[tokio::test]
async fn mailing_update_replaces_recipient_set() {
    let t = spawn_app().await;
    let (_, token) = signup(&t.pool, "owner@example.com").await;
    let (_, mailing_id) =
        make_mailing(&t.app, &token, "Hi", "Body", &["old@example.com"]).await;

    let (_, replacement) = request(
        &t.app,
        "POST",
        "/recipients",
        Some(&token),
        Some(serde_json::json!({ "email": "new@example.com", "full_name": "New" })),
    )
    .await;
    let new_id = replacement["id"].as_i64().unwrap();

    let (status, _) = request(
        &t.app,
        "PATCH",
        &format!("/mailings/{mailing_id}"),
        Some(&token),
        Some(serde_json::json!({ "recipient_ids": [new_id] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = request(
        &t.app,
        "GET",
        &format!("/mailings/{mailing_id}"),
        Some(&token),
        None,
    )
    .await;
    let recipients = detail["recipients"].as_array().unwrap();
    assert_eq!(recipients.len(), 1);
    assert_eq!(recipients[0]["email"], "new@example.com");
}
