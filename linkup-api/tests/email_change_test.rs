//! Integration tests for the two-step email change flow
//!
//! Request with the current password, then redeem the emailed token.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{test_config, token_from_link, TestContext, FIXTURE_EMAIL, FIXTURE_PASSWORD};
use linkup_shared::models::{email_change::PendingEmailChange, user::User};
use serde_json::json;

async fn request_change(ctx: &TestContext, new_email: &str) -> (StatusCode, serde_json::Value) {
    ctx.patch(
        "/users/request-email-update",
        json!({ "newEmail": new_email, "password": FIXTURE_PASSWORD }),
        None,
    )
    .await
}

#[tokio::test]
async fn test_email_change_scenario() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = request_change(&ctx, "b@mailinator.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Verification email sent to b@mailinator.com");

    let link = body["mockVerificationLink"].as_str().unwrap();
    assert!(link.starts_with("http://localhost:3001/users/confirm-email-change?"));
    assert!(link.contains("token="));

    let token = token_from_link(link);
    let uri = format!("/users/confirm-email-change?token={}", token);

    let (status, body) = ctx.get(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "b@mailinator.com");

    let (status, body) = ctx.get(&uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired token");

    let user = User::find_by_email(&ctx.store, "b@mailinator.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(Some(user.id), ctx.fixture_user.as_ref().map(|u| u.id));
    assert!(User::find_by_email(&ctx.store, FIXTURE_EMAIL)
        .await
        .unwrap()
        .is_none());

    // The new address is now the login identity
    let (status, _) = ctx
        .post(
            "/auth/login",
            json!({ "email": "b@mailinator.com", "password": FIXTURE_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_creates_one_pending_record_per_call() {
    let ctx = TestContext::new().await.unwrap();

    let (_, first) = request_change(&ctx, "one@mailinator.com").await;
    let (_, second) = request_change(&ctx, "two@mailinator.com").await;

    let first = token_from_link(first["mockVerificationLink"].as_str().unwrap());
    let second = token_from_link(second["mockVerificationLink"].as_str().unwrap());
    assert_ne!(first, second);

    let user_id = ctx.fixture_user.as_ref().unwrap().id;
    let pending = PendingEmailChange::pending_for_user(&ctx.store, user_id)
        .await
        .unwrap();
    assert_eq!(pending.len(), 2);
}

#[tokio::test]
async fn test_request_rejects_wrong_password() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .patch(
            "/users/request-email-update",
            json!({ "newEmail": "b@mailinator.com", "password": "wrong" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body.get("mockVerificationLink").is_none());
}

#[tokio::test]
async fn test_request_rejects_email_of_another_user() {
    let ctx = TestContext::new().await.unwrap();
    ctx.register_and_login("taken@mailinator.com", "pw").await;

    let (status, body) = request_change(&ctx, "taken@mailinator.com").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_request_requires_fields() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .patch(
            "/users/request-email-update",
            json!({ "password": FIXTURE_PASSWORD }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_request_for_missing_session_user_is_404() {
    let ctx = TestContext::empty(test_config());

    let (status, _) = request_change(&ctx, "b@mailinator.com").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_confirm_requires_token() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.get("/users/confirm-email-change").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["message"], "Token is required");

    let (status, _) = ctx.get("/users/confirm-email-change?token=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_foreign_token_leaves_pending_change_intact() {
    let ctx = TestContext::new().await.unwrap();

    let (_, body) = request_change(&ctx, "b@mailinator.com").await;
    let token = token_from_link(body["mockVerificationLink"].as_str().unwrap());

    let foreign = "x".repeat(token.len());
    let (status, _) = ctx
        .get(&format!("/users/confirm-email-change?token={}", foreign))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(PendingEmailChange::find_by_token(&ctx.store, &token)
        .await
        .unwrap()
        .is_some());

    let (status, _) = ctx
        .get(&format!("/users/confirm-email-change?token={}", token))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_confirm_accepts_seeded_token_of_any_shape() {
    let ctx = TestContext::new().await.unwrap();
    let user_id = ctx.fixture_user.as_ref().unwrap().id;
    let token = "a3f1".repeat(16);

    // Records written into the store file by other tools carry their own tokens
    ctx.store
        .transaction(|doc| {
            doc.pending_email_changes.push(PendingEmailChange {
                user_id,
                new_email: "seeded@mailinator.com".to_string(),
                token: token.clone(),
                created_at: Utc::now(),
            });
            Ok::<_, linkup_shared::store::StoreError>(())
        })
        .await
        .unwrap();

    let (status, body) = ctx
        .get(&format!("/users/confirm-email-change?token={}", token))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["email"], "seeded@mailinator.com");

    let (status, _) = ctx
        .get("/users/confirm-email-change?token=short")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_confirm_fails_when_address_taken_meanwhile() {
    let ctx = TestContext::new().await.unwrap();

    let (_, body) = request_change(&ctx, "race@mailinator.com").await;
    let token = token_from_link(body["mockVerificationLink"].as_str().unwrap());

    ctx.register_and_login("race@mailinator.com", "pw").await;

    let (status, _) = ctx
        .get(&format!("/users/confirm-email-change?token={}", token))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let fixture = User::find_by_id(&ctx.store, ctx.fixture_user.as_ref().unwrap().id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fixture.email, FIXTURE_EMAIL);
}

#[tokio::test]
async fn test_expired_token_is_rejected_and_removed() {
    let ctx = TestContext::new().await.unwrap();

    let (_, body) = request_change(&ctx, "late@mailinator.com").await;
    let token = token_from_link(body["mockVerificationLink"].as_str().unwrap());

    // Backdate the pending change past the configured lifetime
    ctx.store
        .transaction(|doc| {
            for pending in doc.pending_email_changes.iter_mut() {
                pending.created_at = Utc::now() - Duration::days(2);
            }
            Ok::<_, linkup_shared::store::StoreError>(())
        })
        .await
        .unwrap();

    let (status, _) = ctx
        .get(&format!("/users/confirm-email-change?token={}", token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(PendingEmailChange::find_by_token(&ctx.store, &token)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_production_hides_verification_link() {
    let mut config = test_config();
    config.api.production = true;
    let ctx = TestContext::with_config(config).await.unwrap();
    let token = ctx.register_and_login("prod@mailinator.com", "pw").await;

    let (status, body) = ctx
        .patch(
            "/users/request-email-update",
            json!({ "newEmail": "prod2@mailinator.com", "password": "pw" }),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("mockVerificationLink").is_none());

    // Without a token production has no fixture session
    let (status, _) = request_change(&ctx, "other@mailinator.com").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
