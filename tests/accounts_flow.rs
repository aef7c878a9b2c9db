mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use time::{Duration, OffsetDateTime};

use common::*;
use gatehouse::accounts::reset_token::ResetKeys;
use gatehouse::config::ResetConfig;

fn alice() -> serde_json::Value {
    json!({
        "name": "Alice",
        "email": "Alice@Example.com",
        "country_code": "+44",
        "phone": "07700900123",
        "password": "hunter2hunter2"
    })
}

async fn register_alice(app: &axum::Router) {
    let (status, body) = send_json(app, json_post("/register", alice())).await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

fn token_from_link(link: &str) -> String {
    link.split("token=").nth(1).expect("token in link").to_string()
}

#[tokio::test]
async fn home_and_health_respond() {
    let (app, _) = accounts_app().await;

    let (status, page) = send_text(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("<form"));

    let (status, body) = send_json(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_then_duplicate_conflicts() {
    let (app, _) = accounts_app().await;

    let (status, body) = send_json(&app, json_post("/register", alice())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Registration successful!");

    let (status, body) = send_json(&app, json_post("/register", alice())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "User already exists.");
}

#[tokio::test]
async fn duplicate_email_differs_only_in_case() {
    let (app, _) = accounts_app().await;
    register_alice(&app).await;

    let mut again = alice();
    again["email"] = json!("ALICE@EXAMPLE.COM");
    again["phone"] = json!("0123456789");
    let (status, _) = send_json(&app, json_post("/register", again)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn duplicate_phone_conflicts() {
    let (app, _) = accounts_app().await;
    register_alice(&app).await;

    let mut other = alice();
    other["email"] = json!("bob@example.com");
    let (status, _) = send_json(&app, json_post("/register", other)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn register_validates_email_and_phone() {
    let (app, _) = accounts_app().await;

    let mut bad_email = alice();
    bad_email["email"] = json!("not-an-email");
    let (status, body) = send_json(&app, json_post("/register", bad_email)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email address.");

    let mut bad_phone = alice();
    bad_phone["phone"] = json!("12-34");
    let (status, body) = send_json(&app, json_post("/register", bad_phone)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid phone number.");

    let (status, _) = send_json(&app, json_post("/register", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_by_email_or_phone() {
    let (app, _) = accounts_app().await;
    register_alice(&app).await;

    for identifier in ["alice@example.com", "ALICE@example.COM", "07700900123"] {
        let (status, body) = send_json(
            &app,
            json_post(
                "/login",
                json!({ "email_or_phone": identifier, "password": "hunter2hunter2" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "identifier {identifier}");
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Welcome Alice!");
    }
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let (app, _) = accounts_app().await;
    register_alice(&app).await;

    for password in ["wrong", "hunter2hunter", "HUNTER2HUNTER2"] {
        let (status, body) = send_json(
            &app,
            json_post(
                "/login",
                json!({ "email_or_phone": "alice@example.com", "password": password }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid credentials.");
    }

    let (status, _) = send_json(
        &app,
        json_post(
            "/login",
            json!({ "email_or_phone": "nobody@example.com", "password": "x" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn request_reset_builds_link_from_host() {
    let (app, _) = accounts_app().await;

    let req = Request::builder()
        .method("POST")
        .uri("/request-reset")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::HOST, "auth.example.test")
        .body(Body::from(json!({ "email_or_phone": "User@Example.com" }).to_string()))
        .unwrap();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Reset link generated.");

    let link = body["reset_link"].as_str().unwrap();
    assert!(link.starts_with("http://auth.example.test/reset-password?token="));

    let keys = ResetKeys::new(&ResetConfig::with_secret(RESET_SECRET));
    assert_eq!(keys.verify(&token_from_link(link)).unwrap(), "user@example.com");
}

#[tokio::test]
async fn reset_form_prefills_token() {
    let (app, _) = accounts_app().await;
    let (status, page) = send_text(&app, get("/reset-password?token=abc.def.ghi")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains(r#"value="abc.def.ghi""#));
}

#[tokio::test]
async fn full_password_reset_flow() {
    let (app, _) = accounts_app().await;
    register_alice(&app).await;

    let (_, body) = send_json(
        &app,
        json_post("/request-reset", json!({ "email_or_phone": "alice@example.com" })),
    )
    .await;
    let token = token_from_link(body["reset_link"].as_str().unwrap());

    let (status, text) = send_text(
        &app,
        form_post("/reset-password", &format!("token={token}&password=n3w-pass")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "Password reset successful! You can close this page and log in.");

    let (status, _) = send_json(
        &app,
        json_post(
            "/login",
            json!({ "email_or_phone": "alice@example.com", "password": "n3w-pass" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app,
        json_post(
            "/login",
            json!({ "email_or_phone": "alice@example.com", "password": "hunter2hunter2" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reset_rejects_tampered_and_expired_tokens() {
    let (app, _) = accounts_app().await;
    register_alice(&app).await;

    let (_, text) = send_text(
        &app,
        form_post("/reset-password", "token=garbage&password=x"),
    )
    .await;
    assert_eq!(text, "Invalid or expired token.");

    let keys = ResetKeys::new(&ResetConfig::with_secret(RESET_SECRET));
    let stale = keys
        .issue_at(
            "alice@example.com",
            OffsetDateTime::now_utc() - Duration::seconds(3601),
        )
        .unwrap();
    let (_, text) = send_text(
        &app,
        form_post("/reset-password", &format!("token={stale}&password=x")),
    )
    .await;
    assert_eq!(text, "Invalid or expired token.");

    let foreign = ResetKeys::new(&ResetConfig::with_secret("other-secret"))
        .issue("alice@example.com")
        .unwrap();
    let (_, text) = send_text(
        &app,
        form_post("/reset-password", &format!("token={foreign}&password=x")),
    )
    .await;
    assert_eq!(text, "Invalid or expired token.");

    // Old password still works after the rejected attempts.
    let (status, _) = send_json(
        &app,
        json_post(
            "/login",
            json!({ "email_or_phone": "alice@example.com", "password": "hunter2hunter2" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn reset_for_unknown_account_is_reported() {
    let (app, _) = accounts_app().await;
    let token = ResetKeys::new(&ResetConfig::with_secret(RESET_SECRET))
        .issue("ghost@example.com")
        .unwrap();
    let (status, text) = send_text(
        &app,
        form_post("/reset-password", &format!("token={token}&password=x")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(text, "No account matches this reset link.");
}

#[tokio::test]
async fn reset_requires_both_fields() {
    let (app, _) = accounts_app().await;
    let (status, _) = send_text(&app, form_post("/reset-password", "token=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_password_is_a_credential_failure() {
    let (app, _) = accounts_app().await;
    register_alice(&app).await;

    for body in [
        json!({ "email_or_phone": "alice@example.com", "password": "" }),
        json!({ "email_or_phone": "alice@example.com" }),
    ] {
        let (status, res) = send_json(&app, json_post("/login", body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(res["message"], "Invalid credentials.");
    }
}

#[tokio::test]
async fn json_routes_ignore_content_type_and_accept_numeric_phone() {
    let (app, _) = accounts_app().await;

    let mut numeric = alice();
    numeric["phone"] = json!(7700900123u64);
    let (status, body) = send_json(&app, bare_post("/register", &numeric.to_string())).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = send_json(
        &app,
        bare_post(
            "/login",
            &json!({ "email_or_phone": 7700900123u64, "password": "hunter2hunter2" }).to_string(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome Alice!");
}

#[tokio::test]
async fn malformed_bodies_get_the_failure_shape() {
    let (app, _) = accounts_app().await;
    for uri in ["/register", "/login", "/request-reset"] {
        let (status, body) = send_json(&app, bare_post(uri, "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, json!({ "success": false, "message": "Invalid request body" }));
    }

    let (status, body) = send_json(
        &app,
        json_post("/login", json!({ "email_or_phone": {}, "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
