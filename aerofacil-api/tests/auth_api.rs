//! Registration, sign-in and sign-out.

mod common;

use aerofacil_api::auth::session::SESSION_COOKIE;
use aerofacil_api::auth::LOGGED_OUT_MESSAGE;
use aerofacil_api::flash::FlashLevel;
use axum::http::StatusCode;
use common::{assert_redirect, body_text, flashes, set_cookie, TestApp, PASSWORD};

fn registration<'a>(username: &'a str, password: &'a str) -> Vec<(&'static str, &'a str)> {
    vec![
        ("username", username),
        ("password", password),
        ("password_confirm", password),
        ("full_name", "Maria Bonita"),
        ("phone_number", "+55 84 99999-0000"),
        ("is_owner", "on"),
    ]
}

#[tokio::test]
async fn test_register_signs_in_and_redirects_to_dashboard() {
    let app = TestApp::new();

    let response = app.post_form("/register", &registration("maria", "pilot-license-42"), None).await;
    assert_redirect(&response, "/dashboard");
    let token = set_cookie(&response, SESSION_COOKIE).expect("session cookie set");
    assert!(!token.is_empty());

    let user = app.state.users.find_by_username("maria").await.unwrap().expect("user stored");
    assert!(user.is_owner);
    assert_eq!(user.display_name(), "Maria Bonita");
    assert_ne!(user.password_hash, "pilot-license-42");

    let cookie = format!("{}={}", SESSION_COOKIE, token);
    assert_eq!(app.get("/dashboard", Some(&cookie)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_rejects_taken_username_and_bad_passwords() {
    let app = TestApp::new();
    app.user("maria").await;

    let taken = app.post_form("/register", &registration("maria", "pilot-license-42"), None).await;
    assert_eq!(taken.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(taken).await.contains("already exists"));

    let short = app.post_form("/register", &registration("joao", "short"), None).await;
    assert_eq!(short.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(app.state.users.find_by_username("joao").await.unwrap().is_none());

    let mut mismatch = registration("joao", "pilot-license-42");
    mismatch[2].1 = "pilot-license-43";
    let response = app.post_form("/register", &mismatch, None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(set_cookie(&response, SESSION_COOKIE).is_none());
}

#[tokio::test]
async fn test_login_redirects_to_next() {
    let app = TestApp::new();
    app.user("pilot").await;

    let response = app
        .post_form(
            "/login",
            &[("username", "pilot"), ("password", PASSWORD), ("next", "/trips/new")],
            None,
        )
        .await;
    assert_redirect(&response, "/trips/new");
    assert!(set_cookie(&response, SESSION_COOKIE).is_some());
}

#[tokio::test]
async fn test_login_ignores_offsite_next() {
    let app = TestApp::new();
    app.user("pilot").await;

    let response = app
        .post_form(
            "/login",
            &[("username", "pilot"), ("password", PASSWORD), ("next", "https://evil.example/")],
            None,
        )
        .await;
    assert_redirect(&response, "/");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = TestApp::new();
    app.user("pilot").await;

    for (username, password) in [("pilot", "not-the-password"), ("ghost", PASSWORD)] {
        let response = app
            .post_form("/login", &[("username", username), ("password", password)], None)
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookie(&response, SESSION_COOKIE).is_none());
    }
}

#[tokio::test]
async fn test_login_page_keeps_next() {
    let app = TestApp::new();
    let response = app.get("/login?next=%2Fdashboard", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"name="next""#));
    assert!(body.contains("dashboard"));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let app = TestApp::new();
    let user = app.user("pilot").await;

    let response = app.post_form("/logout", &[], Some(&app.session_for(&user))).await;
    assert_redirect(&response, "/");
    assert_eq!(set_cookie(&response, SESSION_COOKIE).as_deref(), Some(""));

    let messages = flashes(&response);
    assert_eq!(messages[0].level, FlashLevel::Info);
    assert_eq!(messages[0].text, LOGGED_OUT_MESSAGE);
}

#[tokio::test]
async fn test_tampered_session_is_anonymous() {
    let app = TestApp::new();
    let user = app.user("pilot").await;
    let cookie = format!("{}x", app.session_for(&user));

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
