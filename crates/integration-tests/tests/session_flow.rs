//! Integration tests for the persisted session lifecycle.

#![allow(clippy::unwrap_used)]

use holocron_catalog::AppError;
use holocron_catalog::session::AuthError;
use holocron_catalog::session::mock::{DEMO_EMAIL, DEMO_PASSWORD};
use holocron_integration_tests::TestContext;
use secrecy::SecretString;

#[tokio::test]
async fn test_login_survives_restart() {
    let ctx = TestContext::new(9).await.unwrap();

    let mut view = ctx.state.view();
    let token = view
        .login(DEMO_EMAIL, &SecretString::from(DEMO_PASSWORD))
        .await
        .unwrap()
        .token
        .clone();

    assert!(ctx.session_dir.path().join("auth_user.json").exists());

    let restarted = ctx.restart().unwrap();
    let view = restarted.view();
    assert!(view.is_authenticated());
    assert_eq!(view.session().unwrap().token, token);
}

#[tokio::test]
async fn test_invalid_credentials_persist_nothing() {
    let ctx = TestContext::new(9).await.unwrap();

    let mut view = ctx.state.view();
    let err = view
        .login("demo@starwars.com", &SecretString::from("demo124"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Auth(AuthError::InvalidCredentials)));
    assert!(!ctx.session_dir.path().join("auth_user.json").exists());
    assert!(!ctx.restart().unwrap().view().is_authenticated());
}

#[tokio::test]
async fn test_refresh_rotates_persisted_tokens() {
    let ctx = TestContext::new(9).await.unwrap();

    let mut view = ctx.state.view();
    let original = view
        .login(DEMO_EMAIL, &SecretString::from(DEMO_PASSWORD))
        .await
        .unwrap()
        .clone();

    let mut other = ctx.restart().unwrap().view();
    let refreshed = other.refresh_now().await.unwrap().clone();

    assert_eq!(refreshed.email, original.email);
    assert_ne!(refreshed.token, original.token);
    assert_ne!(refreshed.refresh_token, original.refresh_token);
    assert_eq!(ctx.state.sessions().current_session(), Some(refreshed));
}

#[tokio::test]
async fn test_logout_is_seen_by_other_instances() {
    let ctx = TestContext::new(9).await.unwrap();

    let mut view = ctx.state.view();
    view.login(DEMO_EMAIL, &SecretString::from(DEMO_PASSWORD))
        .await
        .unwrap();

    ctx.restart().unwrap().view().logout().unwrap();

    assert!(!ctx.restart().unwrap().view().is_authenticated());
    // Idempotent.
    view.logout().unwrap();
    assert!(!view.is_authenticated());
}

#[tokio::test]
async fn test_refresh_without_session_fails() {
    let ctx = TestContext::new(9).await.unwrap();

    let mut view = ctx.state.view();
    assert!(matches!(
        view.refresh_now().await.unwrap_err(),
        AppError::Unauthenticated
    ));
    assert!(matches!(
        ctx.state.sessions().refresh_session().await.unwrap_err(),
        AuthError::NoActiveSession
    ));
}
