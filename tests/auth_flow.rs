mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::*;
use serde_json::{Value, json};

#[actix_web::test]
async fn register_login_and_me() {
    let pool = test_pool().await;
    let dir = temp_upload_dir("presensi-auth-register");
    let config = test_config(dir.to_str().unwrap());
    let app = init_app!(pool, config);

    let resp = test::call_service(
        &app,
        post_json(
            "/api/auth/register",
            json!({
                "name": "Eka Saputra",
                "email": "eka.register@campus.ac.id",
                "password": "rahasia123"
            }),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Same email again is a conflict
    let resp = test::call_service(
        &app,
        post_json(
            "/api/auth/register",
            json!({
                "name": "Eka Saputra",
                "email": "eka.register@campus.ac.id",
                "password": "rahasia123"
            }),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let (access, _refresh) = login_tokens(&app, "eka.register@campus.ac.id", "rahasia123").await;

    let resp = test::call_service(&app, get("/api/me", Some(&access))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], "eka.register@campus.ac.id");
    assert_eq!(body["name"], "Eka Saputra");
    // Registration defaults to the student role
    assert_eq!(body["role_id"], 3);
}

#[actix_web::test]
async fn register_rejects_empty_fields_and_bad_roles() {
    let pool = test_pool().await;
    let dir = temp_upload_dir("presensi-auth-validate");
    let config = test_config(dir.to_str().unwrap());
    let app = init_app!(pool, config);

    let resp = test::call_service(
        &app,
        post_json(
            "/api/auth/register",
            json!({ "name": "", "email": "", "password": "" }),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        post_json(
            "/api/auth/register",
            json!({
                "name": "Fajar",
                "email": "fajar.badrole@campus.ac.id",
                "password": "rahasia123",
                "role_id": 42
            }),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn login_rejects_bad_credentials() {
    let pool = test_pool().await;
    let dir = temp_upload_dir("presensi-auth-badcred");
    let config = test_config(dir.to_str().unwrap());
    let app = init_app!(pool, config);

    seed_user(&pool, "Gita", "gita.badcred@campus.ac.id", "rahasia123", 3).await;

    let resp = test::call_service(
        &app,
        post_json(
            "/api/auth/login",
            json!({ "email": "gita.badcred@campus.ac.id", "password": "salah" }),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(
        &app,
        post_json(
            "/api/auth/login",
            json!({ "email": "nobody@campus.ac.id", "password": "rahasia123" }),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn refresh_rotates_and_revokes() {
    let pool = test_pool().await;
    let dir = temp_upload_dir("presensi-auth-refresh");
    let config = test_config(dir.to_str().unwrap());
    let app = init_app!(pool, config);

    seed_user(&pool, "Hana", "hana.refresh@campus.ac.id", "rahasia123", 3).await;
    let (_access, refresh) = login_tokens(&app, "hana.refresh@campus.ac.id", "rahasia123").await;

    // First refresh succeeds and hands back a new pair
    let resp = test::call_service(
        &app,
        post_empty("/api/auth/refresh", Some(&refresh)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let new_access = body["access_token"].as_str().expect("access").to_string();
    let new_refresh = body["refresh_token"].as_str().expect("refresh").to_string();
    assert_ne!(new_refresh, refresh);

    // The new access token works
    let resp = test::call_service(&app, get("/api/me", Some(&new_access))).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The spent refresh token is gone
    let resp = test::call_service(&app, post_empty("/api/auth/refresh", Some(&refresh))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Logout revokes the current one
    let resp = test::call_service(&app, post_empty("/api/auth/logout", Some(&new_refresh))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test::call_service(&app, post_empty("/api/auth/refresh", Some(&new_refresh))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn token_types_are_not_interchangeable() {
    let pool = test_pool().await;
    let dir = temp_upload_dir("presensi-auth-tokentype");
    let config = test_config(dir.to_str().unwrap());
    let app = init_app!(pool, config);

    seed_user(&pool, "Intan", "intan.tokentype@campus.ac.id", "rahasia123", 3).await;
    let (access, refresh) = login_tokens(&app, "intan.tokentype@campus.ac.id", "rahasia123").await;

    // A refresh token cannot reach protected routes
    let resp = test::call_service(&app, get("/api/me", Some(&refresh))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // An access token cannot be used to refresh
    let resp = test::call_service(&app, post_empty("/api/auth/refresh", Some(&access))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
