#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::test::{self, TestRequest};
use chrono::{DateTime, Utc};
use presensi::auth::password::hash_password;
use presensi::config::Config;
use presensi::db::init_schema;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Builds the same service tree main() serves, against a test pool.
macro_rules! init_app {
    ($pool:expr, $config:expr) => {{
        let routes_config = $config.clone();
        ::actix_web::test::init_service(
            ::actix_web::App::new()
                .app_data(::actix_web::web::Data::new($pool.clone()))
                .app_data(::actix_web::web::Data::new($config.clone()))
                .configure(move |cfg| ::presensi::routes::configure(cfg, routes_config.clone())),
        )
        .await
    }};
}
pub(crate) use init_app;

pub fn peer() -> SocketAddr {
    // The governor limiters key on the peer IP
    "127.0.0.1:54321".parse().expect("peer addr")
}

pub fn temp_upload_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

pub fn test_config(upload_dir: &str) -> Config {
    Config {
        server_addr: "127.0.0.1:0".into(),
        database_url: "sqlite::memory:".into(),
        jwt_secret: "test-secret".into(),
        access_token_ttl: 900,
        refresh_token_ttl: 604_800,
        rate_login_per_min: 600,
        rate_register_per_min: 600,
        rate_refresh_per_min: 600,
        rate_protected_per_min: 6_000,
        api_prefix: "/api".into(),
        upload_dir: upload_dir.into(),
    }
}

pub async fn test_pool() -> SqlitePool {
    // A single connection keeps every query on the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");

    init_schema(&pool).await.expect("create schema");
    pool
}

fn with_auth(req: TestRequest, token: Option<&str>) -> TestRequest {
    match token {
        Some(t) => req.insert_header(("Authorization", format!("Bearer {}", t))),
        None => req,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request {
    with_auth(TestRequest::get().uri(uri).peer_addr(peer()), token).to_request()
}

pub fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request {
    with_auth(
        TestRequest::post().uri(uri).peer_addr(peer()).set_json(&body),
        token,
    )
    .to_request()
}

pub fn post_empty(uri: &str, token: Option<&str>) -> Request {
    with_auth(TestRequest::post().uri(uri).peer_addr(peer()), token).to_request()
}

pub fn put_json(uri: &str, body: Value, token: Option<&str>) -> Request {
    with_auth(
        TestRequest::put().uri(uri).peer_addr(peer()).set_json(&body),
        token,
    )
    .to_request()
}

pub fn delete(uri: &str, token: Option<&str>) -> Request {
    with_auth(TestRequest::delete().uri(uri).peer_addr(peer()), token).to_request()
}

/// Inserts a user directly, bypassing the register endpoint
pub async fn seed_user(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password: &str,
    role_id: i64,
) -> i64 {
    let hash = hash_password(password);
    let res = sqlx::query("INSERT INTO users (name, email, password, role_id) VALUES (?, ?, ?, ?)")
        .bind(name)
        .bind(email)
        .bind(hash)
        .bind(role_id)
        .execute(pool)
        .await
        .expect("seed user");
    res.last_insert_rowid()
}

/// Inserts an attendance row with an explicit check-in time
pub async fn seed_attendance(
    pool: &SqlitePool,
    user_id: i64,
    check_in: DateTime<Utc>,
    check_out: Option<DateTime<Utc>>,
) -> i64 {
    let res = sqlx::query("INSERT INTO attendance (user_id, check_in, check_out) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(check_in)
        .bind(check_out)
        .execute(pool)
        .await
        .expect("seed attendance");
    res.last_insert_rowid()
}

pub async fn login_tokens<S, B>(app: &S, email: &str, password: &str) -> (String, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
    B::Error: std::fmt::Debug,
{
    let req = post_json(
        "/api/auth/login",
        json!({ "email": email, "password": password }),
        None,
    );
    let resp = test::call_service(app, req).await;
    assert!(
        resp.status().is_success(),
        "login for {} failed: {}",
        email,
        resp.status()
    );

    let body: Value = test::read_body_json(resp).await;
    (
        body["access_token"].as_str().expect("access token").to_string(),
        body["refresh_token"].as_str().expect("refresh token").to_string(),
    )
}

pub fn multipart_body(
    boundary: &str,
    fields: &[(&str, &str)],
    photo: Option<(&str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((content_type, bytes)) = photo {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"selfie.jpg\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

pub fn checkin_request(
    token: &str,
    fields: &[(&str, &str)],
    photo: Option<(&str, &[u8])>,
) -> Request {
    let boundary = "presensi-test-boundary";
    let body = multipart_body(boundary, fields, photo);

    TestRequest::post()
        .uri("/api/presensi/checkin")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .insert_header((
            "Content-Type",
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(body)
        .to_request()
}
