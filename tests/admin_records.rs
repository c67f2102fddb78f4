mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use common::*;
use serde_json::{Value, json};

#[actix_web::test]
async fn admin_can_edit_and_delete_records() {
    let pool = test_pool().await;
    let dir = temp_upload_dir("presensi-admin-edit");
    let config = test_config(dir.to_str().unwrap());
    let app = init_app!(pool, config);

    seed_user(&pool, "Admin", "admin.edit@campus.ac.id", "rahasia123", 1).await;
    seed_user(&pool, "Joko", "joko.edit@campus.ac.id", "rahasia123", 3).await;

    let (admin_token, _) = login_tokens(&app, "admin.edit@campus.ac.id", "rahasia123").await;
    let (student_token, _) = login_tokens(&app, "joko.edit@campus.ac.id", "rahasia123").await;

    // Student opens a session
    let resp = test::call_service(&app, checkin_request(&student_token, &[], None)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let record_id = body["data"]["id"].as_i64().expect("record id");

    // Admin closes it by hand
    let resp = test::call_service(
        &app,
        put_json(
            &format!("/api/presensi/{}", record_id),
            json!({ "check_out": "2026-08-07T10:00:00Z" }),
            Some(&admin_token),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, get("/api/presensi", Some(&student_token))).await;
    let body: Value = test::read_body_json(resp).await;
    assert!(body["data"][0]["checkOut"].is_string());

    // Columns outside the whitelist are refused
    let resp = test::call_service(
        &app,
        put_json(
            &format!("/api/presensi/{}", record_id),
            json!({ "user_id": 999 }),
            Some(&admin_token),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Unknown record id
    let resp = test::call_service(
        &app,
        put_json(
            "/api/presensi/424242",
            json!({ "check_out": "2026-08-07T10:00:00Z" }),
            Some(&admin_token),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Delete, then delete again
    let resp = test::call_service(
        &app,
        delete(&format!("/api/presensi/{}", record_id), Some(&admin_token)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        delete(&format!("/api/presensi/{}", record_id), Some(&admin_token)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The student's history is empty again
    let resp = test::call_service(&app, get("/api/presensi", Some(&student_token))).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn non_admin_cannot_edit_or_delete() {
    let pool = test_pool().await;
    let dir = temp_upload_dir("presensi-admin-forbidden");
    let config = test_config(dir.to_str().unwrap());
    let app = init_app!(pool, config);

    seed_user(&pool, "Kirana", "kirana.forbidden@campus.ac.id", "rahasia123", 3).await;
    let (token, _) = login_tokens(&app, "kirana.forbidden@campus.ac.id", "rahasia123").await;

    let resp = test::call_service(&app, checkin_request(&token, &[], None)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let record_id = body["data"]["id"].as_i64().expect("record id");

    // Owning the record does not help, these are admin-only
    let resp = test::call_service(
        &app,
        put_json(
            &format!("/api/presensi/{}", record_id),
            json!({ "check_out": "2026-08-07T10:00:00Z" }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = test::call_service(
        &app,
        delete(&format!("/api/presensi/{}", record_id), Some(&token)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Staff are not admins either
    seed_user(&pool, "Lukman", "lukman.staff@campus.ac.id", "rahasia123", 2).await;
    let (staff_token, _) = login_tokens(&app, "lukman.staff@campus.ac.id", "rahasia123").await;

    let resp = test::call_service(
        &app,
        delete(&format!("/api/presensi/{}", record_id), Some(&staff_token)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
