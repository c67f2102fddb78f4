use crate::{
    auth::auth::AuthUser,
    config::Config,
    model::attendance::Attendance,
    utils::{
        db_utils::{build_update_sql, execute_update},
        photo_store,
    },
};
use actix_multipart::Multipart;
use actix_web::{
    HttpResponse, Responder,
    error::{ErrorBadRequest, ErrorInternalServerError},
    web,
};
use chrono::Utc;
use futures_util::TryStreamExt;
use serde_json::Value;
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::ToSchema;

/// Columns an admin may touch through the override endpoint
const UPDATABLE_COLUMNS: &[&str] = &[
    "check_in",
    "check_out",
    "latitude",
    "longitude",
    "photo_path",
];

/// Swagger shape of the multipart check-in form
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CheckInForm {
    #[schema(example = -7.797068, nullable = true)]
    pub latitude: Option<f64>,
    #[schema(example = 110.370529, nullable = true)]
    pub longitude: Option<f64>,
    /// Selfie evidence, stored on disk and referenced by path
    #[schema(value_type = Option<String>, format = "binary", nullable = true)]
    pub photo: Option<Vec<u8>>,
}

struct CheckInFields {
    latitude: Option<String>,
    longitude: Option<String>,
    photo: Option<(Vec<u8>, String)>,
}

/// Drains the multipart stream into the fields check-in cares about
async fn read_check_in_form(mut payload: Multipart) -> actix_web::Result<CheckInFields> {
    let mut fields = CheckInFields {
        latitude: None,
        longitude: None,
        photo: None,
    };

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().to_string();
        let content_type = field.content_type().map(|m| m.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "latitude" => {
                fields.latitude = Some(text_field(data, "latitude")?);
            }
            "longitude" => {
                fields.longitude = Some(text_field(data, "longitude")?);
            }
            "photo" => {
                if !data.is_empty() {
                    let content_type =
                        content_type.unwrap_or_else(|| "application/octet-stream".to_string());
                    fields.photo = Some((data, content_type));
                }
            }
            _ => {}
        }
    }

    Ok(fields)
}

fn text_field(data: Vec<u8>, field: &str) -> actix_web::Result<String> {
    String::from_utf8(data).map_err(|_| ErrorBadRequest(format!("{} must be valid UTF-8", field)))
}

/// Empty fields count as absent, anything else must parse as a number
fn parse_coord(raw: Option<&str>, field: &str) -> Result<Option<f64>, HttpResponse> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<f64>().map(Some).map_err(|_| {
            HttpResponse::BadRequest().json(json!({
                "message": format!("{} must be a number", field)
            }))
        }),
    }
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/presensi/checkin",
    request_body(
        content = CheckInForm,
        description = "Optional coordinates and selfie photo",
        content_type = "multipart/form-data"
    ),
    responses(
        (status = 201, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Malformed coordinates"),
        (status = 409, description = "An open session already exists", body = Object, example = json!({
            "message": "Already checked in"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presensi"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    payload: Multipart,
) -> actix_web::Result<HttpResponse> {
    let fields = read_check_in_form(payload).await?;

    let latitude = match parse_coord(fields.latitude.as_deref(), "latitude") {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    let longitude = match parse_coord(fields.longitude.as_deref(), "longitude") {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    let photo_path = match fields.photo {
        Some((bytes, content_type)) => {
            let dir = config.upload_dir.clone();
            let saved = web::block(move || photo_store::save_photo(&dir, &bytes, &content_type))
                .await
                .map_err(ErrorInternalServerError)?
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to store check-in photo");
                    ErrorInternalServerError("Internal Server Error")
                })?;
            Some(saved)
        }
        None => None,
    };

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (user_id, check_in, latitude, longitude, photo_path)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(auth.user_id)
    .bind(now)
    .bind(latitude)
    .bind(longitude)
    .bind(photo_path.as_deref())
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => Ok(HttpResponse::Created().json(json!({
            "message": "Checked in successfully",
            "data": Attendance {
                id: res.last_insert_rowid(),
                user_id: auth.user_id,
                check_in: now,
                check_out: None,
                latitude,
                longitude,
                photo_path,
            }
        }))),

        Err(e) => {
            // The partial unique index holds the one-open-session invariant
            if let Some(path) = photo_path.as_deref() {
                photo_store::remove_photo(path);
            }

            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Already checked in"
                    })));
                }
            }

            tracing::error!(error = %e, user_id = auth.user_id, "Check-in failed");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/presensi/checkout",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully"
        })),
        (status = 400, description = "No open session for this user", body = Object, example = json!({
            "message": "No active check-in found"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presensi"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = ?
        WHERE user_id = ?
        AND check_out IS NULL
        "#,
    )
    .bind(Utc::now())
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Check-out failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "No active check-in found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked out successfully"
    })))
}

/// Own attendance history, newest first
#[utoipa::path(
    get,
    path = "/api/presensi",
    responses(
        (status = 200, description = "Attendance records of the caller", body = Object, example = json!({
            "data": []
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presensi"
)]
pub async fn my_attendance(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let records = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, user_id, check_in, check_out, latitude, longitude, photo_path
        FROM attendance
        WHERE user_id = ?
        ORDER BY check_in DESC
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to fetch attendance");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "data": records })))
}

/// Admin override: partial update of a record
#[utoipa::path(
    put,
    path = "/api/presensi/{id}",
    params(
        ("id" = i64, Path, description = "Attendance record id")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Record updated", body = Object, example = json!({
            "message": "Attendance record updated"
        })),
        (status = 400, description = "Unknown column or empty payload"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Record not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presensi"
)]
pub async fn update_attendance(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let record_id = path.into_inner();

    let update = build_update_sql("attendance", &body, UPDATABLE_COLUMNS, "id", record_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        tracing::error!(error = %e, record_id, "Failed to update attendance record");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Attendance record not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance record updated"
    })))
}

/// Admin override: delete a record
#[utoipa::path(
    delete,
    path = "/api/presensi/{id}",
    params(
        ("id" = i64, Path, description = "Attendance record id")
    ),
    responses(
        (status = 200, description = "Record deleted", body = Object, example = json!({
            "message": "Attendance record deleted"
        })),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Record not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presensi"
)]
pub async fn delete_attendance(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let record_id = path.into_inner();

    let photo_path = sqlx::query_scalar::<_, Option<String>>(
        "SELECT photo_path FROM attendance WHERE id = ?",
    )
    .bind(record_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, record_id, "Failed to fetch attendance record");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(photo_path) = photo_path else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Attendance record not found"
        })));
    };

    let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
        .bind(record_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, record_id, "Failed to delete attendance record");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Attendance record not found"
        })));
    }

    if let Some(path) = photo_path.as_deref() {
        photo_store::remove_photo(path);
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Attendance record deleted"
    })))
}
