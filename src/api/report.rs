use crate::auth::auth::AuthUser;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ReportQuery {
    /// Substring match over owner name or email
    #[schema(example = "campus.ac.id")]
    pub search: Option<String>,
    /// First day of the range (inclusive)
    #[schema(example = "2026-08-01", value_type = String, format = "date")]
    pub start_date: Option<NaiveDate>,
    /// Last day of the range (inclusive, up to 23:59:59)
    #[schema(example = "2026-08-07", value_type = String, format = "date")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub id: i64,
    pub user_id: i64,
    #[schema(example = "Alya Putri")]
    pub name: String,
    #[schema(example = "alya@campus.ac.id")]
    pub email: String,
    #[schema(value_type = String, format = "date-time")]
    pub check_in: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub check_out: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_path: Option<String>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    Str(String),
    Ts(DateTime<Utc>),
}

/// Daily attendance report across all users
#[utoipa::path(
    get,
    path = "/api/reports/daily",
    params(ReportQuery),
    responses(
        (status = 200, description = "Matching records, newest check-in first", body = Object, example = json!({
            "reportDate": "2026-08-07",
            "data": []
        })),
        (status = 400, description = "Malformed date filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn daily_report(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        where_sql.push_str(" AND (u.name LIKE ? OR u.email LIKE ?)");
        let like = format!("%{}%", search);
        args.push(FilterValue::Str(like.clone()));
        args.push(FilterValue::Str(like));
    }

    if let Some(start) = query.start_date {
        where_sql.push_str(" AND a.check_in >= ?");
        args.push(FilterValue::Ts(
            Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN)),
        ));
    }

    if let Some(end) = query.end_date {
        // Inclusive end of day: anything before the next midnight
        let next_midnight = end.succ_opt().unwrap_or(end).and_time(NaiveTime::MIN);
        where_sql.push_str(" AND a.check_in < ?");
        args.push(FilterValue::Ts(Utc.from_utc_datetime(&next_midnight)));
    }

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT a.id, a.user_id, u.name, u.email,
               a.check_in, a.check_out, a.latitude, a.longitude, a.photo_path
        FROM attendance a
        JOIN users u ON u.id = a.user_id
        {}
        ORDER BY a.check_in DESC
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, ReportRow>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::Str(s) => data_q.bind(s),
            FilterValue::Ts(t) => data_q.bind(t),
        };
    }

    let rows = data_q.fetch_all(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch daily report");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "reportDate": Utc::now().date_naive(),
        "data": rows,
    })))
}
