use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One attendance session. `check_out` stays NULL while the session is open.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 7)]
    pub user_id: i64,

    #[schema(example = "2026-08-07T07:55:00Z", value_type = String, format = "date-time")]
    pub check_in: DateTime<Utc>,

    #[schema(example = "2026-08-07T16:02:00Z", value_type = Option<String>, format = "date-time", nullable = true)]
    pub check_out: Option<DateTime<Utc>>,

    #[schema(example = -7.797068, nullable = true)]
    pub latitude: Option<f64>,

    #[schema(example = 110.370529, nullable = true)]
    pub longitude: Option<f64>,

    #[schema(example = "uploads/0b2f6f0e-5b1a-4f7d-9a44-1d2cdd7b8a1e.jpg", nullable = true)]
    pub photo_path: Option<String>,
}
