use crate::api::attendance::CheckInForm;
use crate::api::book::BookPayload;
use crate::api::report::{ReportQuery, ReportRow};
use crate::model::attendance::Attendance;
use crate::model::book::Book;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Presensi API",
        version = "1.0.0",
        description = r#"
## Presensi (attendance) service

Backend for a campus attendance application.

### 🔹 Key Features
- **Check-in / Check-out**
  - One open session per user, with optional GPS coordinates and selfie evidence
- **Attendance History**
  - Every user can list their own records
- **Daily Reports**
  - Admins filter by name/email substring and date range
- **Book Catalog**
  - Small sample CRUD resource

### 🔐 Security
Attendance and report endpoints are protected with **JWT Bearer authentication**.
Record edit/delete and reporting require the **Admin** role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::my_attendance,
        crate::api::attendance::update_attendance,
        crate::api::attendance::delete_attendance,

        crate::api::report::daily_report,

        crate::api::book::list_books,
        crate::api::book::get_book,
        crate::api::book::create_book,
        crate::api::book::update_book,
        crate::api::book::delete_book,
    ),
    components(
        schemas(
            Attendance,
            CheckInForm,
            ReportQuery,
            ReportRow,
            Book,
            BookPayload
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Presensi", description = "Check-in / check-out APIs"),
        (name = "Reports", description = "Admin reporting APIs"),
        (name = "Books", description = "Sample book catalog APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
