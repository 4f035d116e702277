use crate::api::attendance::{AttendanceListResponse, CreateLeave};
use crate::api::daily_report::{ReportPreviewResponse, ReportResponse};
use crate::api::settings::UpdateSettings;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::daily_tally::DailyTally;
use crate::model::employee::Employee;
use crate::model::system_config::SystemConfig;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Report API",
        version = "1.0.0",
        description = r#"
## Attendance & Daily Report Service

Back-end of the HR attendance dashboard.

### 🔹 Key Features
- **Attendance**
  - Daily check-in / check-out, leave entries, paginated attendance log
- **Daily Report**
  - Scheduled job that tallies present / late / leave / absent employees
    and pushes a summary card to the HR admin group
- **Settings**
  - Enable or disable the daily report and choose its destination group

### 🔐 Security
Dashboard endpoints use **JWT Bearer authentication** issued by the auth provider.
The scheduler trigger uses a shared secret (`CRON_SECRET`).

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::daily_report::trigger_daily_report,
        crate::api::daily_report::preview_daily_report,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::record_leave,
        crate::api::attendance::list_attendance,

        crate::api::settings::get_settings,
        crate::api::settings::update_settings
    ),
    components(
        schemas(
            ReportResponse,
            ReportPreviewResponse,
            DailyTally,
            AttendanceRecord,
            AttendanceStatus,
            AttendanceListResponse,
            CreateLeave,
            Employee,
            SystemConfig,
            UpdateSettings
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Report", description = "Daily attendance report"),
        (name = "Attendance", description = "Attendance recording APIs"),
        (name = "Settings", description = "Report settings"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
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
        components.add_security_scheme(
            "cron_secret",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
        );
    }
}
