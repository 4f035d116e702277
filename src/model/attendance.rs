use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Known values of `attendance_records.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
    CheckIn,
    CheckOut,
    Leave,
    Other,
}

impl AttendanceStatus {
    /// Unknown status strings are treated as `Other`, never as an error.
    pub fn parse_lenient(raw: &str) -> Self {
        Self::from_str(raw.trim()).unwrap_or(Self::Other)
    }
}

/// One append-only attendance event. `date` is local wall-clock time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 10,
    "employee_id": 1,
    "status": "check_in",
    "date": "2026-01-05T08:12:00",
    "note": null
}))]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    pub status: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub date: Option<NaiveDateTime>,
    #[schema(nullable = true)]
    pub note: Option<String>,
}

impl AttendanceRecord {
    pub fn kind(&self) -> AttendanceStatus {
        AttendanceStatus::parse_lenient(&self.status)
    }
}
