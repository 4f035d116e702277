use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::MySqlPool;
use tracing::debug;

use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;
use crate::model::system_config::SystemConfig;

/// Read side of the daily report. Every method is a single round trip.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn load_system_config(&self) -> anyhow::Result<Option<SystemConfig>>;

    async fn list_employees(&self) -> anyhow::Result<Vec<Employee>>;

    /// All records of all employees with `start <= date <= end`.
    async fn attendance_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> anyhow::Result<Vec<AttendanceRecord>>;
}

#[derive(Clone)]
pub struct MySqlReportStore {
    pool: MySqlPool,
}

impl MySqlReportStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for MySqlReportStore {
    async fn load_system_config(&self) -> anyhow::Result<Option<SystemConfig>> {
        sqlx::query_as::<_, SystemConfig>(
            r#"
            SELECT enable_daily_report, admin_group_id
            FROM system_config
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .context("Failed to load system config")
    }

    async fn list_employees(&self) -> anyhow::Result<Vec<Employee>> {
        sqlx::query_as::<_, Employee>("SELECT id, name FROM employees ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to load employee roster")
    }

    async fn attendance_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> anyhow::Result<Vec<AttendanceRecord>> {
        debug!(%start, %end, "Fetching attendance records");

        sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, employee_id, status, date, note
            FROM attendance_records
            WHERE date BETWEEN ? AND ?
            ORDER BY date, id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load attendance records")
    }
}
