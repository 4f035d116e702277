use crate::{
    auth::auth::AuthUser,
    config::Config,
    model::attendance::{AttendanceRecord, AttendanceStatus},
    report::aggregator::day_bounds,
    utils::pagination::page_window,
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 12)]
    pub employee_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "sick", nullable = true)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    /// Only records on this day
    #[param(value_type = Option<String>, format = Date, example = "2026-01-05")]
    pub date: Option<NaiveDate>,
    /// Only records of this employee
    pub employee_id: Option<u64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRecord>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

async fn has_record_on(
    pool: &MySqlPool,
    employee_id: u64,
    status: AttendanceStatus,
    day: NaiveDate,
) -> Result<bool, sqlx::Error> {
    let (start, end) = day_bounds(day);
    // EXISTS comes back as an integer column
    let found = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM attendance_records
            WHERE employee_id = ? AND status = ? AND date BETWEEN ? AND ?
        )
        "#,
    )
    .bind(employee_id)
    .bind(status.as_ref())
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;
    Ok(found != 0)
}

// Existence check and insert in one statement, so two concurrent requests
// cannot both pass the check. The unique key on (employee_id, status, once_day)
// backs it up.
const INSERT_ONCE_PER_DAY: &str = r#"
    INSERT INTO attendance_records (employee_id, status, date, note)
    SELECT ?, ?, ?, ? FROM DUAL
    WHERE NOT EXISTS (
        SELECT 1 FROM attendance_records
        WHERE employee_id = ? AND status = ? AND date BETWEEN ? AND ?
    )
"#;

/// Inserts a record unless the employee already has one with `status` on that
/// day. Returns `false` when nothing was inserted.
async fn insert_once_per_day(
    pool: &MySqlPool,
    employee_id: u64,
    status: AttendanceStatus,
    at: NaiveDateTime,
    note: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let (start, end) = day_bounds(at.date());
    let result = sqlx::query(INSERT_ONCE_PER_DAY)
        .bind(employee_id)
        .bind(status.as_ref())
        .bind(at)
        .bind(note)
        .bind(employee_id)
        .bind(status.as_ref())
        .bind(start)
        .bind(end)
        .execute(pool)
        .await;

    match result {
        Ok(done) => Ok(done.rows_affected() > 0),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let now = config.local_now();

    let inserted = insert_once_per_day(pool.get_ref(), employee_id, AttendanceStatus::CheckIn, now, None)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Check-in failed");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if !inserted {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Already checked in today"
        })));
    }

    info!(employee_id, at = %now, "Employee checked in");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked in successfully"
    })))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully"
        })),
        (status = 400, description = "No check-in found for today, or already checked out", body = Object, example = json!({
            "message": "No check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let now = config.local_now();
    let db_error = |e: sqlx::Error| {
        error!(error = %e, employee_id, "Check-out failed");
        ErrorInternalServerError("Internal Server Error")
    };

    let checked_in = has_record_on(pool.get_ref(), employee_id, AttendanceStatus::CheckIn, now.date())
        .await
        .map_err(db_error)?;
    if !checked_in {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "No check-in found for today"
        })));
    }

    let inserted = insert_once_per_day(pool.get_ref(), employee_id, AttendanceStatus::CheckOut, now, None)
        .await
        .map_err(db_error)?;
    if !inserted {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Already checked out today"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked out successfully"
    })))
}

/// Record a leave day for an employee (HR/Admin)
#[utoipa::path(
    post,
    path = "/api/attendance/leave",
    request_body = CreateLeave,
    responses(
        (status = 201, description = "Leave recorded", body = Object, example = json!({
            "message": "Leave recorded"
        })),
        (status = 400, description = "Leave already recorded for that day"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn record_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let db_error = |e: sqlx::Error| {
        error!(error = %e, employee_id = payload.employee_id, "Failed to record leave");
        ErrorInternalServerError("Internal Server Error")
    };

    let exists = sqlx::query_scalar::<_, i64>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?)")
        .bind(payload.employee_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(db_error)?;
    if exists == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    let inserted = insert_once_per_day(
        pool.get_ref(),
        payload.employee_id,
        AttendanceStatus::Leave,
        payload.date.and_time(NaiveTime::MIN),
        payload.note.as_deref(),
    )
    .await
    .map_err(db_error)?;
    if !inserted {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Leave already recorded for that day"
        })));
    }

    info!(
        employee_id = payload.employee_id,
        date = %payload.date,
        recorded_by = auth.user_id,
        "Leave recorded"
    );

    Ok(HttpResponse::Created().json(json!({
        "message": "Leave recorded"
    })))
}

// -------------------- Handler --------------------

/// Paginated attendance log (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Paginated attendance log", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let (page, per_page, offset) = page_window(query.page, query.per_page);

    let bounds = query.date.map(day_bounds);
    let (start, end) = (bounds.map(|b| b.0), bounds.map(|b| b.1));

    // NULL filters match everything
    const FILTER: &str = r#"
        WHERE (? IS NULL OR date BETWEEN ? AND ?)
        AND (? IS NULL OR employee_id = ?)
    "#;

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) as total FROM attendance_records {}", FILTER);
    debug!(?query, "Counting attendance records");

    let total = sqlx::query_scalar::<_, i64>(&count_sql)
        .bind(start)
        .bind(start)
        .bind(end)
        .bind(query.employee_id)
        .bind(query.employee_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count attendance records");
            ErrorInternalServerError("Database error")
        })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT id, employee_id, status, date, note FROM attendance_records {} ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
        FILTER
    );
    debug!(page, per_page, offset, "Fetching attendance records");

    let records = sqlx::query_as::<_, AttendanceRecord>(&data_sql)
        .bind(start)
        .bind(start)
        .bind(end)
        .bind(query.employee_id)
        .bind(query.employee_id)
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch attendance records");
            ErrorInternalServerError("Database error")
        })?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data: records,
        page,
        per_page,
        total,
    }))
}
