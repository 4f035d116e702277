use crate::{
    auth::{auth::AuthUser, cron::is_authorized_trigger},
    config::Config,
    model::daily_tally::DailyTally,
    report::job::{DailyReportJob, JobOutcome},
};
use actix_web::{HttpRequest, HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportDateQuery {
    /// Day to report on; defaults to today in the report timezone
    #[param(value_type = Option<String>, format = Date, example = "2026-01-05")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "success": true,
    "data": { "total": 3, "present": 1, "late": 0, "leave": 1, "absent": 1 }
}))]
pub struct ReportResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<DailyTally>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReportResponse {
    fn failure(message: &str, error: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportPreviewResponse {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub data: DailyTally,
    /// Card that would be pushed; null when no admin group is configured
    #[schema(value_type = Object, nullable = true)]
    pub card: Option<serde_json::Value>,
}

/// Maps a run outcome onto the trigger's response contract.
pub fn outcome_response(outcome: JobOutcome) -> HttpResponse {
    match outcome {
        JobOutcome::Disabled => HttpResponse::Ok().json(ReportResponse {
            success: true,
            data: None,
            message: Some("Daily report is disabled".to_string()),
            error: None,
        }),
        JobOutcome::Delivered { tally } => HttpResponse::Ok().json(ReportResponse {
            success: true,
            data: Some(tally),
            message: None,
            error: None,
        }),
        JobOutcome::ConfigError { message } => HttpResponse::InternalServerError()
            .json(ReportResponse::failure("Configuration error", message)),
        JobOutcome::DeliveryError { tally, error } => {
            HttpResponse::InternalServerError().json(ReportResponse {
                data: Some(tally),
                ..ReportResponse::failure("Failed to deliver daily report", error)
            })
        }
        JobOutcome::InternalError { error } => HttpResponse::InternalServerError()
            .json(ReportResponse::failure("Internal server error", error)),
    }
}

/// Scheduler trigger for the daily attendance report
#[utoipa::path(
    get,
    path = "/api/cron/daily-report",
    params(ReportDateQuery),
    responses(
        (status = 200, description = "Report delivered, or disabled in settings", body = ReportResponse),
        (status = 401, description = "Wrong or missing trigger secret", body = Object, example = json!({
            "success": false,
            "message": "Unauthorized"
        })),
        (status = 500, description = "Configuration, delivery or internal error", body = Object, example = json!({
            "success": false,
            "message": "Failed to deliver daily report",
            "error": "group not found",
            "data": { "total": 3, "present": 1, "late": 0, "leave": 1, "absent": 1 }
        }))
    ),
    security(
        ("cron_secret" = [])
    ),
    tag = "Report"
)]
pub async fn trigger_daily_report(
    req: HttpRequest,
    config: web::Data<Config>,
    job: web::Data<DailyReportJob>,
    query: web::Query<ReportDateQuery>,
) -> impl Responder {
    if !is_authorized_trigger(&req, config.cron_secret.as_deref()) {
        warn!("Rejected daily report trigger with bad secret");
        return HttpResponse::Unauthorized().json(json!({
            "success": false,
            "message": "Unauthorized"
        }));
    }

    let date = query.date.unwrap_or_else(|| config.today());
    info!(%date, "Daily report triggered");

    let outcome = job.run(date).await;
    info!(%date, success = outcome.is_success(), "Daily report finished");
    outcome_response(outcome)
}

/// Preview today's (or a given day's) tally without sending anything
#[utoipa::path(
    get,
    path = "/api/reports/daily",
    params(ReportDateQuery),
    responses(
        (status = 200, description = "Tally and rendered card", body = ReportPreviewResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn preview_daily_report(
    auth: AuthUser,
    config: web::Data<Config>,
    job: web::Data<DailyReportJob>,
    query: web::Query<ReportDateQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let date = query.date.unwrap_or_else(|| config.today());

    let preview = job.preview(date).await.map_err(|e| {
        error!(error = ?e, %date, "Failed to preview daily report");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let card = preview
        .card
        .map(serde_json::to_value)
        .transpose()
        .map_err(ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(ReportPreviewResponse {
        date,
        data: preview.tally,
        card,
    }))
}
