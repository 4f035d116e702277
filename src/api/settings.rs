use crate::{auth::auth::AuthUser, model::system_config::SystemConfig};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSettings {
    #[schema(example = true)]
    pub enable_daily_report: Option<bool>,
    /// Empty string clears the group
    #[schema(example = "grp-hr-admins")]
    pub admin_group_id: Option<String>,
}

/// Merges a partial update into the current settings.
///
/// Enabling the report without a destination group is refused, since every
/// run would end in a configuration error.
pub fn apply_update(current: SystemConfig, update: &UpdateSettings) -> Result<SystemConfig, &'static str> {
    let mut next = current;

    if let Some(enable) = update.enable_daily_report {
        next.enable_daily_report = enable;
    }
    if let Some(group) = &update.admin_group_id {
        let group = group.trim();
        next.admin_group_id = (!group.is_empty()).then(|| group.to_string());
    }

    if next.enable_daily_report && next.group_id().is_none() {
        return Err("admin_group_id is required when the daily report is enabled");
    }
    Ok(next)
}

async fn load_settings(pool: &MySqlPool) -> Result<Option<SystemConfig>, sqlx::Error> {
    sqlx::query_as::<_, SystemConfig>(
        "SELECT enable_daily_report, admin_group_id FROM system_config WHERE id = 1",
    )
    .fetch_optional(pool)
    .await
}

/// Read report settings
#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Current settings", body = SystemConfig),
        (status = 404, description = "Settings not initialised"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Settings"
)]
pub async fn get_settings(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let settings = load_settings(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to load settings");
        ErrorInternalServerError("Database error")
    })?;

    match settings {
        Some(s) => Ok(HttpResponse::Ok().json(s)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Settings not initialised"
        }))),
    }
}

/// Update report settings
#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = UpdateSettings,
    responses(
        (status = 200, description = "Settings updated", body = SystemConfig),
        (status = 400, description = "Invalid combination", body = Object, example = json!({
            "message": "admin_group_id is required when the daily report is enabled"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Settings"
)]
pub async fn update_settings(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<UpdateSettings>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let current = load_settings(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load settings");
            ErrorInternalServerError("Database error")
        })?
        .unwrap_or(SystemConfig {
            enable_daily_report: false,
            admin_group_id: None,
        });

    let next = match apply_update(current, &body) {
        Ok(n) => n,
        Err(message) => {
            return Ok(HttpResponse::BadRequest().json(json!({ "message": message })));
        }
    };

    sqlx::query(
        r#"
        INSERT INTO system_config (id, enable_daily_report, admin_group_id)
        VALUES (1, ?, ?)
        ON DUPLICATE KEY UPDATE
            enable_daily_report = VALUES(enable_daily_report),
            admin_group_id = VALUES(admin_group_id)
        "#,
    )
    .bind(next.enable_daily_report)
    .bind(next.admin_group_id.as_deref())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to save settings");
        ErrorInternalServerError("Database error")
    })?;

    info!(
        enabled = next.enable_daily_report,
        group = ?next.admin_group_id,
        updated_by = auth.user_id,
        "Report settings updated"
    );

    Ok(HttpResponse::Ok().json(next))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current(enabled: bool, group: Option<&str>) -> SystemConfig {
        SystemConfig {
            enable_daily_report: enabled,
            admin_group_id: group.map(str::to_string),
        }
    }

    #[test]
    fn test_enable_requires_group() {
        let update = UpdateSettings {
            enable_daily_report: Some(true),
            admin_group_id: None,
        };
        assert!(apply_update(current(false, None), &update).is_err());

        let next = apply_update(current(false, Some("grp-1")), &update).unwrap();
        assert!(next.enable_daily_report);
    }

    #[test]
    fn test_blank_group_clears() {
        let update = UpdateSettings {
            enable_daily_report: None,
            admin_group_id: Some("   ".to_string()),
        };
        let next = apply_update(current(false, Some("grp-1")), &update).unwrap();
        assert!(next.admin_group_id.is_none());

        // still enabled: clearing the group is refused
        assert!(apply_update(current(true, Some("grp-1")), &update).is_err());
    }

    #[test]
    fn test_group_is_trimmed() {
        let update = UpdateSettings {
            enable_daily_report: Some(true),
            admin_group_id: Some("  grp-2 ".to_string()),
        };
        let next = apply_update(current(false, None), &update).unwrap();
        assert_eq!(next.admin_group_id.as_deref(), Some("grp-2"));
    }
}
