use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Singleton row (`id = 1`) holding the report switches edited from the settings page.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "enable_daily_report": true,
    "admin_group_id": "grp-hr-admins"
}))]
pub struct SystemConfig {
    pub enable_daily_report: bool,
    #[schema(nullable = true)]
    pub admin_group_id: Option<String>,
}

impl SystemConfig {
    /// Destination group, ignoring a blank value left behind by the settings form.
    pub fn group_id(&self) -> Option<&str> {
        self.admin_group_id
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }
}
