use serde::{Deserialize, Deserializer, Serialize};
use studio_core::ProjectId;
use time::OffsetDateTime;

/// A registered mockup project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub design_system: Option<serde_json::Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Partial update; `None` keeps the current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Absent keeps the stored design system, `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub design_system: Option<Option<serde_json::Value>>,
}

/// Marks a field as present, keeping an explicit `null` as `Some(None)`.
fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Pages configuration for a project that has never been saved.
pub fn default_pages_config(project_name: &str) -> serde_json::Value {
    serde_json::json!({
        "projectName": project_name,
        "targetPlatform": ["flutter"],
        "designSystem": {},
        "sharedComponents": [],
        "htmlFiles": [],
        "pageGroups": [],
    })
}
