//! Domain DTOs for the backend tables and the dashboard view.
//!
//! # Design
//! Row types (`Profile`, `Resume`) mirror the hosted tables and are
//! read-only from this crate's point of view. View types (`DashboardStats`,
//! `UserDashboardData`, `Insight`) are derived on every request and never
//! persisted; they serialize in camelCase because the UI consumes them as
//! JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role. Values outside the known set are kept as `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Candidate,
    Recruiter,
    #[serde(rename = "administrator", alias = "admin")]
    Administrator,
    #[serde(untagged)]
    Other(String),
}

/// A row of the `profiles` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Processing state of an uploaded resume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeStatus {
    #[default]
    Uploaded,
    Processing,
    Processed,
    Failed,
    #[serde(untagged)]
    Other(String),
}

/// Structured fields extracted from a resume document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedContent {
    #[serde(default)]
    pub skills: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub experience: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub education: Option<Vec<serde_json::Value>>,
}

/// A row of the `resumes` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub parsed_content: Option<ParsedContent>,
    #[serde(default)]
    pub status: ResumeStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resume {
    /// Counted toward the score: processed, or already carrying parsed content.
    pub fn is_processed(&self) -> bool {
        self.status == ResumeStatus::Processed || self.parsed_content.is_some()
    }
}

/// The signed-in user as reported by the auth endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Display metrics for the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub score: u32,
    pub views: u32,
    pub interviews: u32,
    pub applications: u32,
    pub responses: u32,
    pub views_change: i32,
    pub applications_change: i32,
    pub responses_change: i32,
    pub interviews_change: i32,
}

impl Default for DashboardStats {
    fn default() -> Self {
        Self {
            score: 85,
            views: 247,
            interviews: 5,
            applications: 12,
            responses: 4,
            views_change: 12,
            applications_change: 8,
            responses_change: -3,
            interviews_change: 25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDashboardData {
    pub user: DashboardUser,
    pub stats: DashboardStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Suggestion,
    Improvement,
    Achievement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A short recommendation shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: InsightType,
    pub priority: Priority,
}

impl Insight {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        kind: InsightType,
        priority: Priority,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind,
            priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_defaults_optional_columns() {
        let profile: Profile = serde_json::from_str(
            r#"{"id":"00000000-0000-0000-0000-000000000001","email":"a@b.com"}"#,
        )
        .unwrap();
        assert_eq!(profile.name, None);
        assert_eq!(profile.role, Role::Candidate);
        assert!(profile.is_active);
        assert!(!profile.is_verified);
    }

    #[test]
    fn role_parses_lowercase() {
        let role: Role = serde_json::from_str(r#""recruiter""#).unwrap();
        assert_eq!(role, Role::Recruiter);
    }

    #[test]
    fn administrator_role_and_unknown_roles_parse() {
        let profile: Profile = serde_json::from_str(
            r#"{"id":"00000000-0000-0000-0000-000000000001","email":"a@b.com","role":"administrator"}"#,
        )
        .unwrap();
        assert_eq!(profile.role, Role::Administrator);
        assert_eq!(serde_json::to_value(&profile.role).unwrap(), "administrator");

        let role: Role = serde_json::from_str(r#""admin""#).unwrap();
        assert_eq!(role, Role::Administrator);
        let role: Role = serde_json::from_str(r#""hiring_manager""#).unwrap();
        assert_eq!(role, Role::Other("hiring_manager".to_string()));
    }

    #[test]
    fn object_shaped_skills_parse() {
        let resume: Resume = serde_json::from_str(
            r#"{
                "id":"00000000-0000-0000-0000-000000000002",
                "user_id":"00000000-0000-0000-0000-000000000001",
                "parsed_content":{"skills":[{"name":"rust"},{"name":"go"}]}
            }"#,
        )
        .unwrap();
        let content = resume.parsed_content.unwrap();
        assert_eq!(content.skills.map(|s| s.len()), Some(2));
    }

    #[test]
    fn unknown_resume_status_is_preserved() {
        let status: ResumeStatus = serde_json::from_str(r#""archived""#).unwrap();
        assert_eq!(status, ResumeStatus::Other("archived".to_string()));
        let status: ResumeStatus = serde_json::from_str(r#""processed""#).unwrap();
        assert_eq!(status, ResumeStatus::Processed);
    }

    #[test]
    fn resume_with_parsed_content_counts_as_processed() {
        let resume: Resume = serde_json::from_str(
            r#"{
                "id":"00000000-0000-0000-0000-000000000002",
                "user_id":"00000000-0000-0000-0000-000000000001",
                "status":"uploaded",
                "parsed_content":{"skills":["rust"]}
            }"#,
        )
        .unwrap();
        assert!(resume.is_processed());
    }

    #[test]
    fn stats_serialize_camel_case() {
        let json = serde_json::to_value(DashboardStats::default()).unwrap();
        assert_eq!(json["viewsChange"], 12);
        assert_eq!(json["responsesChange"], -3);
    }

    #[test]
    fn insight_kind_serializes_as_type() {
        let insight = Insight::new("t", "d", InsightType::Achievement, Priority::Low);
        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json["type"], "achievement");
        assert_eq!(json["priority"], "low");
    }
}
