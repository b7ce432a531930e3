//! Dashboard aggregation over a `Backend`.
//!
//! # Design
//! Each public operation is total: the fallible work lives in a `load_*`
//! method returning `Result`, and the public method recovers through
//! `recover`, which logs the failure and substitutes a default. Assembly of
//! the view from already-fetched rows is a free function so hosts doing
//! their own I/O get the same results.

use uuid::Uuid;

use crate::backend::Backend;
use crate::config::DashboardConfig;
use crate::error::ApiError;
use crate::insights::{default_insights, insights_for};
use crate::stats::{display_name_from_email, select_avatar, stats_for_resumes};
use crate::types::{DashboardUser, Insight, Profile, Resume, UserDashboardData};

pub struct DashboardService<B> {
    backend: B,
    config: DashboardConfig,
}

impl<B: Backend> DashboardService<B> {
    pub fn new(backend: B, config: DashboardConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Profile and derived stats for `user_id`, or `None` when no profile
    /// can be resolved.
    pub async fn get_user_dashboard_data(&self, user_id: Uuid) -> Option<UserDashboardData> {
        recover(self.load_dashboard(user_id).await, "get_user_dashboard_data")
    }

    /// Reserved for view tracking; currently only traced.
    pub async fn update_profile_views(&self, user_id: Uuid) {
        tracing::debug!(%user_id, "profile view");
    }

    pub async fn get_ai_insights(&self, user_id: Uuid) -> Vec<Insight> {
        recover(self.load_insights(user_id).await, "get_ai_insights").unwrap_or_else(default_insights)
    }

    async fn load_dashboard(&self, user_id: Uuid) -> Result<UserDashboardData, ApiError> {
        let profile = self.resolve_profile(user_id).await?;

        let resumes = match self.list_resumes(profile.id, None).await {
            Ok(resumes) => resumes,
            Err(e) => {
                tracing::warn!(user_id = %profile.id, error = %e, "resume listing failed, treating as empty");
                Vec::new()
            }
        };

        Ok(assemble_dashboard(&profile, &resumes, &self.config))
    }

    async fn load_insights(&self, user_id: Uuid) -> Result<Vec<Insight>, ApiError> {
        let resumes = self.list_resumes(user_id, Some(1)).await?;
        Ok(insights_for(resumes.first()))
    }

    /// By id first, then by the signed-in user's email.
    async fn resolve_profile(&self, user_id: Uuid) -> Result<Profile, ApiError> {
        let table = &self.config.profiles_table;
        let by_id = self
            .backend
            .lookup_record_by_key::<Profile>(table, "id", &user_id.to_string())
            .await;
        let err = match by_id {
            Ok(profile) => return Ok(profile),
            Err(e) => e,
        };
        tracing::debug!(%user_id, error = %err, "profile lookup by id failed, trying session email");

        let email = self
            .backend
            .current_session_user()
            .await?
            .and_then(|user| user.email)
            .ok_or(err)?;

        self.backend
            .lookup_record_by_key::<Profile>(table, "email", &email)
            .await
    }

    async fn list_resumes(&self, owner: Uuid, limit: Option<u32>) -> Result<Vec<Resume>, ApiError> {
        self.backend
            .list_records_by_owner(
                &self.config.resumes_table,
                &self.config.owner_column,
                &owner.to_string(),
                limit,
            )
            .await
    }
}

/// Log a failed operation and turn it into `None`.
pub fn recover<T>(result: Result<T, ApiError>, operation: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(operation, error = %e, "recovered from backend failure");
            None
        }
    }
}

/// Build the dashboard view from a profile and its resumes.
pub fn assemble_dashboard(
    profile: &Profile,
    resumes: &[Resume],
    config: &DashboardConfig,
) -> UserDashboardData {
    let name = match profile.name.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => display_name_from_email(&profile.email),
    };
    let seed = if name.is_empty() { &profile.email } else { &name };
    let avatar = select_avatar(seed, &config.avatars)
        .unwrap_or_default()
        .to_string();

    UserDashboardData {
        user: DashboardUser {
            id: profile.id,
            name,
            email: profile.email.clone(),
            avatar,
        },
        stats: stats_for_resumes(resumes, &config.baseline),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde::de::DeserializeOwned;
    use serde_json::{json, Value};

    use super::*;
    use crate::types::{InsightType, Priority, SessionUser};

    const USER: &str = "00000000-0000-0000-0000-0000000000aa";
    const OTHER: &str = "00000000-0000-0000-0000-0000000000bb";

    /// In-memory tables plus switches for injecting failures.
    #[derive(Default)]
    struct FakeBackend {
        tables: HashMap<String, Vec<Value>>,
        session: Option<SessionUser>,
        fail_listing: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn with_profile(mut self, id: &str, email: &str, name: Option<&str>) -> Self {
            self.tables
                .entry("profiles".into())
                .or_default()
                .push(json!({"id": id, "email": email, "name": name}));
            self
        }

        fn with_resume(mut self, owner: &str, status: &str, content: Option<Value>) -> Self {
            self.tables.entry("resumes".into()).or_default().push(json!({
                "id": uuid::Uuid::new_v4(),
                "user_id": owner,
                "status": status,
                "parsed_content": content,
            }));
            self
        }

        fn rows(&self, table: &str, key: &str, value: &str) -> Vec<Value> {
            self.tables
                .get(table)
                .map(|rows| {
                    rows.iter()
                        .filter(|r| r[key].as_str() == Some(value))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        }
    }

    fn from_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, ApiError> {
        rows.into_iter()
            .map(|r| serde_json::from_value(r).map_err(|e| ApiError::DeserializationError(e.to_string())))
            .collect()
    }

    impl Backend for FakeBackend {
        async fn lookup_record_by_key<T>(&self, table: &str, key: &str, value: &str) -> Result<T, ApiError>
        where
            T: DeserializeOwned + Send,
        {
            self.calls.lock().unwrap().push(format!("lookup {key}"));
            from_rows(self.rows(table, key, value))?
                .into_iter()
                .next()
                .ok_or(ApiError::NotFound)
        }

        async fn list_records_by_owner<T>(
            &self,
            table: &str,
            owner_column: &str,
            owner_id: &str,
            limit: Option<u32>,
        ) -> Result<Vec<T>, ApiError>
        where
            T: DeserializeOwned + Send,
        {
            self.calls.lock().unwrap().push(format!("list {limit:?}"));
            if self.fail_listing {
                return Err(ApiError::HttpError {
                    status: 503,
                    body: "unavailable".into(),
                });
            }
            let mut rows = self.rows(table, owner_column, owner_id);
            if let Some(limit) = limit {
                rows.truncate(limit as usize);
            }
            from_rows(rows)
        }

        async fn current_session_user(&self) -> Result<Option<SessionUser>, ApiError> {
            self.calls.lock().unwrap().push("session".into());
            Ok(self.session.clone())
        }
    }

    fn service(backend: FakeBackend) -> DashboardService<FakeBackend> {
        DashboardService::new(backend, DashboardConfig::default())
    }

    fn id(s: &str) -> Uuid {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn dashboard_for_user_without_resumes_is_baseline() {
        let svc = service(FakeBackend::default().with_profile(USER, "jane.roe@x.com", None));
        let data = svc.get_user_dashboard_data(id(USER)).await.unwrap();
        assert_eq!(data.user.name, "Jane Roe");
        assert_eq!(data.user.email, "jane.roe@x.com");
        assert_eq!(data.stats, svc.config().baseline);
        assert!(svc.config().avatars.contains(&data.user.avatar));
    }

    #[tokio::test]
    async fn dashboard_counts_processed_resumes() {
        let svc = service(
            FakeBackend::default()
                .with_profile(USER, "a@x.com", Some("Ada"))
                .with_resume(USER, "processed", None)
                .with_resume(USER, "uploaded", Some(json!({"skills": []})))
                .with_resume(USER, "uploaded", None)
                .with_resume(OTHER, "processed", None),
        );
        let data = svc.get_user_dashboard_data(id(USER)).await.unwrap();
        assert_eq!(data.user.name, "Ada");
        assert_eq!(data.stats.score, 95);
        assert_eq!(data.stats.views, 425);
        assert_eq!(data.stats.applications, 24);
        assert_eq!(data.stats.responses, 9);
        assert_eq!(data.stats.interviews, 5);
        assert_eq!(data.stats.applications_change, 8);
    }

    #[tokio::test]
    async fn administrator_profile_resolves() {
        let mut backend = FakeBackend::default();
        backend.tables.entry("profiles".into()).or_default().push(json!({
            "id": USER,
            "email": "root@x.com",
            "name": "Root",
            "role": "administrator",
        }));
        let svc = service(backend);
        let data = svc.get_user_dashboard_data(id(USER)).await.unwrap();
        assert_eq!(data.user.name, "Root");
        assert_eq!(svc.backend().calls.lock().unwrap().as_slice(), ["lookup id", "list None"]);
    }

    #[tokio::test]
    async fn object_shaped_skills_still_count_and_get_insights() {
        let skills = json!({"skills": [{"name": "rust"}, {"name": "go"}]});
        let svc = service(
            FakeBackend::default()
                .with_profile(USER, "a@x.com", None)
                .with_resume(USER, "uploaded", Some(skills)),
        );
        let data = svc.get_user_dashboard_data(id(USER)).await.unwrap();
        assert_eq!(data.stats.score, 90);
        assert_eq!(data.stats.views, 275);

        let insights = svc.get_ai_insights(id(USER)).await;
        assert_eq!(insights[0].title, "Add More Skills");
        assert_ne!(insights, default_insights());
    }

    #[tokio::test]
    async fn falls_back_to_session_email() {
        let mut backend = FakeBackend::default().with_profile(OTHER, "me@x.com", Some("Me"));
        backend.session = Some(SessionUser {
            id: id(OTHER),
            email: Some("me@x.com".into()),
        });
        let svc = service(backend);
        let data = svc.get_user_dashboard_data(id(USER)).await.unwrap();
        assert_eq!(data.user.id, id(OTHER));
        let calls = svc.backend().calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["lookup id", "session", "lookup email", "list None"]);
    }

    #[tokio::test]
    async fn missing_profile_and_session_is_none() {
        let svc = service(FakeBackend::default());
        assert!(svc.get_user_dashboard_data(id(USER)).await.is_none());
    }

    #[tokio::test]
    async fn listing_failure_counts_as_zero_resumes() {
        let mut backend = FakeBackend::default().with_profile(USER, "a@x.com", None);
        backend.fail_listing = true;
        let svc = service(backend);
        let data = svc.get_user_dashboard_data(id(USER)).await.unwrap();
        assert_eq!(data.stats, svc.config().baseline);
    }

    #[tokio::test]
    async fn insights_fetch_one_resume() {
        let svc = service(FakeBackend::default().with_resume(USER, "uploaded", None));
        let insights = svc.get_ai_insights(id(USER)).await;
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightType::Achievement);
        assert_eq!(svc.backend().calls.lock().unwrap().as_slice(), ["list Some(1)"]);
    }

    #[tokio::test]
    async fn insights_without_resume_is_high_priority() {
        let svc = service(FakeBackend::default());
        let insights = svc.get_ai_insights(id(USER)).await;
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].priority, Priority::High);
    }

    #[tokio::test]
    async fn insights_failure_returns_default() {
        let mut backend = FakeBackend::default();
        backend.fail_listing = true;
        let insights = service(backend).get_ai_insights(id(USER)).await;
        assert_eq!(insights, default_insights());
    }

    #[tokio::test]
    async fn update_profile_views_never_fails() {
        let svc = service(FakeBackend::default());
        svc.update_profile_views(id(USER)).await;
        assert!(svc.backend().calls.lock().unwrap().is_empty());
    }

    #[test]
    fn blank_name_falls_back_to_email() {
        let profile = Profile {
            id: id(USER),
            email: "sam_lee@x.com".into(),
            name: Some("   ".into()),
            role: Default::default(),
            is_verified: false,
            is_active: true,
            created_at: None,
            updated_at: None,
        };
        let config = DashboardConfig::default();
        let a = assemble_dashboard(&profile, &[], &config);
        let b = assemble_dashboard(&profile, &[], &config);
        assert_eq!(a.user.name, "Sam Lee");
        assert_eq!(a.user.avatar, b.user.avatar);
    }

    #[test]
    fn present_name_is_kept_verbatim() {
        let profile = Profile {
            id: id(USER),
            email: "sam_lee@x.com".into(),
            name: Some("  Sam  ".into()),
            role: Default::default(),
            is_verified: false,
            is_active: true,
            created_at: None,
            updated_at: None,
        };
        let data = assemble_dashboard(&profile, &[], &DashboardConfig::default());
        assert_eq!(data.user.name, "  Sam  ");
    }

    #[test]
    fn recover_passes_values_and_swallows_errors() {
        assert_eq!(recover(Ok::<_, ApiError>(3), "op"), Some(3));
        assert_eq!(recover::<u8>(Err(ApiError::NotFound), "op"), None);
    }
}
