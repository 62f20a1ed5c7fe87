//! In-memory profile service for testing.
//!
//! Holds endpoints with their user links and attributes. Supports:
//! - Per-endpoint update failures
//! - Failing endpoint and user lookups
//! - Call tracking in invocation order

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{EndpointId, ProjectId, UserId};
use crate::ports::{
    Endpoint, ProfileErrorCode, ProfileService, ProfileServiceError, ENGAGEMENT_SCORE_ATTRIBUTE,
};

/// Recorded call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileCall {
    GetEndpoint(EndpointId),
    GetUserEndpoints(UserId),
    UpdateEndpoint(EndpointId),
}

#[derive(Debug, Clone)]
struct StoredEndpoint {
    endpoint: Endpoint,
    user_attributes: HashMap<String, Vec<String>>,
}

#[derive(Debug, Default)]
struct ProfileState {
    /// Ordered so user queries return endpoints deterministically.
    endpoints: BTreeMap<(ProjectId, EndpointId), StoredEndpoint>,
    failing_updates: HashSet<EndpointId>,
    fail_endpoint_lookups: bool,
    fail_user_queries: bool,
    calls: Vec<ProfileCall>,
}

/// In-memory profile service
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileService {
    inner: Arc<RwLock<ProfileState>>,
}

impl InMemoryProfileService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an endpoint, optionally linked to a user.
    pub async fn add_endpoint(
        &self,
        project_id: &ProjectId,
        endpoint_id: &EndpointId,
        user_id: Option<&UserId>,
    ) {
        let endpoint = Endpoint::new(endpoint_id.clone(), user_id.cloned());
        self.inner.write().await.endpoints.insert(
            (project_id.clone(), endpoint_id.clone()),
            StoredEndpoint {
                endpoint,
                user_attributes: HashMap::new(),
            },
        );
    }

    /// Make updates of one endpoint fail.
    pub async fn fail_updates_for(&self, endpoint_id: &EndpointId) {
        self.inner
            .write()
            .await
            .failing_updates
            .insert(endpoint_id.clone());
    }

    pub async fn fail_endpoint_lookups(&self) {
        self.inner.write().await.fail_endpoint_lookups = true;
    }

    pub async fn fail_user_queries(&self) {
        self.inner.write().await.fail_user_queries = true;
    }

    /// Current engagement score attribute of an endpoint.
    pub async fn engagement_score(
        &self,
        project_id: &ProjectId,
        endpoint_id: &EndpointId,
    ) -> Option<Vec<String>> {
        self.inner
            .read()
            .await
            .endpoints
            .get(&(project_id.clone(), endpoint_id.clone()))
            .and_then(|stored| stored.user_attributes.get(ENGAGEMENT_SCORE_ATTRIBUTE))
            .cloned()
    }

    /// All calls received so far.
    pub async fn calls(&self) -> Vec<ProfileCall> {
        self.inner.read().await.calls.clone()
    }
}

#[async_trait]
impl ProfileService for InMemoryProfileService {
    async fn get_endpoint(
        &self,
        project_id: &ProjectId,
        endpoint_id: &EndpointId,
    ) -> Result<Endpoint, ProfileServiceError> {
        let mut state = self.inner.write().await;
        state.calls.push(ProfileCall::GetEndpoint(endpoint_id.clone()));

        if state.fail_endpoint_lookups {
            return Err(ProfileServiceError::new(
                ProfileErrorCode::ServiceUnavailable,
                "injected endpoint lookup failure",
            ));
        }

        state
            .endpoints
            .get(&(project_id.clone(), endpoint_id.clone()))
            .map(|stored| stored.endpoint.clone())
            .ok_or_else(|| ProfileServiceError::not_found("Endpoint"))
    }

    async fn get_user_endpoints(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Vec<Endpoint>, ProfileServiceError> {
        let mut state = self.inner.write().await;
        state.calls.push(ProfileCall::GetUserEndpoints(user_id.clone()));

        if state.fail_user_queries {
            return Err(ProfileServiceError::new(
                ProfileErrorCode::ServiceUnavailable,
                "injected user query failure",
            ));
        }

        let endpoints: Vec<Endpoint> = state
            .endpoints
            .iter()
            .filter(|((project, _), stored)| {
                project == project_id && stored.endpoint.user_id.as_ref() == Some(user_id)
            })
            .map(|(_, stored)| stored.endpoint.clone())
            .collect();

        if endpoints.is_empty() {
            return Err(ProfileServiceError::not_found("User"));
        }
        Ok(endpoints)
    }

    async fn update_engagement_score(
        &self,
        project_id: &ProjectId,
        endpoint_id: &EndpointId,
        score: i64,
    ) -> Result<(), ProfileServiceError> {
        let mut state = self.inner.write().await;
        state.calls.push(ProfileCall::UpdateEndpoint(endpoint_id.clone()));

        if state.failing_updates.contains(endpoint_id) {
            return Err(ProfileServiceError::new(
                ProfileErrorCode::BadRequest,
                "injected update failure",
            ));
        }

        let stored = state
            .endpoints
            .get_mut(&(project_id.clone(), endpoint_id.clone()))
            .ok_or_else(|| ProfileServiceError::not_found("Endpoint"))?;
        stored.user_attributes.insert(
            ENGAGEMENT_SCORE_ATTRIBUTE.to_string(),
            vec![score.to_string()],
        );
        Ok(())
    }
}
