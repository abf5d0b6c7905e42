use axum::async_trait;
use serde::Deserialize;
use std::{collections::HashMap, path::Path, sync::Arc};

use super::{
    repository_models::{Group, Resource, User},
    GroupDirectory, RepositorySession, ResourceResolver, SessionProvider,
};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedUser {
    pub id: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

/// Snapshot the in-memory backend is built from. Deserializes from the
/// `REPOSITORY_SEED` JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemorySeed {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[allow(dead_code)]
impl MemorySeed {
    pub fn with_user<I, S>(mut self, id: impl Into<String>, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users.push(SeedUser {
            id: id.into(),
            groups: groups.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }
}

struct MemoryStore {
    memberships: HashMap<String, Vec<String>>,
    groups: HashMap<String, Group>,
    resources: HashMap<String, Resource>,
}

/// Immutable in-memory content repository.
#[derive(Clone)]
pub struct MemoryRepository {
    store: Arc<MemoryStore>,
}

impl MemoryRepository {
    pub fn new(seed: MemorySeed) -> Self {
        let store = MemoryStore {
            memberships: seed
                .users
                .into_iter()
                .map(|user| (user.id, user.groups))
                .collect(),
            groups: seed
                .groups
                .into_iter()
                .map(|group| (group.id.clone(), group))
                .collect(),
            resources: seed
                .resources
                .into_iter()
                .map(|resource| (resource.path.clone(), resource))
                .collect(),
        };

        Self {
            store: Arc::new(store),
        }
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Config(format!("Cannot read repository seed {}: {}", path.display(), e))
        })?;
        let seed: MemorySeed = serde_json::from_str(&raw).map_err(|e| {
            AppError::Config(format!("Invalid repository seed {}: {}", path.display(), e))
        })?;

        tracing::info!(
            "Loaded repository seed: {} users, {} groups, {} resources",
            seed.users.len(),
            seed.groups.len(),
            seed.resources.len()
        );

        Ok(Self::new(seed))
    }
}

#[async_trait]
impl GroupDirectory for MemoryRepository {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self
            .store
            .memberships
            .contains_key(user_id)
            .then(|| User { id: user_id.to_string() }))
    }

    async fn member_of(&self, user: &User) -> Result<Vec<Group>> {
        let groups: Vec<Group> = self
            .store
            .memberships
            .get(&user.id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.store.groups.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();

        Ok(groups)
    }
}

#[async_trait]
impl ResourceResolver for MemoryRepository {
    async fn resolve(&self, path: &str) -> Result<Option<Resource>> {
        Ok(self.store.resources.get(path).cloned())
    }
}

#[async_trait]
impl SessionProvider for MemoryRepository {
    async fn session(&self, remote_user: &str) -> Result<RepositorySession> {
        Ok(RepositorySession::new(
            remote_user,
            Arc::new(self.clone()),
            Arc::new(self.clone()),
        ))
    }
}
