use axum::async_trait;
use serde_json::{Map, Value};
use sqlx::{types::Json, PgPool};
use std::{collections::HashMap, sync::Arc};

use super::{
    repository_models::{Group, Resource, User},
    GroupDirectory, RepositorySession, ResourceResolver, SessionProvider,
};
use crate::error::Result;

/// Content repository backed by PostgreSQL. Read-only.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupDirectory for PgRepository {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>> {
        let id: Option<String> = sqlx::query_scalar(
            "SELECT id FROM authorizables WHERE id = $1 AND kind = 'user'"
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id.map(|id| User { id }))
    }

    async fn member_of(&self, user: &User) -> Result<Vec<Group>> {
        let group_ids: Vec<String> = sqlx::query_scalar(
            "SELECT a.id FROM authorizables a
             INNER JOIN group_members gm ON a.id = gm.group_id
             WHERE gm.member_id = $1 AND a.kind = 'group'
             ORDER BY gm.position ASC, a.id ASC"
        )
        .bind(&user.id)
        .fetch_all(&self.pool)
        .await?;

        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT authorizable_id, name, value FROM authorizable_properties
             WHERE authorizable_id = ANY($1)
             ORDER BY authorizable_id, name, position ASC"
        )
        .bind(&group_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut groups: HashMap<String, Group> = group_ids
            .iter()
            .map(|id| (id.clone(), Group::new(id.clone())))
            .collect();

        for (group_id, name, value) in rows {
            if let Some(group) = groups.get_mut(&group_id) {
                group.properties.entry(name).or_default().push(value);
            }
        }

        // Back to membership order
        Ok(group_ids
            .iter()
            .filter_map(|id| groups.remove(id))
            .collect())
    }
}

#[async_trait]
impl ResourceResolver for PgRepository {
    async fn resolve(&self, path: &str) -> Result<Option<Resource>> {
        let row: Option<(String, Json<Map<String, Value>>)> = sqlx::query_as(
            "SELECT path, properties FROM resources WHERE path = $1"
        )
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(path, Json(properties))| Resource { path, properties }))
    }
}

#[async_trait]
impl SessionProvider for PgRepository {
    async fn session(&self, remote_user: &str) -> Result<RepositorySession> {
        let repo = Arc::new(self.clone());
        Ok(RepositorySession::new(remote_user, repo.clone(), repo))
    }
}
