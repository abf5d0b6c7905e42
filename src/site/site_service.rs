use std::{collections::HashSet, sync::Arc};

use super::site_models::SiteReference;
use crate::{
    error::{AppError, Result},
    repository::SessionProvider,
};

/// Multi-valued group property listing the paths of the sites the group governs.
pub const SITES_PROPERTY: &str = "sakai:site";

#[derive(Clone)]
pub struct SiteService {
    sessions: Arc<dyn SessionProvider>,
    dedup: bool,
}

impl SiteService {
    pub fn new(sessions: Arc<dyn SessionProvider>, dedup: bool) -> Self {
        Self { sessions, dedup }
    }

    /// Sites the user belongs to through group membership, in group order
    /// and then property value order.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_memberships(&self, user_id: &str) -> Result<Vec<SiteReference>> {
        let session = self.sessions.session(user_id).await?;

        let user = session
            .directory()
            .find_user(session.user_id())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let groups = session.directory().member_of(&user).await?;

        let mut sites = Vec::new();
        let mut seen = HashSet::new();

        for group in &groups {
            let Some(paths) = group.property(SITES_PROPERTY) else {
                continue;
            };

            for path in paths {
                if self.dedup && !seen.insert(path.as_str()) {
                    continue;
                }

                match session.resolver().resolve(path).await? {
                    Some(resource) => sites.push(SiteReference::from(resource)),
                    None => tracing::warn!(
                        group = %group.id,
                        "Site {} listed on group does not resolve, skipping",
                        path
                    ),
                }
            }
        }

        tracing::debug!("Resolved {} site memberships from {} groups", sites.len(), groups.len());

        Ok(sites)
    }
}
