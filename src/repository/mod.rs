// Declare submodules
pub mod repository_models;
pub mod memory_repository;
pub mod pg_repository;

use axum::async_trait;
use std::sync::Arc;

use crate::error::Result;

pub use memory_repository::{MemoryRepository, MemorySeed};
pub use pg_repository::PgRepository;
pub use repository_models::{Group, Resource, User};

/// User lookup and group enumeration.
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Groups the user is a direct member of, in directory order.
    /// Memberships pointing at groups that no longer exist are left out.
    async fn member_of(&self, user: &User) -> Result<Vec<Group>>;
}

/// Maps a repository path to a resource.
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    async fn resolve(&self, path: &str) -> Result<Option<Resource>>;
}

/// Opens a repository session on behalf of the remote user of a request.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn session(&self, remote_user: &str) -> Result<RepositorySession>;
}

/// Read-only view of the repository bound to one user for one request.
#[derive(Clone)]
pub struct RepositorySession {
    user_id: String,
    directory: Arc<dyn GroupDirectory>,
    resolver: Arc<dyn ResourceResolver>,
}

impl RepositorySession {
    pub fn new(
        user_id: impl Into<String>,
        directory: Arc<dyn GroupDirectory>,
        resolver: Arc<dyn ResourceResolver>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            directory,
            resolver,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn directory(&self) -> &dyn GroupDirectory {
        self.directory.as_ref()
    }

    pub fn resolver(&self) -> &dyn ResourceResolver {
        self.resolver.as_ref()
    }
}
