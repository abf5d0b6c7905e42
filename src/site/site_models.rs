use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::repository::Resource;

/// One site the user is a member of, as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SiteReference {
    /// Repository path of the site
    pub siteref: String,
    /// Value map of the resolved site resource
    #[schema(value_type = Object)]
    pub site: Map<String, Value>,
}

impl From<Resource> for SiteReference {
    fn from(resource: Resource) -> Self {
        Self {
            siteref: resource.path,
            site: resource.properties,
        }
    }
}
