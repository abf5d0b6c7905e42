use crate::{
    middleware::remote_user_middleware,
    site::{site_handlers, SiteReference},
    state::AppState,
};
use axum::{
    http::{header::CONTENT_TYPE, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::site::site_handlers::get_site_memberships,
        crate::site::site_handlers::health,
    ),
    components(
        schemas(
            SiteReference,
        )
    ),
    tags(
        (name = "sites", description = "Site membership endpoints"),
        (name = "health", description = "Liveness endpoint")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "remote_user",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("x-remote-user"),
                    ),
                ),
            )
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(state.config.cors_allowed_origins.clone()))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, state.config.remote_user_header.clone()])
        .allow_credentials(true);

    // Routes that need the remote user
    let site_routes = Router::new()
        .route("/membership", get(site_handlers::get_site_memberships))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            remote_user_middleware,
        ));

    let api_routes = Router::new().nest("/sites", site_routes);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(site_handlers::health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repository::{Group, MemoryRepository, MemorySeed, Resource},
        site::{SiteService, SITES_PROPERTY},
        state::{Config, RepositoryBackend},
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    const TEST_USER: &str = "testuser";
    const TEST_SITE_PATH: &str = "/some/test/site";

    fn router(seed: MemorySeed) -> Router {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            backend: RepositoryBackend::Memory { seed: None },
            remote_user_header: "x-remote-user".parse().unwrap(),
            dedup_sites: false,
            cors_allowed_origins: Vec::new(),
        };

        create_router(AppState {
            config: Arc::new(config),
            site_service: SiteService::new(Arc::new(MemoryRepository::new(seed)), false),
        })
    }

    async fn get_memberships(router: Router, user: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder()
            .method(Method::GET)
            .uri("/api/sites/membership");
        if let Some(user) = user {
            request = request.header("x-remote-user", user);
        }

        let response = router
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn test_user_no_memberships_returns_empty_array() {
        let router = router(MemorySeed::default().with_user(TEST_USER, Vec::<String>::new()));

        let (status, json) = get_memberships(router, Some(TEST_USER)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(json.as_array().unwrap().is_empty(), "Expected no sites back");
    }

    #[tokio::test]
    async fn test_user_with_memberships_returns_siteref() {
        let router = router(
            MemorySeed::default()
                .with_user(TEST_USER, ["some_site_group"])
                .with_group(Group::new("some_site_group").with_property(SITES_PROPERTY, [TEST_SITE_PATH]))
                .with_resource(Resource::new(TEST_SITE_PATH).with_value("path", TEST_SITE_PATH)),
        );

        let (status, json) = get_memberships(router, Some(TEST_USER)).await;

        assert_eq!(status, StatusCode::OK);
        let sites = json.as_array().unwrap();
        assert_eq!(sites.len(), 1, "Expected 1 site back");
        assert_eq!(sites[0]["siteref"], TEST_SITE_PATH, "Expected siteref to match path");
        assert_eq!(sites[0]["site"]["path"], TEST_SITE_PATH);
    }

    #[tokio::test]
    async fn test_missing_remote_user_is_unauthorized() {
        let router = router(MemorySeed::default().with_user(TEST_USER, Vec::<String>::new()));

        let (status, json) = get_memberships(router, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "No authenticated user");
    }

    #[tokio::test]
    async fn test_blank_remote_user_is_unauthorized() {
        let router = router(MemorySeed::default());

        let (status, _) = get_memberships(router, Some("  ")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let router = router(MemorySeed::default());

        let (status, json) = get_memberships(router, Some("ghost")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "User ghost not found");
    }

    #[tokio::test]
    async fn test_health() {
        let response = router(MemorySeed::default())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
