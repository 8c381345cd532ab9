use crate::{
    handlers,
    middleware::trigger_auth_middleware,
    state::AppState,
    sweep::{self, SweepResponse},
};
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName,
    },
    middleware,
    routing::{any, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        sweep::sweep_handlers::run_expiration_sweep,
        handlers::health::health,
    ),
    components(
        schemas(SweepResponse)
    ),
    tags(
        (name = "sweep", description = "Auto-expiration of stale pending requests"),
        (name = "health", description = "Liveness")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            )
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    // OPTIONS never reaches the handlers: the layer answers every preflight.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("apikey"),
            HeaderName::from_static("x-client-info"),
        ]);

    let sweep_routes = Router::new()
        .route(
            "/functions/v1/auto-expire-requests",
            any(sweep::run_expiration_sweep),
        )
        .route("/api/sweep", any(sweep::run_expiration_sweep))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            trigger_auth_middleware,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health))
        .merge(sweep_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
