use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::system;
use crate::middleware::{fault_boundary, panic_response, require_auth};
use crate::state::AppState;

/// Build the full router: every verb + path and the handler it runs.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(auth_public_routes())
        // Bearer token required
        .merge(auth_routes(&state))
        .merge(user_settings_routes(&state))
        // Records, optionally guarded
        .merge(record_routes(&state))
        // Known path, unknown verb: same 404 as an unknown path
        .method_not_allowed_fallback(system::not_found)
        .fallback(system::not_found)
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(from_fn(fault_boundary))
                .layer(CatchPanicLayer::custom(panic_response)),
        )
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use axum::routing::post;
    use crate::handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/verify-email", get(auth::verify_email))
        .route("/auth/resend-verification", post(auth::resend_verification))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    use axum::routing::post;
    use crate::handlers::protected::auth;

    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/profile", get(auth::profile_get).put(auth::profile_put))
        .route("/auth/token-info", get(auth::token_info))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn user_settings_routes(state: &AppState) -> Router<AppState> {
    use crate::handlers::protected::user_settings;

    Router::new()
        .route(
            "/user-settings",
            get(user_settings::settings_get).put(user_settings::settings_put),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn record_routes(state: &AppState) -> Router<AppState> {
    use crate::handlers::data::{contracts, customers};

    let router = Router::new()
        .route("/customers", get(customers::list).post(customers::create))
        .route(
            "/customers/:id",
            get(customers::get).put(customers::update).delete(customers::delete),
        )
        .route("/contracts", get(contracts::list).post(contracts::create))
        .route(
            "/contracts/:id",
            get(contracts::get).patch(contracts::update).delete(contracts::delete),
        );

    if state.config.security.require_auth_for_records {
        router.route_layer(from_fn_with_state(state.clone(), require_auth))
    } else {
        router
    }
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}
