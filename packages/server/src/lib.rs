pub mod billing;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Halısaha API",
        version = "1.0.0",
        description = "API for organizing amateur football matches: organizations, members, matches, rosters, scores, ratings, facilities and plan billing"
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::organization::list_organizations,
        handlers::organization::create_organization,
        handlers::organization::get_organization,
        handlers::organization::update_organization,
        handlers::organization::delete_organization,
        handlers::membership::join_organization,
        handlers::membership::list_members,
        handlers::membership::update_member,
        handlers::membership::remove_member,
        handlers::matches::list_matches,
        handlers::matches::create_match,
        handlers::matches::get_match,
        handlers::matches::update_match,
        handlers::matches::delete_match,
        handlers::roster::list_roster,
        handlers::roster::add_to_roster,
        handlers::roster::remove_from_roster,
        handlers::roster::update_formation,
        handlers::score::get_score,
        handlers::score::upsert_score,
        handlers::score::publish_match,
        handlers::attendance::list_attendance,
        handlers::attendance::respond_attendance,
        handlers::rating::list_ratings,
        handlers::rating::create_rating,
        handlers::facility::list_facilities,
        handlers::facility::create_facility,
        handlers::facility::update_facility,
        handlers::facility::delete_facility,
        handlers::billing::list_plans,
        handlers::billing::checkout,
        handlers::billing::list_payments,
    ),
    tags(
        (name = "Auth", description = "Registration, login and the session cookie"),
        (name = "Organizations", description = "Organization CRUD"),
        (name = "Membership", description = "Join requests and member management"),
        (name = "Matches", description = "Match scheduling"),
        (name = "Roster", description = "Match rosters and formations"),
        (name = "Score", description = "Scores and publishing"),
        (name = "Attendance", description = "Attendance answers"),
        (name = "Ratings", description = "Post-match player ratings"),
        (name = "Facilities", description = "Pitches and their map locations"),
        (name = "Billing", description = "Plans and payments"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
        );
    }
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allow_origins
        .iter()
        .filter_map(|o| o.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(cors.max_age))
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let api = ApiDoc::openapi();
    let cors = cors_layer(&state.config.server.cors);

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
