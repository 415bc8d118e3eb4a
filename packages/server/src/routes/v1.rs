use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/organizations", organization_routes())
        .nest("/matches", match_routes())
        .nest("/facilities", facility_routes())
        .nest("/billing", billing_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::me))
}

fn organization_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::organization::list_organizations)
                .post(handlers::organization::create_organization),
        )
        .route(
            "/{id}",
            get(handlers::organization::get_organization)
                .patch(handlers::organization::update_organization)
                .delete(handlers::organization::delete_organization),
        )
        .route("/{id}/join", post(handlers::membership::join_organization))
        .nest("/{id}/members", member_routes())
        .route(
            "/{id}/matches",
            get(handlers::matches::list_matches).post(handlers::matches::create_match),
        )
        .route(
            "/{id}/facilities",
            get(handlers::facility::list_facilities).post(handlers::facility::create_facility),
        )
}

fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::membership::list_members))
        .route(
            "/{user_id}",
            patch(handlers::membership::update_member).delete(handlers::membership::remove_member),
        )
}

fn match_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(handlers::matches::get_match)
                .patch(handlers::matches::update_match)
                .delete(handlers::matches::delete_match),
        )
        .route(
            "/{id}/roster",
            get(handlers::roster::list_roster).post(handlers::roster::add_to_roster),
        )
        .route(
            "/{id}/roster/{user_id}",
            delete(handlers::roster::remove_from_roster),
        )
        .route("/{id}/formation", put(handlers::roster::update_formation))
        .route(
            "/{id}/score",
            get(handlers::score::get_score).put(handlers::score::upsert_score),
        )
        .route("/{id}/publish", post(handlers::score::publish_match))
        .route(
            "/{id}/attendance",
            get(handlers::attendance::list_attendance)
                .put(handlers::attendance::respond_attendance),
        )
        .route(
            "/{id}/ratings",
            get(handlers::rating::list_ratings).post(handlers::rating::create_rating),
        )
}

fn facility_routes() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        patch(handlers::facility::update_facility).delete(handlers::facility::delete_facility),
    )
}

fn billing_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(handlers::billing::list_plans))
        .route("/checkout", post(handlers::billing::checkout))
        .route("/payments", get(handlers::billing::list_payments))
}
