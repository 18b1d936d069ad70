//! HTTP route handlers.
//!
//! Each sub-module corresponds to an API endpoint group. The acting user is
//! named by the `firebaseId` field of the request body; handlers translate
//! requests into service calls and let [`crate::error::AppError`] map
//! failures to status codes.

pub mod credit_score;
pub mod dashboard;
pub mod expenses;
pub mod extract;
pub mod friends;
pub mod groups;
pub mod health;
pub mod notifications;
pub mod payments;
pub mod users;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// Build the full API router over the given state
pub fn router(state: AppState) -> Router {
    let users = Router::new()
        .route("/api/auth/register", post(users::register))
        .route("/api/users/name", put(users::update_name))
        .route("/api/users/{id}", get(users::get_user));

    let friends = Router::new()
        .route("/api/friends", get(friends::list_friends))
        .route(
            "/api/friends/requests",
            get(friends::list_requests).post(friends::send_request),
        )
        .route("/api/friends/requests/incoming", get(friends::incoming))
        .route("/api/friends/requests/outgoing", get(friends::outgoing))
        .route("/api/friends/accept", post(friends::accept))
        .route("/api/friends/reject", post(friends::reject));

    let groups = Router::new()
        .route("/api/groups", post(groups::create_group))
        .route("/api/groups/user-groups", post(groups::user_groups))
        .route("/api/groups/created-by-user", post(groups::created_by_user))
        .route("/api/groups/notification", post(groups::notify_added))
        .route(
            "/api/groups/{id}",
            get(groups::get_group)
                .put(groups::update_group)
                .delete(groups::delete_group),
        )
        .route(
            "/api/groups/{id}/members",
            get(groups::list_members).post(groups::add_member),
        )
        .route("/api/groups/{id}/members/remove", post(groups::remove_member));

    let expenses = Router::new()
        .route("/api/expenses", post(expenses::create_expense))
        .route("/api/expenses/user-expenses", post(expenses::user_expenses))
        .route("/api/expenses/dashboard", post(expenses::dashboard))
        .route("/api/expenses/group-expenses", post(expenses::group_expenses))
        .route(
            "/api/expenses/user-group-expenses",
            post(expenses::user_group_expenses),
        )
        .route(
            "/api/expenses/{id}",
            get(expenses::get_expense)
                .put(expenses::update_expense)
                .delete(expenses::delete_expense),
        )
        .route("/api/expenses/{id}/splits", post(expenses::add_split));

    let payments = Router::new()
        .route("/api/splits/{id}/request", post(payments::request_payment))
        .route("/api/splits/{id}/confirm", post(payments::confirm_payment))
        .route("/api/splits/{id}/reject", post(payments::reject_payment))
        .route("/api/payments/pending", post(payments::pending_requests));

    let dashboard = Router::new()
        .route("/api/dashboard", get(dashboard::summary))
        .route("/api/dashboard/lent", get(dashboard::lent))
        .route("/api/dashboard/owed", get(dashboard::owed));

    let notifications = Router::new()
        .route("/api/notifications/unprocessed", post(notifications::unprocessed))
        .route(
            "/api/notifications/{id}/processed",
            post(notifications::mark_processed),
        );

    let credit_score = Router::new()
        .route("/api/credit-score/user/{id}", get(credit_score::get_score))
        .route("/api/credit-score/calculate/{id}", post(credit_score::calculate))
        .route("/api/credit-score/calculate-all", post(credit_score::calculate_all))
        .route("/api/credit-score/leaderboard", get(credit_score::leaderboard))
        .route("/api/credit-score/stats", get(credit_score::stats));

    Router::new()
        .route("/api/health", get(health::health))
        .merge(users)
        .merge(friends)
        .merge(groups)
        .merge(expenses)
        .merge(payments)
        .merge(dashboard)
        .merge(notifications)
        .merge(credit_score)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
