use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/today", get(handlers::get_today))
        .route("/api/notifications", get(handlers::get_notifications))
        .route("/api/notifications/stream", get(handlers::notification_stream))
        .route("/api/rituals", get(handlers::get_rituals))
        .route("/api/meds", get(handlers::list_meds).post(handlers::add_med))
        .route(
            "/api/meds/:id",
            put(handlers::update_med).delete(handlers::delete_med),
        )
        .route("/api/meds/:id/toggle", post(handlers::toggle_med))
        .route(
            "/api/skincare",
            get(handlers::list_skincare).post(handlers::add_skincare),
        )
        .route(
            "/api/skincare/:id",
            put(handlers::update_skincare).delete(handlers::delete_skincare),
        )
        .route("/api/skincare/:id/toggle", post(handlers::toggle_skincare))
        .route("/api/steps", put(handlers::set_steps))
        .route("/api/goals", get(handlers::get_goals).put(handlers::put_goals))
        .route("/api/body", get(handlers::get_body).put(handlers::put_body))
        .route("/api/weight", post(handlers::log_weight))
        .route("/api/meals", post(handlers::log_meal))
        .route("/api/meals/:date/:index", delete(handlers::delete_meal))
        .route("/api/meals/:date/estimate", post(handlers::estimate_meal))
        .route("/api/pantry", get(handlers::list_pantry).post(handlers::add_pantry))
        .route("/api/pantry/:id", delete(handlers::delete_pantry))
        .route(
            "/api/workouts",
            get(handlers::list_workouts).post(handlers::add_workout),
        )
        .route("/api/workouts/plan", put(handlers::save_plan))
        .route("/api/workouts/:id", delete(handlers::delete_workout))
        .route("/api/workouts/:id/toggle", post(handlers::toggle_workout))
        .route("/api/history/:date", get(handlers::history_day))
        .route("/api/history/:date/week", get(handlers::history_week))
        .route("/api/graph", get(handlers::get_graph))
        .route("/api/export", get(handlers::export))
        .route("/api/surgery", put(handlers::set_surgery))
        .route("/api/surgery/apply", post(handlers::apply_surgery))
        .route("/api/oracle/ask", post(handlers::oracle_ask))
        .route("/api/oracle/meal", post(handlers::oracle_meal))
        .route("/api/oracle/meal/refine", post(handlers::oracle_refine))
        .route("/api/oracle/meal/ideas", post(handlers::oracle_ideas))
        .route("/api/oracle/meal/twist", post(handlers::oracle_twist))
        .route("/api/oracle/workout", post(handlers::oracle_workout))
        .route("/api/oracle/forecast", post(handlers::oracle_forecast))
        .route("/api/oracle/surgery", post(handlers::oracle_surgery))
        .with_state(state)
}
