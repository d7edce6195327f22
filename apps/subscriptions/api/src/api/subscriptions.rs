use axum::Router;
use domain_subscriptions::{PgSubscriptionRepository, SubscriptionService, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let repository = PgSubscriptionRepository::new(state.db.clone());
    let service = SubscriptionService::new(repository);
    handlers::router(service)
}
