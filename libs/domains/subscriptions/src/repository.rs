use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cost;
use crate::error::{SubscriptionError, SubscriptionResult};
use crate::models::{
    NewSubscription, Pagination, SortDirection, SortField, Subscription, SubscriptionFilter,
};

/// Repository trait for Subscription persistence.
///
/// Implementations contain no business validation; callers go through
/// [`SubscriptionService`](crate::service::SubscriptionService).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a subscription and return it with its server-assigned fields
    async fn create(&self, input: NewSubscription) -> SubscriptionResult<Subscription>;

    /// Exact lookup, `NotFound` when absent
    async fn get_by_id(&self, id: Uuid) -> SubscriptionResult<Subscription>;

    /// All subscriptions matching the filter, in no particular order
    async fn list(&self, filter: SubscriptionFilter) -> SubscriptionResult<Vec<Subscription>>;

    /// One sorted page of subscriptions matching the filter
    async fn list_page(
        &self,
        filter: SubscriptionFilter,
        pagination: Pagination,
    ) -> SubscriptionResult<Vec<Subscription>>;

    /// Number of subscriptions matching the filter
    async fn count(&self, filter: SubscriptionFilter) -> SubscriptionResult<u64>;

    /// Replace every field except `id` and `created_at`, refreshing `updated_at`
    async fn update(&self, subscription: Subscription) -> SubscriptionResult<Subscription>;

    /// Physical delete. Returns whether a row was removed; a missing id is not an error.
    async fn delete(&self, id: Uuid) -> SubscriptionResult<bool>;

    /// Prorated cost of matching subscriptions over the filter's period
    async fn total_cost(&self, filter: SubscriptionFilter) -> SubscriptionResult<i64>;
}

/// In-memory implementation of SubscriptionRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemorySubscriptionRepository {
    subscriptions: Arc<RwLock<HashMap<Uuid, Subscription>>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn matches(subscription: &Subscription, filter: &SubscriptionFilter) -> bool {
        if filter.user_id.is_some_and(|id| id != subscription.user_id) {
            return false;
        }
        if let Some(pattern) = filter.service_name_pattern() {
            if !subscription
                .service_name
                .to_lowercase()
                .contains(&pattern.to_lowercase())
            {
                return false;
            }
        }
        filter
            .listing_period()
            .is_none_or(|period| subscription.overlaps(&period))
    }

    async fn filtered(&self, filter: &SubscriptionFilter) -> Vec<Subscription> {
        let subscriptions = self.subscriptions.read().await;
        subscriptions
            .values()
            .filter(|s| Self::matches(s, filter))
            .cloned()
            .collect()
    }
}

fn compare(a: &Subscription, b: &Subscription, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::StartDate => a.start_date.cmp(&b.start_date),
        SortField::Price => a.price.cmp(&b.price),
        SortField::ServiceName => a.service_name.cmp(&b.service_name),
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(&self, input: NewSubscription) -> SubscriptionResult<Subscription> {
        let now = Utc::now();
        let subscription = Subscription {
            id: Uuid::new_v4(),
            service_name: input.service_name,
            price: input.price,
            user_id: input.user_id,
            start_date: input.start_date,
            end_date: input.end_date,
            created_at: now,
            updated_at: now,
        };

        self.subscriptions
            .write()
            .await
            .insert(subscription.id, subscription.clone());

        tracing::info!(subscription_id = %subscription.id, "Created subscription");
        Ok(subscription)
    }

    async fn get_by_id(&self, id: Uuid) -> SubscriptionResult<Subscription> {
        let subscriptions = self.subscriptions.read().await;
        subscriptions
            .get(&id)
            .cloned()
            .ok_or(SubscriptionError::NotFound(id))
    }

    async fn list(&self, filter: SubscriptionFilter) -> SubscriptionResult<Vec<Subscription>> {
        Ok(self.filtered(&filter).await)
    }

    async fn list_page(
        &self,
        filter: SubscriptionFilter,
        pagination: Pagination,
    ) -> SubscriptionResult<Vec<Subscription>> {
        let mut result = self.filtered(&filter).await;

        result.sort_by(|a, b| {
            let ordering = compare(a, b, pagination.sort_by);
            match pagination.sort_dir {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit()).unwrap_or(usize::MAX);

        Ok(result.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, filter: SubscriptionFilter) -> SubscriptionResult<u64> {
        Ok(self.filtered(&filter).await.len() as u64)
    }

    async fn update(&self, subscription: Subscription) -> SubscriptionResult<Subscription> {
        let mut subscriptions = self.subscriptions.write().await;

        let stored = subscriptions
            .get_mut(&subscription.id)
            .ok_or(SubscriptionError::NotFound(subscription.id))?;

        stored.service_name = subscription.service_name;
        stored.price = subscription.price;
        stored.user_id = subscription.user_id;
        stored.start_date = subscription.start_date;
        stored.end_date = subscription.end_date;
        stored.updated_at = Utc::now();

        tracing::info!(subscription_id = %stored.id, "Updated subscription");
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> SubscriptionResult<bool> {
        let removed = self.subscriptions.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(subscription_id = %id, "Deleted subscription");
        }
        Ok(removed)
    }

    async fn total_cost(&self, filter: SubscriptionFilter) -> SubscriptionResult<i64> {
        let period = filter.billing_period()?;
        let matching = self.filtered(&filter).await;
        let total = cost::total_cost(&matching, &period);

        tracing::debug!(total, count = matching.len(), "Computed total cost");
        Ok(total)
    }
}
