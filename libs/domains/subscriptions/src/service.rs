use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::SubscriptionResult;
use crate::models::{
    NewSubscription, Page, Pagination, Subscription, SubscriptionChanges, SubscriptionFilter,
};
use crate::repository::SubscriptionRepository;
use crate::validation;

/// Service layer for Subscription business logic.
///
/// Every rule that can reject a request runs before the repository is touched.
#[derive(Clone)]
pub struct SubscriptionService<R: SubscriptionRepository> {
    repository: Arc<R>,
}

impl<R: SubscriptionRepository> SubscriptionService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create_subscription(
        &self,
        input: NewSubscription,
    ) -> SubscriptionResult<Subscription> {
        validation::validate_for_create(&input)?;
        self.repository.create(input).await
    }

    #[instrument(skip(self), fields(subscription_id = %id))]
    pub async fn get_subscription(&self, id: Uuid) -> SubscriptionResult<Subscription> {
        self.repository.get_by_id(id).await
    }

    /// One page of subscriptions plus the total count for the same filter.
    ///
    /// Two single-statement reads; the total can drift from the page under concurrent writes.
    #[instrument(skip(self))]
    pub async fn list_subscriptions(
        &self,
        filter: SubscriptionFilter,
        pagination: Pagination,
    ) -> SubscriptionResult<Page<Subscription>> {
        let total = self.repository.count(filter.clone()).await?;
        let items = self.repository.list_page(filter, pagination).await?;

        tracing::debug!(total, count = items.len(), "Listed subscriptions");

        Ok(Page {
            items,
            total,
            page: pagination.page,
            page_size: pagination.page_size,
        })
    }

    /// Whole-record update. `created_at` and `id` are taken from the stored record.
    #[instrument(skip(self, changes), fields(subscription_id = %id))]
    pub async fn update_subscription(
        &self,
        id: Uuid,
        changes: SubscriptionChanges,
    ) -> SubscriptionResult<Subscription> {
        validation::validate_changes(&changes)?;

        let existing = self.repository.get_by_id(id).await?;
        let record = validation::validate_for_update(changes, &existing)?;

        self.repository.update(record).await
    }

    /// Idempotent: deleting an unknown id succeeds.
    #[instrument(skip(self), fields(subscription_id = %id))]
    pub async fn delete_subscription(&self, id: Uuid) -> SubscriptionResult<()> {
        if !self.repository.delete(id).await? {
            tracing::debug!("Nothing to delete");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn total_cost(&self, filter: SubscriptionFilter) -> SubscriptionResult<i64> {
        filter.billing_period()?;
        self.repository.total_cost(filter).await
    }
}
