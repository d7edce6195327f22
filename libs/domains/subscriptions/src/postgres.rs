use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement};
use uuid::Uuid;

use crate::cost;
use crate::error::{SubscriptionError, SubscriptionResult};
use crate::models::{NewSubscription, Pagination, Subscription, SubscriptionFilter};
use crate::query::{Column, QueryBuilder};
use crate::repository::SubscriptionRepository;

const COLUMNS: &str =
    "id, service_name, price, user_id, start_date, end_date, created_at, updated_at";

/// PostgreSQL implementation of SubscriptionRepository.
///
/// Each operation is a single statement, so an abandoned request never leaves
/// partial writes behind.
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    db: DatabaseConnection,
}

impl PgSubscriptionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct SubscriptionRow {
    id: Uuid,
    service_name: String,
    price: i32,
    user_id: Uuid,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Subscription {
            id: row.id,
            service_name: row.service_name,
            price: row.price,
            user_id: row.user_id,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct TotalRow {
    total: i64,
}

/// Wrap a driver error with the failed operation, logging it where it happened.
fn db_error(operation: &'static str, id: Option<Uuid>) -> impl FnOnce(DbErr) -> SubscriptionError {
    move |source| {
        tracing::error!(operation, subscription_id = ?id, error = %source, "Subscription query failed");
        SubscriptionError::Persistence { operation, source }
    }
}

/// Equality on owner, substring on service name, and (when both bounds are given) overlap
/// with the period.
fn apply_filter(mut query: QueryBuilder, filter: &SubscriptionFilter) -> QueryBuilder {
    if let Some(user_id) = filter.user_id {
        query = query.and_eq(Column::UserId, user_id);
    }
    if let Some(pattern) = filter.service_name_pattern() {
        query = query.and_contains(Column::ServiceName, pattern);
    }
    if let Some(period) = filter.listing_period() {
        query = query.and_overlaps(Column::StartDate, Column::EndDate, period.start, period.end);
    }
    query
}

fn select_subscriptions() -> QueryBuilder {
    QueryBuilder::new(format!("SELECT {} FROM subscriptions", COLUMNS))
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn create(&self, input: NewSubscription) -> SubscriptionResult<Subscription> {
        let sql = format!(
            "INSERT INTO subscriptions (service_name, price, user_id, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            COLUMNS
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                input.service_name.into(),
                input.price.into(),
                input.user_id.into(),
                input.start_date.into(),
                input.end_date.into(),
            ],
        );

        tracing::debug!(user_id = %input.user_id, "Inserting subscription");

        let row = SubscriptionRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error("create", None))?
            .ok_or_else(|| db_error("create", None)(DbErr::RecordNotInserted))?;

        let subscription = Subscription::from(row);
        tracing::info!(subscription_id = %subscription.id, "Created subscription");
        Ok(subscription)
    }

    async fn get_by_id(&self, id: Uuid) -> SubscriptionResult<Subscription> {
        let stmt = select_subscriptions()
            .and_eq(Column::Id, id)
            .into_statement();

        tracing::debug!(subscription_id = %id, "Fetching subscription");

        SubscriptionRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error("get", Some(id)))?
            .map(Subscription::from)
            .ok_or(SubscriptionError::NotFound(id))
    }

    async fn list(&self, filter: SubscriptionFilter) -> SubscriptionResult<Vec<Subscription>> {
        let stmt = apply_filter(select_subscriptions(), &filter).into_statement();

        tracing::debug!(?filter, "Listing subscriptions");

        let rows = SubscriptionRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(db_error("list", None))?;

        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    async fn list_page(
        &self,
        filter: SubscriptionFilter,
        pagination: Pagination,
    ) -> SubscriptionResult<Vec<Subscription>> {
        let stmt = apply_filter(select_subscriptions(), &filter)
            .order_by(pagination.sort_by, pagination.sort_dir)
            .paginate(pagination.limit(), pagination.offset())
            .into_statement();

        tracing::debug!(
            ?filter,
            page = pagination.page,
            page_size = pagination.page_size,
            "Listing subscriptions page"
        );

        let rows = SubscriptionRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(db_error("list", None))?;

        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    async fn count(&self, filter: SubscriptionFilter) -> SubscriptionResult<u64> {
        let stmt = apply_filter(
            QueryBuilder::new("SELECT COUNT(*) AS count FROM subscriptions"),
            &filter,
        )
        .into_statement();

        let count = CountRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error("count", None))?
            .map_or(0, |row| row.count);

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn update(&self, subscription: Subscription) -> SubscriptionResult<Subscription> {
        let id = subscription.id;
        let sql = format!(
            "UPDATE subscriptions SET service_name = $2, price = $3, user_id = $4, \
             start_date = $5, end_date = $6, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            COLUMNS
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                id.into(),
                subscription.service_name.into(),
                subscription.price.into(),
                subscription.user_id.into(),
                subscription.start_date.into(),
                subscription.end_date.into(),
            ],
        );

        tracing::debug!(subscription_id = %id, "Updating subscription");

        let row = SubscriptionRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(db_error("update", Some(id)))?
            .ok_or(SubscriptionError::NotFound(id))?;

        tracing::info!(subscription_id = %id, "Updated subscription");
        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> SubscriptionResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM subscriptions WHERE id = $1",
            [id.into()],
        );

        let result = self
            .db
            .execute_raw(stmt)
            .await
            .map_err(db_error("delete", Some(id)))?;

        let removed = result.rows_affected() > 0;
        if removed {
            tracing::info!(subscription_id = %id, "Deleted subscription");
        }
        Ok(removed)
    }

    async fn total_cost(&self, filter: SubscriptionFilter) -> SubscriptionResult<i64> {
        let period = filter.billing_period()?;

        let mut query = cost::total_cost_query(&period);
        if let Some(user_id) = filter.user_id {
            query = query.and_eq(Column::UserId, user_id);
        }
        if let Some(pattern) = filter.service_name_pattern() {
            query = query.and_contains(Column::ServiceName, pattern);
        }

        tracing::debug!(start = %period.start, end = %period.end, "Computing total cost");

        let total = TotalRow::find_by_statement(query.into_statement())
            .one(&self.db)
            .await
            .map_err(db_error("total_cost", None))?
            .map_or(0, |row| row.total);

        tracing::info!(total, "Computed total cost");
        Ok(total)
    }
}
