//! Integration tests for the Subscriptions domain
//!
//! These run the Postgres repository against a real database via testcontainers:
//! - SQL produced by the query composer executes as expected
//! - table constraints back up the validator
//! - the cost aggregation runs inside the database
//!
//! They need Docker and are ignored by default: `cargo test -- --ignored`.

use chrono::NaiveDate;
use domain_subscriptions::*;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_subscription(
    user_id: Uuid,
    service_name: &str,
    price: i32,
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> NewSubscription {
    NewSubscription {
        service_name: service_name.to_string(),
        price,
        user_id,
        start_date: start,
        end_date: end,
    }
}

fn year_2025() -> (NaiveDate, NaiveDate) {
    (date(2025, 1, 1), date(2025, 12, 31))
}

// ============================================================================
// Repository Tests
// ============================================================================

#[tokio::test]
#[ignore] // Requires Docker
async fn test_create_and_get_subscription() {
    let db = TestDatabase::new().await;
    let repo = PgSubscriptionRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("create_and_get");

    let input = new_subscription(
        builder.user_id(),
        &builder.name("service", "plus"),
        400,
        date(2025, 7, 1),
        Some(date(2025, 12, 1)),
    );

    let created = repo.create(input.clone()).await.unwrap();

    assert_eq!(created.service_name, input.service_name);
    assert_eq!(created.price, 400);
    assert_uuid_eq(created.user_id, input.user_id, "user_id");
    assert_eq!(created.start_date, date(2025, 7, 1));
    assert_eq!(created.end_date, Some(date(2025, 12, 1)));

    let fetched = repo.get_by_id(created.id).await.unwrap();
    assert_uuid_eq(fetched.id, created.id, "fetched id");
    assert_eq!(fetched.service_name, created.service_name);
    assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_get_missing_subscription_is_not_found() {
    let db = TestDatabase::new().await;
    let repo = PgSubscriptionRepository::new(db.connection());
    let id = Uuid::now_v7();

    let result = repo.get_by_id(id).await;
    assert!(matches!(result, Err(SubscriptionError::NotFound(missing)) if missing == id));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_update_preserves_created_at() {
    let db = TestDatabase::new().await;
    let repo = PgSubscriptionRepository::new(db.connection());
    let service = SubscriptionService::new(repo.clone());
    let builder = TestDataBuilder::from_test_name("update_created_at");

    let created = repo
        .create(new_subscription(
            builder.user_id(),
            "Spotify",
            169,
            date(2025, 1, 1),
            None,
        ))
        .await
        .unwrap();

    let changes = SubscriptionChanges {
        service_name: "Spotify Family".to_string(),
        price: 269,
        user_id: None,
        start_date: date(2025, 2, 1),
        end_date: Some(date(2025, 8, 1)),
    };

    let updated = service
        .update_subscription(created.id, changes)
        .await
        .unwrap();

    assert_eq!(updated.service_name, "Spotify Family");
    assert_eq!(updated.price, 269);
    assert_eq!(updated.user_id, created.user_id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_update_missing_subscription_is_not_found() {
    let db = TestDatabase::new().await;
    let repo = PgSubscriptionRepository::new(db.connection());
    let created = repo
        .create(new_subscription(
            Uuid::now_v7(),
            "Netflix",
            999,
            date(2025, 1, 1),
            None,
        ))
        .await
        .unwrap();

    let ghost = Subscription {
        id: Uuid::now_v7(),
        ..created
    };

    assert!(matches!(
        repo.update(ghost).await,
        Err(SubscriptionError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_delete_reports_whether_a_row_was_removed() {
    let db = TestDatabase::new().await;
    let repo = PgSubscriptionRepository::new(db.connection());

    let created = repo
        .create(new_subscription(
            Uuid::now_v7(),
            "Kinopoisk",
            299,
            date(2025, 1, 1),
            None,
        ))
        .await
        .unwrap();

    assert!(repo.delete(created.id).await.unwrap());
    assert!(!repo.delete(created.id).await.unwrap());
    assert!(matches!(
        repo.get_by_id(created.id).await,
        Err(SubscriptionError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_check_constraints_reject_invalid_rows() {
    let db = TestDatabase::new().await;
    let repo = PgSubscriptionRepository::new(db.connection());

    // Bypasses the service, so only the table constraints stand in the way
    let negative_price = repo
        .create(new_subscription(
            Uuid::now_v7(),
            "Broken",
            -1,
            date(2025, 1, 1),
            None,
        ))
        .await;
    assert!(matches!(
        negative_price,
        Err(SubscriptionError::Persistence { .. })
    ));

    let inverted_period = repo
        .create(new_subscription(
            Uuid::now_v7(),
            "Broken",
            100,
            date(2025, 6, 1),
            Some(date(2025, 1, 1)),
        ))
        .await;
    assert!(matches!(
        inverted_period,
        Err(SubscriptionError::Persistence { .. })
    ));
}

// ============================================================================
// Listing Tests
// ============================================================================

#[tokio::test]
#[ignore] // Requires Docker
async fn test_list_filters_by_user_and_service_name() {
    let db = TestDatabase::new().await;
    let repo = PgSubscriptionRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("list_filters");
    let owner = builder.user_id();
    let other = builder.nth_user_id(1);

    for (user, name) in [
        (owner, "Yandex Plus"),
        (owner, "yandex music"),
        (owner, "Netflix"),
        (other, "Yandex Plus"),
    ] {
        repo.create(new_subscription(user, name, 100, date(2025, 1, 1), None))
            .await
            .unwrap();
    }

    let all_for_owner = repo.list(SubscriptionFilter::for_user(owner)).await.unwrap();
    assert_eq!(all_for_owner.len(), 3);

    let yandex = repo
        .list(SubscriptionFilter::for_user(owner).with_service_name("YANDEX"))
        .await
        .unwrap();
    assert_eq!(yandex.len(), 2);
    assert!(yandex.iter().all(|s| s.user_id == owner));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_service_name_wildcards_are_literal() {
    let db = TestDatabase::new().await;
    let repo = PgSubscriptionRepository::new(db.connection());
    let user_id = TestDataBuilder::from_test_name("wildcards").user_id();

    for name in ["100% Music", "Plain Music"] {
        repo.create(new_subscription(user_id, name, 100, date(2025, 1, 1), None))
            .await
            .unwrap();
    }

    let matches = repo
        .list(SubscriptionFilter::for_user(user_id).with_service_name("%"))
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].service_name, "100% Music");
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_list_period_overlap() {
    let db = TestDatabase::new().await;
    let repo = PgSubscriptionRepository::new(db.connection());
    let user_id = TestDataBuilder::from_test_name("list_overlap").user_id();

    let inside = repo
        .create(new_subscription(user_id, "Inside", 100, date(2025, 3, 1), Some(date(2025, 4, 1))))
        .await
        .unwrap();
    let open_ended = repo
        .create(new_subscription(user_id, "Open", 100, date(2024, 1, 1), None))
        .await
        .unwrap();
    repo.create(new_subscription(user_id, "Ended", 100, date(2024, 1, 1), Some(date(2024, 12, 1))))
        .await
        .unwrap();
    repo.create(new_subscription(user_id, "Future", 100, date(2026, 1, 1), None))
        .await
        .unwrap();

    let (start, end) = year_2025();
    let found = repo
        .list(SubscriptionFilter::for_user(user_id).with_period(start, end))
        .await
        .unwrap();

    let mut ids: Vec<Uuid> = found.iter().map(|s| s.id).collect();
    ids.sort();
    let mut expected = vec![inside.id, open_ended.id];
    expected.sort();
    assert_eq!(ids, expected);

    // A single bound is ignored for listing
    let one_bound = SubscriptionFilter {
        start_period: Some(start),
        ..SubscriptionFilter::for_user(user_id)
    };
    assert_eq!(repo.list(one_bound).await.unwrap().len(), 4);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_list_page_sorts_and_counts() {
    let db = TestDatabase::new().await;
    let repo = PgSubscriptionRepository::new(db.connection());
    let service = SubscriptionService::new(repo);
    let user_id = TestDataBuilder::from_test_name("list_page").user_id();

    for price in [500, 100, 400, 200, 300] {
        service
            .create_subscription(new_subscription(user_id, "Tier", price, date(2025, 1, 1), None))
            .await
            .unwrap();
    }

    let pagination = Pagination::new(Some(2), Some(2)).sorted_by(Some("price"), Some("asc"));
    let page = service
        .list_subscriptions(SubscriptionFilter::for_user(user_id), pagination)
        .await
        .unwrap();

    assert_eq!(page.total, 5);
    assert_eq!(page.total_pages(), 3);
    let prices: Vec<i32> = page.items.iter().map(|s| s.price).collect();
    assert_eq!(prices, vec![300, 400]);

    // Unknown sort columns fall back to the default ordering instead of reaching SQL
    let fallback = Pagination::new(None, None).sorted_by(Some("price; DROP TABLE subscriptions"), None);
    let page = service
        .list_subscriptions(SubscriptionFilter::for_user(user_id), fallback)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 5);
}

// ============================================================================
// Total Cost Tests
// ============================================================================

#[tokio::test]
#[ignore] // Requires Docker
async fn test_total_cost_examples() {
    let db = TestDatabase::new().await;
    let repo = PgSubscriptionRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("total_cost_examples");
    let (start, end) = year_2025();

    let closed_user = builder.nth_user_id(1);
    repo.create(new_subscription(closed_user, "Yandex Plus", 500, date(2025, 1, 1), Some(date(2025, 3, 1))))
        .await
        .unwrap();

    let open_user = builder.nth_user_id(2);
    repo.create(new_subscription(open_user, "Netflix", 100, date(2025, 6, 1), None))
        .await
        .unwrap();

    let total = repo
        .total_cost(SubscriptionFilter::for_user(closed_user).with_period(start, end))
        .await
        .unwrap();
    assert_eq!(total, 1500);

    let total = repo
        .total_cost(SubscriptionFilter::for_user(open_user).with_period(start, end))
        .await
        .unwrap();
    assert_eq!(total, 700);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_total_cost_clips_and_excludes() {
    let db = TestDatabase::new().await;
    let repo = PgSubscriptionRepository::new(db.connection());
    let user_id = TestDataBuilder::from_test_name("total_cost_clip").user_id();
    let (start, end) = year_2025();

    // Started before the period: only Jan and Feb 2025 count
    repo.create(new_subscription(user_id, "Clipped", 10, date(2023, 11, 1), Some(date(2025, 2, 1))))
        .await
        .unwrap();
    // Entirely outside the period
    repo.create(new_subscription(user_id, "Past", 1000, date(2024, 1, 1), Some(date(2024, 12, 1))))
        .await
        .unwrap();
    repo.create(new_subscription(user_id, "Future", 1000, date(2026, 1, 1), None))
        .await
        .unwrap();

    let total = repo
        .total_cost(SubscriptionFilter::for_user(user_id).with_period(start, end))
        .await
        .unwrap();
    assert_eq!(total, 20);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_total_cost_with_no_matches_is_zero() {
    let db = TestDatabase::new().await;
    let repo = PgSubscriptionRepository::new(db.connection());
    let (start, end) = year_2025();

    let total = repo
        .total_cost(SubscriptionFilter::for_user(Uuid::now_v7()).with_period(start, end))
        .await
        .unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_total_cost_filters_by_service_name() {
    let db = TestDatabase::new().await;
    let repo = PgSubscriptionRepository::new(db.connection());
    let user_id = TestDataBuilder::from_test_name("total_cost_service").user_id();
    let (start, end) = year_2025();

    repo.create(new_subscription(user_id, "Yandex Plus", 500, date(2025, 1, 1), Some(date(2025, 3, 1))))
        .await
        .unwrap();
    repo.create(new_subscription(user_id, "Netflix", 100, date(2025, 6, 1), None))
        .await
        .unwrap();

    let filter = SubscriptionFilter::for_user(user_id)
        .with_service_name("netflix")
        .with_period(start, end);
    assert_eq!(repo.total_cost(filter).await.unwrap(), 700);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_total_cost_rejects_missing_bound() {
    let db = TestDatabase::new().await;
    let repo = PgSubscriptionRepository::new(db.connection());

    let filter = SubscriptionFilter {
        end_period: Some(date(2025, 12, 31)),
        ..SubscriptionFilter::default()
    };

    assert!(matches!(
        repo.total_cost(filter).await,
        Err(SubscriptionError::InvalidArgument(_))
    ));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_truncate_clears_table() {
    let db = TestDatabase::new().await;
    let repo = PgSubscriptionRepository::new(db.connection());
    let user_id = Uuid::now_v7();

    let created = repo
        .create(new_subscription(user_id, "Spotify", 100, date(2025, 1, 1), None))
        .await
        .unwrap();

    let before = repo.list(SubscriptionFilter::for_user(user_id)).await.unwrap();
    let first = assert_some(before.first(), "subscription before truncate");
    assert_uuid_eq(first.id, created.id, "listed id");

    db.truncate("subscriptions").await;

    let after = repo.list(SubscriptionFilter::for_user(user_id)).await.unwrap();
    assert!(after.is_empty());
}
