//! Business rules checked before anything reaches storage.
//!
//! These are pure functions over already-parsed values. Date formats and UUID syntax
//! are the HTTP layer's concern.

use chrono::NaiveDate;

use crate::error::{SubscriptionError, SubscriptionResult};
use crate::models::{NewSubscription, Subscription, SubscriptionChanges};

fn check_terms(
    service_name: &str,
    price: i32,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> SubscriptionResult<()> {
    if service_name.trim().is_empty() {
        return Err(SubscriptionError::invalid("service_name must not be empty"));
    }
    if price < 0 {
        return Err(SubscriptionError::invalid("price must not be negative"));
    }
    if end_date.is_some_and(|end| end < start_date) {
        return Err(SubscriptionError::invalid(
            "end_date must not be before start_date",
        ));
    }
    Ok(())
}

pub fn validate_for_create(input: &NewSubscription) -> SubscriptionResult<()> {
    check_terms(
        &input.service_name,
        input.price,
        input.start_date,
        input.end_date,
    )
}

/// Field checks for an update that can run before the stored record is loaded.
pub fn validate_changes(changes: &SubscriptionChanges) -> SubscriptionResult<()> {
    check_terms(
        &changes.service_name,
        changes.price,
        changes.start_date,
        changes.end_date,
    )
}

/// Builds the record to persist from the stored one and the requested changes.
///
/// `id` and `created_at` always come from `existing`; the owner is only replaced when
/// the changes name one.
pub fn validate_for_update(
    changes: SubscriptionChanges,
    existing: &Subscription,
) -> SubscriptionResult<Subscription> {
    validate_changes(&changes)?;

    Ok(Subscription {
        id: existing.id,
        service_name: changes.service_name,
        price: changes.price,
        user_id: changes.user_id.unwrap_or(existing.user_id),
        start_date: changes.start_date,
        end_date: changes.end_date,
        created_at: existing.created_at,
        updated_at: existing.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn month(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn new_sub(price: i32, start: NaiveDate, end: Option<NaiveDate>) -> NewSubscription {
        NewSubscription {
            service_name: "Yandex Plus".to_string(),
            price,
            user_id: Uuid::new_v4(),
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn test_create_accepts_valid_subscription() {
        assert!(validate_for_create(&new_sub(400, month(2025, 7), None)).is_ok());
        assert!(validate_for_create(&new_sub(0, month(2025, 7), Some(month(2025, 7)))).is_ok());
    }

    #[test]
    fn test_create_rejects_negative_price() {
        let err = validate_for_create(&new_sub(-1, month(2025, 7), None)).unwrap_err();
        assert!(matches!(err, SubscriptionError::InvalidArgument(msg) if msg.contains("price")));
    }

    #[test]
    fn test_create_rejects_end_before_start() {
        let err =
            validate_for_create(&new_sub(100, month(2025, 7), Some(month(2025, 6)))).unwrap_err();
        assert!(matches!(err, SubscriptionError::InvalidArgument(msg) if msg.contains("end_date")));
    }

    #[test]
    fn test_create_rejects_blank_service_name() {
        let mut input = new_sub(100, month(2025, 7), None);
        input.service_name = "   ".to_string();
        assert!(matches!(
            validate_for_create(&input),
            Err(SubscriptionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_update_carries_over_identity_and_created_at() {
        let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let existing = Subscription {
            id: Uuid::new_v4(),
            service_name: "Old".to_string(),
            price: 100,
            user_id: Uuid::new_v4(),
            start_date: month(2025, 1),
            end_date: None,
            created_at,
            updated_at: created_at,
        };
        let changes = SubscriptionChanges {
            service_name: "New".to_string(),
            price: 250,
            user_id: None,
            start_date: month(2025, 2),
            end_date: Some(month(2025, 4)),
        };

        let record = validate_for_update(changes, &existing).unwrap();
        assert_eq!(record.id, existing.id);
        assert_eq!(record.created_at, created_at);
        assert_eq!(record.user_id, existing.user_id);
        assert_eq!(record.service_name, "New");
        assert_eq!(record.price, 250);
        assert_eq!(record.end_date, Some(month(2025, 4)));
    }

    #[test]
    fn test_update_rejects_invalid_changes() {
        let existing = Subscription {
            id: Uuid::new_v4(),
            service_name: "Old".to_string(),
            price: 100,
            user_id: Uuid::new_v4(),
            start_date: month(2025, 1),
            end_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let changes = SubscriptionChanges {
            service_name: "Old".to_string(),
            price: -5,
            user_id: None,
            start_date: month(2025, 1),
            end_date: None,
        };
        assert!(matches!(
            validate_for_update(changes, &existing),
            Err(SubscriptionError::InvalidArgument(_))
        ));
    }
}
