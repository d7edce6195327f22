//! Wire types for the HTTP API.
//!
//! Requests carry dates as `MM-YYYY` months; responses render them as `YYYY-MM-DD`.
//! Everything here is parsed into domain values before the service is called.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::{SubscriptionError, SubscriptionResult};
use crate::models::{
    NewSubscription, Page, Pagination, Subscription, SubscriptionChanges, SubscriptionFilter,
};

const MONTH_FORMAT: &str = "%d-%m-%Y";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse `MM-YYYY` into the first day of that month.
pub fn parse_month(value: &str) -> SubscriptionResult<NaiveDate> {
    NaiveDate::parse_from_str(&format!("01-{}", value.trim()), MONTH_FORMAT).map_err(|_| {
        SubscriptionError::invalid(format!("invalid month '{}', expected MM-YYYY", value))
    })
}

/// Parse an optional month where an empty string means "not set".
pub fn parse_optional_month(value: Option<&str>) -> SubscriptionResult<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(month) => parse_month(month).map(Some),
    }
}

/// Start of a reporting period: `YYYY-MM-DD`, or `MM-YYYY` meaning the first of the month.
pub fn parse_period_start(value: &str) -> SubscriptionResult<NaiveDate> {
    match NaiveDate::parse_from_str(value.trim(), DATE_FORMAT) {
        Ok(date) => Ok(date),
        Err(_) => parse_month(value),
    }
}

/// End of a reporting period: `YYYY-MM-DD`, or `MM-YYYY` meaning the last day of the month.
pub fn parse_period_end(value: &str) -> SubscriptionResult<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value.trim(), DATE_FORMAT) {
        return Ok(date);
    }
    let first = parse_month(value)?;
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| SubscriptionError::invalid(format!("month '{}' is out of range", value)))
}

fn validate_month(value: &str) -> Result<(), ValidationError> {
    parse_month(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("month_format").with_message("expected MM-YYYY".into()))
}

fn validate_optional_month(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    validate_month(value)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSubscriptionRequest {
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "Yandex Plus")]
    pub service_name: String,

    #[validate(range(min = 0))]
    #[schema(example = 400)]
    pub price: i32,

    pub user_id: Uuid,

    #[validate(custom(function = "validate_month"))]
    #[schema(example = "07-2025")]
    pub start_date: String,

    #[validate(custom(function = "validate_optional_month"))]
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

impl CreateSubscriptionRequest {
    pub fn into_domain(self) -> SubscriptionResult<NewSubscription> {
        Ok(NewSubscription {
            start_date: parse_month(&self.start_date)?,
            end_date: parse_optional_month(self.end_date.as_deref())?,
            service_name: self.service_name,
            price: self.price,
            user_id: self.user_id,
        })
    }
}

/// Whole-record replacement; omitting `user_id` keeps the current owner.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateSubscriptionRequest {
    #[validate(length(min = 1, max = 255))]
    pub service_name: String,

    #[validate(range(min = 0))]
    pub price: i32,

    pub user_id: Option<Uuid>,

    #[validate(custom(function = "validate_month"))]
    #[schema(example = "07-2025")]
    pub start_date: String,

    #[validate(custom(function = "validate_optional_month"))]
    pub end_date: Option<String>,
}

impl UpdateSubscriptionRequest {
    pub fn into_domain(self) -> SubscriptionResult<SubscriptionChanges> {
        Ok(SubscriptionChanges {
            start_date: parse_month(&self.start_date)?,
            end_date: parse_optional_month(self.end_date.as_deref())?,
            service_name: self.service_name,
            price: self.price,
            user_id: self.user_id,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListSubscriptionsQuery {
    /// Exact owner match
    pub user_id: Option<Uuid>,
    /// Case-insensitive substring of the service name
    pub service_name: Option<String>,
    /// `YYYY-MM-DD` or `MM-YYYY`; applied only together with `end_period`
    pub start_period: Option<String>,
    /// `YYYY-MM-DD` or `MM-YYYY`; applied only together with `start_period`
    pub end_period: Option<String>,
    /// Page number, starting at 1; anything else means the first page
    #[param(value_type = Option<u64>)]
    pub page: Option<String>,
    /// Items per page (1-100, default 20); anything else means the default
    #[param(value_type = Option<u64>)]
    pub page_size: Option<String>,
    /// created_at, updated_at, start_date, price or service_name
    pub sort_by: Option<String>,
    /// ASC or DESC
    pub sort_dir: Option<String>,
}

impl ListSubscriptionsQuery {
    pub fn into_parts(self) -> SubscriptionResult<(SubscriptionFilter, Pagination)> {
        let pagination = Pagination::new(
            lenient_number(self.page.as_deref()),
            lenient_number(self.page_size.as_deref()),
        )
            .sorted_by(self.sort_by.as_deref(), self.sort_dir.as_deref());

        let filter = SubscriptionFilter {
            user_id: self.user_id,
            service_name: self.service_name,
            start_period: non_empty(self.start_period.as_deref())
                .map(parse_period_start)
                .transpose()?,
            end_period: non_empty(self.end_period.as_deref())
                .map(parse_period_end)
                .transpose()?,
        };

        Ok((filter, pagination))
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TotalCostQuery {
    /// Period start, `YYYY-MM-DD` or `MM-YYYY` (required)
    pub start_period: Option<String>,
    /// Period end, `YYYY-MM-DD` or `MM-YYYY` (required)
    pub end_period: Option<String>,
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
}

impl TotalCostQuery {
    pub fn into_filter(self) -> SubscriptionResult<SubscriptionFilter> {
        Ok(SubscriptionFilter {
            user_id: self.user_id,
            service_name: self.service_name,
            start_period: non_empty(self.start_period.as_deref())
                .map(parse_period_start)
                .transpose()?,
            end_period: non_empty(self.end_period.as_deref())
                .map(parse_period_end)
                .transpose()?,
        })
    }
}

/// Negative or non-numeric values count as unset so that pagination falls back to defaults.
fn lenient_number(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.trim().parse().ok())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    #[schema(example = "2025-07-01")]
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(sub: Subscription) -> Self {
        Self {
            id: sub.id,
            service_name: sub.service_name,
            price: sub.price,
            user_id: sub.user_id,
            start_date: sub.start_date.format(DATE_FORMAT).to_string(),
            end_date: sub.end_date.map(|d| d.format(DATE_FORMAT).to_string()),
            created_at: sub.created_at,
            updated_at: sub.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T> From<Page<T>> for PaginatedResponse<T> {
    fn from(page: Page<T>) -> Self {
        let total_pages = page.total_pages();
        Self {
            data: page.items,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TotalCostResponse {
    #[schema(example = 2200)]
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("07-2025").unwrap(), date(2025, 7, 1));
        assert_eq!(parse_month(" 12-2024 ").unwrap(), date(2024, 12, 1));
        assert!(parse_month("2025-07").is_err());
        assert!(parse_month("13-2025").is_err());
        assert!(parse_month("").is_err());
    }

    #[test]
    fn test_parse_optional_month_treats_empty_as_unset() {
        assert_eq!(parse_optional_month(None).unwrap(), None);
        assert_eq!(parse_optional_month(Some("")).unwrap(), None);
        assert_eq!(
            parse_optional_month(Some("03-2025")).unwrap(),
            Some(date(2025, 3, 1))
        );
    }

    #[test]
    fn test_period_bounds_accept_both_formats() {
        assert_eq!(parse_period_start("2025-01-15").unwrap(), date(2025, 1, 15));
        assert_eq!(parse_period_start("01-2025").unwrap(), date(2025, 1, 1));
        assert_eq!(parse_period_end("2025-06-30").unwrap(), date(2025, 6, 30));
        assert_eq!(parse_period_end("02-2024").unwrap(), date(2024, 2, 29));
        assert_eq!(parse_period_end("12-2025").unwrap(), date(2025, 12, 31));
        assert!(parse_period_end("someday").is_err());
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateSubscriptionRequest {
            service_name: String::new(),
            price: -1,
            user_id: Uuid::new_v4(),
            start_date: "2025-07".to_string(),
            end_date: Some(String::new()),
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("service_name"));
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("start_date"));
        assert!(!fields.contains_key("end_date"));
    }

    #[test]
    fn test_create_request_into_domain() {
        let user_id = Uuid::new_v4();
        let request = CreateSubscriptionRequest {
            service_name: "Yandex Plus".to_string(),
            price: 400,
            user_id,
            start_date: "07-2025".to_string(),
            end_date: None,
        };
        let input = request.into_domain().unwrap();
        assert_eq!(input.start_date, date(2025, 7, 1));
        assert_eq!(input.end_date, None);
        assert_eq!(input.user_id, user_id);
    }

    #[test]
    fn test_list_query_into_parts() {
        let query = ListSubscriptionsQuery {
            start_period: Some("01-2025".to_string()),
            end_period: Some("06-2025".to_string()),
            page: Some("2".to_string()),
            sort_by: Some("bogus".to_string()),
            ..Default::default()
        };
        let (filter, pagination) = query.into_parts().unwrap();
        assert_eq!(filter.start_period, Some(date(2025, 1, 1)));
        assert_eq!(filter.end_period, Some(date(2025, 6, 30)));
        assert_eq!(pagination.page, 2);
        assert_eq!(pagination.page_size, 20);
        assert_eq!(pagination.sort_by, crate::models::SortField::CreatedAt);
    }

    #[test]
    fn test_list_query_bad_pagination_uses_defaults() {
        let query = ListSubscriptionsQuery {
            page: Some("-1".to_string()),
            page_size: Some("abc".to_string()),
            ..Default::default()
        };
        let (_, pagination) = query.into_parts().unwrap();
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.page_size, 20);

        let query = ListSubscriptionsQuery {
            page: Some(" 3 ".to_string()),
            page_size: Some("500".to_string()),
            ..Default::default()
        };
        let (_, pagination) = query.into_parts().unwrap();
        assert_eq!(pagination.page, 3);
        assert_eq!(pagination.page_size, 20);
    }

    #[test]
    fn test_response_renders_iso_dates() {
        let now = Utc::now();
        let response = SubscriptionResponse::from(Subscription {
            id: Uuid::new_v4(),
            service_name: "Netflix".to_string(),
            price: 999,
            user_id: Uuid::new_v4(),
            start_date: date(2025, 7, 1),
            end_date: None,
            created_at: now,
            updated_at: now,
        });
        assert_eq!(response.start_date, "2025-07-01");

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("end_date").is_none());
    }
}
