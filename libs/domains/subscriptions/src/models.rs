use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::error::{SubscriptionError, SubscriptionResult};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// A recurring charge for one service, owned by one user.
///
/// Dates carry month granularity at the API boundary; the stored value is the first
/// day of the start month and (when set) the first day of the end month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Whether the subscription is active at some point inside the period.
    /// An unset end date counts as still active.
    pub fn overlaps(&self, period: &BillingPeriod) -> bool {
        self.start_date <= period.end && self.end_date.is_none_or(|end| end >= period.start)
    }
}

/// Client-provided fields of a subscription that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Replacement values for an existing subscription.
///
/// `user_id` may be omitted, in which case the stored owner is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionChanges {
    pub service_name: String,
    pub price: i32,
    pub user_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub start_period: Option<NaiveDate>,
    pub end_period: Option<NaiveDate>,
}

impl SubscriptionFilter {
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    pub fn with_period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_period = Some(start);
        self.end_period = Some(end);
        self
    }

    /// Service name filter with surrounding whitespace removed; blank means "no filter".
    pub fn service_name_pattern(&self) -> Option<&str> {
        self.service_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// The period used for listing, present only when both bounds are given.
    pub fn listing_period(&self) -> Option<BillingPeriod> {
        match (self.start_period, self.end_period) {
            (Some(start), Some(end)) => Some(BillingPeriod { start, end }),
            _ => None,
        }
    }

    /// The period required for cost aggregation.
    pub fn billing_period(&self) -> SubscriptionResult<BillingPeriod> {
        let (Some(start), Some(end)) = (self.start_period, self.end_period) else {
            return Err(SubscriptionError::invalid(
                "start_period and end_period are required",
            ));
        };
        if end < start {
            return Err(SubscriptionError::invalid(
                "end_period must not be before start_period",
            ));
        }
        Ok(BillingPeriod { start, end })
    }
}

/// Inclusive reporting period for cost aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Columns a listing may be ordered by.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    StartDate,
    Price,
    ServiceName,
}

impl SortField {
    /// Resolve a caller-supplied name, falling back to the default for anything unknown.
    pub fn from_param(value: &str) -> Self {
        Self::from_str(value.trim()).unwrap_or_default()
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn from_param(value: &str) -> Self {
        Self::from_str(value.trim()).unwrap_or_default()
    }
}

/// Normalized page request. Construct through [`Pagination::new`] so that
/// out-of-range values are replaced by defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
    pub sort_by: SortField,
    pub sort_dir: SortDirection,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: SortField::default(),
            sort_dir: SortDirection::default(),
        }
    }
}

impl Pagination {
    pub fn new(page: Option<u64>, page_size: Option<u64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
        let page_size = page_size
            .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Self {
            page,
            page_size,
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, sort_by: Option<&str>, sort_dir: Option<&str>) -> Self {
        self.sort_by = sort_by.map(SortField::from_param).unwrap_or_default();
        self.sort_dir = sort_dir.map(SortDirection::from_param).unwrap_or_default();
        self
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.page_size.max(1))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}
