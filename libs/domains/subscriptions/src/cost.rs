//! Period-overlap cost aggregation.
//!
//! A subscription is billed once per calendar month it is active within the reporting
//! period. Both bounds of the overlap window are month-truncated and counted inclusively,
//! so a window from 2025-01-15 to 2025-03-01 bills three months.

use chrono::{Datelike, NaiveDate};

use crate::models::{BillingPeriod, Subscription};
use crate::query::{Column, QueryBuilder};

/// Aggregation over the table, with `$1` = period start and `$2` = period end.
/// The overlap predicate and filters are appended as WHERE conditions.
const TOTAL_COST_SELECT: &str = "SELECT COALESCE(SUM(price::BIGINT * (\
(EXTRACT(YEAR FROM LEAST(COALESCE(end_date, $2::DATE), $2::DATE))::BIGINT \
- EXTRACT(YEAR FROM GREATEST(start_date, $1::DATE))::BIGINT) * 12 \
+ (EXTRACT(MONTH FROM LEAST(COALESCE(end_date, $2::DATE), $2::DATE))::BIGINT \
- EXTRACT(MONTH FROM GREATEST(start_date, $1::DATE))::BIGINT) \
+ 1)), 0)::BIGINT AS total FROM subscriptions";

/// Start of a total-cost query for `period`, already restricted to overlapping rows.
pub fn total_cost_query(period: &BillingPeriod) -> QueryBuilder {
    QueryBuilder::with_values(
        TOTAL_COST_SELECT,
        vec![period.start.into(), period.end.into()],
    )
    .and_overlaps(Column::StartDate, Column::EndDate, period.start, period.end)
}

/// Intersection of the subscription's active range with the period, if any.
pub fn overlap_window(
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    period: &BillingPeriod,
) -> Option<(NaiveDate, NaiveDate)> {
    let from = start_date.max(period.start);
    let to = end_date.map_or(period.end, |end| end.min(period.end));
    (from <= to).then_some((from, to))
}

/// Inclusive number of calendar months between two dates.
pub fn billable_months(from: NaiveDate, to: NaiveDate) -> i64 {
    let years = i64::from(to.year()) - i64::from(from.year());
    let months = i64::from(to.month()) - i64::from(from.month());
    years * 12 + months + 1
}

/// What one subscription adds to the total for `period`.
pub fn contribution(subscription: &Subscription, period: &BillingPeriod) -> i64 {
    overlap_window(subscription.start_date, subscription.end_date, period)
        .map_or(0, |(from, to)| {
            i64::from(subscription.price) * billable_months(from, to)
        })
}

pub fn total_cost<'a>(
    subscriptions: impl IntoIterator<Item = &'a Subscription>,
    period: &BillingPeriod,
) -> i64 {
    subscriptions
        .into_iter()
        .map(|sub| contribution(sub, period))
        .sum()
}
