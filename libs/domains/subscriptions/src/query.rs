//! Parameterized SQL composition for subscription queries.
//!
//! The builder is consumed by each step and handed back, so a half-built query is
//! never shared. Every placeholder number is taken at the moment its value is pushed,
//! which keeps `$n` and the argument list in lockstep regardless of which steps ran
//! or in what order. Caller-supplied text only ever travels as a bound value; column
//! names come from [`Column`] and sort keys from the whitelisted [`SortField`].

use chrono::NaiveDate;
use sea_orm::{DbBackend, Statement, Value};

use crate::models::{SortDirection, SortField};

/// Columns of the `subscriptions` table that queries may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    ServiceName,
    Price,
    UserId,
    StartDate,
    EndDate,
    CreatedAt,
    UpdatedAt,
}

impl Column {
    pub const fn as_str(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::ServiceName => "service_name",
            Column::Price => "price",
            Column::UserId => "user_id",
            Column::StartDate => "start_date",
            Column::EndDate => "end_date",
            Column::CreatedAt => "created_at",
            Column::UpdatedAt => "updated_at",
        }
    }
}

impl From<SortField> for Column {
    fn from(field: SortField) -> Self {
        match field {
            SortField::CreatedAt => Column::CreatedAt,
            SortField::UpdatedAt => Column::UpdatedAt,
            SortField::StartDate => Column::StartDate,
            SortField::Price => Column::Price,
            SortField::ServiceName => Column::ServiceName,
        }
    }
}

#[derive(Debug, Clone)]
#[must_use]
pub struct QueryBuilder {
    base: String,
    conditions: Vec<String>,
    order_by: Option<String>,
    limit: Option<String>,
    values: Vec<Value>,
}

impl QueryBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        Self::with_values(base, Vec::new())
    }

    /// Start from a base query that already references `$1..=$n`, with `values` bound to them.
    pub fn with_values(base: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            base: base.into(),
            conditions: Vec::new(),
            order_by: None,
            limit: None,
            values,
        }
    }

    fn bind(&mut self, value: impl Into<Value>) -> usize {
        self.values.push(value.into());
        self.values.len()
    }

    /// `column = $n`
    pub fn and_eq(mut self, column: Column, value: impl Into<Value>) -> Self {
        let n = self.bind(value);
        self.conditions.push(format!("{} = ${}", column.as_str(), n));
        self
    }

    /// Case-insensitive substring match. Wildcards in `needle` are escaped before it is
    /// wrapped in `%`, so they match literally.
    pub fn and_contains(mut self, column: Column, needle: &str) -> Self {
        let n = self.bind(format!("%{}%", escape_like(needle)));
        self.conditions
            .push(format!("{} ILIKE ${}", column.as_str(), n));
        self
    }

    /// The record's `[start, end-or-open]` range overlaps `[from, to]`.
    pub fn and_overlaps(mut self, start: Column, end: Column, from: NaiveDate, to: NaiveDate) -> Self {
        let upper = self.bind(to);
        let lower = self.bind(from);
        self.conditions.push(format!(
            "{start} <= ${upper} AND ({end} IS NULL OR {end} >= ${lower})",
            start = start.as_str(),
            end = end.as_str(),
        ));
        self
    }

    pub fn order_by(mut self, field: SortField, direction: SortDirection) -> Self {
        self.order_by = Some(format!(
            "ORDER BY {} {}",
            Column::from(field).as_str(),
            direction.as_ref()
        ));
        self
    }

    pub fn paginate(mut self, limit: u64, offset: u64) -> Self {
        let limit_n = self.bind(to_bigint(limit));
        let offset_n = self.bind(to_bigint(offset));
        self.limit = Some(format!("LIMIT ${} OFFSET ${}", limit_n, offset_n));
        self
    }

    /// Render `base [WHERE ...] [ORDER BY ...] [LIMIT ... OFFSET ...]` with its arguments.
    pub fn build(self) -> (String, Vec<Value>) {
        let mut sql = self.base;
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        for clause in [self.order_by, self.limit].into_iter().flatten() {
            sql.push(' ');
            sql.push_str(&clause);
        }
        (sql, self.values)
    }

    pub fn into_statement(self) -> Statement {
        let (sql, values) = self.build();
        Statement::from_sql_and_values(DbBackend::Postgres, sql, values)
    }
}

fn to_bigint(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
