//! Subscriptions Domain
//!
//! CRUD over subscription records plus prorated cost reporting across a period.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, MM-YYYY parsing (dto)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Business rules (validation), run before any I/O
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Trait + Postgres (query composer) + in-memory
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Subscription, filter, pagination
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_subscriptions::{
//!     handlers,
//!     repository::InMemorySubscriptionRepository,
//!     service::SubscriptionService,
//! };
//!
//! let repository = InMemorySubscriptionRepository::new();
//! let service = SubscriptionService::new(repository);
//!
//! let router = handlers::router(service);
//! ```

pub mod cost;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod query;
pub mod repository;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use error::{SubscriptionError, SubscriptionResult};
pub use handlers::ApiDoc;
pub use models::{
    BillingPeriod, NewSubscription, Page, Pagination, SortDirection, SortField, Subscription,
    SubscriptionChanges, SubscriptionFilter,
};
pub use postgres::PgSubscriptionRepository;
pub use repository::{InMemorySubscriptionRepository, SubscriptionRepository};
pub use service::SubscriptionService;
