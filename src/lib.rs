//! Achievement Hub - aggregation and reconciliation of achievement catalogs
//!
//! Pulls game-completion data for one user out of several independent catalog
//! backends (a central achievement tracker, a storefront and standalone trophy
//! sources), merges it into one in-memory registry and keeps observers informed
//! of every incremental change.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Aggregator                 │
//! │   (fan-out across active sources)       │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┼───────────────┐
//!      ▼           ▼               ▼
//! ┌──────────┐ ┌──────────┐ ┌─────────────┐
//! │ Source   │ │ Catalog  │ │ Change bus  │
//! │ adapters │→│ registry │→│ (registry / │
//! │ (HTTP)   │ │          │ │  compare)   │
//! └──────────┘ └──────────┘ └─────────────┘
//! ```

pub mod adapter;
pub mod bus;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod pacing;
pub mod reconcile;
pub mod registry;

pub use adapter::{AdapterContext, SourceAdapter};
pub use bus::{Change, ChangeBus, CompareBus, CompareUpdate, RegistryBus, Subscription};
pub use client::CatalogClient;
pub use config::{Args, HubConfig, RunMode};
pub use error::{HubError, Result};
pub use model::*;
pub use orchestrator::{Aggregator, FanOutReport};
pub use pacing::{FixedDelay, NoDelay, PacingPolicy};
pub use reconcile::{CompareBook, CompareSummary, StatusEntry};
pub use registry::{CatalogRegistry, CompletionSummary, SharedRegistry};
