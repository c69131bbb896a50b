//! Core trait for source adapters.
//!
//! This module defines the `SourceAdapter` trait - the uniform capability set
//! every catalog source exposes to the orchestrator.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::bus::{CompareBus, RegistryBus};
use crate::error::Result;
use crate::model::{CompareRecord, Console, ConsoleId, ConsoleSource, Game, GameId};
use crate::reconcile::CompareBook;
use crate::registry::SharedRegistry;

/// Notification channels and reconciliation storage shared by all adapters.
///
/// Owned by the top-level assembly and cloned into each adapter.
#[derive(Clone)]
pub struct AdapterContext {
    pub registry_bus: Arc<RegistryBus>,
    pub compare_bus: Arc<CompareBus>,
    pub compare_book: Arc<RwLock<CompareBook>>,
}

impl AdapterContext {
    pub fn new() -> Self {
        Self {
            registry_bus: Arc::new(RegistryBus::new("registry")),
            compare_bus: Arc::new(CompareBus::new("compare")),
            compare_book: Arc::new(RwLock::new(CompareBook::new())),
        }
    }
}

impl Default for AdapterContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Core trait for catalog sources.
///
/// An adapter only ever writes the game collections of consoles owned by its
/// own [`ConsoleSource`].
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// The source this adapter serves.
    fn source_kind(&self) -> ConsoleSource;

    /// Path prefix of the source on the backend.
    fn base_path(&self) -> &str {
        self.source_kind().base_path()
    }

    /// List the consoles of this source. The caller inserts them into the
    /// registry.
    async fn fetch_consoles(&self) -> Result<Vec<Console>>;

    /// Fetch the full game catalog of every console this adapter owns,
    /// merging and notifying batch by batch.
    async fn fetch_all_games(&self, registry: &SharedRegistry) -> Result<()>;

    /// Fetch only the games already known to the backend.
    async fn fetch_existing_games(&self, registry: &SharedRegistry) -> Result<()>;

    /// Fetch one game with its achievements, merge it, persist, and notify.
    async fn fetch_full_game_detail(
        &self,
        console_id: ConsoleId,
        game_id: GameId,
        registry: &SharedRegistry,
    ) -> Result<Game>;

    /// Fetch the backend's reconciliation diff for this source and store it.
    async fn reconcile(&self, registry: &SharedRegistry) -> Result<Vec<CompareRecord>>;

    /// Ask the backend to persist its current state for this source.
    async fn persist(&self) -> Result<()>;

    /// Completed sequential requests of the current full fetch.
    fn progress_counter(&self) -> usize {
        0
    }

    /// Whether [`Self::fetch_all_games`] already reconciles on completion.
    fn reconciles_after_fetch(&self) -> bool {
        false
    }
}
