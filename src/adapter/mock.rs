//! Mock source adapter for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use super::common::{self, ConsoleTarget};
use super::traits::{AdapterContext, SourceAdapter};
use crate::bus::CompareUpdate;
use crate::error::{HubError, Result};
use crate::model::{CompareRecord, Console, ConsoleId, ConsoleSource, Game, GameId};
use crate::registry::SharedRegistry;

/// Mock adapter for testing.
///
/// Serves canned consoles, games and compare records without a backend.
pub struct MockAdapter {
    source: ConsoleSource,
    ctx: AdapterContext,
    available: AtomicBool,
    delay: Duration,
    consoles: Vec<Console>,
    games: Vec<Game>,
    existing: Vec<Game>,
    compare: Vec<CompareRecord>,
    follow_ups: bool,
    call_count: AtomicU32,
}

impl MockAdapter {
    /// Create a new mock adapter with no data.
    pub fn new(source: ConsoleSource, ctx: AdapterContext) -> Self {
        Self {
            source,
            ctx,
            available: AtomicBool::new(true),
            delay: Duration::ZERO,
            consoles: Vec::new(),
            games: Vec::new(),
            existing: Vec::new(),
            compare: Vec::new(),
            follow_ups: false,
            call_count: AtomicU32::new(0),
        }
    }

    pub fn with_consoles(mut self, consoles: Vec<Console>) -> Self {
        self.consoles = consoles;
        self
    }

    /// Games served by a full fetch.
    pub fn with_games(mut self, games: Vec<Game>) -> Self {
        self.games = games;
        self
    }

    /// Games served by an existing-only fetch.
    pub fn with_existing(mut self, games: Vec<Game>) -> Self {
        self.existing = games;
        self
    }

    pub fn with_compare(mut self, records: Vec<CompareRecord>) -> Self {
        self.compare = records;
        self
    }

    /// Reconcile and persist at the end of every full fetch.
    pub fn with_follow_ups(mut self, follow_ups: bool) -> Self {
        self.follow_ups = follow_ups;
        self
    }

    /// Sleep before answering every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set availability. An unavailable adapter fails every call.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Number of trait calls made so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    fn target(&self) -> ConsoleTarget {
        match self.source.fixed_console_id() {
            Some(id) => ConsoleTarget::Fixed(id),
            None => ConsoleTarget::PerGame,
        }
    }

    async fn enter(&self) -> Result<()> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if !self.available.load(Ordering::SeqCst) {
            return Err(HubError::Server {
                status: 503,
                message: format!("Mock {} disabled", self.source),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SourceAdapter for MockAdapter {
    fn source_kind(&self) -> ConsoleSource {
        self.source
    }

    async fn fetch_consoles(&self) -> Result<Vec<Console>> {
        self.enter().await?;
        Ok(self.consoles.clone())
    }

    async fn fetch_all_games(&self, registry: &SharedRegistry) -> Result<()> {
        self.enter().await?;
        common::merge_batch(&self.ctx, registry, self.source, self.target(), self.games.clone())
            .await;
        if self.follow_ups {
            common::run_follow_ups(self, registry).await;
        }
        Ok(())
    }

    async fn fetch_existing_games(&self, registry: &SharedRegistry) -> Result<()> {
        self.enter().await?;
        common::merge_batch(
            &self.ctx,
            registry,
            self.source,
            self.target(),
            self.existing.clone(),
        )
        .await;
        Ok(())
    }

    async fn fetch_full_game_detail(
        &self,
        console_id: ConsoleId,
        game_id: GameId,
        registry: &SharedRegistry,
    ) -> Result<Game> {
        self.enter().await?;
        let game = self
            .games
            .iter()
            .find(|g| g.id == game_id)
            .cloned()
            .ok_or_else(|| HubError::Server {
                status: 404,
                message: format!("game {} not found", game_id),
            })?;

        let outcome = common::merge_batch(
            &self.ctx,
            registry,
            self.source,
            ConsoleTarget::Fixed(console_id),
            vec![game.clone()],
        )
        .await;
        if !outcome.is_complete() {
            return Err(HubError::MissingConsole {
                catalog: self.source,
                console_id,
            });
        }
        Ok(game)
    }

    async fn reconcile(&self, _registry: &SharedRegistry) -> Result<Vec<CompareRecord>> {
        self.enter().await?;
        self.ctx
            .compare_book
            .write()
            .await
            .replace(self.source, self.compare.clone());
        self.ctx.compare_bus.publish(CompareUpdate {
            source: self.source,
            records: self.compare.clone(),
        });
        Ok(self.compare.clone())
    }

    async fn persist(&self) -> Result<()> {
        self.enter().await
    }

    fn reconciles_after_fetch(&self) -> bool {
        self.follow_ups
    }
}
