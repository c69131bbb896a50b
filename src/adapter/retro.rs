//! Central achievement tracker adapter.
//!
//! A full fetch runs in two phases: the account's completion progress across
//! all consoles, then each owned console's game list. The tracker rate-limits
//! clients, so console requests are sequential with a pause before each one.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

use super::common::{self, ConsoleTarget};
use super::traits::{AdapterContext, SourceAdapter};
use crate::client::{endpoints, CatalogClient};
use crate::error::Result;
use crate::model::{CompareRecord, Console, ConsoleId, ConsoleSource, Game, GameId};
use crate::pacing::{FixedDelay, PacingPolicy};
use crate::registry::SharedRegistry;

const SOURCE: ConsoleSource = ConsoleSource::RetroAchievements;

pub struct RetroAchievementsAdapter {
    client: Arc<CatalogClient>,
    ctx: AdapterContext,
    pacing: Arc<dyn PacingPolicy>,
    console_requests: AtomicUsize,
}

impl RetroAchievementsAdapter {
    pub fn new(client: Arc<CatalogClient>, ctx: AdapterContext) -> Self {
        Self {
            client,
            ctx,
            pacing: Arc::new(FixedDelay::CENTRAL_TRACKER),
            console_requests: AtomicUsize::new(0),
        }
    }

    /// Replace the pause taken before each console request.
    pub fn with_pacing(mut self, pacing: Arc<dyn PacingPolicy>) -> Self {
        self.pacing = pacing;
        self
    }
}

#[async_trait]
impl SourceAdapter for RetroAchievementsAdapter {
    fn source_kind(&self) -> ConsoleSource {
        SOURCE
    }

    async fn fetch_consoles(&self) -> Result<Vec<Console>> {
        common::fetch_consoles(&self.client, SOURCE).await
    }

    async fn fetch_all_games(&self, registry: &SharedRegistry) -> Result<()> {
        self.console_requests.store(0, Ordering::SeqCst);

        let progress = common::fetch_and_merge(
            &self.client,
            &self.ctx,
            registry,
            SOURCE,
            endpoints::COMPLETION_PROGRESS,
            ConsoleTarget::PerGame,
        )
        .await?;
        info!(games = progress.merged, "Completion progress merged");

        let console_ids = registry.read().await.consoles_for(SOURCE);
        info!(consoles = console_ids.len(), pacing = ?self.pacing, "Fetching console game lists");

        for console_id in console_ids {
            self.pacing.pause().await;

            let method = format!("{}{}", endpoints::GAME_DATA, console_id);
            let outcome = common::fetch_and_merge(
                &self.client,
                &self.ctx,
                registry,
                SOURCE,
                &method,
                ConsoleTarget::PerGame,
            )
            .await?;
            let done = self.console_requests.fetch_add(1, Ordering::SeqCst) + 1;
            info!(console_id, games = outcome.merged, done, "Console game list merged");
        }

        common::run_follow_ups(self, registry).await;
        Ok(())
    }

    async fn fetch_existing_games(&self, registry: &SharedRegistry) -> Result<()> {
        let outcome = common::fetch_and_merge(
            &self.client,
            &self.ctx,
            registry,
            SOURCE,
            endpoints::EXISTING_DATA,
            ConsoleTarget::PerGame,
        )
        .await?;
        info!(games = outcome.merged, "Existing data merged");
        Ok(())
    }

    async fn fetch_full_game_detail(
        &self,
        console_id: ConsoleId,
        game_id: GameId,
        registry: &SharedRegistry,
    ) -> Result<Game> {
        common::fetch_full_detail(&self.client, &self.ctx, registry, SOURCE, console_id, game_id)
            .await
    }

    async fn reconcile(&self, _registry: &SharedRegistry) -> Result<Vec<CompareRecord>> {
        common::fetch_compare(&self.client, &self.ctx, SOURCE).await
    }

    async fn persist(&self) -> Result<()> {
        common::persist(&self.client, SOURCE).await
    }

    fn progress_counter(&self) -> usize {
        self.console_requests.load(Ordering::SeqCst)
    }

    fn reconciles_after_fetch(&self) -> bool {
        true
    }
}
