//! Storefront adapter.
//!
//! All storefront games live on one fixed console. A full fetch merges the
//! owned-games list, then requests detail for each known game one at a time.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::common::{self, ConsoleTarget};
use super::traits::{AdapterContext, SourceAdapter};
use crate::client::{endpoints, CatalogClient};
use crate::error::Result;
use crate::model::source::STEAM_CONSOLE_ID;
use crate::model::{CompareRecord, Console, ConsoleId, ConsoleSource, Game, GameId};
use crate::registry::SharedRegistry;

const SOURCE: ConsoleSource = ConsoleSource::Steam;
const TARGET: ConsoleTarget = ConsoleTarget::Fixed(STEAM_CONSOLE_ID);

pub struct SteamAdapter {
    client: Arc<CatalogClient>,
    ctx: AdapterContext,
    detail_requests: AtomicUsize,
}

impl SteamAdapter {
    pub fn new(client: Arc<CatalogClient>, ctx: AdapterContext) -> Self {
        Self {
            client,
            ctx,
            detail_requests: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SourceAdapter for SteamAdapter {
    fn source_kind(&self) -> ConsoleSource {
        SOURCE
    }

    async fn fetch_consoles(&self) -> Result<Vec<Console>> {
        common::fetch_consoles(&self.client, SOURCE).await
    }

    async fn fetch_all_games(&self, registry: &SharedRegistry) -> Result<()> {
        self.detail_requests.store(0, Ordering::SeqCst);

        let owned = common::fetch_and_merge(
            &self.client,
            &self.ctx,
            registry,
            SOURCE,
            endpoints::OWNED_GAMES,
            TARGET,
        )
        .await?;
        if !owned.is_complete() {
            warn!("Storefront console missing, skipping game detail");
            return Ok(());
        }
        info!(games = owned.merged, "Owned games merged");

        let game_ids: Vec<GameId> = registry
            .read()
            .await
            .get(STEAM_CONSOLE_ID)
            .map(|console| console.games.ids().to_vec())
            .unwrap_or_default();

        for game_id in game_ids {
            let method = format!("{}{}", endpoints::GAME_DATA, game_id);
            let game: Game = self.client.get_json(SOURCE.base_path(), &method).await?;
            let outcome =
                common::merge_batch(&self.ctx, registry, SOURCE, TARGET, vec![game]).await;
            let done = self.detail_requests.fetch_add(1, Ordering::SeqCst) + 1;
            debug!(game_id, merged = outcome.merged, done, "Game detail merged");
        }

        info!(
            games = self.detail_requests.load(Ordering::SeqCst),
            "Storefront game detail complete"
        );
        Ok(())
    }

    async fn fetch_existing_games(&self, registry: &SharedRegistry) -> Result<()> {
        let outcome = common::fetch_and_merge(
            &self.client,
            &self.ctx,
            registry,
            SOURCE,
            endpoints::EXISTING_DATA,
            TARGET,
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
        self.detail_requests.load(Ordering::SeqCst)
    }
}
