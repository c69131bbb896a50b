//! Standalone trophy sources: PS3, PS Vita and Xbox 360.
//!
//! Each owns a single fixed console and fetches its whole catalog in one
//! request, then reconciles and persists.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::common::{self, ConsoleTarget};
use super::traits::{AdapterContext, SourceAdapter};
use crate::client::{endpoints, CatalogClient};
use crate::error::{HubError, Result};
use crate::model::source::{PS3_CONSOLE_ID, PSVITA_CONSOLE_ID, XBOX360_CONSOLE_ID};
use crate::model::{CompareRecord, Console, ConsoleId, ConsoleSource, Game, GameId};
use crate::registry::SharedRegistry;

pub struct StandaloneAdapter {
    client: Arc<CatalogClient>,
    ctx: AdapterContext,
    source: ConsoleSource,
    console_id: ConsoleId,
}

impl StandaloneAdapter {
    /// Adapter for a fixed-console source. Fails for the central tracker,
    /// which has no fixed console.
    pub fn new(
        client: Arc<CatalogClient>,
        ctx: AdapterContext,
        source: ConsoleSource,
    ) -> Result<Self> {
        let console_id = source.fixed_console_id().ok_or_else(|| {
            HubError::Config(format!("{} has no fixed console", source))
        })?;
        Ok(Self {
            client,
            ctx,
            source,
            console_id,
        })
    }

    pub fn ps3(client: Arc<CatalogClient>, ctx: AdapterContext) -> Self {
        Self::fixed(client, ctx, ConsoleSource::Ps3, PS3_CONSOLE_ID)
    }

    pub fn psvita(client: Arc<CatalogClient>, ctx: AdapterContext) -> Self {
        Self::fixed(client, ctx, ConsoleSource::PsVita, PSVITA_CONSOLE_ID)
    }

    pub fn xbox360(client: Arc<CatalogClient>, ctx: AdapterContext) -> Self {
        Self::fixed(client, ctx, ConsoleSource::Xbox360, XBOX360_CONSOLE_ID)
    }

    fn fixed(
        client: Arc<CatalogClient>,
        ctx: AdapterContext,
        source: ConsoleSource,
        console_id: ConsoleId,
    ) -> Self {
        Self {
            client,
            ctx,
            source,
            console_id,
        }
    }

    pub fn console_id(&self) -> ConsoleId {
        self.console_id
    }

    fn target(&self) -> ConsoleTarget {
        ConsoleTarget::Fixed(self.console_id)
    }
}

#[async_trait]
impl SourceAdapter for StandaloneAdapter {
    fn source_kind(&self) -> ConsoleSource {
        self.source
    }

    async fn fetch_consoles(&self) -> Result<Vec<Console>> {
        common::fetch_consoles(&self.client, self.source).await
    }

    async fn fetch_all_games(&self, registry: &SharedRegistry) -> Result<()> {
        let outcome = common::fetch_and_merge(
            &self.client,
            &self.ctx,
            registry,
            self.source,
            endpoints::GAME_DATA,
            self.target(),
        )
        .await?;
        info!(source = %self.source, games = outcome.merged, "Game data merged");

        common::run_follow_ups(self, registry).await;
        Ok(())
    }

    async fn fetch_existing_games(&self, registry: &SharedRegistry) -> Result<()> {
        let outcome = common::fetch_and_merge(
            &self.client,
            &self.ctx,
            registry,
            self.source,
            endpoints::EXISTING_DATA,
            self.target(),
        )
        .await?;
        info!(source = %self.source, games = outcome.merged, "Existing data merged");
        Ok(())
    }

    async fn fetch_full_game_detail(
        &self,
        console_id: ConsoleId,
        game_id: GameId,
        registry: &SharedRegistry,
    ) -> Result<Game> {
        common::fetch_full_detail(
            &self.client,
            &self.ctx,
            registry,
            self.source,
            console_id,
            game_id,
        )
        .await
    }

    async fn reconcile(&self, _registry: &SharedRegistry) -> Result<Vec<CompareRecord>> {
        common::fetch_compare(&self.client, &self.ctx, self.source).await
    }

    async fn persist(&self) -> Result<()> {
        common::persist(&self.client, self.source).await
    }

    fn reconciles_after_fetch(&self) -> bool {
        true
    }
}
