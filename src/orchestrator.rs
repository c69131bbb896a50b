//! Aggregation orchestrator
//!
//! Fans each operation out to the adapters of the active sources, runs them
//! concurrently, and collects every adapter's outcome. A failing adapter never
//! hides or undoes the merges of its siblings: each adapter merges into the
//! shared registry as it completes, and failures are reported alongside.

use futures::future::join_all;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::adapter::{
    AdapterContext, RetroAchievementsAdapter, SourceAdapter, StandaloneAdapter, SteamAdapter,
};
use crate::bus::{CompareUpdate, Subscription};
use crate::client::CatalogClient;
use crate::config::HubConfig;
use crate::error::{HubError, Result};
use crate::model::{CompareRecord, ConsoleSource, Game};
use crate::pacing::{FixedDelay, NoDelay, PacingPolicy};
use crate::reconcile::{self, CompareSummary, StatusEntry};
use crate::registry::{CatalogRegistry, CompletionSummary, SharedRegistry};

/// Outcome of one fan-out across adapters.
#[derive(Debug)]
pub struct FanOutReport {
    pub operation: &'static str,
    /// Sources whose adapter succeeded, in completion-independent request order
    pub completed: Vec<ConsoleSource>,
    pub failed: Vec<(ConsoleSource, HubError)>,
    /// Requested sources without a registered adapter
    pub skipped: Vec<ConsoleSource>,
}

impl FanOutReport {
    fn new(operation: &'static str) -> Self {
        Self {
            operation,
            completed: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Sources that completed, or a partial failure naming the ones that
    /// did not.
    pub fn into_result(self) -> Result<Vec<ConsoleSource>> {
        if self.failed.is_empty() {
            return Ok(self.completed);
        }
        Err(HubError::PartialFailure {
            operation: self.operation,
            failures: describe(self.failed),
        })
    }
}

fn describe(failed: Vec<(ConsoleSource, HubError)>) -> Vec<(ConsoleSource, String)> {
    failed
        .into_iter()
        .map(|(source, e)| (source, e.to_string()))
        .collect()
}

/// Coordinates the adapters over one shared registry.
pub struct Aggregator {
    registry: SharedRegistry,
    adapters: HashMap<ConsoleSource, Arc<dyn SourceAdapter>>,
    ctx: AdapterContext,
    active: RwLock<Vec<ConsoleSource>>,
}

impl Aggregator {
    /// Create an aggregator with no adapters and every source active.
    pub fn new(ctx: AdapterContext) -> Self {
        Self {
            registry: CatalogRegistry::shared(),
            adapters: HashMap::new(),
            ctx,
            active: RwLock::new(ConsoleSource::ALL.to_vec()),
        }
    }

    /// Register an adapter, replacing any previous one for its source.
    pub fn with_adapter(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        let source = adapter.source_kind();
        if self.adapters.insert(source, adapter).is_some() {
            debug!(source = %source, "Replaced adapter");
        }
        self
    }

    /// Assemble the five backend adapters from configuration.
    pub fn with_default_adapters(config: &HubConfig) -> Result<Self> {
        let client = Arc::new(CatalogClient::new(
            config.api_url.clone(),
            config.request_timeout,
        )?);
        let ctx = AdapterContext::new();
        let pacing: Arc<dyn PacingPolicy> = if config.pacing_delay.is_zero() {
            Arc::new(NoDelay)
        } else {
            Arc::new(FixedDelay(config.pacing_delay))
        };

        info!(
            api_url = %client.api_url(),
            sources = ?config.active_sources,
            "Assembling aggregator"
        );

        let aggregator = Self::new(ctx.clone())
            .with_adapter(Arc::new(
                RetroAchievementsAdapter::new(client.clone(), ctx.clone()).with_pacing(pacing),
            ))
            .with_adapter(Arc::new(SteamAdapter::new(client.clone(), ctx.clone())))
            .with_adapter(Arc::new(StandaloneAdapter::ps3(client.clone(), ctx.clone())))
            .with_adapter(Arc::new(StandaloneAdapter::psvita(client.clone(), ctx.clone())))
            .with_adapter(Arc::new(StandaloneAdapter::xbox360(client, ctx)))
            .with_active_sources(&config.active_sources);
        Ok(aggregator)
    }

    /// Restrict the sources triggered operations run against.
    pub fn with_active_sources(mut self, sources: &[ConsoleSource]) -> Self {
        self.active = RwLock::new(dedup(sources));
        self
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn context(&self) -> &AdapterContext {
        &self.ctx
    }

    /// Run `call` on the adapter of every source in `sources` concurrently.
    async fn fan_out<F, Fut>(
        &self,
        operation: &'static str,
        sources: &[ConsoleSource],
        call: F,
    ) -> FanOutReport
    where
        F: Fn(Arc<dyn SourceAdapter>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut report = FanOutReport::new(operation);
        let mut tasks = Vec::new();

        for source in dedup(sources) {
            match self.adapters.get(&source) {
                Some(adapter) => {
                    let task = call(adapter.clone());
                    tasks.push(async move { (source, task.await) });
                }
                None => {
                    warn!(source = %source, operation, "No adapter registered, skipping");
                    report.skipped.push(source);
                }
            }
        }

        debug!(operation, adapters = tasks.len(), "Fanning out");
        for (source, result) in join_all(tasks).await {
            match result {
                Ok(()) => report.completed.push(source),
                Err(e) => {
                    warn!(source = %source, operation, error = %e, "Adapter failed");
                    report.failed.push((source, e));
                }
            }
        }

        info!(
            operation,
            completed = report.completed.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "Fan-out finished"
        );
        report
    }

    /// List consoles of every source in `sources` and merge them as each
    /// adapter answers.
    pub async fn request_consoles(&self, sources: &[ConsoleSource]) -> FanOutReport {
        self.fan_out("console data", sources, |adapter| {
            let registry = self.registry.clone();
            async move {
                let consoles = adapter.fetch_consoles().await?;
                let mut registry = registry.write().await;
                let mut added = 0;
                for console in consoles {
                    if console.source != adapter.source_kind() {
                        warn!(
                            source = %adapter.source_kind(),
                            console_id = console.id,
                            "Console reported for another source, ignoring"
                        );
                        continue;
                    }
                    if registry.upsert_console(console) {
                        added += 1;
                    }
                }
                debug!(source = %adapter.source_kind(), added, "Consoles merged");
                Ok::<(), HubError>(())
            }
        })
        .await
    }

    /// Fetch every game of `sources`. Call after [`Self::request_consoles`]
    /// for the same sources.
    pub async fn request_all_game_data(&self, sources: &[ConsoleSource]) -> FanOutReport {
        self.fan_out("game data", sources, |adapter| {
            let registry = self.registry.clone();
            async move { adapter.fetch_all_games(&registry).await }
        })
        .await
    }

    pub async fn request_existing_data(&self, sources: &[ConsoleSource]) -> FanOutReport {
        self.fan_out("existing data", sources, |adapter| {
            let registry = self.registry.clone();
            async move { adapter.fetch_existing_games(&registry).await }
        })
        .await
    }

    pub async fn request_compare_data(&self, sources: &[ConsoleSource]) -> FanOutReport {
        self.fan_out("compare data", sources, |adapter| {
            let registry = self.registry.clone();
            async move { adapter.reconcile(&registry).await.map(|_| ()) }
        })
        .await
    }

    /// Refresh one game with its achievements through the adapter owning
    /// its console. Fails with `NoAdapterForGame` for an unknown console and
    /// `NoAdapter` when the console's source has no registered adapter.
    pub async fn request_single_game(&self, game: &Game) -> Result<Game> {
        let source = self
            .registry
            .read()
            .await
            .get(game.console_id)
            .map(|console| console.source);

        let source = source.ok_or(HubError::NoAdapterForGame {
            console_id: game.console_id,
            game_id: game.id,
        })?;
        let adapter = self
            .adapters
            .get(&source)
            .ok_or(HubError::NoAdapter(source))?;

        adapter
            .fetch_full_game_detail(game.console_id, game.id, &self.registry)
            .await
    }

    pub async fn set_active_sources(&self, sources: &[ConsoleSource]) {
        let sources = dedup(sources);
        info!(sources = ?sources, "Active sources changed");
        *self.active.write().await = sources;
    }

    pub async fn active_sources(&self) -> Vec<ConsoleSource> {
        self.active.read().await.clone()
    }

    /// Consoles, then games for every active source whose consoles arrived.
    pub async fn trigger_full_refresh(&self) -> Result<()> {
        let (consoles, games) = self.full_refresh().await;
        combine("full refresh", vec![consoles, games])
    }

    /// Full refresh, then reconciliation for the refreshed sources whose
    /// adapters do not already reconcile after a full fetch.
    pub async fn trigger_full_sync(&self) -> Result<()> {
        let (consoles, games) = self.full_refresh().await;
        let pending: Vec<ConsoleSource> = games
            .completed
            .iter()
            .copied()
            .filter(|source| {
                self.adapters
                    .get(source)
                    .is_some_and(|adapter| !adapter.reconciles_after_fetch())
            })
            .collect();
        let compare = self.request_compare_data(&pending).await;
        combine("full sync", vec![consoles, games, compare])
    }

    async fn full_refresh(&self) -> (FanOutReport, FanOutReport) {
        let sources = self.active_sources().await;
        let consoles = self.request_consoles(&sources).await;
        let games = self.request_all_game_data(&consoles.completed).await;
        (consoles, games)
    }

    /// Consoles, then only the games the backend already knows.
    pub async fn trigger_existing_only_refresh(&self) -> Result<()> {
        let sources = self.active_sources().await;
        let consoles = self.request_consoles(&sources).await;
        let existing = self.request_existing_data(&consoles.completed).await;
        combine("existing refresh", vec![consoles, existing])
    }

    pub async fn trigger_reconciliation(&self) -> Result<()> {
        let sources = self.active_sources().await;
        self.request_compare_data(&sources)
            .await
            .into_result()
            .map(|_| ())
    }

    /// Alias of [`Self::request_single_game`] for presentation collaborators.
    pub async fn request_game(&self, game: &Game) -> Result<Game> {
        self.request_single_game(game).await
    }

    pub fn subscribe_registry(&self) -> Subscription<Vec<Game>> {
        self.ctx.registry_bus.subscribe()
    }

    pub fn subscribe_reconciliation(&self) -> Subscription<CompareUpdate> {
        self.ctx.compare_bus.subscribe()
    }

    /// Completed sequential requests of the source's current full fetch.
    pub fn progress_counter_for(&self, source: ConsoleSource) -> usize {
        self.adapters
            .get(&source)
            .map(|adapter| adapter.progress_counter())
            .unwrap_or(0)
    }

    pub async fn compare_summary(&self) -> CompareSummary {
        self.ctx.compare_book.read().await.summary()
    }

    pub async fn completion_summary(&self, source: ConsoleSource) -> CompletionSummary {
        self.registry.read().await.completion_summary(source)
    }

    /// Diff the registry's games of `source` against `remote` without the
    /// backend, then store and announce the records like a backend pass.
    pub async fn reconcile_locally(
        &self,
        source: ConsoleSource,
        remote: &[StatusEntry],
    ) -> Vec<CompareRecord> {
        let local: Vec<StatusEntry> = self
            .registry
            .read()
            .await
            .games_for(source)
            .into_iter()
            .map(StatusEntry::from)
            .collect();

        let records = reconcile::reconcile(source, &local, remote);
        info!(
            source = %source,
            local = local.len(),
            remote = remote.len(),
            records = records.len(),
            "Local reconciliation finished"
        );

        self.ctx
            .compare_book
            .write()
            .await
            .replace(source, records.clone());
        self.ctx.compare_bus.publish(CompareUpdate {
            source,
            records: records.clone(),
        });
        records
    }
}

fn dedup(sources: &[ConsoleSource]) -> Vec<ConsoleSource> {
    let mut unique = Vec::with_capacity(sources.len());
    for &source in sources {
        if !unique.contains(&source) {
            unique.push(source);
        }
    }
    unique
}

fn combine(operation: &'static str, reports: Vec<FanOutReport>) -> Result<()> {
    let failures: Vec<_> = reports
        .into_iter()
        .flat_map(|report| describe(report.failed))
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(HubError::PartialFailure {
            operation,
            failures,
        })
    }
}
