//! Plumbing shared by the concrete adapters.
//!
//! Fetch, merge under the registry lock, then notify once the lock is
//! released. Every merge goes through [`merge_batch`], which is where the
//! ownership rule is enforced.

use std::iter;
use tracing::{debug, info, warn};

use super::traits::{AdapterContext, SourceAdapter};
use crate::bus::CompareUpdate;
use crate::client::{endpoints, CatalogClient};
use crate::error::{HubError, Result};
use crate::model::{CompareRecord, Console, ConsoleId, ConsoleRecord, ConsoleSource, Game, GameId};
use crate::registry::SharedRegistry;

/// Which console a fetched game is merged into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleTarget {
    /// Each game names its own console
    PerGame,
    /// Every game goes to one fixed console
    Fixed(ConsoleId),
}

impl ConsoleTarget {
    fn resolve(self, game: &Game) -> ConsoleId {
        match self {
            ConsoleTarget::PerGame => game.console_id,
            ConsoleTarget::Fixed(id) => id,
        }
    }
}

/// Result of merging one fetched batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Games merged before the batch ended
    pub merged: usize,
    /// Console that stopped the batch, if one was missing or foreign
    pub missing_console: Option<ConsoleId>,
}

impl MergeOutcome {
    pub fn is_complete(&self) -> bool {
        self.missing_console.is_none()
    }
}

/// List the consoles of `source`.
pub async fn fetch_consoles(client: &CatalogClient, source: ConsoleSource) -> Result<Vec<Console>> {
    let records: Vec<ConsoleRecord> = client
        .get_json(source.base_path(), endpoints::CONSOLE_DATA)
        .await?;
    info!(source = %source, consoles = records.len(), "Fetched console list");
    Ok(records
        .into_iter()
        .map(|record| record.into_console(source))
        .collect())
}

/// Merge `games` into the registry in order.
///
/// The first game whose console is absent, or owned by another source, ends
/// the batch: it and everything after it are dropped, while the games merged
/// before it stay and are announced.
pub async fn merge_batch(
    ctx: &AdapterContext,
    registry: &SharedRegistry,
    source: ConsoleSource,
    target: ConsoleTarget,
    games: Vec<Game>,
) -> MergeOutcome {
    let mut merged = Vec::with_capacity(games.len());
    let mut missing_console = None;

    {
        let mut registry = registry.write().await;
        for mut game in games {
            let console_id = target.resolve(&game);
            let console_name = match registry.get(console_id) {
                Some(console) if console.source == source => console.name.clone(),
                Some(console) => {
                    warn!(
                        source = %source,
                        owner = %console.source,
                        console_id,
                        game_id = game.id,
                        "Console belongs to another source, dropping rest of batch"
                    );
                    missing_console = Some(console_id);
                    break;
                }
                None => {
                    warn!(
                        source = %source,
                        console_id,
                        game_id = game.id,
                        title = %game.title,
                        "No console found for game, dropping rest of batch"
                    );
                    missing_console = Some(console_id);
                    break;
                }
            };

            game.console_id = console_id;
            if game.console_name.is_empty() {
                game.console_name = console_name;
            }
            registry.upsert_games(console_id, iter::once(game.clone()));
            merged.push(game);
        }
    }

    let count = merged.len();
    if count > 0 {
        ctx.registry_bus.publish(merged);
    }
    MergeOutcome {
        merged: count,
        missing_console,
    }
}

/// GET a game list from `method` and merge it.
pub async fn fetch_and_merge(
    client: &CatalogClient,
    ctx: &AdapterContext,
    registry: &SharedRegistry,
    source: ConsoleSource,
    method: &str,
    target: ConsoleTarget,
) -> Result<MergeOutcome> {
    let games: Vec<Game> = client.get_json(source.base_path(), method).await?;
    let fetched = games.len();
    let outcome = merge_batch(ctx, registry, source, target, games).await;
    debug!(
        source = %source,
        method,
        fetched,
        merged = outcome.merged,
        "Merged game batch"
    );
    Ok(outcome)
}

/// Fetch one game with achievements, merge it, persist, then notify.
///
/// A missing console fails the request and leaves the registry untouched.
/// A failed persist is logged and does not fail the request.
pub async fn fetch_full_detail(
    client: &CatalogClient,
    ctx: &AdapterContext,
    registry: &SharedRegistry,
    source: ConsoleSource,
    console_id: ConsoleId,
    game_id: GameId,
) -> Result<Game> {
    let method = format!("{}{}", endpoints::FULL_GAME_DATA, game_id);
    let mut game: Game = client.get_json(source.base_path(), &method).await?;

    {
        let mut registry = registry.write().await;
        let console_name = match registry.get(console_id) {
            Some(console) if console.source == source => console.name.clone(),
            _ => {
                warn!(source = %source, console_id, game_id, "No console found for game detail");
                return Err(HubError::MissingConsole {
                    catalog: source,
                    console_id,
                });
            }
        };
        game.console_id = console_id;
        if game.console_name.is_empty() {
            game.console_name = console_name;
        }
        registry.upsert_games(console_id, iter::once(game.clone()));
    }
    info!(
        source = %source,
        console_id,
        game_id,
        achievements = game.achievements.len(),
        "Merged full game detail"
    );

    if let Err(e) = persist(client, source).await {
        warn!(source = %source, error = %e, "Persist after game detail failed");
    }

    ctx.registry_bus.publish(vec![game.clone()]);
    Ok(game)
}

/// Fetch the backend diff for `source`, store it, and announce it.
pub async fn fetch_compare(
    client: &CatalogClient,
    ctx: &AdapterContext,
    source: ConsoleSource,
) -> Result<Vec<CompareRecord>> {
    let records: Vec<CompareRecord> = client
        .get_json(source.base_path(), endpoints::COMPARE_DATA)
        .await?;
    info!(source = %source, records = records.len(), "Fetched compare data");

    ctx.compare_book
        .write()
        .await
        .replace(source, records.clone());
    ctx.compare_bus.publish(CompareUpdate {
        source,
        records: records.clone(),
    });
    Ok(records)
}

/// Ask the backend to write its database for `source`.
pub async fn persist(client: &CatalogClient, source: ConsoleSource) -> Result<()> {
    client
        .get_ack(source.base_path(), endpoints::WRITE_DATABASE)
        .await?;
    info!(source = %source, "Backend database written");
    Ok(())
}

/// Reconcile then persist after a full fetch. Failures are logged only.
pub async fn run_follow_ups<A>(adapter: &A, registry: &SharedRegistry)
where
    A: SourceAdapter + ?Sized,
{
    let source = adapter.source_kind();
    if let Err(e) = adapter.reconcile(registry).await {
        warn!(source = %source, error = %e, "Reconciliation after fetch failed");
    }
    if let Err(e) = adapter.persist().await {
        warn!(source = %source, error = %e, "Persist after fetch failed");
    }
}
