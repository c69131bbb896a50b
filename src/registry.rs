//! Catalog registry - in-memory store of every console and its games.
//!
//! The registry itself is a plain synchronous structure. It is shared between
//! concurrently running adapters as a [`SharedRegistry`]; the lock is only held
//! for the duration of a merge and never across a network call.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::model::{CompletionStatus, Console, ConsoleId, ConsoleSource, Game};

/// Registry handle shared by the orchestrator and the adapters.
pub type SharedRegistry = Arc<RwLock<CatalogRegistry>>;

/// Consoles keyed by id, iterated in first-insertion order.
#[derive(Debug, Default)]
pub struct CatalogRegistry {
    order: Vec<ConsoleId>,
    consoles: HashMap<ConsoleId, Console>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry behind a shared handle.
    pub fn shared() -> SharedRegistry {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Insert console metadata.
    ///
    /// A new console starts with an empty game collection. For a console
    /// already present only the metadata is replaced; its games are kept.
    /// The owning source never changes: a listing of the same id by another
    /// source is ignored. Returns `true` when the console was newly inserted.
    pub fn upsert_console(&mut self, console: Console) -> bool {
        match self.consoles.get_mut(&console.id) {
            Some(existing) if existing.source != console.source => {
                warn!(
                    console_id = console.id,
                    owner = %existing.source,
                    source = %console.source,
                    "Console already owned by another source, ignoring listing"
                );
                false
            }
            Some(existing) => {
                existing.name = console.name;
                existing.active = console.active;
                existing.is_game_system = console.is_game_system;
                false
            }
            None => {
                let mut console = console;
                console.games = Default::default();
                self.order.push(console.id);
                self.consoles.insert(console.id, console);
                true
            }
        }
    }

    pub fn get(&self, console_id: ConsoleId) -> Option<&Console> {
        self.consoles.get(&console_id)
    }

    pub fn contains(&self, console_id: ConsoleId) -> bool {
        self.consoles.contains_key(&console_id)
    }

    pub fn all_consoles(&self) -> Vec<&Console> {
        self.order
            .iter()
            .filter_map(|id| self.consoles.get(id))
            .collect()
    }

    /// Ids of the consoles owned by `source`, in insertion order.
    pub fn consoles_for(&self, source: ConsoleSource) -> Vec<ConsoleId> {
        self.all_consoles()
            .into_iter()
            .filter(|c| c.source == source)
            .map(|c| c.id)
            .collect()
    }

    /// Merge games into a console, replacing records with the same id.
    ///
    /// Returns the number of games merged, or `None` when the console is absent.
    pub fn upsert_games(
        &mut self,
        console_id: ConsoleId,
        games: impl IntoIterator<Item = Game>,
    ) -> Option<usize> {
        let console = self.consoles.get_mut(&console_id)?;
        let mut merged = 0;
        for game in games {
            console.games.insert(game);
            merged += 1;
        }
        Some(merged)
    }

    /// Every game across every console: consoles in insertion order, then
    /// games in insertion order within each console.
    pub fn flatten(&self) -> Vec<&Game> {
        self.all_consoles()
            .into_iter()
            .flat_map(|c| c.games.iter())
            .collect()
    }

    /// Every game of the consoles owned by `source`.
    pub fn games_for(&self, source: ConsoleSource) -> Vec<&Game> {
        self.all_consoles()
            .into_iter()
            .filter(|c| c.source == source)
            .flat_map(|c| c.games.iter())
            .collect()
    }

    pub fn console_count(&self) -> usize {
        self.order.len()
    }

    pub fn game_count(&self) -> usize {
        self.consoles.values().map(|c| c.games.len()).sum()
    }

    /// Hardcore award totals and status breakdown for one source.
    pub fn completion_summary(&self, source: ConsoleSource) -> CompletionSummary {
        let mut summary = CompletionSummary {
            source,
            ..Default::default()
        };
        for game in self.games_for(source) {
            summary.games += 1;
            summary.earned += u64::from(game.num_awarded_hardcore);
            summary.possible += u64::from(game.max_possible);
            *summary
                .by_status
                .entry(game.completion_status)
                .or_insert(0) += 1;
        }
        summary
    }
}

/// Per-source completion totals.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSummary {
    pub source: ConsoleSource,
    pub games: usize,
    /// Hardcore awards earned
    pub earned: u64,
    /// Achievements available
    pub possible: u64,
    pub by_status: HashMap<CompletionStatus, usize>,
}

impl Default for CompletionSummary {
    fn default() -> Self {
        Self {
            source: ConsoleSource::RetroAchievements,
            games: 0,
            earned: 0,
            possible: 0,
            by_status: HashMap::new(),
        }
    }
}

impl CompletionSummary {
    /// Earned over possible awards, zero when nothing is available.
    pub fn ratio(&self) -> f64 {
        if self.possible == 0 {
            0.0
        } else {
            self.earned as f64 / self.possible as f64
        }
    }

    pub fn count(&self, status: CompletionStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}
