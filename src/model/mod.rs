//! Data model shared by the registry, the adapters and the reconciliation engine.
//!
//! Wire names follow the catalog backend's JSON, which mixes the central
//! tracker's PascalCase with the storefront's lowercase keys.

pub mod achievement;
pub mod compare;
pub mod console;
pub mod game;
pub mod source;

pub use achievement::{Achievement, AchievementType, Rarity, SortOption};
pub use compare::{CompareRecord, CompareStatus};
pub use console::{Console, ConsoleRecord, GameMap};
pub use game::{CompletionStatus, Game};
pub use source::ConsoleSource;

/// Console identifier, unique within the registry.
pub type ConsoleId = i64;

/// Game identifier, unique only within its owning console.
pub type GameId = i64;
