//! Source adapters.
//!
//! One adapter per catalog source, all behind the [`SourceAdapter`] trait:
//! - Central achievement tracker (two-phase, paced per console)
//! - Storefront (owned games, then per-game detail)
//! - Standalone trophy sources (PS3, PS Vita, Xbox 360)
//! - Mock adapter for testing

pub mod common;
pub mod mock;
pub mod retro;
pub mod standalone;
pub mod steam;
pub mod traits;

pub use common::{ConsoleTarget, MergeOutcome};
pub use mock::MockAdapter;
pub use retro::RetroAchievementsAdapter;
pub use standalone::StandaloneAdapter;
pub use steam::SteamAdapter;
pub use traits::{AdapterContext, SourceAdapter};
