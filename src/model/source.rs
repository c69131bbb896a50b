//! Catalog sources.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ConsoleId;

/// Pseudo-console holding every storefront game.
pub const STEAM_CONSOLE_ID: ConsoleId = 100_000;
/// Pseudo-console holding every PlayStation 3 trophy list.
pub const PS3_CONSOLE_ID: ConsoleId = 200_000;
/// Pseudo-console holding every PlayStation Vita trophy list.
pub const PSVITA_CONSOLE_ID: ConsoleId = 300_000;
/// Pseudo-console holding every Xbox 360 achievement list.
pub const XBOX360_CONSOLE_ID: ConsoleId = 400_000;

/// One external catalog provider.
///
/// Determines which source adapter owns a console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsoleSource {
    /// Central achievement-tracking service
    #[serde(rename = "RETRO_ACHIEVEMENTS")]
    RetroAchievements,
    /// Digital storefront
    #[serde(rename = "STEAM")]
    Steam,
    #[serde(rename = "PS3")]
    Ps3,
    #[serde(rename = "PSVITA")]
    PsVita,
    #[serde(rename = "XBOX_360")]
    Xbox360,
}

impl ConsoleSource {
    /// Every source, in fan-out order.
    pub const ALL: [ConsoleSource; 5] = [
        ConsoleSource::RetroAchievements,
        ConsoleSource::Steam,
        ConsoleSource::Ps3,
        ConsoleSource::PsVita,
        ConsoleSource::Xbox360,
    ];

    /// Name used on the wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ConsoleSource::RetroAchievements => "RETRO_ACHIEVEMENTS",
            ConsoleSource::Steam => "STEAM",
            ConsoleSource::Ps3 => "PS3",
            ConsoleSource::PsVita => "PSVITA",
            ConsoleSource::Xbox360 => "XBOX_360",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ConsoleSource::RetroAchievements => "Retro Achievements",
            ConsoleSource::Steam => "Steam",
            ConsoleSource::Ps3 => "PlayStation 3",
            ConsoleSource::PsVita => "PlayStation Vita",
            ConsoleSource::Xbox360 => "Xbox 360",
        }
    }

    /// Path prefix of this source on the catalog backend.
    pub fn base_path(&self) -> &'static str {
        match self {
            ConsoleSource::RetroAchievements => "ra/",
            ConsoleSource::Steam => "steam/",
            ConsoleSource::Ps3 => "ps3/",
            ConsoleSource::PsVita => "psvita/",
            ConsoleSource::Xbox360 => "xbox360/",
        }
    }

    /// The single pseudo-console of sources that expose one, `None` for the
    /// central tracker which reports real platforms.
    pub fn fixed_console_id(&self) -> Option<ConsoleId> {
        match self {
            ConsoleSource::RetroAchievements => None,
            ConsoleSource::Steam => Some(STEAM_CONSOLE_ID),
            ConsoleSource::Ps3 => Some(PS3_CONSOLE_ID),
            ConsoleSource::PsVita => Some(PSVITA_CONSOLE_ID),
            ConsoleSource::Xbox360 => Some(XBOX360_CONSOLE_ID),
        }
    }
}

impl fmt::Display for ConsoleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ConsoleSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "retro_achievements" | "ra" => Ok(ConsoleSource::RetroAchievements),
            "steam" => Ok(ConsoleSource::Steam),
            "ps3" => Ok(ConsoleSource::Ps3),
            "psvita" | "ps_vita" => Ok(ConsoleSource::PsVita),
            "xbox_360" | "xbox360" => Ok(ConsoleSource::Xbox360),
            _ => Err(format!("Unknown console source: {}", s)),
        }
    }
}
