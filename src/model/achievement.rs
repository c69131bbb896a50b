//! Achievements, rarity tiers and the achievement orderings.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Achievement type flag set by the central tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AchievementType {
    #[serde(alias = "missable")]
    Missable,
    #[serde(alias = "progression")]
    Progression,
    #[serde(alias = "win_condition")]
    WinCondition,
}

impl AchievementType {
    /// Fixed rank used for type ordering. Untyped achievements rank last.
    pub fn rank(kind: Option<AchievementType>) -> u8 {
        match kind {
            Some(AchievementType::Missable) => 0,
            Some(AchievementType::Progression) => 1,
            Some(AchievementType::WinCondition) => 2,
            None => 3,
        }
    }
}

/// One achievement of a game snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Achievement {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "apiname", alias = "name")]
    pub api_name: String,
    #[serde(rename = "displayName", alias = "Title")]
    pub display_name: String,
    #[serde(rename = "description", alias = "Description")]
    pub description: String,
    pub icon: String,
    #[serde(rename = "icongray")]
    pub icon_gray: String,
    /// Global unlock rarity, 0 to 100.
    pub percent: f64,
    #[serde(rename = "Type", alias = "type")]
    pub kind: Option<AchievementType>,
    #[serde(rename = "Points")]
    pub points: u32,
    #[serde(rename = "TrueRatio")]
    pub true_ratio: u32,
    pub achieved: bool,
}

impl Achievement {
    pub fn rarity(&self) -> Rarity {
        Rarity::from_percent(self.percent)
    }

    /// True points per point; zero for pointless achievements.
    pub fn points_ratio(&self) -> f64 {
        if self.points == 0 {
            0.0
        } else {
            f64::from(self.true_ratio) / f64::from(self.points)
        }
    }
}

/// Rarity tier derived from the global unlock percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    SuperRare,
    UltraRare,
}

impl Rarity {
    pub const COMMON_MIN: f64 = 50.0;
    pub const UNCOMMON_MIN: f64 = 20.0;
    pub const RARE_MIN: f64 = 10.0;
    pub const SUPER_RARE_MIN: f64 = 5.0;

    /// Thresholds are checked from common downwards; the first match wins.
    pub fn from_percent(percent: f64) -> Self {
        if percent >= Self::COMMON_MIN {
            Rarity::Common
        } else if percent >= Self::UNCOMMON_MIN {
            Rarity::Uncommon
        } else if percent >= Self::RARE_MIN {
            Rarity::Rare
        } else if percent >= Self::SUPER_RARE_MIN {
            Rarity::SuperRare
        } else {
            Rarity::UltraRare
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::SuperRare => "super-rare",
            Rarity::UltraRare => "ultra-rare",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named achievement orderings.
///
/// Rarity sorts on the unlock percentage, so `RarityDescending` lists the most
/// unlocked achievements first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOption {
    #[default]
    RarityDescending,
    RarityAscending,
    DisplayNameDescending,
    DisplayNameAscending,
    TypeDescending,
    TypeAscending,
    PointsDescending,
    PointsAscending,
    TruePointsDescending,
    TruePointsAscending,
    RatioDescending,
    RatioAscending,
    IdDescending,
    IdAscending,
}

impl SortOption {
    pub const ALL: [SortOption; 14] = [
        SortOption::RarityDescending,
        SortOption::RarityAscending,
        SortOption::DisplayNameDescending,
        SortOption::DisplayNameAscending,
        SortOption::TypeDescending,
        SortOption::TypeAscending,
        SortOption::PointsDescending,
        SortOption::PointsAscending,
        SortOption::TruePointsDescending,
        SortOption::TruePointsAscending,
        SortOption::RatioDescending,
        SortOption::RatioAscending,
        SortOption::IdDescending,
        SortOption::IdAscending,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SortOption::RarityDescending => "Rarity (Descending)",
            SortOption::RarityAscending => "Rarity (Ascending)",
            SortOption::DisplayNameDescending => "Display name (Descending)",
            SortOption::DisplayNameAscending => "Display name (Ascending)",
            SortOption::TypeDescending => "Type (Descending)",
            SortOption::TypeAscending => "Type (Ascending)",
            SortOption::PointsDescending => "Points (Descending)",
            SortOption::PointsAscending => "Points (Ascending)",
            SortOption::TruePointsDescending => "True points (Descending)",
            SortOption::TruePointsAscending => "True points (Ascending)",
            SortOption::RatioDescending => "Ratio (Descending)",
            SortOption::RatioAscending => "Ratio (Ascending)",
            SortOption::IdDescending => "ID (Descending)",
            SortOption::IdAscending => "ID (Ascending)",
        }
    }

    fn is_descending(&self) -> bool {
        matches!(
            self,
            SortOption::RarityDescending
                | SortOption::DisplayNameDescending
                | SortOption::TypeDescending
                | SortOption::PointsDescending
                | SortOption::TruePointsDescending
                | SortOption::RatioDescending
                | SortOption::IdDescending
        )
    }

    /// Ascending comparison on this option's key.
    fn compare_key(&self, a: &Achievement, b: &Achievement) -> Ordering {
        match self {
            SortOption::RarityDescending | SortOption::RarityAscending => {
                a.percent.total_cmp(&b.percent)
            }
            SortOption::DisplayNameDescending | SortOption::DisplayNameAscending => a
                .display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase()),
            SortOption::TypeDescending | SortOption::TypeAscending => {
                AchievementType::rank(a.kind).cmp(&AchievementType::rank(b.kind))
            }
            SortOption::PointsDescending | SortOption::PointsAscending => a.points.cmp(&b.points),
            SortOption::TruePointsDescending | SortOption::TruePointsAscending => {
                a.true_ratio.cmp(&b.true_ratio)
            }
            SortOption::RatioDescending | SortOption::RatioAscending => {
                a.points_ratio().total_cmp(&b.points_ratio())
            }
            SortOption::IdDescending | SortOption::IdAscending => a.id.cmp(&b.id),
        }
    }

    /// Comparator for this ordering. Equal keys compare equal, so a stable sort
    /// keeps their original relative order in both directions.
    pub fn compare(&self, a: &Achievement, b: &Achievement) -> Ordering {
        let ordering = self.compare_key(a, b);
        if self.is_descending() {
            ordering.reverse()
        } else {
            ordering
        }
    }

    /// Stable in-place sort.
    pub fn sort(&self, achievements: &mut [Achievement]) {
        achievements.sort_by(|a, b| self.compare(a, b));
    }

    /// Sorted copy, leaving the game snapshot untouched.
    pub fn sorted(&self, achievements: &[Achievement]) -> Vec<Achievement> {
        let mut sorted = achievements.to_vec();
        self.sort(&mut sorted);
        sorted
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_ascii_uppercase()))
            .map_err(|_| format!("Unknown sort option: {}", s))
    }
}
