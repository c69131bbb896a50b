//! Games and completion status.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::achievement::Achievement;
use super::{ConsoleId, GameId};

/// Completion classification of a game for this user.
///
/// Unordered: there is no "more complete" relation between variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionStatus {
    #[default]
    NotPlayed,
    Tried,
    Beaten,
    Mastered,
    NoAchievements,
    CannotPlay,
}

impl CompletionStatus {
    pub const ALL: [CompletionStatus; 6] = [
        CompletionStatus::NotPlayed,
        CompletionStatus::Tried,
        CompletionStatus::Beaten,
        CompletionStatus::Mastered,
        CompletionStatus::NoAchievements,
        CompletionStatus::CannotPlay,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CompletionStatus::NotPlayed => "Not played",
            CompletionStatus::Tried => "Tried",
            CompletionStatus::Beaten => "Beaten",
            CompletionStatus::Mastered => "Mastered",
            CompletionStatus::NoAchievements => "No achievements",
            CompletionStatus::CannotPlay => "Cannot play",
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One game as reported by a catalog source.
///
/// Identity is `(console_id, id)`. A fresher copy replaces the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Game {
    #[serde(rename = "Title", alias = "name")]
    pub title: String,
    #[serde(rename = "ID", alias = "GameID", alias = "appid")]
    pub id: GameId,
    #[serde(rename = "ConsoleID")]
    pub console_id: ConsoleId,
    #[serde(rename = "ConsoleName")]
    pub console_name: String,
    #[serde(rename = "CompletionStatus")]
    pub completion_status: CompletionStatus,
    #[serde(rename = "MaxPossible", alias = "NumAchievements")]
    pub max_possible: u32,
    #[serde(rename = "NumAwardedHardcore")]
    pub num_awarded_hardcore: u32,
    #[serde(rename = "Points")]
    pub points: u32,
    #[serde(rename = "TruePoints")]
    pub true_points: u32,
    #[serde(rename = "EarnedPoints")]
    pub earned_points: u32,
    #[serde(rename = "EarnedTruePoints")]
    pub earned_true_points: u32,
    #[serde(rename = "Ratio")]
    pub ratio: f64,
    #[serde(rename = "EarnedRatio")]
    pub earned_ratio: f64,
    /// This user's completion of the game, as reported by the backend.
    /// Not to be confused with [`Achievement::percent`], which is global rarity.
    #[serde(rename = "Percent")]
    pub percent: f64,
    #[serde(rename = "Image")]
    pub image: String,
    #[serde(rename = "AchievementData")]
    pub achievements: Vec<Achievement>,
}

impl Game {
    /// Completion fraction in `[0, 1]` derived from hardcore awards.
    ///
    /// Games without any hardcore award fall back to their status: mastered
    /// counts as complete, beaten as half way.
    pub fn completion_fraction(&self) -> f64 {
        if self.num_awarded_hardcore == 0 {
            return match self.completion_status {
                CompletionStatus::Mastered => 1.0,
                CompletionStatus::Beaten => 0.5,
                _ => 0.0,
            };
        }
        if self.max_possible == 0 {
            return 0.0;
        }
        f64::from(self.num_awarded_hardcore) / f64::from(self.max_possible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(awarded: u32, max: u32, status: CompletionStatus) -> Game {
        Game {
            num_awarded_hardcore: awarded,
            max_possible: max,
            completion_status: status,
            ..Default::default()
        }
    }

    #[test]
    fn test_completion_fraction_by_status() {
        assert_eq!(game(0, 10, CompletionStatus::Mastered).completion_fraction(), 1.0);
        assert_eq!(game(0, 10, CompletionStatus::Beaten).completion_fraction(), 0.5);
        assert_eq!(game(0, 10, CompletionStatus::Tried).completion_fraction(), 0.0);
    }

    #[test]
    fn test_completion_fraction_by_awards() {
        let fraction = game(3, 10, CompletionStatus::Tried).completion_fraction();
        assert!((fraction - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_deserialize_backend_game() {
        let json = r#"{
            "ID": 42,
            "Title": "Sonic the Hedgehog",
            "ConsoleID": 1,
            "ConsoleName": "Genesis/Mega Drive",
            "CompletionStatus": "BEATEN",
            "NumAchievements": 23,
            "NumAwardedHardcore": 12,
            "Points": 400,
            "HighestAwardKind": "beaten-hardcore",
            "AchievementData": [{"ID": 7, "Title": "Ring Collector", "Points": 5, "Type": "PROGRESSION"}]
        }"#;

        let game: Game = serde_json::from_str(json).unwrap();
        assert_eq!(game.id, 42);
        assert_eq!(game.max_possible, 23);
        assert_eq!(game.completion_status, CompletionStatus::Beaten);
        assert_eq!(game.achievements.len(), 1);
        assert_eq!(game.achievements[0].display_name, "Ring Collector");
    }

    #[test]
    fn test_deserialize_storefront_game() {
        let game: Game = serde_json::from_str(r#"{"appid": 620, "name": "Portal 2"}"#).unwrap();
        assert_eq!(game.id, 620);
        assert_eq!(game.title, "Portal 2");
        assert_eq!(game.completion_status, CompletionStatus::NotPlayed);
    }
}
