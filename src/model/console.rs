//! Consoles and their game collections.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use super::game::Game;
use super::source::ConsoleSource;
use super::{ConsoleId, GameId};

/// Games of one console keyed by id, iterated in first-insertion order.
///
/// Replacing a game keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameMap {
    order: Vec<GameId>,
    games: HashMap<GameId, Game>,
}

impl GameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a game, returning the previous record.
    pub fn insert(&mut self, game: Game) -> Option<Game> {
        let id = game.id;
        let previous = self.games.insert(id, game);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    pub fn get(&self, id: GameId) -> Option<&Game> {
        self.games.get(&id)
    }

    pub fn contains(&self, id: GameId) -> bool {
        self.games.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn ids(&self) -> &[GameId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &Game> {
        self.order.iter().filter_map(|id| self.games.get(id))
    }
}

/// A grouping of games under one source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Console {
    #[serde(rename = "ID")]
    pub id: ConsoleId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Active")]
    pub active: bool,
    #[serde(rename = "IsGameSystem")]
    pub is_game_system: bool,
    #[serde(rename = "Source")]
    pub source: ConsoleSource,
    #[serde(skip)]
    pub games: GameMap,
}

impl Console {
    pub fn new(id: ConsoleId, name: impl Into<String>, source: ConsoleSource) -> Self {
        Self {
            id,
            name: name.into(),
            active: true,
            is_game_system: true,
            source,
            games: GameMap::new(),
        }
    }
}

/// Console metadata as listed by a source's `console_data/` endpoint.
///
/// Becomes a [`Console`] once the owning source is known.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConsoleRecord {
    #[serde(rename = "ID")]
    pub id: ConsoleId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Active", deserialize_with = "deserialize_flag")]
    pub active: bool,
    #[serde(rename = "IsGameSystem", deserialize_with = "deserialize_flag")]
    pub is_game_system: bool,
}

impl ConsoleRecord {
    pub fn into_console(self, source: ConsoleSource) -> Console {
        Console {
            id: self.id,
            name: self.name,
            active: self.active,
            is_game_system: self.is_game_system,
            source,
            games: GameMap::new(),
        }
    }
}

/// Backends report flags as booleans, integers or numeric strings.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
        Null(()),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
        Flag::Text(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        Flag::Null(()) => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: GameId, title: &str) -> Game {
        Game {
            id,
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_game_map_keeps_first_insertion_order() {
        let mut games = GameMap::new();
        games.insert(game(3, "c"));
        games.insert(game(1, "a"));
        let previous = games.insert(game(3, "c2"));

        assert_eq!(previous.map(|g| g.title), Some("c".to_string()));
        assert_eq!(games.ids(), &[3, 1]);
        let titles: Vec<&str> = games.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["c2", "a"]);
    }

    #[test]
    fn test_console_record_flags() {
        let records: Vec<ConsoleRecord> = serde_json::from_str(
            r#"[
                {"ID": 1, "Name": "Genesis/Mega Drive", "Active": true, "IsGameSystem": "1", "IconURL": "x"},
                {"ID": 2, "Name": "Events", "Active": 0, "IsGameSystem": false}
            ]"#,
        )
        .unwrap();

        assert!(records[0].active && records[0].is_game_system);
        assert!(!records[1].active && !records[1].is_game_system);

        let console = records[0].clone().into_console(ConsoleSource::RetroAchievements);
        assert_eq!(console.source, ConsoleSource::RetroAchievements);
        assert!(console.games.is_empty());
    }
}
