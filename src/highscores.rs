//! Per-mode best scores
//!
//! One integer per game mode, persisted to LocalStorage in the browser
//! and kept in memory natively.

use std::collections::HashMap;

use crate::sim::GameMode;

const KEY_PREFIX: &str = "spaceExplorerHighScore_";

/// Storage key for a mode's best score
pub fn storage_key(mode: GameMode) -> String {
    format!("{KEY_PREFIX}{}", mode.key())
}

/// Stored values are decimal strings; anything else counts as absent
fn parse_score(key: &str, raw: &str) -> Option<u64> {
    match raw.trim().parse() {
        Ok(score) => Some(score),
        Err(_) => {
            log::warn!("Ignoring corrupt high score under {key}: {raw:?}");
            None
        }
    }
}

/// Key-value backend for high scores
pub trait ScoreStore {
    fn get(&self, key: &str) -> Option<u64>;
    fn set(&mut self, key: &str, score: u64);
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a raw string under `key`, as a foreign writer might
    pub fn insert_raw(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

impl ScoreStore for MemoryStore {
    fn get(&self, key: &str) -> Option<u64> {
        self.values.get(key).and_then(|raw| parse_score(key, raw))
    }

    fn set(&mut self, key: &str, score: u64) {
        self.values.insert(key.to_string(), score.to_string());
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStore;

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalStore {
    fn get(&self, key: &str) -> Option<u64> {
        let raw = Self::storage()?.get_item(key).ok()??;
        parse_score(key, &raw)
    }

    fn set(&mut self, key: &str, score: u64) {
        if let Some(storage) = Self::storage() {
            let _ = storage.set_item(key, &score.to_string());
        }
    }
}

/// Best score per mode over a [`ScoreStore`]
pub struct HighScores {
    store: Box<dyn ScoreStore>,
}

impl HighScores {
    pub fn new(store: Box<dyn ScoreStore>) -> Self {
        Self { store }
    }

    /// LocalStorage on wasm32, memory elsewhere
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        Self::new(Box::new(LocalStore))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Best recorded score for `mode`, 0 when none
    pub fn best(&self, mode: GameMode) -> u64 {
        self.store.get(&storage_key(mode)).unwrap_or(0)
    }

    /// Record `score` if it beats the stored best (absent counts as 0).
    /// Returns whether it did.
    pub fn submit(&mut self, mode: GameMode, score: u64) -> bool {
        let is_best = score > self.best(mode);
        if is_best {
            self.store.set(&storage_key(mode), score);
            log::info!("New {} high score: {score}", mode.key());
        }
        is_best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scores() -> HighScores {
        HighScores::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_keys() {
        assert_eq!(storage_key(GameMode::Single), "spaceExplorerHighScore_single");
        assert_eq!(storage_key(GameMode::Vs), "spaceExplorerHighScore_vs");
        assert_eq!(storage_key(GameMode::Coop), "spaceExplorerHighScore_coop");
    }

    #[test]
    fn test_submit_only_raises() {
        let mut hs = scores();
        assert_eq!(hs.best(GameMode::Single), 0);
        assert!(hs.submit(GameMode::Single, 500));
        assert!(!hs.submit(GameMode::Single, 500));
        assert!(!hs.submit(GameMode::Single, 100));
        assert_eq!(hs.best(GameMode::Single), 500);
        assert!(hs.submit(GameMode::Single, 501));
        assert_eq!(hs.best(GameMode::Single), 501);
    }

    #[test]
    fn test_modes_are_isolated() {
        let mut hs = scores();
        hs.submit(GameMode::Vs, 900);
        assert_eq!(hs.best(GameMode::Vs), 900);
        assert_eq!(hs.best(GameMode::Single), 0);
        assert_eq!(hs.best(GameMode::Coop), 0);
    }

    #[test]
    fn test_corrupt_value_is_absent() {
        let mut store = MemoryStore::new();
        store.insert_raw("spaceExplorerHighScore_coop", "lots");
        store.insert_raw("spaceExplorerHighScore_vs", " 42 ");
        let mut hs = HighScores::new(Box::new(store));

        assert_eq!(hs.best(GameMode::Coop), 0);
        assert_eq!(hs.best(GameMode::Vs), 42);
        assert!(!hs.submit(GameMode::Coop, 0));
        assert!(hs.submit(GameMode::Coop, 1));
        assert_eq!(hs.best(GameMode::Coop), 1);
    }

    proptest! {
        #[test]
        fn prop_best_is_running_max(submissions in prop::collection::vec(0u64..10_000, 1..20)) {
            let mut hs = scores();
            for &s in &submissions {
                hs.submit(GameMode::Single, s);
            }
            prop_assert_eq!(hs.best(GameMode::Single), submissions.iter().copied().max().unwrap_or(0));
        }
    }
}
