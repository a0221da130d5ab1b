//! Player profile: coins, best score and tower skins
//!
//! Persisted through [`crate::persistence`]. The simulation only reads the
//! best score and selected skin at session start, and reports the result at
//! game over.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Storage};

/// A purchasable tower skin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skin {
    pub id: u8,
    pub name: &'static str,
    pub price: u64,
}

/// Every skin in the shop, in display order. Skin 1 is free.
pub const SKINS: [Skin; 8] = [
    Skin { id: 1, name: "Brick", price: 0 },
    Skin { id: 2, name: "Green", price: 100 },
    Skin { id: 3, name: "Neon", price: 200 },
    Skin { id: 4, name: "Wooden", price: 300 },
    Skin { id: 5, name: "Japanese", price: 400 },
    Skin { id: 6, name: "Golden", price: 500 },
    Skin { id: 7, name: "Stone", price: 600 },
    Skin { id: 8, name: "Greek", price: 700 },
];

/// Skin available to every new profile
pub const DEFAULT_SKIN: u8 = 1;

/// Look up a skin by id
pub fn skin(id: u8) -> Option<&'static Skin> {
    SKINS.iter().find(|s| s.id == id)
}

/// Outcome of trying to buy a skin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purchase {
    Unlocked { price: u64 },
    AlreadyOwned,
    InsufficientCoins { missing: u64 },
    UnknownSkin,
}

/// Saved player data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub coins: u64,
    pub high_score: u64,
    pub unlocked_skins: Vec<u8>,
    pub selected_skin: u8,
    pub total_games: u32,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            coins: 0,
            high_score: 0,
            unlocked_skins: vec![DEFAULT_SKIN],
            selected_skin: DEFAULT_SKIN,
            total_games: 0,
        }
    }
}

impl Profile {
    /// Storage key
    const STORAGE_KEY: &'static str = "save_data";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_coins(&mut self, amount: u64) {
        self.coins = self.coins.saturating_add(amount);
    }

    /// Deduct coins if there are enough
    pub fn spend_coins(&mut self, amount: u64) -> bool {
        if self.coins < amount {
            return false;
        }
        self.coins -= amount;
        true
    }

    pub fn is_unlocked(&self, skin_id: u8) -> bool {
        self.unlocked_skins.contains(&skin_id)
    }

    /// Unlock without paying. Returns false if already unlocked or unknown.
    pub fn unlock_skin(&mut self, skin_id: u8) -> bool {
        if skin(skin_id).is_none() || self.is_unlocked(skin_id) {
            return false;
        }
        self.unlocked_skins.push(skin_id);
        true
    }

    /// Buy a skin from the shop
    pub fn purchase(&mut self, skin_id: u8) -> Purchase {
        let Some(skin) = skin(skin_id) else {
            return Purchase::UnknownSkin;
        };
        if self.is_unlocked(skin_id) {
            return Purchase::AlreadyOwned;
        }
        if !self.spend_coins(skin.price) {
            return Purchase::InsufficientCoins {
                missing: skin.price - self.coins,
            };
        }
        self.unlocked_skins.push(skin_id);
        log::info!("Unlocked skin {} ({}) for {} coins", skin.id, skin.name, skin.price);
        Purchase::Unlocked { price: skin.price }
    }

    /// Choose the skin used for new sessions; only unlocked skins qualify
    pub fn select_skin(&mut self, skin_id: u8) -> bool {
        if !self.is_unlocked(skin_id) {
            return false;
        }
        self.selected_skin = skin_id;
        true
    }

    /// Returns true if `score` is a new best
    pub fn update_high_score(&mut self, score: u64) -> bool {
        if score > self.high_score {
            self.high_score = score;
            return true;
        }
        false
    }

    /// Apply a finished session's result. Returns true on a new high score.
    pub fn record_game(&mut self, score: u64, coins: u64) -> bool {
        self.total_games += 1;
        self.add_coins(coins);
        self.update_high_score(score)
    }

    /// Load from storage, or start fresh
    pub fn load(storage: &dyn Storage) -> Self {
        let mut profile: Self = persistence::load_or_default(storage, Self::STORAGE_KEY);
        // A hand-edited file may have lost the free skin
        if !profile.is_unlocked(DEFAULT_SKIN) {
            profile.unlocked_skins.insert(0, DEFAULT_SKIN);
        }
        if !profile.is_unlocked(profile.selected_skin) {
            profile.selected_skin = DEFAULT_SKIN;
        }
        profile
    }

    /// Save to storage; failures are logged, never fatal
    pub fn save(&self, storage: &mut dyn Storage) {
        if let Err(e) = persistence::save_json(storage, Self::STORAGE_KEY, self) {
            log::warn!("Profile not saved: {:#}", e);
        }
    }
}
