//! Coins and per-game best scores
//!
//! Coins are earned in mini-games and spent on food. Best scores only ever
//! go up: a lower final score never replaces a stored best.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ActionError;
use crate::minigame::GameId;
use crate::persistence::{PetPatch, PetRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Economy {
    coins: u32,
    best_scores: BTreeMap<GameId, u32>,
}

impl Economy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_record(record: &PetRecord) -> Self {
        let best_scores = GameId::ALL
            .into_iter()
            .map(|game| (game, record.best_score(game)))
            .collect();
        Self {
            coins: record.coins,
            best_scores,
        }
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn earn(&mut self, amount: u32) -> u32 {
        self.coins = self.coins.saturating_add(amount);
        self.coins
    }

    /// Take coins, stopping at zero
    pub fn spend(&mut self, amount: u32) -> u32 {
        self.coins = self.coins.saturating_sub(amount);
        self.coins
    }

    /// Take coins only if the full amount is there
    pub fn try_spend(&mut self, amount: u32) -> Result<u32, ActionError> {
        if self.coins < amount {
            return Err(ActionError::InsufficientCoins {
                needed: amount,
                available: self.coins,
            });
        }
        self.coins -= amount;
        Ok(self.coins)
    }

    pub fn reset_coins(&mut self) {
        self.coins = 0;
    }

    pub fn best_score(&self, game: GameId) -> u32 {
        self.best_scores.get(&game).copied().unwrap_or(0)
    }

    /// Offer a final score. Returns the new best when it beats the stored one.
    pub fn record_best_score(&mut self, game: GameId, candidate: u32) -> Option<u32> {
        let best = self.best_scores.entry(game).or_insert(0);
        if candidate > *best {
            *best = candidate;
            log::info!("New best score for {}: {}", game.as_str(), candidate);
            Some(candidate)
        } else {
            None
        }
    }

    /// Coins plus every best score
    pub fn to_patch(&self) -> PetPatch {
        let mut patch = PetPatch::coins(self.coins);
        for game in GameId::ALL {
            patch.absorb(PetPatch::best(game, self.best_score(game)));
        }
        patch
    }
}
