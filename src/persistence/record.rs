//! Saved pet data and partial updates to it

use serde::{Deserialize, Serialize};

use crate::minigame::GameId;
use crate::pet::StatVector;
use crate::pet::stats::clamp_stat;

pub const DEFAULT_PET_NAME: &str = "Tamagotchi";

/// One pet as stored remotely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetRecord {
    pub name: String,
    pub hunger: f32,
    pub happiness: f32,
    pub energy: f32,
    pub cleanliness: f32,
    pub health: f32,
    pub coins: u32,
    pub catch_food_best_score: u32,
    pub click_food_best_score: u32,
    #[serde(default)]
    pub food_jump_best_score: u32,
    /// Milliseconds on the host clock
    pub last_updated: u64,
}

impl Default for PetRecord {
    fn default() -> Self {
        let stats = StatVector::default();
        Self {
            name: DEFAULT_PET_NAME.to_string(),
            hunger: stats.hunger,
            happiness: stats.happiness,
            energy: stats.energy,
            cleanliness: stats.cleanliness,
            health: stats.health,
            coins: 0,
            catch_food_best_score: 0,
            click_food_best_score: 0,
            food_jump_best_score: 0,
            last_updated: 0,
        }
    }
}

impl PetRecord {
    pub fn stats(&self) -> StatVector {
        StatVector::new(
            self.hunger,
            self.happiness,
            self.energy,
            self.cleanliness,
            self.health,
        )
    }

    pub fn best_score(&self, game: GameId) -> u32 {
        match game {
            GameId::CatchFood => self.catch_food_best_score,
            GameId::ClickFood => self.click_food_best_score,
            GameId::FoodJump => self.food_jump_best_score,
        }
    }

    fn best_score_mut(&mut self, game: GameId) -> &mut u32 {
        match game {
            GameId::CatchFood => &mut self.catch_food_best_score,
            GameId::ClickFood => &mut self.click_food_best_score,
            GameId::FoodJump => &mut self.food_jump_best_score,
        }
    }

    /// Clamp stats that may have come from an untrusted store
    pub fn sanitized(mut self) -> Self {
        self.hunger = clamp_stat(self.hunger);
        self.happiness = clamp_stat(self.happiness);
        self.energy = clamp_stat(self.energy);
        self.cleanliness = clamp_stat(self.cleanliness);
        self.health = clamp_stat(self.health);
        self
    }

    /// Apply a patch: present fields override, best scores and the timestamp
    /// only move forward, stats are clamped.
    pub fn merge(&mut self, patch: &PetPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(v) = patch.hunger {
            self.hunger = clamp_stat(v);
        }
        if let Some(v) = patch.happiness {
            self.happiness = clamp_stat(v);
        }
        if let Some(v) = patch.energy {
            self.energy = clamp_stat(v);
        }
        if let Some(v) = patch.cleanliness {
            self.cleanliness = clamp_stat(v);
        }
        if let Some(v) = patch.health {
            self.health = clamp_stat(v);
        }
        if let Some(coins) = patch.coins {
            self.coins = coins;
        }
        for game in GameId::ALL {
            if let Some(score) = patch.best_score(game) {
                let best = self.best_score_mut(game);
                *best = (*best).max(score);
            }
        }
        if let Some(ts) = patch.last_updated {
            self.last_updated = self.last_updated.max(ts);
        }
    }

    /// Copy of `self` with `patch` merged in
    pub fn merged(&self, patch: &PetPatch) -> Self {
        let mut out = self.clone();
        out.merge(patch);
        out
    }
}

/// Partial update to a `PetRecord`; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hunger: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub happiness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanliness: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coins: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catch_food_best_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_food_best_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_jump_best_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<u64>,
}

impl PetPatch {
    pub fn stats(stats: &StatVector) -> Self {
        Self {
            hunger: Some(stats.hunger),
            happiness: Some(stats.happiness),
            energy: Some(stats.energy),
            cleanliness: Some(stats.cleanliness),
            health: Some(stats.health),
            ..Self::default()
        }
    }

    pub fn coins(coins: u32) -> Self {
        Self {
            coins: Some(coins),
            ..Self::default()
        }
    }

    pub fn best(game: GameId, score: u32) -> Self {
        let mut patch = Self::default();
        *patch.best_score_mut(game) = Some(score);
        patch
    }

    /// Every field of `record`
    pub fn full(record: &PetRecord) -> Self {
        Self {
            name: Some(record.name.clone()),
            hunger: Some(record.hunger),
            happiness: Some(record.happiness),
            energy: Some(record.energy),
            cleanliness: Some(record.cleanliness),
            health: Some(record.health),
            coins: Some(record.coins),
            catch_food_best_score: Some(record.catch_food_best_score),
            click_food_best_score: Some(record.click_food_best_score),
            food_jump_best_score: Some(record.food_jump_best_score),
            last_updated: Some(record.last_updated),
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn best_score(&self, game: GameId) -> Option<u32> {
        match game {
            GameId::CatchFood => self.catch_food_best_score,
            GameId::ClickFood => self.click_food_best_score,
            GameId::FoodJump => self.food_jump_best_score,
        }
    }

    fn best_score_mut(&mut self, game: GameId) -> &mut Option<u32> {
        match game {
            GameId::CatchFood => &mut self.catch_food_best_score,
            GameId::ClickFood => &mut self.click_food_best_score,
            GameId::FoodJump => &mut self.food_jump_best_score,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Coalesce a later patch into this one. Later values win, except best
    /// scores and the timestamp which keep the larger value.
    pub fn absorb(&mut self, later: PetPatch) {
        fn take<T>(slot: &mut Option<T>, later: Option<T>) {
            if later.is_some() {
                *slot = later;
            }
        }

        for game in GameId::ALL {
            if let Some(score) = later.best_score(game) {
                let slot = self.best_score_mut(game);
                *slot = Some(slot.map_or(score, |s| s.max(score)));
            }
        }
        take(&mut self.name, later.name);
        take(&mut self.hunger, later.hunger);
        take(&mut self.happiness, later.happiness);
        take(&mut self.energy, later.energy);
        take(&mut self.cleanliness, later.cleanliness);
        take(&mut self.health, later.health);
        take(&mut self.coins, later.coins);
        if let Some(ts) = later.last_updated {
            self.last_updated = Some(self.last_updated.map_or(ts, |t| t.max(ts)));
        }
    }

    /// Same set of fields, with values taken from `record`
    pub fn refreshed_from(&self, record: &PetRecord) -> PetPatch {
        let mut out = PetPatch {
            name: self.name.as_ref().map(|_| record.name.clone()),
            hunger: self.hunger.map(|_| record.hunger),
            happiness: self.happiness.map(|_| record.happiness),
            energy: self.energy.map(|_| record.energy),
            cleanliness: self.cleanliness.map(|_| record.cleanliness),
            health: self.health.map(|_| record.health),
            coins: self.coins.map(|_| record.coins),
            last_updated: self.last_updated.map(|_| record.last_updated),
            ..PetPatch::default()
        };
        for game in GameId::ALL {
            if self.best_score(game).is_some() {
                *out.best_score_mut(game) = Some(record.best_score(game));
            }
        }
        out
    }
}
