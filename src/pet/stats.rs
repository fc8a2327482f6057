//! Pet stat vector, time decay and action effects
//!
//! All functions here are pure: they take a `StatVector` by value and return
//! the next one. Every stat is clamped to `[STAT_MIN, STAT_MAX]` after each
//! mutation.

use serde::{Deserialize, Serialize};

pub const STAT_MIN: f32 = 0.0;
pub const STAT_MAX: f32 = 100.0;

/// Ticks shorter than this (6 seconds) do not decay anything
pub const MIN_DECAY_MINUTES: f32 = 0.1;

/// Decay rates per minute
pub mod rates {
    pub const HUNGER: f32 = 2.0;
    pub const ENERGY: f32 = 1.5;
    pub const HAPPINESS: f32 = 1.0;
    pub const CLEANLINESS: f32 = 1.5;

    /// Below this average of the four needs, health drains
    pub const HEALTH_DRAIN_BELOW: f32 = 30.0;
    /// Health drain factor applied to `(HEALTH_DRAIN_BELOW - avg)` per minute
    pub const HEALTH_DRAIN_FACTOR: f32 = 0.1;
    /// Above this average of the four needs, health regenerates
    pub const HEALTH_REGEN_ABOVE: f32 = 70.0;
    pub const HEALTH_REGEN: f32 = 0.5;
}

/// Player-triggered care actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Feed,
    Sleep,
    Play,
    Clean,
    Medicine,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Feed,
        ActionKind::Sleep,
        ActionKind::Play,
        ActionKind::Clean,
        ActionKind::Medicine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Feed => "feed",
            ActionKind::Sleep => "sleep",
            ActionKind::Play => "play",
            ActionKind::Clean => "clean",
            ActionKind::Medicine => "medicine",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "feed" => Some(ActionKind::Feed),
            "sleep" => Some(ActionKind::Sleep),
            "play" => Some(ActionKind::Play),
            "clean" => Some(ActionKind::Clean),
            "medicine" | "heal" => Some(ActionKind::Medicine),
            _ => None,
        }
    }

    /// Stat deltas applied when the action completes
    pub fn effect(&self) -> StatDelta {
        match self {
            ActionKind::Feed => StatDelta {
                hunger: 30.0,
                happiness: 5.0,
                ..StatDelta::ZERO
            },
            ActionKind::Sleep => StatDelta {
                energy: 50.0,
                health: 5.0,
                ..StatDelta::ZERO
            },
            ActionKind::Play => StatDelta {
                happiness: 25.0,
                energy: -10.0,
                ..StatDelta::ZERO
            },
            ActionKind::Clean => StatDelta {
                cleanliness: 40.0,
                happiness: 10.0,
                ..StatDelta::ZERO
            },
            ActionKind::Medicine => StatDelta {
                health: 30.0,
                ..StatDelta::ZERO
            },
        }
    }
}

/// Signed per-stat change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatDelta {
    pub hunger: f32,
    pub happiness: f32,
    pub energy: f32,
    pub cleanliness: f32,
    pub health: f32,
}

impl StatDelta {
    pub const ZERO: StatDelta = StatDelta {
        hunger: 0.0,
        happiness: 0.0,
        energy: 0.0,
        cleanliness: 0.0,
        health: 0.0,
    };
}

/// The five bounded pet stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatVector {
    pub hunger: f32,
    pub happiness: f32,
    pub energy: f32,
    pub cleanliness: f32,
    pub health: f32,
}

impl Default for StatVector {
    fn default() -> Self {
        Self {
            hunger: 80.0,
            happiness: 80.0,
            energy: 80.0,
            cleanliness: 80.0,
            health: 100.0,
        }
    }
}

/// Clamp one stat, mapping NaN to the floor
#[inline]
pub fn clamp_stat(value: f32) -> f32 {
    if value.is_nan() {
        STAT_MIN
    } else {
        value.clamp(STAT_MIN, STAT_MAX)
    }
}

impl StatVector {
    pub fn new(hunger: f32, happiness: f32, energy: f32, cleanliness: f32, health: f32) -> Self {
        Self {
            hunger,
            happiness,
            energy,
            cleanliness,
            health,
        }
        .clamped()
    }

    /// Copy with every stat forced into range
    pub fn clamped(self) -> Self {
        Self {
            hunger: clamp_stat(self.hunger),
            happiness: clamp_stat(self.happiness),
            energy: clamp_stat(self.energy),
            cleanliness: clamp_stat(self.cleanliness),
            health: clamp_stat(self.health),
        }
    }

    /// Mean of hunger, energy, happiness and cleanliness (health excluded)
    pub fn average_needs(&self) -> f32 {
        (self.hunger + self.energy + self.happiness + self.cleanliness) / 4.0
    }

    /// Add a delta and clamp
    pub fn apply_delta(self, delta: StatDelta) -> Self {
        Self {
            hunger: self.hunger + delta.hunger,
            happiness: self.happiness + delta.happiness,
            energy: self.energy + delta.energy,
            cleanliness: self.cleanliness + delta.cleanliness,
            health: self.health + delta.health,
        }
        .clamped()
    }

    pub fn is_within_bounds(&self) -> bool {
        [
            self.hunger,
            self.happiness,
            self.energy,
            self.cleanliness,
            self.health,
        ]
        .iter()
        .all(|v| (STAT_MIN..=STAT_MAX).contains(v))
    }
}

/// Advance stats by `elapsed_minutes` of wall-clock time.
///
/// Health is never decayed directly. It drains when the average of the other
/// four stats falls below 30 and regenerates slowly while that average stays
/// above 70.
pub fn apply_decay(stats: StatVector, elapsed_minutes: f32) -> StatVector {
    if !elapsed_minutes.is_finite() || elapsed_minutes < MIN_DECAY_MINUTES {
        return stats;
    }

    let mut next = StatVector {
        hunger: clamp_stat(stats.hunger - rates::HUNGER * elapsed_minutes),
        energy: clamp_stat(stats.energy - rates::ENERGY * elapsed_minutes),
        happiness: clamp_stat(stats.happiness - rates::HAPPINESS * elapsed_minutes),
        cleanliness: clamp_stat(stats.cleanliness - rates::CLEANLINESS * elapsed_minutes),
        health: stats.health,
    };

    let avg = next.average_needs();
    if avg < rates::HEALTH_DRAIN_BELOW {
        next.health -= (rates::HEALTH_DRAIN_BELOW - avg) * rates::HEALTH_DRAIN_FACTOR * elapsed_minutes;
    } else if avg > rates::HEALTH_REGEN_ABOVE && next.health < STAT_MAX {
        next.health += rates::HEALTH_REGEN * elapsed_minutes;
    }
    next.health = clamp_stat(next.health);

    next
}

/// Apply the fixed effect table for a care action
pub fn apply_action(stats: StatVector, action: ActionKind) -> StatVector {
    stats.apply_delta(action.effect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_decay_rates() {
        let s = apply_decay(StatVector::default(), 1.0);
        assert!(approx(s.hunger, 78.0));
        assert!(approx(s.energy, 78.5));
        assert!(approx(s.happiness, 79.0));
        assert!(approx(s.cleanliness, 78.5));
        // avg 78.5 > 70 but health already full
        assert!(approx(s.health, 100.0));
    }

    #[test]
    fn test_sub_threshold_tick_is_noop() {
        let stats = StatVector::new(12.0, 34.0, 56.0, 78.0, 90.0);
        assert_eq!(apply_decay(stats, 0.05), stats);
        assert_eq!(apply_decay(stats, -3.0), stats);
        assert_eq!(apply_decay(stats, f32::NAN), stats);
    }

    #[test]
    fn test_health_drains_when_needs_low() {
        let mut stats = StatVector::new(10.0, 10.0, 10.0, 10.0, 60.0);
        let mut prev = stats.health;
        for _ in 0..40 {
            stats = apply_decay(stats, 1.0);
            if prev > 0.0 {
                assert!(stats.health < prev);
            }
            prev = stats.health;
        }
        assert_eq!(stats.health, 0.0);
    }

    #[test]
    fn test_health_regenerates_when_needs_high() {
        let mut stats = StatVector::new(100.0, 100.0, 100.0, 100.0, 95.0);
        let first = apply_decay(stats, 0.5);
        assert!(first.health > stats.health);
        for _ in 0..100 {
            let next = apply_decay(stats, 0.5);
            if stats.health < 100.0 && next.average_needs() > 70.0 {
                assert!(next.health > stats.health);
            }
            stats = next;
        }
        assert!(stats.health <= 100.0);
    }

    #[test]
    fn test_health_unchanged_in_middle_band() {
        let stats = StatVector::new(50.0, 50.0, 50.0, 50.0, 40.0);
        assert!(approx(apply_decay(stats, 1.0).health, 40.0));
    }

    #[test]
    fn test_action_effects() {
        let base = StatVector::new(50.0, 50.0, 50.0, 50.0, 50.0);

        let fed = apply_action(base, ActionKind::Feed);
        assert_eq!((fed.hunger, fed.happiness), (80.0, 55.0));

        let slept = apply_action(base, ActionKind::Sleep);
        assert_eq!((slept.energy, slept.health), (100.0, 55.0));

        let played = apply_action(base, ActionKind::Play);
        assert_eq!((played.happiness, played.energy), (75.0, 40.0));

        let cleaned = apply_action(base, ActionKind::Clean);
        assert_eq!((cleaned.cleanliness, cleaned.happiness), (90.0, 60.0));

        let healed = apply_action(base, ActionKind::Medicine);
        assert_eq!(healed.health, 80.0);
    }

    #[test]
    fn test_action_clamps() {
        let full = StatVector::new(95.0, 98.0, 5.0, 100.0, 100.0);
        let fed = apply_action(full, ActionKind::Feed);
        assert_eq!(fed.hunger, 100.0);
        assert_eq!(fed.happiness, 100.0);
        let played = apply_action(full, ActionKind::Play);
        assert_eq!(played.energy, 0.0);
    }

    #[test]
    fn test_action_kind_parse() {
        for action in ActionKind::ALL {
            assert_eq!(ActionKind::from_str(action.as_str()), Some(action));
        }
        assert_eq!(ActionKind::from_str("dance"), None);
    }

    fn any_stats() -> impl Strategy<Value = StatVector> {
        (
            -500.0f32..500.0,
            -500.0f32..500.0,
            -500.0f32..500.0,
            -500.0f32..500.0,
            -500.0f32..500.0,
        )
            .prop_map(|(h, ha, e, c, he)| StatVector::new(h, ha, e, c, he))
    }

    proptest! {
        #[test]
        fn prop_decay_stays_in_bounds(stats in any_stats(), minutes in 0.0f32..100_000.0) {
            prop_assert!(apply_decay(stats, minutes).is_within_bounds());
        }

        #[test]
        fn prop_actions_stay_in_bounds(stats in any_stats(), idx in 0usize..5, repeats in 1usize..20) {
            let mut s = stats;
            for _ in 0..repeats {
                s = apply_action(s, ActionKind::ALL[idx]);
            }
            prop_assert!(s.is_within_bounds());
        }
    }
}
