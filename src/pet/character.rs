//! Character animation state machine
//!
//! A care action plays a short scripted sequence of animation phases. While
//! the sequence runs, input is locked and mood changes are ignored so the
//! animation is not interrupted. Phases and durations are plain data; the
//! machine is advanced by comparing deadlines against the host clock.

use serde::{Deserialize, Serialize};

use super::mood::Mood;
use super::stats::ActionKind;
use crate::error::CharacterError;

/// What the character sprite is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterState {
    /// Resting, showing the mood derived from stats
    Idle(Mood),
    Eating,
    Jumping,
    Sleeping,
}

impl Default for CharacterState {
    fn default() -> Self {
        CharacterState::Idle(Mood::Normal)
    }
}

/// One timed animation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub state: CharacterState,
    pub duration_ms: u64,
}

const FEED_PHASES: [Phase; 2] = [
    Phase {
        state: CharacterState::Eating,
        duration_ms: 800,
    },
    Phase {
        state: CharacterState::Jumping,
        duration_ms: 1000,
    },
];
const SLEEP_PHASES: [Phase; 1] = [Phase {
    state: CharacterState::Sleeping,
    duration_ms: 2000,
}];
const PLAY_PHASES: [Phase; 1] = [Phase {
    state: CharacterState::Jumping,
    duration_ms: 1500,
}];
const CLEAN_PHASES: [Phase; 1] = [Phase {
    state: CharacterState::Jumping,
    duration_ms: 1000,
}];

/// Animation script for an action (empty = completes instantly)
pub fn phases(action: ActionKind) -> &'static [Phase] {
    match action {
        ActionKind::Feed => &FEED_PHASES,
        ActionKind::Sleep => &SLEEP_PHASES,
        ActionKind::Play => &PLAY_PHASES,
        ActionKind::Clean => &CLEAN_PHASES,
        ActionKind::Medicine => &[],
    }
}

/// Total lock time for an action
pub fn total_duration_ms(action: ActionKind) -> u64 {
    phases(action).iter().map(|p| p.duration_ms).sum()
}

/// Result of starting an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionProgress {
    /// Animation running; completion arrives from `advance`
    Animating,
    /// No animation for this action; it completed on the spot
    Completed(ActionKind),
}

#[derive(Debug, Clone, Copy)]
struct Animation {
    action: ActionKind,
    phase_index: usize,
    phase_started_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Character {
    state: CharacterState,
    mood: Mood,
    animation: Option<Animation>,
}

impl Character {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CharacterState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Action currently playing, if any
    pub fn current_action(&self) -> Option<ActionKind> {
        self.animation.map(|a| a.action)
    }

    /// Show a mood. Ignored while an animation holds the sprite.
    pub fn set_mood(&mut self, mood: Mood) {
        if self.is_animating() {
            return;
        }
        self.mood = mood;
        self.state = CharacterState::Idle(mood);
    }

    /// Begin an action animation. Requests while animating are rejected.
    pub fn start(&mut self, action: ActionKind, now_ms: u64) -> Result<ActionProgress, CharacterError> {
        if self.is_animating() {
            return Err(CharacterError::Busy);
        }

        match phases(action).first() {
            None => Ok(ActionProgress::Completed(action)),
            Some(first) => {
                self.state = first.state;
                self.animation = Some(Animation {
                    action,
                    phase_index: 0,
                    phase_started_ms: now_ms,
                });
                log::debug!("Character started {} animation", action.as_str());
                Ok(ActionProgress::Animating)
            }
        }
    }

    /// Move through elapsed phases. Returns the action exactly once, when its
    /// final phase ends and input unlocks.
    pub fn advance(&mut self, now_ms: u64) -> Option<ActionKind> {
        let mut anim = self.animation?;
        let script = phases(anim.action);

        loop {
            let phase = script[anim.phase_index];
            let phase_end = anim.phase_started_ms + phase.duration_ms;
            if now_ms < phase_end {
                self.state = phase.state;
                self.animation = Some(anim);
                return None;
            }

            anim.phase_index += 1;
            anim.phase_started_ms = phase_end;
            if anim.phase_index >= script.len() {
                self.animation = None;
                self.state = CharacterState::Idle(self.mood);
                return Some(anim.action);
            }
        }
    }

    /// Stop any running animation and return to `Idle(Normal)`. The
    /// interrupted action is returned instead of being completed; the caller
    /// decides whether its effect still applies.
    pub fn reset(&mut self) -> Option<ActionKind> {
        let interrupted = self.animation.take().map(|anim| anim.action);
        self.mood = Mood::Normal;
        self.state = CharacterState::Idle(Mood::Normal);
        interrupted
    }
}
