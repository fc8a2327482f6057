//! The real-time driver for one pet
//!
//! The host calls `tick(now)` regularly (every frame is fine) and forwards
//! player requests. The session:
//! - runs stat decay on a fixed period and saves the result (debounced)
//! - walks the character animation and applies action effects on completion
//! - routes mini-game events into the economy
//! - keeps short-lived status messages and warnings
//! - reports everything the host should redraw as `SessionEvent`s
//!
//! Mood updates and unprompted stat messages are held back while the pet is
//! animating or a mini-game is open; the numbers keep decaying regardless.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::PetConfig;
use crate::economy::Economy;
use crate::error::{ActionError, StoreError};
use crate::minigame::{GameEvent, GameId};
use crate::persistence::{PetPatch, PetRecord, Reconciler, RemoteStore, SyncStatus};
use crate::pet::messages::{MessageKind, stat_message};
use crate::pet::stats::MIN_DECAY_MINUTES;
use crate::pet::{
    ActionKind, ActionProgress, Character, Mood, StatVector, apply_action, apply_decay,
    health_level, mood,
};

const MS_PER_MINUTE: f32 = 60_000.0;

/// Things the host should react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    MoodChanged(Mood),
    StatsChanged(StatVector),
    CoinsChanged(u32),
    Message(String),
    Warning(String),
    BestScoreUpdated { game: GameId, score: u32 },
    SyncStatusChanged(SyncStatus),
}

#[derive(Debug, Clone)]
struct Notice {
    text: String,
    expires_ms: u64,
}

/// Current speech bubble and error banner, each with an expiry
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    message: Option<Notice>,
    warning: Option<Notice>,
}

impl StatusBoard {
    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|n| n.text.as_str())
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_ref().map(|n| n.text.as_str())
    }

    fn show_message(&mut self, text: String, expires_ms: u64) {
        self.message = Some(Notice { text, expires_ms });
    }

    fn show_warning(&mut self, text: String, expires_ms: u64) {
        self.warning = Some(Notice { text, expires_ms });
    }

    fn expire(&mut self, now_ms: u64) {
        if self.message.as_ref().is_some_and(|n| now_ms >= n.expires_ms) {
            self.message = None;
        }
        if self.warning.as_ref().is_some_and(|n| now_ms >= n.expires_ms) {
            self.warning = None;
        }
    }
}

pub struct Session<S: RemoteStore> {
    config: PetConfig,
    stats: StatVector,
    mood: Mood,
    character: Character,
    economy: Economy,
    reconciler: Reconciler<S>,
    status: StatusBoard,
    rng: Pcg32,
    last_decay_ms: u64,
    last_decay_check_ms: u64,
    active_game: Option<GameId>,
    night: bool,
    wake_at_ms: Option<u64>,
    sync_status: SyncStatus,
    events: Vec<SessionEvent>,
}

impl<S: RemoteStore> Session<S> {
    /// Load the pet for `identity` (or run as a guest) and start the clock.
    ///
    /// Decay resumes from the record's last save, so time spent away counts
    /// on the first decay check.
    pub fn new(store: S, identity: Option<String>, config: PetConfig, now_ms: u64) -> Self {
        let mut reconciler = Reconciler::new(store, identity, config.max_save_defer_ms);
        reconciler.load(now_ms);
        let rng = Pcg32::seed_from_u64(config.rng_seed);

        let mut session = Self {
            config,
            stats: StatVector::default(),
            mood: Mood::Normal,
            character: Character::new(),
            economy: Economy::new(),
            reconciler,
            status: StatusBoard::default(),
            rng,
            last_decay_ms: now_ms,
            last_decay_check_ms: now_ms,
            active_game: None,
            night: false,
            wake_at_ms: None,
            sync_status: SyncStatus::Loading,
            events: Vec::new(),
        };
        session.adopt_record(now_ms);
        session.sync_events(now_ms);
        session
    }

    /// Take stats and coins from the reconciler's working copy
    fn adopt_record(&mut self, now_ms: u64) {
        let record = self.reconciler.record();
        self.stats = record.stats();
        self.economy = Economy::from_record(record);
        self.last_decay_ms = if record.last_updated > 0 && record.last_updated <= now_ms {
            record.last_updated
        } else {
            now_ms
        };
        self.last_decay_check_ms = now_ms;

        self.mood = mood(&self.stats);
        self.character.set_mood(self.mood);
        self.events.push(SessionEvent::StatsChanged(self.stats));
        self.events.push(SessionEvent::CoinsChanged(self.economy.coins()));
        self.events.push(SessionEvent::MoodChanged(self.mood));
    }

    pub fn config(&self) -> &PetConfig {
        &self.config
    }

    pub fn stats(&self) -> StatVector {
        self.stats
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn health_level(&self) -> u8 {
        health_level(&self.stats)
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn coins(&self) -> u32 {
        self.economy.coins()
    }

    pub fn best_score(&self, game: GameId) -> u32 {
        self.economy.best_score(game)
    }

    pub fn record(&self) -> &PetRecord {
        self.reconciler.record()
    }

    pub fn reconciler(&self) -> &Reconciler<S> {
        &self.reconciler
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync_status
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn active_game(&self) -> Option<GameId> {
        self.active_game
    }

    /// Night scene shown from the start of a nap until the pet wakes
    pub fn is_night(&self) -> bool {
        self.night
    }

    /// Presentation is frozen while animating or playing
    fn presentation_frozen(&self) -> bool {
        self.active_game.is_some() || self.character.is_animating()
    }

    /// Drive timers. Call with a monotonically non-decreasing clock.
    pub fn tick(&mut self, now_ms: u64) {
        if now_ms.saturating_sub(self.last_decay_check_ms) >= self.config.decay_period_ms {
            self.last_decay_check_ms = now_ms;
            self.run_decay(now_ms);
        }

        if let Some(action) = self.character.advance(now_ms) {
            self.complete_action(action, now_ms);
        }

        // Waking only ends the night; an action started since keeps running
        if self.wake_at_ms.is_some_and(|t| now_ms >= t) {
            self.wake_at_ms = None;
            self.night = false;
            log::debug!("Pet woke up");
            self.refresh_mood();
        }

        self.reconciler.poll(now_ms);
        self.sync_events(now_ms);
        self.status.expire(now_ms);
    }

    fn run_decay(&mut self, now_ms: u64) {
        let minutes = now_ms.saturating_sub(self.last_decay_ms) as f32 / MS_PER_MINUTE;
        if minutes < MIN_DECAY_MINUTES {
            return;
        }
        self.stats = apply_decay(self.stats, minutes);
        self.last_decay_ms = now_ms;
        self.stats_changed(now_ms);

        if !self.presentation_frozen() {
            self.refresh_mood();
            if let Some(kind) = stat_message(&self.stats, self.mood, &mut self.rng) {
                let line = kind.pick(&mut self.rng);
                self.show_message(line.to_string(), now_ms);
            }
        }
    }

    fn stats_changed(&mut self, now_ms: u64) {
        self.reconciler.stage(
            PetPatch::stats(&self.stats),
            now_ms,
            self.config.stats_save_delay_ms,
        );
        self.events.push(SessionEvent::StatsChanged(self.stats));
    }

    fn coins_changed(&mut self, now_ms: u64) {
        let coins = self.economy.coins();
        self.reconciler
            .stage(PetPatch::coins(coins), now_ms, self.config.coins_save_delay_ms);
        self.events.push(SessionEvent::CoinsChanged(coins));
    }

    fn refresh_mood(&mut self) {
        if self.presentation_frozen() {
            return;
        }
        let next = mood(&self.stats);
        self.character.set_mood(next);
        if next != self.mood {
            self.mood = next;
            self.events.push(SessionEvent::MoodChanged(next));
        }
    }

    fn show_message(&mut self, text: String, now_ms: u64) {
        let expires = now_ms + self.config.message_ms;
        self.status.show_message(text.clone(), expires);
        self.events.push(SessionEvent::Message(text));
    }

    fn show_warning(&mut self, text: String, now_ms: u64) {
        let expires = now_ms + self.config.warning_ms;
        self.status.show_warning(text.clone(), expires);
        self.events.push(SessionEvent::Warning(text));
    }

    /// Surface reconciler status changes and warnings
    fn sync_events(&mut self, now_ms: u64) {
        let status = self.reconciler.status();
        if status != self.sync_status {
            self.sync_status = status;
            self.events.push(SessionEvent::SyncStatusChanged(status));
        }
        for warning in self.reconciler.drain_warnings() {
            self.show_warning(warning, now_ms);
        }
    }

    /// Start a care action. Feeding pays for itself up front.
    pub fn perform(&mut self, action: ActionKind, now_ms: u64) -> Result<ActionProgress, ActionError> {
        if self.active_game.is_some() {
            return Err(ActionError::MiniGameActive);
        }
        if self.character.is_animating() {
            return Err(ActionError::Busy);
        }

        if action == ActionKind::Feed {
            let cost = self.config.feed_cost;
            if let Err(err) = self.economy.try_spend(cost) {
                self.show_warning(
                    format!("Not enough coins! Feeding costs {} coins.", cost),
                    now_ms,
                );
                return Err(err);
            }
            self.coins_changed(now_ms);
        }
        if action == ActionKind::Sleep {
            self.night = true;
            self.wake_at_ms = None;
        }

        let progress = self.character.start(action, now_ms)?;
        log::info!("Action: {}", action.as_str());
        if let ActionProgress::Completed(done) = progress {
            self.complete_action(done, now_ms);
        }
        Ok(progress)
    }

    fn complete_action(&mut self, action: ActionKind, now_ms: u64) {
        self.stats = apply_action(self.stats, action);
        self.last_decay_ms = now_ms;
        self.stats_changed(now_ms);

        let line = MessageKind::for_action(action).pick(&mut self.rng);
        self.show_message(line.to_string(), now_ms);

        if action == ActionKind::Sleep {
            self.wake_at_ms = Some(now_ms + self.config.wake_delay_ms);
        }
        self.refresh_mood();
    }

    /// "Go home": cut any animation short and leave the night scene. An
    /// interrupted action still takes effect.
    pub fn go_home(&mut self, now_ms: u64) {
        self.night = false;
        if self.active_game.is_some() {
            return;
        }
        if let Some(action) = self.character.reset() {
            self.complete_action(action, now_ms);
        }
        self.wake_at_ms = None;
        self.refresh_mood();
    }

    pub fn begin_minigame(&mut self, game: GameId) -> Result<(), ActionError> {
        if self.active_game.is_some() {
            return Err(ActionError::MiniGameActive);
        }
        log::info!("Opening {}", game.as_str());
        self.active_game = Some(game);
        Ok(())
    }

    /// Apply a batch of events drained from the running game
    pub fn handle_game_events(&mut self, game: GameId, events: &[GameEvent], now_ms: u64) {
        for event in events {
            match *event {
                GameEvent::CurrencyEarned(n) => {
                    self.economy.earn(n);
                    self.coins_changed(now_ms);
                }
                GameEvent::CurrencySpent(n) => {
                    self.economy.spend(n);
                    self.coins_changed(now_ms);
                }
                GameEvent::GameEnded(score) => {
                    self.end_minigame(game, score, now_ms);
                }
                GameEvent::ScoreChanged(_)
                | GameEvent::LivesChanged(_)
                | GameEvent::ClickSound
                | GameEvent::BestScoreUpdated(_) => {}
            }
        }
    }

    /// Close the open game with its final score. Returns the new best score
    /// when it improved. Ignored unless `game` is the one open.
    pub fn end_minigame(&mut self, game: GameId, final_score: u32, now_ms: u64) -> Option<u32> {
        if self.active_game != Some(game) {
            return None;
        }
        self.active_game = None;

        let improved = self.economy.record_best_score(game, final_score);
        if let Some(best) = improved {
            self.reconciler.stage(
                PetPatch::best(game, best),
                now_ms,
                self.config.coins_save_delay_ms,
            );
            self.events
                .push(SessionEvent::BestScoreUpdated { game, score: best });
        }

        if final_score > 0 {
            self.stats = apply_action(self.stats, ActionKind::Play);
            self.last_decay_ms = now_ms;
            self.stats_changed(now_ms);
            self.show_message(format!("Great! Score: {}", final_score), now_ms);
        }
        self.refresh_mood();
        improved
    }

    pub fn rename(&mut self, name: &str, now_ms: u64) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        self.reconciler
            .stage(PetPatch::name(name), now_ms, self.config.stats_save_delay_ms);
        self.sync_events(now_ms);
    }

    /// Manual save of everything. Guests have nowhere to save to.
    pub fn save_now(&mut self, now_ms: u64) -> Result<(), StoreError> {
        if self.reconciler.is_guest() {
            self.show_message("Log in to save your pet!".to_string(), now_ms);
            return Ok(());
        }
        let mut patch = PetPatch::stats(&self.stats);
        patch.absorb(self.economy.to_patch());
        self.reconciler
            .stage(patch, now_ms, self.config.stats_save_delay_ms);
        let result = self.reconciler.save_now(now_ms);
        if result.is_ok() {
            self.show_message("Saved!".to_string(), now_ms);
        }
        self.sync_events(now_ms);
        result
    }

    /// Manual load: replace local state with the stored pet
    pub fn reload(&mut self, now_ms: u64) {
        self.reconciler.reload(now_ms);
        self.adopt_record(now_ms);
        if self.reconciler.last_error().is_none() {
            self.show_message("Loaded!".to_string(), now_ms);
        }
        self.sync_events(now_ms);
    }

    /// Final save, then continue as a guest on a fresh pet. When the save
    /// fails the session stays signed in with its unsaved changes, so the
    /// caller can retry.
    pub fn logout(&mut self, now_ms: u64) -> Result<(), StoreError> {
        if !self.reconciler.is_guest() {
            self.save_now(now_ms)?;
        }
        self.reconciler.sign_out();
        self.character.reset();
        self.active_game = None;
        self.night = false;
        self.wake_at_ms = None;
        self.adopt_record(now_ms);
        self.sync_events(now_ms);
        Ok(())
    }

    /// Back to default stats (coins and best scores are kept)
    pub fn reset_pet(&mut self, now_ms: u64) {
        self.stats = StatVector::default();
        self.last_decay_ms = now_ms;
        self.character.reset();
        self.night = false;
        self.wake_at_ms = None;
        self.stats_changed(now_ms);
        self.refresh_mood();
        self.sync_events(now_ms);
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}
