//! Shared mini-game engine pieces
//!
//! Every mini-game is "timed spawner + physics/collision + difficulty ramp +
//! lives/score bookkeeping". The pieces common to all three live here:
//! - `Session`: score, lives, running flag and the exactly-once end event
//! - `EntityList`: id allocation and stable ordering
//! - `SpawnTimer`: interval-driven spawner
//! - `FixedStep`: frame delta to fixed simulation steps
//! - `GameEvent` / `GameListener`: what games report to the host
//! - difficulty curves

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Fixed simulation timestep (60 Hz, the rate all game tuning assumes)
pub const SIM_DT: f32 = 1.0 / 60.0;
/// Maximum substeps per frame to prevent spiral of death
pub const MAX_SUBSTEPS: u32 = 8;
/// Frame deltas above this are treated as a stall and capped
pub const MAX_FRAME_DT: f32 = 0.1;

/// Identifies a mini-game (and its best-score slot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameId {
    CatchFood,
    ClickFood,
    FoodJump,
}

impl GameId {
    pub const ALL: [GameId; 3] = [GameId::CatchFood, GameId::ClickFood, GameId::FoodJump];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::CatchFood => "catch_food",
            GameId::ClickFood => "click_food",
            GameId::FoodJump => "food_jump",
        }
    }
}

/// Food sprites used as falling items, click targets and platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodKind {
    Candies,
    Dimsam,
    Onigiri,
    RiceWithOmelette,
}

impl FoodKind {
    pub const ALL: [FoodKind; 4] = [
        FoodKind::Candies,
        FoodKind::Dimsam,
        FoodKind::Onigiri,
        FoodKind::RiceWithOmelette,
    ];

    pub fn random(rng: &mut Pcg32) -> Self {
        use rand::Rng;
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn name(&self) -> &'static str {
        match self {
            FoodKind::Candies => "Candies",
            FoodKind::Dimsam => "Dimsam",
            FoodKind::Onigiri => "Onigiri",
            FoodKind::RiceWithOmelette => "Rice with omelette",
        }
    }
}

/// Events a mini-game reports to its host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreChanged(u32),
    LivesChanged(u32),
    CurrencyEarned(u32),
    CurrencySpent(u32),
    /// Play the click feedback sound
    ClickSound,
    /// Terminal event, emitted exactly once per session
    GameEnded(u32),
    /// Follows `GameEnded` when the final score beats the stored best
    BestScoreUpdated(u32),
}

/// Callback-style view of `GameEvent`s; every method defaults to a no-op.
pub trait GameListener {
    fn on_score_change(&mut self, _score: u32) {}
    fn on_lives_change(&mut self, _lives: u32) {}
    fn on_currency_earned(&mut self, _amount: u32) {}
    fn on_currency_spent(&mut self, _amount: u32) {}
    fn on_click_sound(&mut self) {}
    fn on_game_end(&mut self, _final_score: u32) {}
    fn on_best_score_update(&mut self, _new_best: u32) {}
}

/// Forward a batch of events to a listener in order
pub fn dispatch<L: GameListener + ?Sized>(events: &[GameEvent], listener: &mut L) {
    for event in events {
        match *event {
            GameEvent::ScoreChanged(s) => listener.on_score_change(s),
            GameEvent::LivesChanged(l) => listener.on_lives_change(l),
            GameEvent::CurrencyEarned(n) => listener.on_currency_earned(n),
            GameEvent::CurrencySpent(n) => listener.on_currency_spent(n),
            GameEvent::ClickSound => listener.on_click_sound(),
            GameEvent::GameEnded(s) => listener.on_game_end(s),
            GameEvent::BestScoreUpdated(s) => listener.on_best_score_update(s),
        }
    }
}

/// Score/lives bookkeeping shared by all games
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    score: u32,
    lives: u32,
    max_lives: u32,
    running: bool,
    ended: bool,
    /// Best score known before this session, as stored by the economy
    best: u32,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl Session {
    /// A session that has not started yet
    pub fn idle(max_lives: u32) -> Self {
        Self {
            score: 0,
            lives: max_lives,
            max_lives,
            running: false,
            ended: false,
            best: 0,
            events: Vec::new(),
        }
    }

    /// Reset counters and mark running
    pub fn begin(&mut self) {
        self.score = 0;
        self.lives = self.max_lives;
        self.running = true;
        self.ended = false;
        self.events.push(GameEvent::ScoreChanged(0));
        self.events.push(GameEvent::LivesChanged(self.lives));
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn max_lives(&self) -> u32 {
        self.max_lives
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn best_score(&self) -> u32 {
        self.best
    }

    /// Seed the stored best; only ever raises it
    pub fn set_best_score(&mut self, best: u32) {
        self.best = self.best.max(best);
    }

    /// True once `GameEnded` has been emitted for this session
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn add_score(&mut self, points: u32) {
        if points == 0 {
            return;
        }
        self.score = self.score.saturating_add(points);
        self.events.push(GameEvent::ScoreChanged(self.score));
    }

    pub fn earn(&mut self, amount: u32) {
        if amount > 0 {
            self.events.push(GameEvent::CurrencyEarned(amount));
        }
    }

    pub fn spend(&mut self, amount: u32) {
        if amount > 0 {
            self.events.push(GameEvent::CurrencySpent(amount));
        }
    }

    pub fn click_sound(&mut self) {
        self.events.push(GameEvent::ClickSound);
    }

    /// Take one life. Ends the session when none remain and returns whether it
    /// just ended.
    pub fn lose_life(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        self.events.push(GameEvent::LivesChanged(self.lives));
        if self.lives == 0 {
            self.finish();
            return true;
        }
        false
    }

    /// Stop the session and emit the terminal event (once)
    pub fn finish(&mut self) {
        self.running = false;
        if self.ended {
            return;
        }
        self.ended = true;
        log::info!("Mini-game over, final score {}", self.score);
        self.events.push(GameEvent::GameEnded(self.score));
        if self.score > self.best {
            self.best = self.score;
            self.events.push(GameEvent::BestScoreUpdated(self.score));
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Unique per-session entity id
pub type EntityId = u32;

/// A falling item, click target, platform or coin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub pos: Vec2,
    pub kind: FoodKind,
    /// Fall speed or similar scalar velocity
    pub vel: Option<f32>,
    /// Seconds until automatic despawn
    pub lifetime: Option<f32>,
}

/// Entity storage with id allocation, kept sorted by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityList {
    items: Vec<Entity>,
    next_id: EntityId,
}

impl Default for EntityList {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }
}

impl EntityList {
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn spawn(&mut self, pos: Vec2, kind: FoodKind) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        // Ids only grow, so pushing keeps the list sorted
        self.items.push(Entity {
            id,
            pos,
            kind,
            vel: None,
            lifetime: None,
        });
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.items.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.items.iter_mut().find(|e| e.id == id)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.items.iter().position(|e| e.id == id)?;
        Some(self.items.remove(idx))
    }

    pub fn retain<F: FnMut(&Entity) -> bool>(&mut self, f: F) {
        self.items.retain(f);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entity> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.items
    }
}

/// Fires once every `interval` seconds of accumulated time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnTimer {
    elapsed: f32,
}

impl SpawnTimer {
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    /// Make the next `tick` fire regardless of interval
    pub fn fire_next(&mut self) {
        self.elapsed = f32::INFINITY;
    }

    /// Advance by `dt`; true when the interval has elapsed (timer restarts)
    pub fn tick(&mut self, dt: f32, interval: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= interval {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }
}

/// Converts variable frame deltas into fixed `SIM_DT` steps
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    /// Number of fixed steps to run for this frame
    pub fn steps(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt.min(MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog instead of spiralling
            self.accumulator = 0.0;
        }
        substeps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Difficulty curves
pub mod difficulty {
    /// Difficulty level `floor(score / per)`
    pub fn level(score: u32, per: u32) -> u32 {
        if per == 0 { 0 } else { score / per }
    }

    pub fn stepped(base: f32, step: f32, level: u32) -> f32 {
        base + level as f32 * step
    }

    /// Shrinking interval with a floor
    pub fn stepped_interval(initial: f32, decrease: f32, level: u32, floor: f32) -> f32 {
        (initial - level as f32 * decrease).max(floor)
    }

    /// Linear interpolation from `initial` to `min` by `progress` in [0,1]
    pub fn lerp_interval(initial: f32, min: f32, progress: f32) -> f32 {
        let p = progress.clamp(0.0, 1.0);
        (initial - (initial - min) * p).max(min)
    }
}

/// Common interface of the three games, used by hosts and the demo driver
pub trait MiniGame {
    fn id(&self) -> GameId;
    fn session(&self) -> &Session;
    fn session_mut(&mut self) -> &mut Session;
    /// Start (or restart) a round
    fn start(&mut self);
    /// Advance one fixed step of `dt` seconds
    fn step(&mut self, dt: f32);
    /// Close the game; a running session ends with its current score
    fn exit(&mut self);
    fn drain_events(&mut self) -> Vec<GameEvent>;
    fn fixed_step(&mut self) -> &mut FixedStep;

    /// Advance by a variable frame delta using fixed substeps
    fn advance(&mut self, frame_dt: f32) {
        let steps = self.fixed_step().steps(frame_dt);
        for _ in 0..steps {
            if !self.session().is_running() {
                break;
            }
            self.step(SIM_DT);
        }
    }

    fn score(&self) -> u32 {
        self.session().score()
    }

    /// Tell the game the stored best so it can report a new record
    fn set_best_score(&mut self, best: u32) {
        self.session_mut().set_best_score(best);
    }

    fn lives(&self) -> u32 {
        self.session().lives()
    }

    fn is_running(&self) -> bool {
        self.session().is_running()
    }
}

/// Seeded per-game RNG
pub fn game_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ends_once() {
        let mut s = Session::idle(2);
        s.begin();
        s.add_score(3);
        assert!(!s.lose_life());
        assert!(s.lose_life());
        assert!(!s.is_running());
        // Further losses and finishes are ignored
        assert!(!s.lose_life());
        s.finish();

        let ends: Vec<_> = s
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameEnded(_)))
            .collect();
        assert_eq!(ends, vec![GameEvent::GameEnded(3)]);
    }

    #[test]
    fn test_best_score_reported_after_end() {
        let mut s = Session::idle(3);
        s.set_best_score(5);
        s.begin();
        s.add_score(7);
        s.finish();
        let events = s.drain_events();
        let n = events.len();
        assert_eq!(
            events[n - 2..],
            [GameEvent::GameEnded(7), GameEvent::BestScoreUpdated(7)]
        );

        // A lower score next round is not a record
        s.begin();
        s.add_score(6);
        s.finish();
        assert!(
            !s.drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::BestScoreUpdated(_)))
        );
        assert_eq!(s.best_score(), 7);
    }

    #[test]
    fn test_entity_ids_unique_and_sorted() {
        let mut list = EntityList::default();
        let a = list.spawn(Vec2::ZERO, FoodKind::Candies);
        let b = list.spawn(Vec2::ONE, FoodKind::Onigiri);
        list.remove(a);
        let c = list.spawn(Vec2::ZERO, FoodKind::Dimsam);
        assert!(a < b && b < c);
        let ids: Vec<_> = list.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![b, c]);
    }

    #[test]
    fn test_spawn_timer() {
        let mut t = SpawnTimer::default();
        assert!(!t.tick(0.5, 1.0));
        assert!(t.tick(0.5, 1.0));
        assert!(!t.tick(0.1, 1.0));
        t.fire_next();
        assert!(t.tick(0.0, 1.0));
    }

    #[test]
    fn test_fixed_step_accumulates() {
        let mut fs = FixedStep::default();
        assert_eq!(fs.steps(SIM_DT * 0.5), 0);
        assert_eq!(fs.steps(SIM_DT * 0.6), 1);
        assert_eq!(fs.steps(-1.0), 0);
        // A long stall is capped
        assert!(fs.steps(5.0) <= MAX_SUBSTEPS);
    }

    #[test]
    fn test_difficulty_curves() {
        assert_eq!(difficulty::level(25, 10), 2);
        assert_eq!(difficulty::stepped(60.0, 15.0, 2), 90.0);
        assert_eq!(difficulty::stepped_interval(1.5, 0.1, 20, 0.5), 0.5);
        assert_eq!(difficulty::lerp_interval(1.5, 0.5, 0.5), 1.0);
        assert_eq!(difficulty::lerp_interval(1.5, 0.5, 2.0), 0.5);
    }

    #[derive(Default)]
    struct Recorder {
        earned: u32,
        ended: Option<u32>,
        best: Option<u32>,
    }

    impl GameListener for Recorder {
        fn on_currency_earned(&mut self, amount: u32) {
            self.earned += amount;
        }
        fn on_game_end(&mut self, final_score: u32) {
            self.ended = Some(final_score);
        }
        fn on_best_score_update(&mut self, new_best: u32) {
            self.best = Some(new_best);
        }
    }

    #[test]
    fn test_dispatch_routes_events() {
        let mut r = Recorder::default();
        dispatch(
            &[
                GameEvent::CurrencyEarned(2),
                GameEvent::ScoreChanged(9),
                GameEvent::CurrencyEarned(1),
                GameEvent::GameEnded(9),
                GameEvent::BestScoreUpdated(9),
            ],
            &mut r,
        );
        assert_eq!(r.earned, 3);
        assert_eq!(r.ended, Some(9));
        assert_eq!(r.best, Some(9));
    }
}
