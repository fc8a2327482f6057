//! Catch-Food: move a paddle to catch food falling from the top
//!
//! Coordinates are percentages of the play area (0-100 on both axes, y grows
//! downward). Difficulty is tied to score, not time: every 10 points items
//! fall faster and spawn more often.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::{Rect, item_caught};
use super::engine::{
    Entity, EntityId, EntityList, FixedStep, FoodKind, GameEvent, GameId, MiniGame, Session,
    SpawnTimer, difficulty, game_rng,
};

/// Catch-Food tuning
pub mod consts {
    pub const INITIAL_LIVES: u32 = 3;

    /// Fall speed in %/s (1% per frame at 60 Hz)
    pub const INITIAL_FALL_SPEED: f32 = 60.0;
    /// Extra fall speed per difficulty level
    pub const FALL_SPEED_STEP: f32 = 15.0;

    /// Seconds between spawns at level 0
    pub const INITIAL_SPAWN_INTERVAL: f32 = 1.5;
    pub const SPAWN_INTERVAL_STEP: f32 = 0.1;
    pub const MIN_SPAWN_INTERVAL: f32 = 0.5;

    /// Points per difficulty level
    pub const SCORE_PER_LEVEL: u32 = 10;

    pub const PADDLE_WIDTH: f32 = 10.0;
    pub const PADDLE_HEIGHT: f32 = 5.0;
    /// Top of the paddle band
    pub const PADDLE_Y: f32 = 85.0;
    pub const PADDLE_MIN_X: f32 = 5.0;
    pub const PADDLE_MAX_X: f32 = 95.0;
    pub const PADDLE_START_X: f32 = 50.0;

    pub const ITEM_SIZE: f32 = 6.0;
    pub const SPAWN_MIN_X: f32 = 5.0;
    pub const SPAWN_MAX_X: f32 = 95.0;
    /// Items whose top reaches this are lost
    pub const FLOOR_Y: f32 = 100.0;

    pub const POINTS_PER_CATCH: u32 = 1;
    pub const COINS_PER_CATCH: u32 = 1;
}

use consts::*;

pub struct CatchFoodGame {
    session: Session,
    rng: Pcg32,
    items: EntityList,
    paddle_x: f32,
    drag_offset: Option<f32>,
    spawn_timer: SpawnTimer,
    stepper: FixedStep,
}

impl CatchFoodGame {
    pub fn new(seed: u64) -> Self {
        Self {
            session: Session::idle(INITIAL_LIVES),
            rng: game_rng(seed),
            items: EntityList::default(),
            paddle_x: PADDLE_START_X,
            drag_offset: None,
            spawn_timer: SpawnTimer::default(),
            stepper: FixedStep::default(),
        }
    }

    pub fn paddle_x(&self) -> f32 {
        self.paddle_x
    }

    pub fn items(&self) -> &[Entity] {
        self.items.as_slice()
    }

    /// Move the paddle to an absolute position (clamped)
    pub fn set_paddle_x(&mut self, x: f32) {
        if !self.session.is_running() || !x.is_finite() {
            return;
        }
        self.paddle_x = x.clamp(PADDLE_MIN_X, PADDLE_MAX_X);
    }

    /// Grab the paddle, remembering where on it the pointer landed
    pub fn begin_drag(&mut self, pointer_x: f32) {
        if !self.session.is_running() {
            return;
        }
        self.drag_offset = Some(pointer_x - self.paddle_x);
    }

    pub fn drag_to(&mut self, pointer_x: f32) {
        if let Some(offset) = self.drag_offset {
            self.set_paddle_x(pointer_x - offset);
        }
    }

    pub fn end_drag(&mut self) {
        self.drag_offset = None;
    }

    fn level(&self) -> u32 {
        difficulty::level(self.session.score(), SCORE_PER_LEVEL)
    }

    /// Current fall speed for newly spawned items (%/s)
    pub fn fall_speed(&self) -> f32 {
        difficulty::stepped(INITIAL_FALL_SPEED, FALL_SPEED_STEP, self.level())
    }

    /// Current seconds between spawns
    pub fn spawn_interval(&self) -> f32 {
        difficulty::stepped_interval(
            INITIAL_SPAWN_INTERVAL,
            SPAWN_INTERVAL_STEP,
            self.level(),
            MIN_SPAWN_INTERVAL,
        )
    }

    /// Drop an item with its top at `y`, falling at the current speed
    pub fn spawn_item(&mut self, x: f32, y: f32) -> EntityId {
        let kind = FoodKind::random(&mut self.rng);
        let speed = self.fall_speed();
        let id = self.items.spawn(Vec2::new(x, y), kind);
        if let Some(item) = self.items.get_mut(id) {
            item.vel = Some(speed);
        }
        id
    }

    fn paddle_rect(&self) -> Rect {
        Rect::new(
            self.paddle_x - PADDLE_WIDTH / 2.0,
            PADDLE_Y,
            PADDLE_WIDTH,
            PADDLE_HEIGHT,
        )
    }

    fn item_rect(item: &Entity) -> Rect {
        Rect::new(item.pos.x - ITEM_SIZE / 2.0, item.pos.y, ITEM_SIZE, ITEM_SIZE)
    }
}

impl MiniGame for CatchFoodGame {
    fn id(&self) -> GameId {
        GameId::CatchFood
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn start(&mut self) {
        self.items.clear();
        self.paddle_x = PADDLE_START_X;
        self.drag_offset = None;
        self.spawn_timer.reset();
        self.stepper.reset();
        self.session.begin();
        log::info!("Catch-Food started");
    }

    fn step(&mut self, dt: f32) {
        if !self.session.is_running() {
            return;
        }

        if self.spawn_timer.tick(dt, self.spawn_interval()) {
            let x = self.rng.random_range(SPAWN_MIN_X..SPAWN_MAX_X);
            self.spawn_item(x, 0.0);
        }

        for item in self.items.iter_mut() {
            item.pos.y += item.vel.unwrap_or(INITIAL_FALL_SPEED) * dt;
        }

        let before = self.items.len();
        self.items.retain(|item| item.pos.y < FLOOR_Y);
        let lost = before - self.items.len();
        // At most one life per frame, however many items fell off together
        if lost > 0 {
            log::debug!("Catch-Food: {} item(s) missed", lost);
            if self.session.lose_life() {
                self.items.clear();
                return;
            }
        }

        let paddle = self.paddle_rect();
        let before = self.items.len();
        self.items
            .retain(|item| !item_caught(&Self::item_rect(item), &paddle));
        let caught = (before - self.items.len()) as u32;
        if caught > 0 {
            self.session.add_score(caught * POINTS_PER_CATCH);
            self.session.earn(caught * COINS_PER_CATCH);
        }
    }

    fn exit(&mut self) {
        if self.session.is_running() {
            self.session.finish();
        }
        self.items.clear();
        self.drag_offset = None;
        self.stepper.reset();
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        self.session.drain_events()
    }

    fn fixed_step(&mut self) -> &mut FixedStep {
        &mut self.stepper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minigame::engine::SIM_DT;

    fn game_ended_count(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameEnded(_)))
            .count()
    }

    #[test]
    fn test_three_misses_end_the_game_once() {
        let mut game = CatchFoodGame::new(42);
        game.start();
        game.set_paddle_x(5.0);

        // Staggered so each one falls off on a different frame
        game.spawn_item(90.0, 0.0);
        game.spawn_item(90.0, -10.0);
        game.spawn_item(90.0, -20.0);

        let mut events = Vec::new();
        let mut lives_seen = vec![game.lives()];
        for _ in 0..600 {
            game.step(SIM_DT);
            events.extend(game.drain_events());
            if game.lives() != *lives_seen.last().unwrap() {
                lives_seen.push(game.lives());
            }
        }

        assert_eq!(lives_seen, vec![3, 2, 1, 0]);
        assert!(!game.is_running());
        assert_eq!(game_ended_count(&events), 1);
        assert!(events.contains(&GameEvent::GameEnded(game.score())));
    }

    #[test]
    fn test_simultaneous_misses_cost_one_life() {
        let mut game = CatchFoodGame::new(1);
        game.start();
        game.set_paddle_x(5.0);
        game.spawn_item(60.0, 99.5);
        game.spawn_item(70.0, 99.5);
        game.spawn_item(80.0, 99.5);
        game.step(SIM_DT);
        assert_eq!(game.lives(), 2);
        assert!(game.items().is_empty());
    }

    #[test]
    fn test_catch_scores_and_pays() {
        let mut game = CatchFoodGame::new(7);
        game.start();
        game.set_paddle_x(50.0);
        game.drain_events();

        game.spawn_item(50.0, 78.5);
        game.step(SIM_DT);

        assert_eq!(game.score(), 1);
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::CurrencyEarned(1)));
        assert!(events.contains(&GameEvent::ScoreChanged(1)));
        assert!(game.items().is_empty());
    }

    #[test]
    fn test_difficulty_follows_score() {
        let mut game = CatchFoodGame::new(3);
        game.start();
        assert_eq!(game.fall_speed(), INITIAL_FALL_SPEED);
        assert_eq!(game.spawn_interval(), INITIAL_SPAWN_INTERVAL);

        game.session.add_score(25);
        assert_eq!(game.fall_speed(), INITIAL_FALL_SPEED + 2.0 * FALL_SPEED_STEP);
        assert!((game.spawn_interval() - 1.3).abs() < 1e-5);

        game.session.add_score(1000);
        assert_eq!(game.spawn_interval(), MIN_SPAWN_INTERVAL);
    }

    #[test]
    fn test_paddle_clamped_and_drag_keeps_offset() {
        let mut game = CatchFoodGame::new(9);
        game.start();
        game.set_paddle_x(150.0);
        assert_eq!(game.paddle_x(), PADDLE_MAX_X);

        game.set_paddle_x(50.0);
        game.begin_drag(53.0);
        game.drag_to(63.0);
        assert_eq!(game.paddle_x(), 60.0);
        game.end_drag();
        game.drag_to(10.0);
        assert_eq!(game.paddle_x(), 60.0);
    }

    #[test]
    fn test_spawner_runs_on_interval() {
        let mut game = CatchFoodGame::new(11);
        game.start();
        // Just under one interval: nothing yet
        for _ in 0..89 {
            game.step(SIM_DT);
        }
        assert!(game.items().is_empty());
        for _ in 0..2 {
            game.step(SIM_DT);
        }
        assert_eq!(game.items().len(), 1);
    }

    #[test]
    fn test_beating_stored_best_is_reported() {
        let mut game = CatchFoodGame::new(7);
        game.set_best_score(0);
        game.start();
        game.set_paddle_x(50.0);
        game.spawn_item(50.0, 78.5);
        game.step(SIM_DT);
        game.exit();

        let events = game.drain_events();
        assert_eq!(
            events[events.len() - 2..],
            [GameEvent::GameEnded(1), GameEvent::BestScoreUpdated(1)]
        );

        // Matching the best on the next round is no record
        game.start();
        game.set_paddle_x(50.0);
        game.spawn_item(50.0, 78.5);
        game.step(SIM_DT);
        game.exit();
        assert!(!game.drain_events().contains(&GameEvent::BestScoreUpdated(1)));
    }

    #[test]
    fn test_exit_ends_running_session() {
        let mut game = CatchFoodGame::new(5);
        game.start();
        game.spawn_item(20.0, 10.0);
        game.exit();
        assert!(!game.is_running());
        assert!(game.items().is_empty());
        let events = game.drain_events();
        assert_eq!(game_ended_count(&events), 1);
        // Exiting again does not emit another end
        game.exit();
        assert_eq!(game_ended_count(&game.drain_events()), 0);
    }
}
