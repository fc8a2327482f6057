//! Food-Jump: bounce upward on food platforms and grab coins
//!
//! The player stays at the horizontal center of a 400 px wide world; steering
//! slides the world instead. Landing on a platform while falling triggers an
//! automatic jump. The camera only ever moves up, new platforms are generated
//! above it and anything far enough below is pruned.
//!
//! Coordinates are pixels with y growing downward, so "up" is negative.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::{Rect, lands_on, within_reach};
use super::engine::{
    Entity, EntityId, EntityList, FixedStep, FoodKind, GameEvent, GameId, MiniGame, Session,
    game_rng,
};

/// Food-Jump tuning (per-second values are the 60 Hz per-frame ones scaled)
pub mod consts {
    pub const INITIAL_LIVES: u32 = 3;

    pub const WORLD_WIDTH: f32 = 400.0;
    /// Horizontal center of the player
    pub const PLAYER_X: f32 = 200.0;
    pub const PLAYER_SIZE: f32 = 50.0;
    pub const PLATFORM_SIZE: f32 = 80.0;
    pub const COIN_SIZE: f32 = 30.0;

    /// px/s^2 (0.5 px/frame^2)
    pub const GRAVITY: f32 = 1800.0;
    /// px/s (-12 px/frame)
    pub const JUMP_VELOCITY: f32 = -720.0;
    pub const LANDING_TOLERANCE: f32 = 20.0;

    /// Player top at the start of a round
    pub const START_Y: f32 = 300.0;
    pub const INITIAL_PLATFORMS: usize = 5;
    /// Vertical distance between consecutive platforms
    pub const PLATFORM_SPACING: f32 = 150.0;

    /// Camera keeps the player at least this far below its top edge
    pub const CAMERA_LEAD: f32 = 200.0;
    /// Platforms are generated until this far above the camera
    pub const GENERATE_AHEAD: f32 = 500.0;
    /// Entities this far below the camera are pruned
    pub const PRUNE_BELOW: f32 = 600.0;
    /// Falling this far below the camera costs a life
    pub const FALL_LIMIT: f32 = 500.0;
    pub const RESPAWN_OFFSET: f32 = 100.0;
    /// Extra drop below the lowest platform that re-allows its reuse
    pub const RESET_MARGIN: f32 = 50.0;

    /// World slide per step while steering
    pub const STEER_NUDGE: f32 = 5.0;

    pub const LANDING_POINTS: u32 = 5;
    pub const COIN_LANDING_POINTS: u32 = 10;
    pub const COIN_POINTS: u32 = 20;
    pub const COIN_VALUE: u32 = 2;
    /// Gap between a spawned coin and the platform top
    pub const COIN_LIFT: f32 = 10.0;
    /// Safety cap on platforms generated in a single step
    pub const MAX_GENERATED_PER_STEP: usize = 16;
}

use consts::*;

/// Held steering input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Steer {
    #[default]
    None,
    Left,
    Right,
}

pub struct FoodJumpGame {
    session: Session,
    rng: Pcg32,
    player_y: f32,
    velocity: f32,
    camera_y: f32,
    platforms: EntityList,
    coins: EntityList,
    landings: u32,
    last_platform: Option<EntityId>,
    steer: Steer,
    stepper: FixedStep,
}

impl FoodJumpGame {
    pub fn new(seed: u64) -> Self {
        Self {
            session: Session::idle(INITIAL_LIVES),
            rng: game_rng(seed),
            player_y: START_Y,
            velocity: 0.0,
            camera_y: 0.0,
            platforms: EntityList::default(),
            coins: EntityList::default(),
            landings: 0,
            last_platform: None,
            steer: Steer::None,
            stepper: FixedStep::default(),
        }
    }

    /// Player top edge
    pub fn player_y(&self) -> f32 {
        self.player_y
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn camera_y(&self) -> f32 {
        self.camera_y
    }

    pub fn landings(&self) -> u32 {
        self.landings
    }

    pub fn platforms(&self) -> &[Entity] {
        self.platforms.as_slice()
    }

    pub fn coins(&self) -> &[Entity] {
        self.coins.as_slice()
    }

    pub fn set_steer(&mut self, steer: Steer) {
        self.steer = steer;
    }

    /// Add a platform with its top-left corner at (`x`, `y`)
    pub fn spawn_platform(&mut self, x: f32, y: f32) -> EntityId {
        let kind = FoodKind::random(&mut self.rng);
        self.platforms.spawn(Vec2::new(x, y), kind)
    }

    fn spawn_random_platform(&mut self, y: f32) -> EntityId {
        let x = self.rng.random_range(0.0..WORLD_WIDTH - PLATFORM_SIZE);
        self.spawn_platform(x, y)
    }

    fn player_rect(&self) -> Rect {
        Rect::new(
            PLAYER_X - PLAYER_SIZE / 2.0,
            self.player_y,
            PLAYER_SIZE,
            PLAYER_SIZE,
        )
    }

    fn platform_rect(p: &Entity) -> Rect {
        Rect::new(p.pos.x, p.pos.y, PLATFORM_SIZE, PLATFORM_SIZE)
    }

    fn coin_rect(c: &Entity) -> Rect {
        Rect::new(c.pos.x, c.pos.y, COIN_SIZE, COIN_SIZE)
    }

    fn highest_platform_y(&self) -> Option<f32> {
        self.platforms.iter().map(|p| p.pos.y).reduce(f32::min)
    }

    fn lowest_platform_y(&self) -> Option<f32> {
        self.platforms.iter().map(|p| p.pos.y).reduce(f32::max)
    }

    fn apply_steer(&mut self) {
        let dx = match self.steer {
            Steer::None => return,
            Steer::Left => -STEER_NUDGE,
            Steer::Right => STEER_NUDGE,
        };
        for p in self.platforms.iter_mut() {
            p.pos.x = (p.pos.x + dx).clamp(0.0, WORLD_WIDTH - PLATFORM_SIZE);
        }
        for c in self.coins.iter_mut() {
            c.pos.x = (c.pos.x + dx).clamp(0.0, WORLD_WIDTH - COIN_SIZE);
        }
    }

    fn try_land(&mut self) {
        let body = self.player_rect();
        let falling = self.velocity > 0.0;
        let landed = self
            .platforms
            .iter()
            .filter(|p| Some(p.id) != self.last_platform)
            .find(|p| lands_on(&body, falling, &Self::platform_rect(p), LANDING_TOLERANCE))
            .map(|p| (p.id, p.pos, p.kind));
        let Some((id, pos, kind)) = landed else {
            return;
        };

        self.velocity = JUMP_VELOCITY;
        self.player_y = pos.y - PLAYER_SIZE;
        self.last_platform = Some(id);
        self.landings += 1;

        if self.landings % 2 == 0 {
            let coin = Vec2::new(
                pos.x + PLATFORM_SIZE / 2.0 - COIN_SIZE / 2.0,
                pos.y - COIN_SIZE - COIN_LIFT,
            );
            self.coins.spawn(coin, kind);
            self.session.add_score(COIN_LANDING_POINTS);
        } else {
            self.session.add_score(LANDING_POINTS);
        }
    }

    fn collect_coins(&mut self) {
        let body = self.player_rect();
        let before = self.coins.len();
        self.coins
            .retain(|c| !within_reach(&body, &Self::coin_rect(c)));
        let collected = (before - self.coins.len()) as u32;
        for _ in 0..collected {
            self.session.add_score(COIN_POINTS);
            self.session.earn(COIN_VALUE);
        }
    }

    fn generate_platforms(&mut self) {
        let mut highest = self
            .highest_platform_y()
            .unwrap_or(self.camera_y + FALL_LIMIT);
        let mut generated = 0;
        while self.camera_y - highest < GENERATE_AHEAD && generated < MAX_GENERATED_PER_STEP {
            highest -= PLATFORM_SPACING;
            self.spawn_random_platform(highest);
            generated += 1;
        }
    }
}

impl MiniGame for FoodJumpGame {
    fn id(&self) -> GameId {
        GameId::FoodJump
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn start(&mut self) {
        self.platforms.clear();
        self.coins.clear();
        self.player_y = START_Y;
        self.velocity = 0.0;
        self.camera_y = 0.0;
        self.landings = 0;
        self.last_platform = None;
        self.steer = Steer::None;
        self.stepper.reset();

        // First platform sits right under the player
        let base = START_Y + PLAYER_SIZE;
        self.spawn_platform(PLAYER_X - PLATFORM_SIZE / 2.0, base);
        for i in 1..INITIAL_PLATFORMS {
            self.spawn_random_platform(base - i as f32 * PLATFORM_SPACING);
        }

        self.session.begin();
        log::info!("Food-Jump started");
    }

    fn step(&mut self, dt: f32) {
        if !self.session.is_running() {
            return;
        }

        self.apply_steer();

        self.velocity += GRAVITY * dt;
        self.player_y += self.velocity * dt;

        let reset_line = self
            .lowest_platform_y()
            .map(|lowest| lowest + PLATFORM_SIZE + RESET_MARGIN);
        if reset_line.is_some_and(|line| self.player_y > line) {
            self.last_platform = None;
        }

        self.try_land();
        self.collect_coins();

        if self.player_y < self.camera_y + CAMERA_LEAD {
            self.camera_y = self.player_y - CAMERA_LEAD;
        }

        self.generate_platforms();

        let cutoff = self.camera_y + PRUNE_BELOW;
        self.platforms.retain(|p| p.pos.y < cutoff);
        self.coins.retain(|c| c.pos.y < cutoff);

        if self.player_y > self.camera_y + FALL_LIMIT {
            log::debug!("Food-Jump: fell at y={:.0}", self.player_y);
            if self.session.lose_life() {
                self.platforms.clear();
                self.coins.clear();
                return;
            }
            self.player_y = self.camera_y + RESPAWN_OFFSET;
            self.velocity = 0.0;
        }
    }

    fn exit(&mut self) {
        if self.session.is_running() {
            self.session.finish();
        }
        self.platforms.clear();
        self.coins.clear();
        self.steer = Steer::None;
        self.stepper.reset();
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        self.session.drain_events()
    }

    fn fixed_step(&mut self) -> &mut FixedStep {
        &mut self.stepper
    }
}
