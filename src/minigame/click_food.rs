//! Click-Food: tap food before it disappears, but never the forbidden kind
//!
//! A round starts with a short warning that names the forbidden food, then
//! runs for a fixed time. Items pop up at random spots and vanish after a
//! lifetime that shrinks every few seconds; the spawn rate ramps with round
//! progress. Clicking the forbidden food costs coins and a life.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::Rect;
use super::engine::{
    Entity, EntityId, EntityList, FixedStep, FoodKind, GameEvent, GameId, MiniGame, Session,
    SpawnTimer, difficulty, game_rng,
};

/// Click-Food tuning
pub mod consts {
    pub const INITIAL_LIVES: u32 = 3;

    /// Logical arena size
    pub const ARENA_WIDTH: f32 = 400.0;
    pub const ARENA_HEIGHT: f32 = 600.0;
    pub const ITEM_SIZE: f32 = 64.0;
    /// Spawn area (top-left corner of the item)
    pub const SPAWN_MAX_X: f32 = ARENA_WIDTH - 100.0;
    pub const SPAWN_MIN_Y: f32 = 100.0;
    pub const SPAWN_MAX_Y: f32 = ARENA_HEIGHT - 100.0;

    pub const ROUND_SECONDS: f32 = 30.0;
    pub const WARNING_SECONDS: f32 = 3.0;

    pub const INITIAL_SPAWN_INTERVAL: f32 = 1.5;
    pub const MIN_SPAWN_INTERVAL: f32 = 0.5;

    pub const INITIAL_LIFETIME: f32 = 2.0;
    pub const MIN_LIFETIME: f32 = 0.5;
    pub const LIFETIME_DECREASE: f32 = 0.3;
    /// Lifetime shrinks once per epoch of running time
    pub const LIFETIME_EPOCH: f32 = 7.0;

    /// Clicked items linger this long before removal
    pub const CLICKED_LINGER: f32 = 0.2;

    pub const FORBIDDEN_PENALTY: u32 = 2;
}

use consts::*;

/// Item lifetime for food spawned after `elapsed` seconds of play
pub fn lifetime_at(elapsed: f32) -> f32 {
    let epochs = (elapsed.max(0.0) / LIFETIME_EPOCH).floor();
    (INITIAL_LIFETIME - epochs * LIFETIME_DECREASE).max(MIN_LIFETIME)
}

/// Seconds between spawns after `elapsed` seconds of play
pub fn spawn_interval_at(elapsed: f32) -> f32 {
    difficulty::lerp_interval(
        INITIAL_SPAWN_INTERVAL,
        MIN_SPAWN_INTERVAL,
        elapsed / ROUND_SECONDS,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    /// Forbidden food is being announced; nothing spawns yet
    Warning { remaining: f32 },
    Playing,
    Over,
}

/// What a click did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Scored,
    Penalized,
    /// Missed, already clicked, or not accepting clicks
    Ignored,
}

pub struct ClickFoodGame {
    session: Session,
    rng: Pcg32,
    phase: Phase,
    forbidden: Option<FoodKind>,
    items: EntityList,
    clicked: Vec<EntityId>,
    elapsed: f32,
    spawn_timer: SpawnTimer,
    stepper: FixedStep,
}

impl ClickFoodGame {
    pub fn new(seed: u64) -> Self {
        Self {
            session: Session::idle(INITIAL_LIVES),
            rng: game_rng(seed),
            phase: Phase::Idle,
            forbidden: None,
            items: EntityList::default(),
            clicked: Vec::new(),
            elapsed: 0.0,
            spawn_timer: SpawnTimer::default(),
            stepper: FixedStep::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn in_warning(&self) -> bool {
        matches!(self.phase, Phase::Warning { .. })
    }

    /// Food that must not be clicked this round
    pub fn forbidden(&self) -> Option<FoodKind> {
        self.forbidden
    }

    pub fn items(&self) -> &[Entity] {
        self.items.as_slice()
    }

    pub fn is_clicked(&self, id: EntityId) -> bool {
        self.clicked.contains(&id)
    }

    /// Countdown shown to the player, rounded up to whole seconds
    pub fn seconds_left(&self) -> u32 {
        match self.phase {
            Phase::Idle | Phase::Warning { .. } => ROUND_SECONDS as u32,
            Phase::Playing => (ROUND_SECONDS - self.elapsed).max(0.0).ceil() as u32,
            Phase::Over => 0,
        }
    }

    /// Lifetime given to items spawned now
    pub fn current_lifetime(&self) -> f32 {
        lifetime_at(self.elapsed)
    }

    /// Place an item with the current lifetime
    pub fn spawn_item(&mut self, pos: Vec2, kind: FoodKind) -> EntityId {
        let lifetime = self.current_lifetime();
        let id = self.items.spawn(pos, kind);
        if let Some(item) = self.items.get_mut(id) {
            item.lifetime = Some(lifetime);
        }
        id
    }

    fn spawn_random(&mut self) {
        let x = self.rng.random_range(0.0..SPAWN_MAX_X);
        let y = self.rng.random_range(SPAWN_MIN_Y..SPAWN_MAX_Y);
        let kind = FoodKind::random(&mut self.rng);
        self.spawn_item(Vec2::new(x, y), kind);
    }

    fn item_rect(item: &Entity) -> Rect {
        Rect::new(item.pos.x, item.pos.y, ITEM_SIZE, ITEM_SIZE)
    }

    /// Click an item by id
    pub fn click(&mut self, id: EntityId) -> ClickOutcome {
        if self.phase != Phase::Playing || !self.session.is_running() {
            return ClickOutcome::Ignored;
        }
        if self.is_clicked(id) {
            return ClickOutcome::Ignored;
        }
        let Some(item) = self.items.get_mut(id) else {
            return ClickOutcome::Ignored;
        };

        item.lifetime = Some(item.lifetime.unwrap_or(CLICKED_LINGER).min(CLICKED_LINGER));
        let kind = item.kind;
        self.clicked.push(id);

        if Some(kind) == self.forbidden {
            log::debug!("Click-Food: forbidden {} clicked", kind.name());
            self.session.spend(FORBIDDEN_PENALTY);
            if self.session.lose_life() {
                self.end_round();
            }
            ClickOutcome::Penalized
        } else {
            self.session.add_score(1);
            self.session.earn(1);
            self.session.click_sound();
            ClickOutcome::Scored
        }
    }

    /// Click at a point; the newest live item under it takes the click
    pub fn click_at(&mut self, point: Vec2) -> ClickOutcome {
        let hit = self
            .items
            .iter()
            .rev()
            .filter(|item| !self.clicked.contains(&item.id))
            .find(|item| Self::item_rect(item).contains(point))
            .map(|item| item.id);
        match hit {
            Some(id) => self.click(id),
            None => ClickOutcome::Ignored,
        }
    }

    fn end_round(&mut self) {
        self.phase = Phase::Over;
        self.session.finish();
        self.items.clear();
        self.clicked.clear();
    }
}

impl MiniGame for ClickFoodGame {
    fn id(&self) -> GameId {
        GameId::ClickFood
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn start(&mut self) {
        self.forbidden = Some(FoodKind::random(&mut self.rng));
        self.items.clear();
        self.clicked.clear();
        self.elapsed = 0.0;
        self.spawn_timer.reset();
        self.stepper.reset();
        self.phase = Phase::Warning {
            remaining: WARNING_SECONDS,
        };
        self.session.begin();
        log::info!(
            "Click-Food started, forbidden food: {}",
            self.forbidden.map(|f| f.name()).unwrap_or("none")
        );
    }

    fn step(&mut self, dt: f32) {
        if !self.session.is_running() {
            return;
        }

        match self.phase {
            Phase::Warning { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.phase = Phase::Playing;
                    // First item appears as soon as play begins
                    self.spawn_timer.fire_next();
                } else {
                    self.phase = Phase::Warning { remaining };
                }
                return;
            }
            Phase::Playing => {}
            Phase::Idle | Phase::Over => return,
        }

        self.elapsed += dt;

        for item in self.items.iter_mut() {
            if let Some(life) = item.lifetime.as_mut() {
                *life -= dt;
            }
        }
        self.items
            .retain(|item| item.lifetime.is_none_or(|life| life > 0.0));
        let items = &self.items;
        self.clicked.retain(|id| items.get(*id).is_some());

        if self.elapsed >= ROUND_SECONDS {
            log::debug!("Click-Food: time up");
            self.end_round();
            return;
        }

        if self.spawn_timer.tick(dt, spawn_interval_at(self.elapsed)) {
            self.spawn_random();
        }
    }

    fn exit(&mut self) {
        if self.session.is_running() {
            self.end_round();
        } else {
            self.items.clear();
            self.clicked.clear();
        }
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

    fn started(seed: u64) -> ClickFoodGame {
        let mut game = ClickFoodGame::new(seed);
        game.start();
        for _ in 0..1000 {
            if !game.in_warning() {
                break;
            }
            game.step(SIM_DT);
        }
        assert_eq!(game.phase(), Phase::Playing);
        game
    }

    fn allowed_kind(game: &ClickFoodGame) -> FoodKind {
        FoodKind::ALL
            .into_iter()
            .find(|k| Some(*k) != game.forbidden())
            .unwrap()
    }

    #[test]
    fn test_warning_delays_spawning() {
        let mut game = ClickFoodGame::new(1);
        game.start();
        assert!(game.in_warning());
        assert!(game.forbidden().is_some());
        for _ in 0..170 {
            game.step(SIM_DT);
        }
        assert!(game.items().is_empty());
        assert_eq!(game.seconds_left(), 30);

        for _ in 0..12 {
            game.step(SIM_DT);
        }
        assert_eq!(game.phase(), Phase::Playing);
        // First spawn is immediate once play begins
        assert_eq!(game.items().len(), 1);
    }

    #[test]
    fn test_forbidden_click_costs_one_life_and_coins() {
        let mut game = started(2);
        game.drain_events();
        let forbidden = game.forbidden().unwrap();
        let id = game.spawn_item(Vec2::new(10.0, 150.0), forbidden);

        assert_eq!(game.click(id), ClickOutcome::Penalized);
        assert_eq!(game.lives(), 2);
        assert_eq!(game.score(), 0);

        let events = game.drain_events();
        assert!(events.contains(&GameEvent::CurrencySpent(FORBIDDEN_PENALTY)));
        assert!(events.contains(&GameEvent::LivesChanged(2)));
        assert!(!events.contains(&GameEvent::ClickSound));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::ScoreChanged(_))));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::CurrencyEarned(_))));

        // A second click on the same item does nothing
        assert_eq!(game.click(id), ClickOutcome::Ignored);
        assert_eq!(game.lives(), 2);
    }

    #[test]
    fn test_good_click_scores_and_lingers() {
        let mut game = started(3);
        game.drain_events();
        let kind = allowed_kind(&game);
        let id = game.spawn_item(Vec2::new(10.0, 150.0), kind);

        assert_eq!(game.click(id), ClickOutcome::Scored);
        assert_eq!(game.score(), 1);
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::CurrencyEarned(1)));
        assert!(events.contains(&GameEvent::ClickSound));

        assert!(game.is_clicked(id));
        for _ in 0..6 {
            game.step(SIM_DT);
        }
        assert!(game.items().iter().any(|e| e.id == id));
        for _ in 0..8 {
            game.step(SIM_DT);
        }
        assert!(!game.items().iter().any(|e| e.id == id));
        assert!(!game.is_clicked(id));
    }

    #[test]
    fn test_three_forbidden_clicks_end_game() {
        let mut game = started(4);
        let forbidden = game.forbidden().unwrap();
        for _ in 0..3 {
            let id = game.spawn_item(Vec2::new(10.0, 150.0), forbidden);
            game.click(id);
        }
        assert!(!game.is_running());
        assert_eq!(game.phase(), Phase::Over);
        let ends = game
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameEnded(_)))
            .count();
        assert_eq!(ends, 1);
    }

    #[test]
    fn test_round_times_out() {
        let mut game = started(5);
        for _ in 0..(ROUND_SECONDS / SIM_DT) as usize + 2 {
            game.step(SIM_DT);
        }
        assert!(!game.is_running());
        assert_eq!(game.seconds_left(), 0);
        assert_eq!(game.lives(), INITIAL_LIVES);
        assert!(game.drain_events().contains(&GameEvent::GameEnded(0)));
    }

    #[test]
    fn test_items_expire_by_lifetime() {
        let mut game = started(6);
        let kind = allowed_kind(&game);
        let id = game.spawn_item(Vec2::new(10.0, 150.0), kind);
        let frames = (INITIAL_LIFETIME / SIM_DT) as usize + 2;
        for _ in 0..frames {
            game.step(SIM_DT);
        }
        assert!(!game.items().iter().any(|e| e.id == id));
        // Expiry alone is not penalized
        assert_eq!(game.lives(), INITIAL_LIVES);
    }

    #[test]
    fn test_click_at_prefers_newest() {
        let mut game = started(7);
        let kind = allowed_kind(&game);
        let older = game.spawn_item(Vec2::new(100.0, 200.0), kind);
        let newer = game.spawn_item(Vec2::new(120.0, 220.0), kind);

        assert_eq!(game.click_at(Vec2::new(130.0, 230.0)), ClickOutcome::Scored);
        assert!(game.is_clicked(newer));
        assert!(!game.is_clicked(older));
        // Next click in the overlap goes to the older item
        assert_eq!(game.click_at(Vec2::new(130.0, 230.0)), ClickOutcome::Scored);
        assert!(game.is_clicked(older));
        assert_eq!(game.click_at(Vec2::new(390.0, 590.0)), ClickOutcome::Ignored);
    }

    #[test]
    fn test_clicks_ignored_during_warning() {
        let mut game = ClickFoodGame::new(8);
        game.start();
        let id = game.spawn_item(Vec2::new(10.0, 150.0), FoodKind::Onigiri);
        assert_eq!(game.click(id), ClickOutcome::Ignored);
    }

    #[test]
    fn test_lifetime_and_interval_curves() {
        assert_eq!(lifetime_at(0.0), 2.0);
        assert!((lifetime_at(7.0) - 1.7).abs() < 1e-5);
        assert!((lifetime_at(28.0) - 0.8).abs() < 1e-5);
        assert_eq!(lifetime_at(1000.0), MIN_LIFETIME);
        assert_eq!(spawn_interval_at(0.0), 1.5);
        assert_eq!(spawn_interval_at(15.0), 1.0);
        assert_eq!(spawn_interval_at(60.0), 0.5);
    }
}
