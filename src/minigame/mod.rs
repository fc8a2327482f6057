//! Arcade mini-games that earn coins for the pet
//!
//! All three share the engine in [`engine`]: a `Session` for score and lives,
//! a fixed-step driver and a `GameEvent` stream the host drains after each
//! frame. Each game owns its own seeded RNG so runs replay exactly.

pub mod catch_food;
pub mod click_food;
pub mod collision;
pub mod engine;
pub mod food_jump;

pub use catch_food::CatchFoodGame;
pub use click_food::{ClickFoodGame, ClickOutcome};
pub use engine::{
    Entity, EntityId, FoodKind, GameEvent, GameId, GameListener, MiniGame, SIM_DT, dispatch,
};
pub use food_jump::{FoodJumpGame, Steer};

/// Build a game by id, boxed behind the common trait
pub fn new_game(id: GameId, seed: u64) -> Box<dyn MiniGame> {
    match id {
        GameId::CatchFood => Box::new(CatchFoodGame::new(seed)),
        GameId::ClickFood => Box::new(ClickFoodGame::new(seed)),
        GameId::FoodJump => Box::new(FoodJumpGame::new(seed)),
    }
}
