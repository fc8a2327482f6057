//! Pocket Pet headless demo
//!
//! Runs one simulated play session against the in-memory store: a bot plays
//! Catch-Food, the winnings buy a meal, and the pet is saved. Pass a path to
//! a JSON config file to override the defaults.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Pocket Pet (headless) starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => match demo::load_config(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Could not load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => pocket_pet::PetConfig::default(),
    };

    demo::run(config);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host drives the library directly
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use pocket_pet::minigame::{CatchFoodGame, MiniGame};
    use pocket_pet::persistence::{MemoryLocalStore, anonymous_session_id};
    use pocket_pet::{
        ActionKind, ConfigError, GameId, MemoryStore, PetConfig, Preferences, Session,
        SessionEvent,
    };
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Simulated frame length
    const FRAME_MS: u64 = 16;
    /// Give up on the round after this long
    const ROUND_LIMIT_MS: u64 = 120_000;

    pub fn load_config(path: &str) -> Result<PetConfig, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Invalid(format!("{}: {}", path, e)))?;
        PetConfig::from_json(&json)
    }

    pub fn run(config: PetConfig) {
        let mut now: u64 = 1_000;
        let store = MemoryStore::new();
        let local = MemoryLocalStore::new();
        let mut rng = Pcg32::seed_from_u64(config.rng_seed);

        let prefs = Preferences::load(&local);
        log::info!(
            "Music {:.0}%, effects {:.0}%",
            prefs.effective_music_volume() * 100.0,
            prefs.effective_sfx_volume() * 100.0
        );

        let identity = anonymous_session_id(&local, now, &mut rng);
        let game_seed = config.rng_seed.wrapping_add(1);
        let mut session = Session::new(&store, Some(identity.clone()), config, now);
        log::info!("Playing as {} ({})", session.record().name, identity);

        // Catch-Food with a bot that chases the lowest falling item
        let mut game = CatchFoodGame::new(game_seed);
        if let Err(e) = session.begin_minigame(GameId::CatchFood) {
            log::error!("Could not open Catch-Food: {}", e);
            return;
        }
        game.set_best_score(session.best_score(GameId::CatchFood));
        game.start();
        let round_end = now + ROUND_LIMIT_MS;
        while game.is_running() && now < round_end {
            if let Some(target) = game
                .items()
                .iter()
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|item| item.pos.x)
            {
                let x = game.paddle_x();
                // Limited paddle speed so the bot eventually misses
                game.set_paddle_x(x + (target - x).clamp(-1.2, 1.2));
            }
            game.advance(FRAME_MS as f32 / 1000.0);
            now += FRAME_MS;
            let events = game.drain_events();
            session.handle_game_events(GameId::CatchFood, &events, now);
            session.tick(now);
        }
        if game.is_running() {
            game.exit();
            let events = game.drain_events();
            session.handle_game_events(GameId::CatchFood, &events, now);
        }
        println!(
            "Catch-Food over: score {}, coins {}, best {}",
            game.score(),
            session.coins(),
            session.best_score(GameId::CatchFood)
        );

        // Spend the winnings if there are enough
        match session.perform(ActionKind::Feed, now) {
            Ok(_) => {
                let done = now + 2_000;
                while now < done {
                    now += FRAME_MS;
                    session.tick(now);
                }
            }
            Err(e) => println!("No meal: {}", e),
        }

        if let Err(e) = session.save_now(now) {
            log::warn!("Final save failed: {}", e);
        }

        for event in session.drain_events() {
            match event {
                SessionEvent::Message(text) => println!("Pet says: {}", text),
                SessionEvent::Warning(text) => println!("Warning: {}", text),
                SessionEvent::BestScoreUpdated { game, score } => {
                    println!("New best in {}: {}", game.as_str(), score)
                }
                _ => {}
            }
        }

        let stats = session.stats();
        println!(
            "Mood {} | hearts {} | hunger {:.1} happiness {:.1} energy {:.1} cleanliness {:.1} health {:.1}",
            session.mood().as_str(),
            session.health_level(),
            stats.hunger,
            stats.happiness,
            stats.energy,
            stats.cleanliness,
            stats.health
        );
        println!(
            "Sync: {} ({} writes)",
            session.sync_status().as_str(),
            store.write_count()
        );
    }
}
