//! Tower Drop entry point
//!
//! The native build runs a headless autopilot session: the demo player drops
//! pieces until the run ends, sound cues go to the log, and the result is
//! recorded in the saved profile.
//!
//! Usage: `tower-drop [seed]`. Set `TOWER_DROP_TUNING` to a JSON file to
//! override game balance.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;

    use tower_drop::audio::{AudioManager, LogBackend};
    use tower_drop::consts::SIM_HZ;
    use tower_drop::persistence::FileStorage;
    use tower_drop::sim::{GameEvent, GameState, TickInput, tick};
    use tower_drop::{Profile, Settings, Tuning};

    /// Give up on a demo run after ten simulated minutes
    const MAX_TICKS: u64 = SIM_HZ as u64 * 60 * 10;

    env_logger::init();
    log::info!("Tower Drop (headless) starting...");

    let seed = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<u64>()
            .with_context(|| format!("seed must be an unsigned integer, got {arg:?}"))?,
        None => std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0),
    };

    let tuning = match std::env::var_os("TOWER_DROP_TUNING") {
        Some(path) => Tuning::load(&path).unwrap_or_else(|e| {
            log::warn!("Ignoring tuning file: {:#}", e);
            Tuning::default()
        }),
        None => Tuning::default(),
    };

    let mut storage = FileStorage::default();
    let mut profile = Profile::load(&storage);
    let settings = Settings::load(&storage);
    let mut audio = AudioManager::from_settings(LogBackend, &settings);

    log::info!(
        "Seed {}, best {}, skin {}",
        seed,
        profile.high_score,
        profile.selected_skin
    );

    let mut state =
        GameState::with_tuning(seed, tuning).with_profile(profile.high_score, profile.selected_skin);
    let input = TickInput {
        drop: false,
        idle_mode: true,
    };

    while !state.is_over() && state.time_ticks < MAX_TICKS {
        tick(&mut state, &input);
        for event in state.drain_events() {
            audio.handle_event(&event);
            match event {
                GameEvent::Placed { golden, sequence } => {
                    log::debug!("placed #{} golden={}", sequence, golden)
                }
                GameEvent::Missed { misses } => log::debug!("missed ({})", misses),
                GameEvent::Collapsed { reason } => log::info!("tower collapsed: {:?}", reason),
                GameEvent::Truncated { removed } => log::debug!("truncated {} pieces", removed),
                GameEvent::GameOver { .. } | GameEvent::NewHighScore { .. } => {}
            }
        }
    }

    if !state.is_over() {
        log::warn!("Demo stopped after {} ticks without a game over", MAX_TICKS);
    }

    let new_best = profile.record_game(state.score, state.coins_earned);
    profile.save(&mut storage);

    println!(
        "seed {}: score {} ({} placed, {} misses) in {:.1}s, +{} coins{}",
        seed,
        state.score,
        state.placed,
        state.misses,
        state.time_ticks as f32 / SIM_HZ as f32,
        state.coins_earned,
        if new_best { ", new high score!" } else { "" }
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives `sim::tick` itself; nothing to run here
}
