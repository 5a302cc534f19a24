//! Jungle Jump entry point
//!
//! The browser build is driven from JS through `platform::web`. Natively
//! this runs a headless session under the autopilot and records the result
//! in an in-memory leaderboard.
//!
//! Usage: `jungle-jump [easy|hard] [name] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use futures::executor::block_on;
    use jungle_jump::consts::*;
    use jungle_jump::persistence::{ChunkedStore, MemoryBackend};
    use jungle_jump::sim::autopilot;
    use jungle_jump::{Difficulty, GameLoop, Leaderboard, SaveOutcome, Settings};

    /// Give up after ten simulated minutes
    const MAX_TICKS: u64 = 60 * 60 * 10;

    env_logger::init();
    log::info!("Jungle Jump (native) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut settings = Settings::load();
    if let Some(mode) = args.first() {
        match Difficulty::from_str(mode) {
            Some(difficulty) => settings.difficulty = difficulty,
            None => log::warn!("Unknown mode `{}`, using {}", mode, settings.difficulty.as_str()),
        }
    }
    let name = args.get(1).map(String::as_str).unwrap_or("autopilot");
    if !settings.remember_name(name) {
        eprintln!("Invalid name `{}`: use 1-10 of a-z, 0-9, `_`, `-`", name);
        std::process::exit(2);
    }
    let seed = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(rand::random);

    // Fake clock: one frame per tick
    let mut now = 0.0;
    let mut game = GameLoop::new(settings.tuning(), seed, now);
    game.frame(now);
    let summary = loop {
        now += TICK_MS;
        let target = autopilot::target_x(game.state());
        game.set_target_x(target);
        if let Some(summary) = game.frame(now).summary {
            break Some(summary);
        }
        if game.state().time_ticks >= MAX_TICKS {
            break None;
        }
    };

    let Some(summary) = summary else {
        println!("Autopilot still going after {} ticks, stopping", MAX_TICKS);
        return;
    };
    println!("Game over: score {} in {}", summary.score, summary.note());

    let mut leaderboard = Leaderboard::new(ChunkedStore::new(MemoryBackend::new()));
    match block_on(leaderboard.save_score(name, summary.score, &summary.note())) {
        Ok(SaveOutcome::Saved { rank }) => println!("Saved as `{}` at rank {}", name, rank),
        Ok(SaveOutcome::NotHighEnough) => println!("Score did not make the leaderboard"),
        Err(e) => {
            eprintln!("Saving score failed: {}", e);
            std::process::exit(1);
        }
    }

    println!("\n{} leaderboard:", settings.collection());
    for (i, entry) in leaderboard.table().entries().iter().enumerate() {
        println!("{:>2}. {:<10} {:>8} {}", i + 1, entry.name, entry.score, entry.note);
    }

    let backend = leaderboard.store().backend();
    println!("\nStored keys:");
    for key in backend.keys() {
        println!("  {} = {}", key, backend.peek(&key).unwrap_or_default());
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
