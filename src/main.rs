/// Entry point and game loop.

mod app;
mod cli;
mod config;
mod domain;
mod error;
mod logging;
mod sim;
mod ui;

use std::io;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info};

use app::{AppContext, GameLauncher, ScoreboardLauncher};
use cli::Cli;
use config::GameConfig;
use sim::engine::GameEngine;
use sim::event::GameEvent;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::screen::{Flow, UiState};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_path = app::log_path(&cli);
    if let Err(e) = logging::init(&log_path) {
        eprintln!("Warning: logging disabled ({}): {e}", log_path.display());
    }

    let config = GameConfig::load(cli.config.as_deref());
    let ctx = match AppContext::from_cli(&cli, config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    info!(
        user = %ctx.username,
        scores = ?ctx.scores_path,
        log = %ctx.log_path.display(),
        seed = ?ctx.seed,
        "starting",
    );

    let mut engine = match ScoreboardLauncher::new(&ctx).launch(&ctx.username) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        error!(error = %e, "terminal init failed");
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut engine, &mut renderer, sound.as_ref(), &ctx);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!(error = %e, "game loop aborted");
        eprintln!("Game error: {e}");
        return ExitCode::FAILURE;
    }

    info!(user = %engine.username(), best = engine.best_score(), "exiting");
    println!();
    println!("Thanks for playing, {}!", engine.username());
    println!("Best Score: {}", engine.best_score());
    ExitCode::SUCCESS
}

fn game_loop(
    engine: &mut GameEngine,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    ctx: &AppContext,
) -> io::Result<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new(&ctx.config.gamepad);
    let mut ui = UiState::new();
    let tick_rate = Duration::from_millis(ctx.config.speed.tick_rate_ms);
    let mut last_tick = Instant::now();

    'frame: loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        for cmd in kb.commands().iter().copied().chain(gp.commands()) {
            match ui.handle_command(engine, cmd) {
                Flow::Continue => {}
                Flow::Restarted => last_tick = Instant::now(),
                Flow::Quit => break 'frame,
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if ui.should_tick(engine) {
                let events = engine.tick();
                process_sound_events(sound, &events);
                ui.apply_events(&events);
            }
            ui.tick();
            last_tick = Instant::now();
        }

        renderer.render(engine, &ui)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    let new_best = events.iter().any(|e| matches!(e, GameEvent::NewBest { .. }));
    for event in events {
        match event {
            GameEvent::FoodEaten { .. } => sfx.play_eat(),
            GameEvent::GameOver { .. } if new_best => sfx.play_new_best(),
            GameEvent::GameOver { .. } => sfx.play_game_over(),
            _ => {}
        }
    }
}
