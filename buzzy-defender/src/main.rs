mod combat;
mod config;
mod entities;
mod screens;
mod swarm;
mod textures;

use anyhow::Result;
use hornet2d::{Engine, StateMachine};

use crate::config::GameConfig;
use crate::screens::StartScreen;

const CONFIG_PATH: &str = "buzzy-defender.json";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load_or_default(CONFIG_PATH)?;
    log::info!(
        "Starting Buzzy Defender ({}x{}, {} enemies)",
        config.window_width,
        config.window_height,
        config.grid_rows * config.grid_cols
    );

    let (width, height) = (config.window_width, config.window_height);
    let game = StateMachine::with_initial_state(Box::new(StartScreen::new(config)));

    Engine::new()
        .with_title("Buzzy Defender")
        .with_size(width, height)
        .run(game)
}
