use std::path::PathBuf;

use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    ai::DEFAULT_DIFFICULTY, clock::DEFAULT_FPS, game_theme::GameTheme, network::NetworkConfig,
};

/// Terminal pong against the computer or another player.
#[derive(Debug, Parser)]
#[command(name = "peer-pong", version, about)]
pub struct Cli {
    /// Join the session with this id as the client.
    #[arg(long, env = "PONG_JOIN", conflicts_with = "host")]
    pub join: Option<String>,

    /// Skip the menu and open a hosted session.
    #[arg(long)]
    pub host: bool,

    /// Broker that relays messages between the two peers.
    #[arg(long, env = "PONG_BROKER_HOST", default_value = "127.0.0.1")]
    pub broker_host: String,

    #[arg(long, env = "PONG_BROKER_PORT", default_value_t = 1883)]
    pub broker_port: u16,

    #[arg(long, env = "PONG_BROKER_USER")]
    pub username: Option<String>,

    #[arg(long, env = "PONG_BROKER_PASS", hide_env_values = true)]
    pub password: Option<String>,

    /// AI reaction speed, 0.0 (asleep) to 1.0 (full paddle speed).
    #[arg(long, env = "PONG_AI_DIFFICULTY", default_value_t = DEFAULT_DIFFICULTY)]
    pub difficulty: f32,

    #[arg(long, env = "PONG_THEME", value_enum, default_value_t = GameTheme::Classic)]
    pub theme: GameTheme,

    /// Frames (and simulation ticks) per second.
    #[arg(long, env = "PONG_FPS", default_value_t = DEFAULT_FPS)]
    pub fps: u32,

    /// Fixed seed for serve directions.
    #[arg(long, env = "PONG_SEED")]
    pub seed: Option<u64>,

    #[arg(long, env = "PONG_LOG_FILE", default_value = "peer-pong.log")]
    pub log_file: PathBuf,
}

impl Cli {
    pub fn network(&self, session_id: &str) -> NetworkConfig {
        NetworkConfig {
            broker_host: self.broker_host.clone(),
            broker_port: self.broker_port,
            session_id: session_id.to_string(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
