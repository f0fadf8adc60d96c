/// WorldState: the complete state of a running game.
///
/// Owns the environment, the player and the session around them (phase,
/// HUD message, the RNG used for new layouts). All mutation during play
/// goes through `sim::step`.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::domain::environment::Environment;
use crate::domain::layout::{Layout, LayoutCounts, LayoutError};
use crate::domain::player::Player;
use super::share::{self, ShareError};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    GameOver,
    Victory,
}

/// Game rules that survive restarts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rules {
    pub width: usize,
    pub height: usize,
    pub counts: LayoutCounts,
    pub arrows: u32,
    pub gold_reward: u32,
    pub wumpus_reward: u32,
}

impl Rules {
    pub fn from_config(config: &GameConfig) -> Self {
        Rules {
            width: config.grid.width,
            height: config.grid.height,
            counts: config.layout.counts,
            arrows: config.player.arrows,
            gold_reward: config.scoring.gold_reward,
            wumpus_reward: config.scoring.wumpus_reward,
        }
    }
}

pub struct WorldState {
    pub env: Environment,
    pub player: Player,
    pub rules: Rules,
    pub rng: StdRng,

    pub phase: Phase,
    /// Turns played in the current game.
    pub turn: u64,
    /// Games started this session (restarts included).
    pub games_played: u32,

    pub message: String,
    pub message_timer: u32,
}

// ── Construction ──

impl WorldState {
    /// New world over a random layout.
    pub fn new(rules: Rules, seed: Option<u64>) -> Result<Self, LayoutError> {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let env = Environment::initialize(rules.width, rules.height, rules.counts, &mut rng)?;
        Ok(WorldState::assemble(rules, rng, env))
    }

    /// New world over a given layout (validated).
    pub fn with_layout(rules: Rules, layout: Layout, seed: Option<u64>) -> Result<Self, LayoutError> {
        layout.validate(rules.width, rules.height)?;
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let env = Environment::from_layout(rules.width, rules.height, layout);
        Ok(WorldState::assemble(rules, rng, env))
    }

    /// New world over the layout carried by a share link.
    pub fn from_link(rules: Rules, link: &str, seed: Option<u64>) -> Result<Self, ShareError> {
        let layout = share::decode(link)?;
        Ok(WorldState::with_layout(rules, layout, seed)?)
    }

    fn assemble(rules: Rules, rng: StdRng, env: Environment) -> Self {
        WorldState {
            env,
            player: Player::new(rules.arrows),
            rules,
            rng,
            phase: Phase::Playing,
            turn: 0,
            games_played: 1,
            message: String::new(),
            message_timer: 0,
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Count down the HUD message. Duration 0 means "until replaced".
    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 { self.message.clear(); }
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase != Phase::Playing
    }
}
