/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use log::{info, warn};

use config::GameConfig;
use domain::coord::Direction;
use domain::layout::LayoutError;
use sim::event::GameEvent;
use sim::step::{self, FrameInput};
use sim::world::{Rules, WorldState};
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const MSG_SHORT: u32 = 20;

fn main() {
    let config = GameConfig::load();
    init_logging(&config);

    if let Some(path) = &config.source {
        info!("config loaded from {}", path.display());
    }
    for issue in &config.issues {
        warn!("config: {issue}");
    }

    let rules = Rules::from_config(&config);
    let mut world = match build_world(&config, rules) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Cannot build a {}x{} world: {e}", rules.width, rules.height);
            return;
        }
    };

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    info!("session over: {} games, final score {}", world.games_played, world.player.score);
    println!();
    println!("Thanks for playing Wumpus World!");
    println!("Final Score: {}", world.player.score);
}

/// World over the start link if there is a usable one, else a random one.
/// A link on the command line wins over the one in the config.
fn build_world(config: &GameConfig, rules: Rules) -> Result<WorldState, LayoutError> {
    let seed = config.layout.seed;
    let link = match std::env::args().nth(1).or_else(|| config.start_link.clone()) {
        Some(link) => link,
        None => return WorldState::new(rules, seed),
    };
    match WorldState::from_link(rules, &link, seed) {
        Ok(world) => {
            let c = world.env.level().counts();
            info!("layout loaded from link: {} holes, {} wumpus, {} golds", c.holes, c.wumpus, c.golds);
            Ok(world)
        }
        Err(e) => {
            warn!("ignoring layout link: {e}");
            let mut world = WorldState::new(rules, seed)?;
            world.set_message(&format!("Bad layout link: {e}"), 60);
            Ok(world)
        }
    }
}

/// Logs go to a file; the terminal belongs to the game. RUST_LOG overrides
/// the configured level.
fn init_logging(config: &GameConfig) {
    use std::io::Write;

    let path = match &config.logging.file {
        Some(p) => p,
        None => return,
    };
    let file = match std::fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Cannot open log file {}: {e}", path.display());
            return;
        }
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(config.logging.level)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(buf, "{} [{}] {}", buf.timestamp(), record.level(), record.args())
        });
    // Only fails if a logger is already installed
    let _ = builder.try_init();
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.tick_rate_ms);

    'frames: loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }
        // Turn based: every key press is handled on its own, in order
        for code in kb.presses() {
            if handle_key(world, code) == Flow::Quit {
                break 'frames;
            }
        }

        if last_tick.elapsed() >= tick_rate {
            world.tick_message();
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn report_events(world: &mut WorldState, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::Bumped => world.set_message("You bump into the cave wall.", MSG_SHORT),
            GameEvent::NothingToCapture => world.set_message("There is no gold here.", MSG_SHORT),
            _ => {}
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_FIRE: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_FIRE_UP: &[KeyCode] = &[KeyCode::Char('i'), KeyCode::Char('I')];
const KEYS_FIRE_LEFT: &[KeyCode] = &[KeyCode::Char('j'), KeyCode::Char('J')];
const KEYS_FIRE_DOWN: &[KeyCode] = &[KeyCode::Char('k'), KeyCode::Char('K')];
const KEYS_FIRE_RIGHT: &[KeyCode] = &[KeyCode::Char('l'), KeyCode::Char('L')];
const KEYS_CAPTURE: &[KeyCode] = &[KeyCode::Enter];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_NEW_MAP: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N')];
const KEYS_REVEAL: &[KeyCode] = &[KeyCode::Char('v'), KeyCode::Char('V')];
const KEYS_SHARE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc];

fn movement_for(code: KeyCode) -> Option<Direction> {
    if KEYS_UP.contains(&code) {
        Some(Direction::Up)
    } else if KEYS_DOWN.contains(&code) {
        Some(Direction::Down)
    } else if KEYS_LEFT.contains(&code) {
        Some(Direction::Left)
    } else if KEYS_RIGHT.contains(&code) {
        Some(Direction::Right)
    } else {
        None
    }
}

/// Space shoots along `facing`, which is read at the moment Space is handled.
fn fire_for(code: KeyCode, facing: Direction) -> Option<Direction> {
    if KEYS_FIRE_UP.contains(&code) {
        Some(Direction::Up)
    } else if KEYS_FIRE_DOWN.contains(&code) {
        Some(Direction::Down)
    } else if KEYS_FIRE_LEFT.contains(&code) {
        Some(Direction::Left)
    } else if KEYS_FIRE_RIGHT.contains(&code) {
        Some(Direction::Right)
    } else if KEYS_FIRE.contains(&code) {
        Some(facing)
    } else {
        None
    }
}

/// One key, one intent.
fn turn_for_key(code: KeyCode, facing: Direction) -> Option<FrameInput> {
    let input = FrameInput {
        movement: movement_for(code),
        fire: fire_for(code, facing),
        capture: KEYS_CAPTURE.contains(&code),
    };
    if input.is_empty() { None } else { Some(input) }
}

/// Session keys first, then turn keys.
fn handle_key(world: &mut WorldState, code: KeyCode) -> Flow {
    if KEYS_QUIT.contains(&code) {
        return Flow::Quit;
    }

    let play_again = KEYS_RESTART.contains(&code)
        || (world.is_over() && KEYS_CAPTURE.contains(&code));
    if play_again {
        match step::restart(world) {
            Ok(()) => world.set_message("New round. Good luck!", MSG_SHORT),
            Err(e) => {
                warn!("restart failed: {e}");
                world.set_message(&format!("Restart failed: {e}"), MSG_SHORT);
            }
        }
    } else if KEYS_NEW_MAP.contains(&code) {
        match step::new_game(world) {
            Ok(()) => world.set_message("A new cave awaits.", MSG_SHORT),
            Err(e) => {
                warn!("new map failed: {e}");
                world.set_message(&format!("New map failed: {e}"), MSG_SHORT);
            }
        }
    } else if KEYS_REVEAL.contains(&code) {
        world.env.reveal_all = !world.env.reveal_all;
        let state = if world.env.reveal_all { "on" } else { "off" };
        world.set_message(&format!("Reveal all: {state}"), MSG_SHORT);
    } else if KEYS_SHARE.contains(&code) {
        match step::current_link(world) {
            Ok(link) => {
                info!("share link: {link}");
                world.set_message(&format!("Link: {link}"), 0);
            }
            Err(e) => world.set_message(&format!("No link: {e}"), MSG_SHORT),
        }
    } else if let Some(input) = turn_for_key(code, world.player.facing) {
        let events = step::step(world, input);
        report_events(world, &events);
    }

    Flow::Continue
}
