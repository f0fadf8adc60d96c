/// The step function: advances the world by one turn.
///
/// Processing order:
///   1. Movement
///   2. Arrow
///   3. Gold capture
///   4. Hazard check (lose)
///   5. Gold check (win)
///
/// A turn only happens in `Phase::Playing`. Loss is decided purely by the
/// player's cell being in the hole or wumpus set; win purely by a capture
/// emptying the gold set.

use log::{debug, info};

use crate::domain::coord::Direction;
use crate::domain::environment::Environment;
use crate::domain::layout::LayoutError;
use crate::domain::player::{ArrowOutcome, MoveOutcome, Player};
use super::event::GameEvent;
use super::share::{self, ShareError};
use super::world::{Phase, WorldState};

const MSG_SHORT: u32 = 20;
const MSG_LONG: u32 = 40;

/// One turn's worth of player intent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub movement: Option<Direction>,
    pub fire: Option<Direction>,
    pub capture: bool,
}

impl FrameInput {
    pub fn is_empty(&self) -> bool {
        self.movement.is_none() && self.fire.is_none() && !self.capture
    }
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    if world.phase != Phase::Playing || input.is_empty() { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.turn += 1;

    resolve_movement(world, input.movement, &mut events);
    resolve_arrow(world, input.fire, &mut events);
    resolve_capture(world, input.capture, &mut events);
    if resolve_hazards(world, &mut events) { return events; }
    resolve_win(world, &mut events);

    debug!("turn {}: {:?}", world.turn, events);
    events
}

// ══════════════════════════════════════════════════════════════
// Player actions
// ══════════════════════════════════════════════════════════════

fn resolve_movement(world: &mut WorldState, movement: Option<Direction>, events: &mut Vec<GameEvent>) {
    let dir = match movement { Some(d) => d, None => return };
    match world.player.apply_move(dir, &mut world.env.grid) {
        MoveOutcome::Moved(to) => events.push(GameEvent::Moved { to }),
        MoveOutcome::Blocked => events.push(GameEvent::Bumped),
    }
}

fn resolve_arrow(world: &mut WorldState, fire: Option<Direction>, events: &mut Vec<GameEvent>) {
    let dir = match fire { Some(d) => d, None => return };
    match world.player.fire_arrow(dir, &world.env.grid) {
        ArrowOutcome::NoArrows => {
            events.push(GameEvent::OutOfArrows);
            world.set_message("No arrows left!", MSG_SHORT);
        }
        ArrowOutcome::Fired(target) => {
            events.push(GameEvent::ArrowFired { target });
            match target {
                Some(at) if world.env.remove_hazard_at(at) => {
                    world.player.award(world.rules.wumpus_reward);
                    events.push(GameEvent::WumpusKilled { at });
                    world.set_message(&format!("Wumpus slain! +{}", world.rules.wumpus_reward), MSG_LONG);
                    info!("wumpus killed at {at}, {} left", world.env.wumpus_remaining());
                }
                _ => {
                    events.push(GameEvent::ArrowMissed);
                    world.set_message("The arrow hits nothing.", MSG_SHORT);
                }
            }
        }
    }
}

fn resolve_capture(world: &mut WorldState, capture: bool, events: &mut Vec<GameEvent>) {
    if !capture { return; }
    match world.player.attempt_capture(&mut world.env) {
        Some(at) => {
            world.player.award(world.rules.gold_reward);
            events.push(GameEvent::GoldCaptured { at });
            world.set_message(&format!("Gold! +{}", world.rules.gold_reward), MSG_LONG);
            info!("gold captured at {at}, {} left", world.env.gold_remaining());
        }
        None => events.push(GameEvent::NothingToCapture),
    }
}

// ══════════════════════════════════════════════════════════════
// Terminal conditions
// ══════════════════════════════════════════════════════════════

/// Returns true if the player died this turn.
fn resolve_hazards(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    let at = world.player.pos;
    if !world.env.is_hazard_at(at) { return false; }
    let event = if world.env.is_hole_at(at) {
        world.set_message("You fell into a hole!", 0);
        GameEvent::FellIntoHole { at }
    } else {
        world.set_message("The wumpus got you!", 0);
        GameEvent::EatenByWumpus { at }
    };
    events.push(event);
    world.player.alive = false;
    world.phase = Phase::GameOver;
    info!("game over at {at} after {} turns, score {}", world.turn, world.player.score);
    true
}

fn resolve_win(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let captured = events.iter().any(|e| matches!(e, GameEvent::GoldCaptured { .. }));
    if captured && world.env.gold_remaining() == 0 {
        events.push(GameEvent::AllGoldCollected);
        world.phase = Phase::Victory;
        world.set_message("All gold collected!", 0);
        info!("victory after {} turns, score {}", world.turn, world.player.score);
    }
}

// ══════════════════════════════════════════════════════════════
// Session control
// ══════════════════════════════════════════════════════════════

/// Play again. After a win the next game gets a new random layout;
/// otherwise the same layout is replayed.
pub fn restart(world: &mut WorldState) -> Result<(), LayoutError> {
    if world.phase == Phase::Victory {
        return new_game(world);
    }
    world.env.reset();
    begin(world);
    Ok(())
}

/// Fresh random layout.
pub fn new_game(world: &mut WorldState) -> Result<(), LayoutError> {
    let r = world.rules;
    world.env = Environment::initialize(r.width, r.height, r.counts, &mut world.rng)?;
    begin(world);
    Ok(())
}

/// Share link for the level being played, as it was at the start of the
/// game. Kills and captures are not part of the link.
pub fn current_link(world: &WorldState) -> Result<String, ShareError> {
    share::encode(world.env.level())
}

fn begin(world: &mut WorldState) {
    world.player = Player::new(world.rules.arrows);
    world.phase = Phase::Playing;
    world.turn = 0;
    world.games_played += 1;
    world.message.clear();
    world.message_timer = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coord::Coord;
    use crate::domain::layout::{Layout, LayoutCounts};
    use crate::sim::world::Rules;

    const RULES: Rules = Rules {
        width: 5,
        height: 4,
        counts: LayoutCounts { holes: 2, wumpus: 2, golds: 2 },
        arrows: 1,
        gold_reward: 1000,
        wumpus_reward: 1000,
    };

    /// 5x4 fixture:
    /// ```text
    ///   P $ . . .
    ///   . O . W .
    ///   W . . . .
    ///   . . . . $
    /// ```
    fn fixture() -> WorldState {
        let layout = Layout {
            holes: [Coord::new(1, 1)].into_iter().collect(),
            wumpus: [Coord::new(1, 3), Coord::new(2, 0)].into_iter().collect(),
            golds: [Coord::new(0, 1), Coord::new(3, 4)].into_iter().collect(),
        };
        WorldState::with_layout(RULES, layout, Some(1)).unwrap()
    }

    fn mv(d: Direction) -> FrameInput {
        FrameInput { movement: Some(d), ..FrameInput::default() }
    }

    fn fire(d: Direction) -> FrameInput {
        FrameInput { fire: Some(d), ..FrameInput::default() }
    }

    fn grab() -> FrameInput {
        FrameInput { capture: true, ..FrameInput::default() }
    }

    /// Walk a path, asserting the player survives every step.
    fn walk(w: &mut WorldState, path: &[Direction]) {
        for &d in path {
            step(w, mv(d));
            assert_eq!(w.phase, Phase::Playing, "died walking {:?}", path);
        }
    }

    #[test]
    fn empty_input_is_not_a_turn() {
        let mut w = fixture();
        assert!(step(&mut w, FrameInput::default()).is_empty());
        assert_eq!(w.turn, 0);
    }

    #[test]
    fn move_and_bump() {
        let mut w = fixture();
        assert_eq!(step(&mut w, mv(Direction::Up)), vec![GameEvent::Bumped]);
        assert_eq!(w.player.pos, Coord::START);
        assert_eq!(step(&mut w, mv(Direction::Right)), vec![GameEvent::Moved { to: Coord::new(0, 1) }]);
        assert!(w.env.grid.is_visible(Coord::new(0, 1)));
        assert_eq!(w.turn, 2);
    }

    #[test]
    fn falling_into_hole_loses() {
        let mut w = fixture();
        walk(&mut w, &[Direction::Right]);
        let ev = step(&mut w, mv(Direction::Down));
        assert!(ev.contains(&GameEvent::FellIntoHole { at: Coord::new(1, 1) }));
        assert_eq!(w.phase, Phase::GameOver);
        assert!(!w.player.alive);
        // no further turns once over
        assert!(step(&mut w, mv(Direction::Up)).is_empty());
        assert_eq!(w.player.pos, Coord::new(1, 1));
    }

    #[test]
    fn walking_into_wumpus_loses() {
        let mut w = fixture();
        walk(&mut w, &[Direction::Down]);
        let ev = step(&mut w, mv(Direction::Down));
        assert!(ev.contains(&GameEvent::EatenByWumpus { at: Coord::new(2, 0) }));
        assert_eq!(w.phase, Phase::GameOver);
    }

    #[test]
    fn safe_cells_never_lose() {
        let mut w = fixture();
        // around the hazards along the right side
        walk(&mut w, &[
            Direction::Right, Direction::Right, Direction::Down, Direction::Down,
            Direction::Right, Direction::Right, Direction::Down, Direction::Left,
        ]);
        assert!(w.player.alive);
    }

    #[test]
    fn arrow_kills_adjacent_wumpus_then_cell_is_safe() {
        let mut w = fixture();
        walk(&mut w, &[Direction::Down]);
        let ev = step(&mut w, fire(Direction::Down));
        assert!(ev.contains(&GameEvent::WumpusKilled { at: Coord::new(2, 0) }));
        assert_eq!(w.player.score, 1000);
        assert_eq!(w.player.arrows, 0);
        assert!(w.env.grid.is_visible(Coord::new(2, 0)));
        walk(&mut w, &[Direction::Down]);
        assert_eq!(w.player.pos, Coord::new(2, 0));
    }

    #[test]
    fn arrow_miss_and_out_of_arrows() {
        let mut w = fixture();
        let ev = step(&mut w, fire(Direction::Left));
        assert_eq!(ev, vec![GameEvent::ArrowFired { target: None }, GameEvent::ArrowMissed]);
        assert_eq!(step(&mut w, fire(Direction::Down)), vec![GameEvent::OutOfArrows]);
        assert_eq!(w.env.wumpus_remaining(), 2);
        assert_eq!(w.player.score, 0);
    }

    #[test]
    fn capture_needs_gold_underfoot() {
        let mut w = fixture();
        assert_eq!(step(&mut w, grab()), vec![GameEvent::NothingToCapture]);
        walk(&mut w, &[Direction::Right]);
        let ev = step(&mut w, grab());
        assert_eq!(ev, vec![GameEvent::GoldCaptured { at: Coord::new(0, 1) }]);
        assert_eq!(w.player.score, 1000);
        assert_eq!(w.phase, Phase::Playing);
        // second capture on the same cell finds nothing
        assert_eq!(step(&mut w, grab()), vec![GameEvent::NothingToCapture]);
        assert_eq!(w.player.score, 1000);
    }

    #[test]
    fn win_iff_last_gold_captured() {
        let mut w = fixture();
        walk(&mut w, &[Direction::Right]);
        step(&mut w, grab());
        walk(&mut w, &[
            Direction::Right, Direction::Down, Direction::Down,
            Direction::Right, Direction::Right, Direction::Down,
        ]);
        assert_eq!(w.player.pos, Coord::new(3, 4));
        assert_eq!(w.phase, Phase::Playing);
        let ev = step(&mut w, grab());
        assert!(ev.contains(&GameEvent::AllGoldCollected));
        assert_eq!(w.phase, Phase::Victory);
        assert_eq!(w.player.score, 2000);
    }

    #[test]
    fn score_is_monotonic() {
        let mut w = fixture();
        let script = [
            mv(Direction::Right), grab(), fire(Direction::Down), mv(Direction::Up),
            mv(Direction::Right), grab(), fire(Direction::Right), mv(Direction::Down),
        ];
        let mut last = 0;
        for input in script {
            step(&mut w, input);
            assert!(w.player.score >= last);
            last = w.player.score;
        }
    }

    #[test]
    fn visibility_never_regresses_during_play() {
        let mut w = fixture();
        let mut seen = w.env.grid.reveal_count();
        for d in [Direction::Right, Direction::Left, Direction::Right, Direction::Right, Direction::Down] {
            step(&mut w, mv(d));
            let now = w.env.grid.reveal_count();
            assert!(now >= seen);
            seen = now;
        }
        assert!(w.env.grid.is_visible(Coord::START));
    }

    #[test]
    fn restart_after_loss_replays_same_layout() {
        let mut w = fixture();
        let before = w.env.level().clone();
        walk(&mut w, &[Direction::Right]);
        step(&mut w, grab());
        step(&mut w, mv(Direction::Down));
        assert_eq!(w.phase, Phase::GameOver);

        restart(&mut w).unwrap();
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(*w.env.level(), before);
        assert_eq!(w.env.gold_remaining(), 2);
        assert_eq!(w.player.pos, Coord::START);
        assert_eq!(w.player.score, 0);
        assert_eq!(w.player.arrows, RULES.arrows);
        assert_eq!(w.env.grid.reveal_count(), 1);
        assert_eq!(w.games_played, 2);
    }

    #[test]
    fn restart_after_win_draws_new_layout() {
        let mut w = fixture();
        w.phase = Phase::Victory;
        restart(&mut w).unwrap();
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.env.level().counts(), RULES.counts);
        assert_eq!(w.env.level().validate(RULES.width, RULES.height), Ok(()));
    }

    #[test]
    fn link_describes_level_not_progress() {
        let mut w = fixture();
        walk(&mut w, &[Direction::Right]);
        step(&mut w, grab());
        let link = current_link(&w).unwrap();
        assert_eq!(share::decode(&link).unwrap(), *fixture().env.level());
    }

    #[test]
    fn link_taken_after_a_win_still_loads() {
        let mut w = fixture();
        walk(&mut w, &[Direction::Right]);
        step(&mut w, grab());
        walk(&mut w, &[
            Direction::Right, Direction::Down, Direction::Down,
            Direction::Right, Direction::Right, Direction::Down,
        ]);
        step(&mut w, grab());
        assert_eq!(w.phase, Phase::Victory);
        assert_eq!(w.env.gold_remaining(), 0);

        let link = current_link(&w).unwrap();
        let again = WorldState::from_link(RULES, &link, Some(2)).unwrap();
        assert_eq!(again.env.gold_remaining(), 2);
        assert_eq!(*again.env.level(), *w.env.level());
        assert_eq!(again.phase, Phase::Playing);
    }

    #[test]
    fn links_round_trip_through_world() {
        let mut w = fixture();
        let link = current_link(&w).unwrap();
        new_game(&mut w).unwrap();
        let again = WorldState::from_link(RULES, &link, None).unwrap();
        assert_eq!(*again.env.level(), *fixture().env.level());
    }

    #[test]
    fn start_link_counts_as_one_game() {
        let link = current_link(&fixture()).unwrap();
        let w = WorldState::from_link(RULES, &link, None).unwrap();
        assert_eq!(w.games_played, 1);
        assert_eq!(w.turn, 0);
        assert_eq!(w.player.pos, Coord::START);
    }

    #[test]
    fn bad_links_build_no_world() {
        assert!(matches!(
            WorldState::from_link(RULES, "#not base64!", None),
            Err(ShareError::Base64(_)),
        ));
        let outside = Layout {
            golds: [Coord::new(9, 9)].into_iter().collect(),
            ..Layout::default()
        };
        let link = share::encode(&outside).unwrap();
        assert!(matches!(
            WorldState::from_link(RULES, &link, None),
            Err(ShareError::Layout(_)),
        ));
    }
}
