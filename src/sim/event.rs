/// Events emitted during a simulation step.
/// The presentation layer consumes these for messages and logging.

use crate::domain::coord::Coord;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Moved { to: Coord },
    Bumped,
    ArrowFired { target: Option<Coord> },
    ArrowMissed,
    OutOfArrows,
    WumpusKilled { at: Coord },
    GoldCaptured { at: Coord },
    NothingToCapture,
    AllGoldCollected,
    FellIntoHole { at: Coord },
    EatenByWumpus { at: Coord },
}
