/// Keyboard input collector.
///
/// The game is turn based, so only key presses matter: every Press or
/// Repeat event drained this frame is kept, in order, and handled as its
/// own action. Release events (reported by
/// terminals with keyboard enhancement) are ignored.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub struct InputState {
    /// Key presses collected during the most recent `drain_events()`.
    presses: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { presses: Vec::with_capacity(8) }
    }

    /// Drain all pending terminal events without blocking.
    /// Call this once per frame, before the simulation step.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    self.presses.push(key);
                }
                _ => {}
            }
        }
    }

    /// Key codes pressed this frame, oldest first.
    pub fn presses(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.presses.iter().map(|k| k.code)
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.presses.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
