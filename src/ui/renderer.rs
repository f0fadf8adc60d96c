/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Each grid cell is drawn as a CELL_W x CELL_H block: the top line shows
/// what is in the cell, the bottom line its cues (T = tremor, R = roar).
/// Unseen cells are drawn as fog unless `reveal_all` is on.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::coord::Coord;
use crate::domain::environment::DangerLevel;
use crate::sim::world::{Phase, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Renderer ──

const CELL_W: usize = 5;
const CELL_H: usize = 2;

const HUD_ROW: usize = 0;
const CUE_ROW: usize = 1;
const MAP_ROW: usize = 3;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const FLOOR_A: Color = Color::Rgb { r: 48, g: 40, b: 32 };
const FLOOR_B: Color = Color::Rgb { r: 56, g: 47, b: 38 };
const FOG_FG: Color = Color::Rgb { r: 90, g: 90, b: 100 };
const FOG_BG: Color = Color::Rgb { r: 45, g: 45, b: 55 };
const TREMOR: Color = Color::Rgb { r: 0, g: 149, b: 255 };
const ROAR: Color = Color::Rgb { r: 255, g: 60, b: 60 };
const GOLD: Color = Color::Rgb { r: 255, g: 210, b: 50 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_phase != Some(world.phase) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        self.compose_hud(world);
        self.compose_map(world);
        self.compose_footer(world);
        if world.is_over() {
            self.compose_result_overlay(world);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, w: &WorldState) {
        let danger = match w.env.danger_level() {
            DangerLevel::Low => "Low",
            DangerLevel::High => "High",
        };
        let hud = format!(
            " Score:{:<7} Arrows:{:<2} Gold left:{:<2} Wumpus:{:<2} Danger:{:<4} Explored:{}/{}",
            w.player.score, w.player.arrows, w.env.gold_remaining(),
            w.env.wumpus_remaining(), danger,
            w.env.grid.reveal_count(), w.env.grid.cell_count(),
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // What the player perceives right now
        let cues = w.env.cues_at(w.player.pos);
        let mut x = 1;
        let parts = [
            (cues.tremor, "Tremor", TREMOR),
            (cues.roar, "Roar", ROAR),
            (cues.glitter, "Gold nearby!", GOLD),
        ];
        for (on, label, color) in parts {
            if on {
                self.front.put_str(x, CUE_ROW, label, color, Color::Reset);
                x += label.chars().count() + 2;
            }
        }
        if x == 1 {
            self.front.put_str(x, CUE_ROW, "All quiet.", Color::DarkGrey, Color::Reset);
        }
    }

    fn compose_map(&mut self, w: &WorldState) {
        let grid = &w.env.grid;
        for c in grid.cells() {
            let col = c.col * CELL_W;
            let row = MAP_ROW + c.row * CELL_H;
            self.compose_cell(w, c, col, row);
        }
    }

    fn compose_cell(&mut self, w: &WorldState, c: Coord, col: usize, row: usize) {
        if !w.env.is_shown(c) {
            for dy in 0..CELL_H {
                for dx in 0..CELL_W {
                    self.front.set(col + dx, row + dy, Cell::new('░', FOG_FG, FOG_BG));
                }
            }
            return;
        }

        let bg = if (c.row + c.col) % 2 == 0 { FLOOR_A } else { FLOOR_B };
        for dy in 0..CELL_H {
            for dx in 0..CELL_W {
                self.front.set(col + dx, row + dy, Cell::new(' ', Color::White, bg));
            }
        }

        // Top line: contents, player drawn over everything
        let mid = col + CELL_W / 2;
        if w.player.pos == c {
            if w.player.alive {
                self.front.set(mid - 1, row, Cell::new('@', Color::White, bg));
                self.front.set(mid + 1, row, Cell::new(w.player.facing.arrow_glyph(), Color::White, bg));
            } else {
                self.front.set(mid, row, Cell::new('✕', ROAR, bg));
            }
        } else if w.env.is_hole_at(c) {
            self.front.put_str(col + 1, row, "( )", Color::Black, bg);
        } else if w.env.is_wumpus_at(c) {
            self.front.set(mid, row, Cell::new('W', ROAR, bg));
        } else if w.env.is_gold_at(c) {
            self.front.set(mid, row, Cell::new('$', GOLD, bg));
        }

        // Bottom line: cues
        let cues = w.env.cues_at(c);
        if cues.tremor {
            self.front.set(col + 1, row + 1, Cell::new('T', TREMOR, bg));
        }
        if cues.roar {
            self.front.set(col + 3, row + 1, Cell::new('R', ROAR, bg));
        }
    }

    fn compose_footer(&mut self, w: &WorldState) {
        let map_bottom = MAP_ROW + w.env.grid.height * CELL_H;

        let msg_row = map_bottom + 1;
        if !w.message.is_empty() && msg_row < self.front.height {
            let msg = format!(" ◈ {} ", w.message);
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &msg, Color::Black, MSG_BG);
        }

        let help_row = map_bottom + 3;
        let reveal = if w.env.reveal_all { "on" } else { "off" };
        let help = [
            " ←↑↓→/WASD Move   Space Shoot ahead   IJKL Shoot   Enter Grab gold".to_string(),
            format!(" V Reveal ({reveal})   P Share link   R Restart   N New map   Q Quit"),
        ];
        for (i, line) in help.iter().enumerate() {
            self.front.put_str(0, help_row + i, line, Color::DarkGrey, Color::Reset);
        }
    }

    fn compose_result_overlay(&mut self, w: &WorldState) {
        let (title, color) = match w.phase {
            Phase::Victory => ("★  ALL GOLD FOUND!  ★", GOLD),
            _ => ("✕   GAME  OVER   ✕", ROAR),
        };
        let box_w = 36;
        let box_h = 7;
        let map_w = w.env.grid.width * CELL_W;
        let map_h = w.env.grid.height * CELL_H;
        let box_x = map_w.saturating_sub(box_w) / 2;
        let box_y = MAP_ROW + map_h.saturating_sub(box_h) / 2;
        let dim = Color::Rgb { r: 30, g: 30, b: 30 };

        for y in box_y..box_y + box_h {
            for x in box_x..box_x + box_w {
                self.front.set(x, y, Cell::new(' ', Color::White, dim));
            }
        }

        let center = |s: &str| box_x + box_w.saturating_sub(s.chars().count()) / 2;
        self.front.put_str(center(title), box_y + 1, title, color, dim);
        let score = format!("Score: {}   Turns: {}", w.player.score, w.turn);
        self.front.put_str(center(&score), box_y + 3, &score, Color::White, dim);
        let again = if w.phase == Phase::Victory { "R/Enter: next map" } else { "R/Enter: try again" };
        let keys = format!("{again}   Q: quit");
        self.front.put_str(center(&keys), box_y + 5, &keys, Color::Rgb { r: 100, g: 200, b: 255 }, dim);
    }
}
