/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Each board cell is two terminal columns wide so the board looks square.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::grid::Position;
use crate::sim::engine::GameEngine;
use super::screen::{Screen, UiState};

// ── Palette ──

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const BOARD_BG: Color = Color::Rgb { r: 14, g: 14, b: 24 };
const BORDER: Color = Color::Rgb { r: 90, g: 90, b: 130 };
const HEAD: Color = Color::Rgb { r: 0x39, g: 0xff, b: 0x14 };
const BODY: Color = Color::Rgb { r: 0x0b, g: 0x8b, b: 0x00 };
const FOOD: Color = Color::Rgb { r: 0xff, g: 0x41, b: 0x36 };
const OVERLAY_BG: Color = Color::Rgb { r: 40, g: 40, b: 40 };
const TITLE: Color = Color::Rgb { r: 255, g: 220, b: 50 };
const ACCENT: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const KEY: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const DIM: Color = Color::Rgb { r: 150, g: 150, b: 150 };
const ALERT: Color = Color::Rgb { r: 255, g: 60, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every "empty" terminal cell, so the
    /// gaps between rows match on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Differs from any real cell; forces a full repaint.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
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
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
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

    /// Write a string at (x, y). One column per char; clipped at the edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::from_char(ch, fg, bg));
        }
    }

    fn fill(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for row in y..y + h {
            for col in x..x + w {
                self.set(col, row, Cell::from_char(' ', Color::White, bg));
            }
        }
    }

    /// Centered in the span `[x, x + w)`.
    fn put_centered(&mut self, x: usize, w: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let len = s.chars().count();
        self.put_str(x + w.saturating_sub(len) / 2, y, s, fg, bg);
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).as_str().to_string()).collect()
    }
}

// ── Layout ──

const CELL_W: usize = 2;
const HUD_ROW: usize = 0;
/// Top border of the board.
const BOARD_ROW: usize = 2;
const BOARD_COL: usize = 0;
const OVERLAY_W: usize = 44;

/// Terminal rectangle of the board interior.
#[derive(Clone, Copy)]
struct BoardArea {
    col: usize,
    row: usize,
    cols: usize,
    rows: usize,
}

impl BoardArea {
    fn of(engine: &GameEngine) -> Self {
        let g = engine.grid();
        BoardArea {
            col: BOARD_COL + 1,
            row: BOARD_ROW + 1,
            cols: g.width as usize * CELL_W,
            rows: g.height as usize,
        }
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<Screen>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
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

    pub fn render(&mut self, engine: &GameEngine, ui: &UiState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        if self.last_screen != Some(ui.screen) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_screen = Some(ui.screen);
        }

        self.front.clear();
        self.compose(engine, ui);
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

        // Explicit base colors, not ResetColor: the terminal default may
        // differ from BASE_BG.
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

                queue!(self.writer, Print(cell.as_str()))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, engine: &GameEngine, ui: &UiState) {
        match ui.screen {
            Screen::Playing => {
                self.compose_game(engine, ui);
                if engine.is_game_over() {
                    self.compose_game_over(engine, ui);
                } else if ui.paused {
                    self.compose_pause_overlay(engine, ui);
                }
            }
            Screen::Leaderboard => self.compose_leaderboard(engine),
        }
    }

    fn compose_game(&mut self, engine: &GameEngine, ui: &UiState) {
        let buf_w = self.front.width;

        // ── HUD row ──
        let hud = format!(
            " {}  Score: {}  Best: {}  Length: {} ",
            engine.username(),
            engine.score(),
            engine.best_score().max(engine.score()),
            engine.snake_len(),
        );
        self.front.fill(0, HUD_ROW, buf_w, 1, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Board ──
        let area = BoardArea::of(engine);
        self.compose_border(area);
        let g = engine.grid();
        let head = engine.snake_head();
        let food = engine.food();
        for y in 0..g.height {
            for x in 0..g.width {
                let p = Position::new(x, y);
                let col = area.col + x as usize * CELL_W;
                let row = area.row + y as usize;
                let (left, right) = if p == head {
                    (Cell::from_char(' ', Color::White, HEAD), Cell::from_char(' ', Color::White, HEAD))
                } else if engine.is_snake_at(p) {
                    (Cell::from_char(' ', Color::White, BODY), Cell::from_char(' ', Color::White, BODY))
                } else if food == Some(p) {
                    (Cell::from_char('●', FOOD, BOARD_BG), Cell::from_char(' ', FOOD, BOARD_BG))
                } else {
                    (Cell::from_char(' ', Color::White, BOARD_BG), Cell::from_char(' ', Color::White, BOARD_BG))
                };
                self.front.set(col, row, left);
                self.front.set(col + 1, row, right);
            }
        }

        // ── Message bar ──
        let msg_row = area.row + area.rows + 2;
        if !ui.message.is_empty() {
            let msg = format!(" ◈ {} ", ui.message);
            self.front.fill(0, msg_row, buf_w, 1, MSG_BG);
            self.front.put_str(0, msg_row, &msg, Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help = " Arrows/WASD/HJKL: Turn  P/F1: Pause  Esc/Q: Quit";
        self.front.put_str(0, msg_row + 1, help, Color::DarkGrey, Color::Reset);
    }

    fn compose_border(&mut self, area: BoardArea) {
        let left = area.col - 1;
        let right = area.col + area.cols;
        let top = area.row - 1;
        let bottom = area.row + area.rows;
        for col in area.col..right {
            self.front.set(col, top, Cell::from_char('─', BORDER, Color::Reset));
            self.front.set(col, bottom, Cell::from_char('─', BORDER, Color::Reset));
        }
        for row in area.row..bottom {
            self.front.set(left, row, Cell::from_char('│', BORDER, Color::Reset));
            self.front.set(right, row, Cell::from_char('│', BORDER, Color::Reset));
        }
        self.front.set(left, top, Cell::from_char('┌', BORDER, Color::Reset));
        self.front.set(right, top, Cell::from_char('┐', BORDER, Color::Reset));
        self.front.set(left, bottom, Cell::from_char('└', BORDER, Color::Reset));
        self.front.set(right, bottom, Cell::from_char('┘', BORDER, Color::Reset));
    }

    /// Box centered over the board, clipped to the buffer. Returns (x, y, w).
    fn overlay_box(&mut self, engine: &GameEngine, h: usize) -> (usize, usize, usize) {
        let area = BoardArea::of(engine);
        let span = area.cols + 2;
        let w = OVERLAY_W.min(self.front.width);
        let x = BOARD_COL + span.saturating_sub(w) / 2;
        let y = area.row + area.rows.saturating_sub(h) / 2;
        self.front.fill(x, y, w, h, OVERLAY_BG);
        (x, y, w)
    }

    fn compose_game_over(&mut self, engine: &GameEngine, ui: &UiState) {
        let (x, y, w) = self.overlay_box(engine, 10);
        let best = engine.best_score().max(engine.score());

        self.front.put_centered(x, w, y + 1, "GAME OVER", ALERT, OVERLAY_BG);
        let line = format!("{}  Score: {} (Best: {})", engine.username(), engine.score(), best);
        self.front.put_centered(x, w, y + 3, &line, Color::White, OVERLAY_BG);
        if let Some(cause) = engine.end_cause() {
            self.front.put_centered(x, w, y + 4, cause.describe(), DIM, OVERLAY_BG);
        }

        let mut row = y + 5;
        if ui.new_best && (ui.anim_tick / 6) % 2 == 0 {
            self.front.put_centered(x, w, row, "★ NEW BEST! ★", TITLE, OVERLAY_BG);
        }
        if ui.new_best {
            row += 1;
        }
        if let Some(reason) = &ui.save_error {
            let text: String = format!("Save failed: {reason}").chars().take(w.saturating_sub(2)).collect();
            self.front.put_centered(x, w, row, &text, ALERT, OVERLAY_BG);
        }

        self.front.put_centered(x, w, y + 8, "Enter/R: Retry  L: Leaderboard  Q: Quit", KEY, OVERLAY_BG);
    }

    fn compose_pause_overlay(&mut self, engine: &GameEngine, ui: &UiState) {
        let (x, y, w) = self.overlay_box(engine, 5);
        let blink = (ui.anim_tick / 8) % 2 == 0;
        let label = if blink { "▶  PAUSED  ◀" } else { "   PAUSED   " };
        self.front.put_centered(x, w, y + 1, label, TITLE, OVERLAY_BG);
        self.front.put_centered(x, w, y + 3, "P/F1: Resume  Esc/Q: Quit", KEY, OVERLAY_BG);
    }

    fn compose_leaderboard(&mut self, engine: &GameEngine) {
        let ranked = engine.leaderboard();
        let user = engine.username();

        self.front.put_str(4, 1, "╔════════════════════╗", TITLE, Color::Reset);
        self.front.put_str(4, 2, "║     Top Scores     ║", TITLE, Color::Reset);
        self.front.put_str(4, 3, "╚════════════════════╝", TITLE, Color::Reset);

        let header = format!("{:>4}  {:<20} {:>7}", "Rank", "Name", "Score");
        self.front.put_str(4, 5, &header, DIM, Color::Reset);

        let first_row = 6;
        let footer_row = self.front.height.saturating_sub(2).max(first_row + 1);
        let visible = footer_row.saturating_sub(first_row + 1);

        if ranked.is_empty() {
            self.front.put_str(4, first_row, "No scores yet", DIM, Color::Reset);
        }
        for (i, r) in ranked.iter().take(visible).enumerate() {
            let name: String = r.name.chars().take(20).collect();
            let line = format!("{:>4}  {:<20} {:>7}", r.rank, name, r.score);
            let (marker, fg) = if r.name == user { ("▸", ACCENT) } else { (" ", Color::White) };
            self.front.put_str(2, first_row + i, marker, fg, Color::Reset);
            self.front.put_str(4, first_row + i, &line, fg, Color::Reset);
        }

        self.front.put_str(4, footer_row, "Esc/L: Back  Enter: Retry  Q: Quit", KEY, Color::Reset);
    }
}
