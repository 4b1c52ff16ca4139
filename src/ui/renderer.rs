/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` (a grid of Cell)
///   2. Compare each cell with `back` (the previous frame)
///   3. Emit terminal commands only for cells that changed, batched with
///      `queue!` and flushed once
///   4. Swap front/back
///
/// The picture itself is never decoded. Each revealed grid cell is painted
/// as a solid tile whose colour is derived from the image reference, so the
/// board visibly fills in while the player's identity stays hidden.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::player::GameMode;
use crate::sim::asset::AssetStatus;
use crate::sim::round::RoundState;
use crate::sim::world::{GameState, Phase};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Every cell gets this explicit background, never the terminal default,
    /// so row gaps on VTE terminals match the cells.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Differs from any real cell; filling `back` with it forces a repaint.
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

    /// One column per char; clipped at the right edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::from_char(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, ch: char, fg: Color, bg: Color) {
        for row in y..y + h {
            for col in x..x + w {
                self.set(col, row, Cell::from_char(ch, fg, bg));
            }
        }
    }
}

// ── Palette ──

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const ACCENT: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const GOOD: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const BAD: Color = Color::Rgb { r: 255, g: 70, b: 70 };
const INFO: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const HIDDEN_BG: Color = Color::Rgb { r: 45, g: 45, b: 60 };
const HIDDEN_FG: Color = Color::Rgb { r: 70, g: 70, b: 90 };
const DIM: Color = Color::DarkGrey;

// ── Layout ──

/// Terminal columns/rows per grid cell.
const CELL_W: usize = 6;
const CELL_H: usize = 3;

const HUD_ROW: usize = 0;
const GRID_ROW: usize = 2;
const GRID_COL: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<&'static str>,
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

    pub fn render(&mut self, world: &GameState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Clean slate on every phase change.
        let phase = world.phase.name();
        if self.last_phase != Some(phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(phase);
        }

        self.front.clear();
        match &world.phase {
            Phase::NotStarted => self.compose_title(world),
            Phase::FetchFailed { message } => self.compose_fetch_failed(world, message),
            Phase::RoundActive(round) => self.compose_round(world, round),
            Phase::RoundSummary(round) => self.compose_summary(world, round),
            Phase::MatchComplete => self.compose_match_complete(world),
        }
        self.compose_message(world);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colours; ResetColor would fall back to the terminal default.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
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
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_title(&mut self, w: &GameState) {
        let title = [
            r"  ___            ___                           ",
            r" | _ \_ _ ___   / __|_  _ ___ ______ ___ _ _ ",
            r" |  _/ '_/ _ \ | (_ | || / -_|_-<_-</ -_) '_|",
            r" |_| |_| \___/  \___|\_,_\___/__/__/\___|_|  ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 1 + i, line, ACCENT, Color::Reset);
        }
        self.front.put_str(4, 6, "Name the pro before the picture gives them away.", GOOD, Color::Reset);

        let s = &w.scoring;
        let rules = format!(
            "{} rounds · {}s per round · -{} per second · -{} per miss",
            s.max_rounds, s.time_per_round, s.time_decay_rate, s.wrong_answer_penalty,
        );
        self.front.put_str(4, 8, &rules, DIM, Color::Reset);

        self.front.put_str(4, 10, "MODE", ACCENT, Color::Reset);
        for (i, mode) in GameMode::ALL.iter().enumerate() {
            let selected = *mode == w.mode;
            let marker = if selected { "▸ " } else { "  " };
            let fg = if selected { GOOD } else { Color::White };
            self.front.put_str(6, 11 + i, &format!("{marker}{}", mode.title()), fg, Color::Reset);
            let blurb = match mode {
                GameMode::Headshot => "profile headshot",
                GameMode::FreeForAll => "any picture of the player",
            };
            self.front.put_str(24, 11 + i, blurb, DIM, Color::Reset);
        }

        let menu = 11 + GameMode::ALL.len() + 1;
        self.front.put_str(6, menu, "ENTER   Start match", GOOD, Color::Reset);
        self.front.put_str(6, menu + 1, "TAB     Switch mode", INFO, Color::Reset);
        self.front.put_str(6, menu + 2, "Q       Quit", Color::White, Color::Reset);
    }

    fn compose_hud(&mut self, w: &GameState, round: &RoundState) {
        let hud = format!(
            " Round {}/{}   Score {:<4}  Time {:>2}s{}  Total {:<5}  {} ",
            round.round_number,
            w.scoring.max_rounds,
            hud_score(w, round),
            round.remaining_seconds(),
            if round.timer.is_running() { " " } else { "·" },
            w.match_state.total_score,
            w.mode.title(),
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    /// Draw the N×N board; `reveal_all` paints every cell.
    fn compose_grid(&mut self, w: &GameState, reveal_all: bool) -> usize {
        let n = w.reveal.grid_size();
        let image = w.reveal.source().unwrap_or_default();
        let failed = w.reveal.status() == Some(AssetStatus::Failed);
        for idx in 0..w.reveal.total_cells() {
            let col = GRID_COL + (idx % n) * CELL_W;
            let row = GRID_ROW + (idx / n) * CELL_H;
            if reveal_all || w.reveal.is_revealed(idx) {
                if failed {
                    self.front.fill_rect(col, row, CELL_W - 1, CELL_H, '╳', DIM, HIDDEN_BG);
                } else {
                    self.front.fill_rect(col, row, CELL_W - 1, CELL_H, ' ', Color::White, cell_color(image, idx));
                }
            } else {
                self.front.fill_rect(col, row, CELL_W - 1, CELL_H, '░', HIDDEN_FG, HIDDEN_BG);
            }
        }
        GRID_ROW + n * CELL_H
    }

    fn compose_round(&mut self, w: &GameState, round: &RoundState) {
        self.compose_hud(w, round);
        let below = self.compose_grid(w, false);
        let side = GRID_COL + w.reveal.grid_size() * CELL_W + 2;

        if !w.reveal.is_ready() {
            let dots = ".".repeat((w.anim_tick as usize / 10) % 4);
            self.front.put_str(side, GRID_ROW, &format!("Loading image{dots}"), INFO, Color::Reset);
        } else {
            let pct = w.reveal.progress_percent();
            let label = if w.reveal.is_running() { "Revealing" } else { "Revealed" };
            self.front.put_str(side, GRID_ROW, label, ACCENT, Color::Reset);
            self.front.put_str(side, GRID_ROW + 1, &progress_bar(pct, 20), INFO, Color::Reset);
            self.front.put_str(side, GRID_ROW + 2, &format!("{pct:>3}%"), INFO, Color::Reset);
            if w.reveal.status() == Some(AssetStatus::Failed) {
                self.front.put_str(side, GRID_ROW + 4, "image unavailable", BAD, Color::Reset);
            }
        }
        if round.wrong_attempts > 0 {
            let misses = format!("Misses: {}", round.wrong_attempts);
            self.front.put_str(side, GRID_ROW + 6, &misses, BAD, Color::Reset);
        }

        let guess_row = below + 1;
        let caret = if (w.anim_tick / 15) % 2 == 0 { '_' } else { ' ' };
        self.front.put_str(GRID_COL, guess_row, "Who is it? ", ACCENT, Color::Reset);
        self.front.put_str(GRID_COL + 11, guess_row, &format!("{}{caret}", w.guess), Color::White, Color::Reset);

        self.front.put_str(GRID_COL, guess_row + 2, "ENTER guess   BACKSPACE delete   ESC quit match", DIM, Color::Reset);
    }

    fn compose_summary(&mut self, w: &GameState, round: &RoundState) {
        self.compose_hud(w, round);
        let below = self.compose_grid(w, true);
        let side = GRID_COL + w.reveal.grid_size() * CELL_W + 2;

        let (label, fg) = if round.correct { ("✓ CORRECT", GOOD) } else { ("✗ TIME UP", BAD) };
        self.front.put_str(side, GRID_ROW, label, fg, Color::Reset);
        self.front.put_str(side, GRID_ROW + 2, &round.player.name, ACCENT, Color::Reset);
        if let Some(quote) = &round.player.quote {
            let line = format!("\u{201c}{}\u{201d}", fit(quote, self.front.width.saturating_sub(side + 2)));
            self.front.put_str(side, GRID_ROW + 3, &line, DIM, Color::Reset);
        }

        if let Some(result) = w.match_state.round_results.last() {
            let rows = [
                format!("Points   {}", result.score),
                format!("Time     {}s", result.seconds_used),
                format!("Misses   {}", result.wrong_attempts),
                format!("Total    {}", w.match_state.total_score),
            ];
            for (i, r) in rows.iter().enumerate() {
                self.front.put_str(side, GRID_ROW + 5 + i, r, Color::White, Color::Reset);
            }
        }

        let last = round.round_number >= w.scoring.max_rounds;
        let next = if last { "ENTER   See results" } else { "ENTER   Next round" };
        self.front.put_str(GRID_COL, below + 1, next, GOOD, Color::Reset);
        self.front.put_str(GRID_COL, below + 2, "ESC     Quit match", DIM, Color::Reset);
    }

    fn compose_match_complete(&mut self, w: &GameState) {
        let m = &w.match_state;
        let banner = [
            "╔══════════════════════════════╗",
            "║        MATCH  COMPLETE       ║",
            "╚══════════════════════════════╝",
        ];
        for (i, l) in banner.iter().enumerate() {
            self.front.put_str(4, 1 + i, l, ACCENT, Color::Reset);
        }

        let total = format!("Total score   {}", m.total_score);
        let avg = format!("Per round     {}", m.average_score(w.scoring.max_rounds));
        let hits = format!("Identified    {}/{}", m.rounds_correct(), m.round_results.len());
        self.front.put_str(6, 5, &total, Color::White, Color::Reset);
        self.front.put_str(6, 6, &avg, Color::White, Color::Reset);
        self.front.put_str(6, 7, &hits, GOOD, Color::Reset);

        self.front.put_str(6, 9, " #  Player               Pts  Time  Miss", DIM, Color::Reset);
        let room = self.front.height.saturating_sub(14);
        for (i, r) in m.round_results.iter().take(room).enumerate() {
            let mark = if r.correct { '✓' } else { '✗' };
            let line = format!(
                "{:>2}  {:<18} {mark} {:>4}  {:>3}s  {:>4}",
                r.round_number,
                fit(&r.player_name, 18),
                r.score,
                r.seconds_used,
                r.wrong_attempts,
            );
            let fg = if r.correct { Color::White } else { DIM };
            self.front.put_str(6, 10 + i, &line, fg, Color::Reset);
        }

        let foot = 11 + m.round_results.len().min(room);
        self.front.put_str(6, foot, "ENTER   Play again", GOOD, Color::Reset);
        self.front.put_str(6, foot + 1, "Q       Quit", Color::White, Color::Reset);
    }

    fn compose_fetch_failed(&mut self, w: &GameState, message: &str) {
        let banner = [
            "╔══════════════════════════════╗",
            "║   COULD NOT LOAD A PLAYER    ║",
            "╚══════════════════════════════╝",
        ];
        for (i, l) in banner.iter().enumerate() {
            self.front.put_str(4, 2 + i, l, BAD, Color::Reset);
        }
        let round = format!("Round {}/{}", w.match_state.current_round, w.scoring.max_rounds);
        self.front.put_str(6, 6, &round, Color::White, Color::Reset);
        self.front.put_str(6, 7, &fit(message, self.front.width.saturating_sub(8)), DIM, Color::Reset);
        self.front.put_str(6, 9, "R / ENTER   Retry", GOOD, Color::Reset);
        self.front.put_str(6, 10, "ESC         Back to title", Color::White, Color::Reset);
    }

    fn compose_message(&mut self, w: &GameState) {
        if w.message.is_empty() || self.front.height == 0 {
            return;
        }
        let row = self.front.height - 1;
        self.front.fill_row(row, MSG_BG);
        self.front.put_str(0, row, &format!(" ◈ {} ", w.message), Color::Black, MSG_BG);
    }
}

// ── Helpers ──

/// Stable tile colour for one cell of one image.
fn cell_color(image: &str, cell: usize) -> Color {
    // FNV-1a over the reference, then mixed with the cell index.
    let mut h: u32 = 0x811c_9dc5;
    for b in image.bytes() {
        h = (h ^ b as u32).wrapping_mul(0x0100_0193);
    }
    h = (h ^ cell as u32).wrapping_mul(0x0100_0193);
    h ^= h >> 15;
    Color::Rgb {
        r: 60 + (h & 0x7f) as u8,
        g: 60 + ((h >> 8) & 0x7f) as u8,
        b: 60 + ((h >> 16) & 0x7f) as u8,
    }
}

/// Live score while playing; the recorded result once the round is closed.
fn hud_score(w: &GameState, round: &RoundState) -> u32 {
    match &w.phase {
        Phase::RoundSummary(_) => w
            .match_state
            .round_results
            .last()
            .filter(|r| r.round_number == round.round_number)
            .map_or(round.current_score, |r| r.score),
        _ => round.current_score,
    }
}

fn progress_bar(percent: u32, width: usize) -> String {
    let filled = (percent.min(100) as usize * width) / 100;
    format!("▕{}{}▏", "█".repeat(filled), "░".repeat(width - filled))
}

/// Truncate to `max` chars, marking the cut with an ellipsis.
fn fit(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::config::GameConfig;
    use crate::sim::provider::RosterProvider;
    use crate::sim::step;

    #[test]
    fn progress_bar_scales() {
        assert_eq!(progress_bar(0, 4), "▕░░░░▏");
        assert_eq!(progress_bar(50, 4), "▕██░░▏");
        assert_eq!(progress_bar(150, 4), "▕████▏");
    }

    #[test]
    fn fit_truncates_with_ellipsis() {
        assert_eq!(fit("ropz", 10), "ropz");
        assert_eq!(fit("electroNic", 6), "elect…");
        assert_eq!(fit("abc", 0), "");
    }

    #[test]
    fn cell_colors_are_stable_per_image() {
        assert!(cell_color("a.png", 3) == cell_color("a.png", 3));
        assert!(cell_color("a.png", 3) != cell_color("a.png", 4));
    }

    #[test]
    fn hud_shows_recorded_score_after_timeout() {
        let mut cfg = GameConfig::default();
        cfg.seed = Some(1);
        let mut w = GameState::new(&cfg);
        let mut roster = RosterProvider::embedded(Some(1)).unwrap();
        step::start_match(&mut w, &mut roster);
        step::image_resolved(&mut w, AssetStatus::Loaded, Duration::ZERO);
        step::advance(&mut w, Duration::from_secs(10));
        let round = w.round().unwrap().clone();
        assert_eq!(hud_score(&w, &round), 80);

        step::advance(&mut w, Duration::from_secs(40));
        let round = w.round().unwrap().clone();
        assert!(matches!(w.phase, Phase::RoundSummary(_)));
        assert_eq!(round.current_score, 40);
        assert_eq!(hud_score(&w, &round), 0);
    }

    #[test]
    fn put_str_clips_at_edge() {
        let mut fb = FrameBuffer::new(3, 1);
        fb.put_str(1, 0, "xyz", Color::White, Color::Reset);
        assert_eq!(fb.get(1, 0).as_str(), "x");
        assert_eq!(fb.get(2, 0).as_str(), "y");
        assert!(fb.get(0, 0) == Cell::BLANK);
        assert!(fb.get(1, 0).bg == Cell::BASE_BG);
    }
}
