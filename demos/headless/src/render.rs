//! ASCII rendering of grid snapshots and the terminal observer.

use std::fmt::Write as _;
use std::io::{self, Write as _};
use std::ops::ControlFlow;

use tv_core::Color;
use tv_grid::{CellState, GridSnapshot};
use tv_sim::{SimHandle, SimObserver, StatusReport};

/// Glyph for one cell.  Travelers get a letter cycling through `a..=z` by id
/// so neighbours stay distinguishable without color.
fn glyph(cell: CellState) -> char {
    match cell {
        CellState::Traveler(id) => (b'a' + (id.0 % 26) as u8) as char,
        other => other.glyph(),
    }
}

/// Render `snap` with the top row northmost (row 0 is the southern edge).
///
/// With `colors`, traveler cells are wrapped in 24-bit ANSI foreground
/// escapes using the traveler's color.
pub fn render(snap: &GridSnapshot, colors: Option<&[Color]>) -> String {
    let mut out = String::with_capacity((snap.cols() as usize + 1) * snap.rows() as usize);
    for row in (0..snap.rows()).rev() {
        for &cell in snap.row(row).unwrap_or_default() {
            let ch = glyph(cell);
            match (cell.traveler(), colors) {
                (Some(id), Some(colors)) if !colors.is_empty() => {
                    let (r, g, b) = colors[id.index() % colors.len()].to_rgb8();
                    let _ = write!(out, "\x1b[38;2;{r};{g};{b}m{ch}\x1b[0m");
                }
                _ => out.push(ch),
            }
        }
        out.push('\n');
    }
    out
}

pub fn status_line(s: &StatusReport) -> String {
    format!(
        "{:>7.2}s  created {:>3}  finished {:>3}  live {:>3}  think {} us",
        s.elapsed_secs, s.created, s.finished, s.live, s.think_micros
    )
}

// ── TerminalObserver ──────────────────────────────────────────────────────────

/// Prints a frame (optional) and a status line every observation interval.
pub struct TerminalObserver {
    draw_grid: bool,
    ansi:      bool,
    colors:    Vec<Color>,
    frames:    u64,
}

impl TerminalObserver {
    pub fn new(draw_grid: bool, ansi: bool) -> Self {
        Self { draw_grid, ansi, colors: Vec::new(), frames: 0 }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn print(&self, sim: &SimHandle) {
        let mut text = String::new();
        if self.draw_grid {
            if self.ansi {
                // Clear screen, cursor home.
                text.push_str("\x1b[2J\x1b[H");
            }
            let colors = self.ansi.then_some(self.colors.as_slice());
            text.push_str(&render(&sim.snapshot_grid(), colors));
        }
        text.push_str(&status_line(&sim.status()));
        text.push('\n');

        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

impl SimObserver for TerminalObserver {
    fn on_start(&mut self, sim: &SimHandle) {
        self.colors = sim.snapshot_agents().into_iter().map(|a| a.color).collect();
    }

    fn on_frame(&mut self, sim: &SimHandle) -> ControlFlow<()> {
        self.frames += 1;
        self.print(sim);
        ControlFlow::Continue(())
    }

    fn on_end(&mut self, sim: &SimHandle) {
        self.print(sim);
    }
}

#[cfg(test)]
mod tests {
    use tv_core::{AgentId, Position, SimConfig};
    use tv_sim::{LayoutBuilder, SimBuilder};

    use super::*;

    #[test]
    fn renders_north_up() {
        let layout = LayoutBuilder::new()
            .exit(Position::new(2, 2))
            .wall(Position::new(0, 0))
            .traveler(Position::new(1, 1), tv_core::Direction::East)
            .build();
        let config = SimConfig { rows: 3, cols: 3, agent_count: 1, ..SimConfig::default() };
        let sim = SimBuilder::new(config).layout(layout).build().unwrap();

        assert_eq!(render(&sim.snapshot_grid(), None), "..X\n.a.\n#..\n");
    }

    #[test]
    fn traveler_letters_cycle() {
        assert_eq!(glyph(CellState::Traveler(AgentId(0))), 'a');
        assert_eq!(glyph(CellState::Traveler(AgentId(27))), 'b');
        assert_eq!(glyph(CellState::Free), '.');
    }

    #[test]
    fn ansi_wraps_travelers_only() {
        let layout = LayoutBuilder::new().traveler(Position::new(0, 0), tv_core::Direction::North).build();
        let config = SimConfig { rows: 3, cols: 3, agent_count: 1, ..SimConfig::default() };
        let sim = SimBuilder::new(config).layout(layout).build().unwrap();

        let red = [Color::rgba(1.0, 0.0, 0.0, 1.0)];
        let text = render(&sim.snapshot_grid(), Some(&red));
        assert!(text.ends_with("\x1b[38;2;255;0;0ma\x1b[0m..\n"));
    }
}
