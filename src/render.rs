//! Box-drawn terminal tables for mazes, values and policies.
//!
//! Cells are addressed by maze coordinate. The first rendered row is the
//! top of the maze (`y = height - 1`), so `(0, 0)` appears bottom-left.

use std::fmt;

use colored::Colorize;

use crate::maze::{Action, Coordinate, Maze};

/// Highlighting applied to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellStyle {
    #[default]
    Plain,
    Terminal,
    Agent,
    Highlight,
}

#[derive(Debug, Clone, Default)]
struct Cell {
    lines: Vec<String>,
    style: CellStyle,
}

/// A grid of multi-line text cells rendered with box-drawing characters.
#[derive(Debug, Clone)]
pub struct GridTable {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl GridTable {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        }
    }

    fn cell_mut(&mut self, at: Coordinate) -> Option<&mut Cell> {
        if at.x < self.width && at.y < self.height {
            self.cells.get_mut(at.x * self.height + at.y)
        } else {
            None
        }
    }

    /// Set the text of a cell. Coordinates outside the table are ignored.
    pub fn set(&mut self, at: Coordinate, lines: Vec<String>) {
        if let Some(cell) = self.cell_mut(at) {
            cell.lines = lines;
        }
    }

    pub fn set_style(&mut self, at: Coordinate, style: CellStyle) {
        if let Some(cell) = self.cell_mut(at) {
            cell.style = style;
        }
    }

    fn cell(&self, x: usize, y: usize) -> &Cell {
        &self.cells[x * self.height + y]
    }

    fn cell_width(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|c| c.lines.iter())
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
    }

    fn rule(&self, left: char, mid: char, right: char, inner: usize) -> String {
        let segment = "─".repeat(inner + 2);
        let mut line = String::new();
        line.push(left);
        for x in 0..self.width {
            line.push_str(&segment);
            line.push(if x + 1 == self.width { right } else { mid });
        }
        line
    }
}

fn paint(text: &str, style: CellStyle) -> String {
    match style {
        CellStyle::Plain => text.to_string(),
        CellStyle::Terminal => text.red().to_string(),
        CellStyle::Agent => text.yellow().bold().to_string(),
        CellStyle::Highlight => text.blue().to_string(),
    }
}

impl fmt::Display for GridTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }
        let inner = self.cell_width();

        writeln!(f, "{}", self.rule('┌', '┬', '┐', inner))?;
        for y in (0..self.height).rev() {
            let row_lines = (0..self.width)
                .map(|x| self.cell(x, y).lines.len())
                .max()
                .unwrap_or(0)
                .max(1);

            for line_idx in 0..row_lines {
                write!(f, "│")?;
                for x in 0..self.width {
                    let cell = self.cell(x, y);
                    let text = cell.lines.get(line_idx).map(String::as_str).unwrap_or("");
                    let padded = format!("{text:<inner$}");
                    write!(f, " {} │", paint(&padded, cell.style))?;
                }
                writeln!(f)?;
            }

            if y > 0 {
                writeln!(f, "{}", self.rule('├', '┼', '┤', inner))?;
            }
        }
        write!(f, "{}", self.rule('└', '┴', '┘', inner))
    }
}

/// Maze layout: position and reward per cell. Terminal cells are styled as
/// terminal; the agent's cell (if not terminal) is styled as agent.
pub fn maze_table(maze: &Maze, agent: Option<Coordinate>) -> GridTable {
    let mut table = GridTable::new(maze.width(), maze.height());
    for state in maze.states() {
        table.set(state.position, vec![state.to_string()]);
        if state.terminal {
            table.set_style(state.position, CellStyle::Terminal);
        } else if Some(state.position) == agent {
            table.set_style(state.position, CellStyle::Agent);
        }
    }
    table
}

/// State values, `v = …` per cell; cells with no value read `unvisited`.
pub fn value_table<F>(maze: &Maze, value: F) -> GridTable
where
    F: Fn(Coordinate) -> Option<f64>,
{
    let mut table = GridTable::new(maze.width(), maze.height());
    for state in maze.states() {
        let text = match value(state.position) {
            Some(v) => format!("{}, v = {:^10.6}", state.label(), v),
            None => format!("{}, unvisited", state.label()),
        };
        table.set(state.position, vec![text]);
        if state.terminal {
            table.set_style(state.position, CellStyle::Terminal);
        }
    }
    table
}

/// Action values, one line per action, with `precision` decimals.
pub fn action_value_table<F>(maze: &Maze, values: F, precision: usize) -> GridTable
where
    F: Fn(Coordinate) -> Option<[f64; 4]>,
{
    let mut table = GridTable::new(maze.width(), maze.height());
    for state in maze.states() {
        let mut lines = vec![state.label()];
        match values(state.position) {
            Some(q) => {
                for action in Action::ALL {
                    lines.push(format!(
                        "{} {:>9.precision$}",
                        action.arrow(),
                        q[action.index()]
                    ));
                }
            }
            None => lines.push("unvisited".to_string()),
        }
        table.set(state.position, lines);
        if state.terminal {
            table.set_style(state.position, CellStyle::Terminal);
        }
    }
    table
}

/// One arrow per cell; `✕` where the policy takes no action.
pub fn policy_table<F>(maze: &Maze, action: F) -> GridTable
where
    F: Fn(Coordinate) -> Option<Action>,
{
    let mut table = GridTable::new(maze.width(), maze.height());
    for state in maze.states() {
        let glyph = action(state.position).map(Action::arrow).unwrap_or('✕');
        table.set(state.position, vec![format!("{}, a = {}", state.label(), glyph)]);
        if state.terminal {
            table.set_style(state.position, CellStyle::Terminal);
        }
    }
    table
}
