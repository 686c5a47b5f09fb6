//! Concrete rendering collaborator: draws the board into a terminal with
//! half-block cells, plus the move counter, clock, and success banner.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::error::PuzzleError;
use crate::session::Board;
use crate::tile::{Position, Tile};
use crate::view::PuzzleView;

const TOP_MARGIN: u16 = 2;
const BOTTOM_MARGIN: u16 = 2;
const CURSOR_OUTLINE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const HELD_OUTLINE: Rgba<u8> = Rgba([255, 210, 80, 255]);

/// Character-cell geometry of the board on screen.
///
/// Each tile is a `cell_w` x `cell_h` block of characters with a one-cell gap
/// between tiles; every character shows two stacked pixels via `▀`, and
/// `cell_w = 2 * cell_h` keeps tiles visually square in a typical font.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    size: usize,
    cell_w: u16,
    cell_h: u16,
    origin_x: u16,
    origin_y: u16,
}

impl Layout {
    /// Fits an N x N board into a `cols` x `rows` terminal, or `None` if even
    /// one-row tiles do not fit.
    pub fn compute(size: usize, cols: u16, rows: u16) -> Option<Self> {
        let n = size as u16;
        if n == 0 {
            return None;
        }
        let gaps = n - 1;
        let avail_rows = rows.checked_sub(TOP_MARGIN + BOTTOM_MARGIN)?;
        let by_height = avail_rows.checked_sub(gaps)? / n;
        let by_width = cols.checked_sub(gaps)? / n / 2;
        let cell_h = by_height.min(by_width);
        if cell_h == 0 {
            return None;
        }
        let cell_w = cell_h * 2;
        let total_w = n * cell_w + gaps;
        Some(Self {
            size,
            cell_w,
            cell_h,
            origin_x: (cols - total_w) / 2,
            origin_y: TOP_MARGIN,
        })
    }

    /// Top-left character cell of the tile at `pos`.
    pub fn tile_origin(&self, pos: Position) -> (u16, u16) {
        (
            self.origin_x + pos.col as u16 * (self.cell_w + 1),
            self.origin_y + pos.row as u16 * (self.cell_h + 1),
        )
    }

    /// The board slot under a terminal cell, if the cell is inside a tile
    /// (gaps and margins count as outside).
    pub fn slot_at(&self, column: u16, row: u16) -> Option<usize> {
        let rel_x = column.checked_sub(self.origin_x)?;
        let rel_y = row.checked_sub(self.origin_y)?;
        let (col, in_x) = (rel_x / (self.cell_w + 1), rel_x % (self.cell_w + 1));
        let (tile_row, in_y) = (rel_y / (self.cell_h + 1), rel_y % (self.cell_h + 1));
        if in_x < self.cell_w
            && in_y < self.cell_h
            && (col as usize) < self.size
            && (tile_row as usize) < self.size
        {
            Some(Position::new(tile_row as usize, col as usize).index(self.size))
        } else {
            None
        }
    }

    fn banner_row(&self) -> u16 {
        let n = self.size as u16;
        self.origin_y + n * self.cell_h + (n - 1) + 1
    }
}

/// Terminal-backed [`PuzzleView`]. Generic over the writer so the drawing
/// path can run against a buffer.
pub struct TerminalView<W: Write> {
    out: W,
    layout: Layout,
    moves: u32,
    elapsed: u64,
    solved: bool,
    cursor: Position,
    held: Option<usize>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, size: usize, cols: u16, rows: u16) -> Result<Self, PuzzleError> {
        let layout =
            Layout::compute(size, cols, rows).ok_or(PuzzleError::TerminalTooSmall {
                cols,
                rows,
                size,
            })?;
        let mut view = Self {
            out,
            layout,
            moves: 0,
            elapsed: 0,
            solved: false,
            cursor: Position::new(0, 0),
            held: None,
        };
        queue!(view.out, Clear(ClearType::All))?;
        view.draw_banner()?;
        view.out.flush()?;
        Ok(view)
    }

    pub fn slot_at(&self, column: u16, row: u16) -> Option<usize> {
        self.layout.slot_at(column, row)
    }

    /// The cursor or held tile moved; repaint with fresh highlights.
    pub fn selection_changed(
        &mut self,
        cursor: Position,
        held: Option<usize>,
        board: &Board,
    ) -> io::Result<()> {
        self.cursor = cursor;
        self.held = held;
        self.redraw_board(board)
    }

    /// The terminal was resized; recompute the layout and repaint everything.
    pub fn resize(&mut self, cols: u16, rows: u16, board: &Board) -> Result<(), PuzzleError> {
        let size = self.layout.size;
        self.layout =
            Layout::compute(size, cols, rows).ok_or(PuzzleError::TerminalTooSmall {
                cols,
                rows,
                size,
            })?;
        queue!(self.out, Clear(ClearType::All))?;
        self.draw_status()?;
        self.draw_banner()?;
        self.redraw_board(board)?;
        Ok(())
    }

    fn redraw_board(&mut self, board: &Board) -> io::Result<()> {
        for (slot, tile) in board.tiles().iter().enumerate() {
            self.draw_tile(slot, tile)?;
        }
        queue!(self.out, ResetColor)?;
        self.out.flush()
    }

    fn draw_tile(&mut self, slot: usize, tile: &Tile) -> io::Result<()> {
        let layout = self.layout;
        let (x0, y0) = layout.tile_origin(Position::from_index(slot, layout.size));
        let mut thumb = imageops::resize(
            tile.image(),
            layout.cell_w as u32,
            layout.cell_h as u32 * 2,
            FilterType::Triangle,
        );
        if let Some(color) = self.highlight_for(slot) {
            outline(&mut thumb, color);
        }
        for cy in 0..layout.cell_h {
            queue!(self.out, MoveTo(x0, y0 + cy))?;
            for cx in 0..layout.cell_w {
                let top = thumb.get_pixel(cx as u32, cy as u32 * 2);
                let bottom = thumb.get_pixel(cx as u32, cy as u32 * 2 + 1);
                queue!(
                    self.out,
                    SetForegroundColor(to_color(top)),
                    SetBackgroundColor(to_color(bottom)),
                    Print('▀')
                )?;
            }
        }
        Ok(())
    }

    fn highlight_for(&self, slot: usize) -> Option<Rgba<u8>> {
        if self.solved {
            return None;
        }
        if self.held == Some(slot) {
            Some(HELD_OUTLINE)
        } else if self.cursor.index(self.layout.size) == slot {
            Some(CURSOR_OUTLINE)
        } else {
            None
        }
    }

    fn draw_status(&mut self) -> io::Result<()> {
        let text = format!(
            "Moves: {:<5} Time: {}",
            self.moves,
            clock(self.elapsed)
        );
        queue!(
            self.out,
            MoveTo(self.layout.origin_x, 0),
            Clear(ClearType::CurrentLine),
            Print(text)
        )
    }

    fn draw_banner(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            MoveTo(0, self.layout.banner_row()),
            Clear(ClearType::CurrentLine)
        )?;
        if self.solved {
            queue!(
                self.out,
                MoveTo(self.layout.origin_x, self.layout.banner_row()),
                SetForegroundColor(Color::Green),
                Print(format!(
                    "Picture restored in {} moves ({})!  r: new game  q: quit",
                    self.moves,
                    clock(self.elapsed)
                )),
                ResetColor
            )
        } else {
            queue!(
                self.out,
                MoveTo(self.layout.origin_x, self.layout.banner_row()),
                SetForegroundColor(Color::DarkGrey),
                Print("arrows: move  enter: grab/drop  mouse: drag  r: restart  q: quit"),
                ResetColor
            )
        }
    }
}

impl<W: Write> PuzzleView for TerminalView<W> {
    fn board_changed(&mut self, board: &Board) -> io::Result<()> {
        self.redraw_board(board)
    }

    fn moves_changed(&mut self, moves: u32) -> io::Result<()> {
        self.moves = moves;
        self.draw_status()?;
        self.out.flush()
    }

    fn elapsed_changed(&mut self, seconds: u64) -> io::Result<()> {
        self.elapsed = seconds;
        self.draw_status()?;
        self.out.flush()
    }

    fn solved_changed(&mut self, solved: bool) -> io::Result<()> {
        self.solved = solved;
        self.draw_banner()?;
        self.out.flush()
    }
}

fn to_color(pixel: &Rgba<u8>) -> Color {
    Color::Rgb {
        r: pixel[0],
        g: pixel[1],
        b: pixel[2],
    }
}

fn outline(img: &mut RgbaImage, color: Rgba<u8>) {
    let (w, h) = img.dimensions();
    for x in 0..w {
        for y in 0..h {
            if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                img.put_pixel(x, y, color);
            }
        }
    }
}

fn clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_fits_a_standard_terminal() {
        let layout = Layout::compute(4, 80, 24).unwrap();
        assert_eq!(layout.cell_h, 4);
        assert_eq!(layout.cell_w, 8);
        // 4 tiles of 8 cells plus 3 gaps, centered in 80 columns.
        assert_eq!(layout.origin_x, (80 - 35) / 2);
    }

    #[test]
    fn layout_rejects_tiny_terminals() {
        assert!(Layout::compute(6, 10, 8).is_none());
        assert!(Layout::compute(0, 80, 24).is_none());
    }

    #[test]
    fn slot_at_inverts_tile_origin() {
        let layout = Layout::compute(3, 80, 24).unwrap();
        for slot in 0..9 {
            let pos = Position::from_index(slot, 3);
            let (x, y) = layout.tile_origin(pos);
            assert_eq!(layout.slot_at(x, y), Some(slot));
            assert_eq!(
                layout.slot_at(x + layout.cell_w - 1, y + layout.cell_h - 1),
                Some(slot)
            );
        }
    }

    #[test]
    fn gaps_and_margins_map_to_no_slot() {
        let layout = Layout::compute(3, 80, 24).unwrap();
        let (x, y) = layout.tile_origin(Position::new(0, 0));
        assert_eq!(layout.slot_at(x + layout.cell_w, y), None); // first gap column
        assert_eq!(layout.slot_at(0, 0), None); // margin
        assert_eq!(layout.slot_at(79, 23), None);
    }

    #[test]
    fn clock_formats_minutes_and_seconds() {
        assert_eq!(clock(0), "00:00");
        assert_eq!(clock(61), "01:01");
        assert_eq!(clock(600), "10:00");
    }
}
