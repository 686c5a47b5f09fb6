//! The seam between the puzzle core and whatever draws it.

use std::io;

use crate::session::Board;

/// Rendering collaborator for a puzzle session.
///
/// The session calls these to request display updates; it never touches a
/// terminal itself. Methods are fallible because the concrete collaborator
/// writes to one.
pub trait PuzzleView {
    /// The tile order changed; redraw the grid.
    fn board_changed(&mut self, board: &Board) -> io::Result<()>;
    /// The move counter changed.
    fn moves_changed(&mut self, moves: u32) -> io::Result<()>;
    /// Another second elapsed (or the clock was reset).
    fn elapsed_changed(&mut self, seconds: u64) -> io::Result<()>;
    /// Show or hide the success indication.
    fn solved_changed(&mut self, solved: bool) -> io::Result<()>;
}

#[cfg(test)]
pub(crate) use recording::{RecordingView, ViewEvent};
