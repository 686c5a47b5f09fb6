//! slidepix: a sliding image puzzle for the terminal.
//!
//! A source picture is sliced into an N x N grid, the tiles are shuffled, and
//! the player restores the picture by swapping edge-adjacent tiles while a
//! move counter and clock run. The core (grid builder in [`grid`], state
//! machine in [`session`]) is pure data; rendering goes through the
//! [`view::PuzzleView`] seam, with a crossterm implementation in [`render`].

pub mod app;
pub mod error;
pub mod grid;
pub mod input;
pub mod render;
pub mod session;
pub mod tile;
pub mod view;

pub use error::PuzzleError;
pub use session::{Board, Phase, Session, SwapOutcome};
pub use tile::{Position, Tile};
