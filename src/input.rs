//! Normalizes mouse drags and keyboard grab-and-drop into the one kind of
//! event the session understands: "move the tile at slot A onto slot B".

use crossterm::event::{MouseButton, MouseEventKind};

use crate::tile::Position;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn as_offset(&self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// A completed gesture: the user tried to move the tile at `source` onto
/// `target`. Always two distinct slots; whether they are adjacent is the
/// session's call, not ours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapRequest {
    pub source: usize,
    pub target: usize,
}

/// Tracks in-flight gestures from both input modalities.
///
/// Keyboard: arrow keys move a cursor, select grabs the cursor slot, a second
/// select over another slot completes the gesture. Mouse: press marks the
/// source slot, release over another slot completes it. Both produce the same
/// [`SwapRequest`].
pub struct Gestures {
    size: usize,
    cursor: Position,
    grabbed: Option<usize>,
    mouse_from: Option<usize>,
}

impl Gestures {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cursor: Position::new(0, 0),
            grabbed: None,
            mouse_from: None,
        }
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// The slot currently picked up, via either modality.
    pub fn held(&self) -> Option<usize> {
        self.grabbed.or(self.mouse_from)
    }

    /// Forgets any in-flight gesture and homes the cursor. Called when a new
    /// session replaces the board.
    pub fn reset(&mut self, size: usize) {
        *self = Self::new(size);
    }

    /// Moves the cursor one slot, clamped at the board edges (no wraparound).
    pub fn move_cursor(&mut self, direction: Direction) {
        let (dr, dc) = direction.as_offset();
        let row = self.cursor.row.saturating_add_signed(dr);
        let col = self.cursor.col.saturating_add_signed(dc);
        self.cursor = Position::new(row.min(self.size - 1), col.min(self.size - 1));
    }

    /// Grab-or-drop at the cursor. Grabbing an empty hand holds the cursor
    /// slot; dropping on a different slot completes the gesture; dropping
    /// back on the source just lets go.
    pub fn select(&mut self) -> Option<SwapRequest> {
        let slot = self.cursor.index(self.size);
        match self.grabbed.take() {
            None => {
                self.grabbed = Some(slot);
                None
            }
            Some(source) if source == slot => None,
            Some(source) => Some(SwapRequest {
                source,
                target: slot,
            }),
        }
    }

    /// Feeds a mouse event, with `slot` the board slot under the pointer (if
    /// any). A press outside the board clears any in-flight drag.
    pub fn mouse(&mut self, kind: MouseEventKind, slot: Option<usize>) -> Option<SwapRequest> {
        match kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.mouse_from = slot;
                if let Some(s) = slot {
                    self.cursor = Position::from_index(s, self.size);
                }
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let source = self.mouse_from.take()?;
                let target = slot?;
                if source == target {
                    return None;
                }
                Some(SwapRequest { source, target })
            }
            _ => None,
        }
    }
}
