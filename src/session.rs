//! The puzzle state machine: board, counters, and the session lifecycle.

use std::fmt;
use std::io;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::PuzzleError;
use crate::tile::{Position, Tile};
use crate::view::PuzzleView;

/// The ordered tile sequence, left-to-right, top-to-bottom.
///
/// Tiles are only ever permuted after construction; the multiset of home
/// positions always covers the full coordinate grid exactly once.
pub struct Board {
    size: usize,
    tiles: Vec<Tile>,
}

impl Board {
    /// Wraps `size * size` tiles, verifying the home positions cover every
    /// grid coordinate exactly once.
    pub fn new(tiles: Vec<Tile>, size: usize) -> Result<Self, PuzzleError> {
        if size == 0 {
            return Err(PuzzleError::UnsupportedGridSize(size));
        }
        let expected = size * size;
        if tiles.len() != expected {
            return Err(PuzzleError::WrongTileCount {
                size,
                expected,
                found: tiles.len(),
            });
        }
        let mut seen = vec![false; expected];
        for tile in &tiles {
            let home = tile.home();
            if home.row >= size || home.col >= size || seen[home.index(size)] {
                return Err(PuzzleError::MalformedHomes);
            }
            seen[home.index(size)] = true;
        }
        Ok(Self { size, tiles })
    }

    pub fn grid_size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Uniform random permutation of the tiles, retried while the result
    /// happens to land back in home order (so a fresh game never starts
    /// solved; a 1x1 board is always solved and shuffles once).
    pub fn scramble<R: Rng>(&mut self, rng: &mut R) {
        loop {
            self.tiles.shuffle(rng);
            if self.size == 1 || !self.is_solved() {
                break;
            }
        }
    }

    /// True iff the tile at every index is home: `home == (i / N, i % N)`.
    pub fn is_solved(&self) -> bool {
        self.tiles
            .iter()
            .enumerate()
            .all(|(i, tile)| tile.home() == Position::from_index(i, self.size))
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.tiles.swap(a, b);
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                let home = self.tiles[Position::new(row, col).index(self.size)].home();
                write!(f, "{},{} ", home.row, home.col)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Where a session is in its lifecycle. There is no way back to `Building`;
/// a new puzzle means a new session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Building,
    Active,
    Solved,
}

/// What `attempt_swap` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapOutcome {
    Accepted { solved: bool },
    Rejected,
}

/// One run of the puzzle, from shuffle to solve.
///
/// Owns the board and both counters exclusively. Elapsed time advances only
/// through [`Session::tick`], so whoever owns the session owns its clock:
/// dropping the session on restart is what cancels the old ticking.
pub struct Session {
    board: Board,
    moves: u32,
    elapsed_secs: u64,
    phase: Phase,
}

impl Session {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            moves: 0,
            elapsed_secs: 0,
            phase: Phase::Building,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Shuffles the board, zeroes both counters, clears the solved flag, and
    /// pushes the fresh state to the view. The session is playable afterward.
    pub fn initialize<R: Rng>(
        &mut self,
        rng: &mut R,
        view: &mut dyn PuzzleView,
    ) -> io::Result<()> {
        self.board.scramble(rng);
        self.moves = 0;
        self.elapsed_secs = 0;
        self.phase = Phase::Active;
        log::debug!("session start:\n{}", self.board);
        view.board_changed(&self.board)?;
        view.moves_changed(self.moves)?;
        view.elapsed_changed(self.elapsed_secs)?;
        view.solved_changed(false)
    }

    /// Swaps the tiles at two slots if the slots share an edge.
    ///
    /// Coordinates come from the slots themselves (`i / N`, `i % N`), never
    /// from the tiles' homes. Rejections (same slot, not adjacent, out of
    /// range, session not active) change nothing and notify nobody. A solved
    /// session rejects everything; the board is frozen until a restart.
    pub fn attempt_swap(
        &mut self,
        source: usize,
        target: usize,
        view: &mut dyn PuzzleView,
    ) -> io::Result<SwapOutcome> {
        if self.phase != Phase::Active
            || source == target
            || source >= self.board.len()
            || target >= self.board.len()
        {
            return Ok(SwapOutcome::Rejected);
        }
        let size = self.board.grid_size();
        let a = Position::from_index(source, size);
        let b = Position::from_index(target, size);
        if !a.is_adjacent(b) {
            log::trace!("rejected swap {a} <-> {b}");
            return Ok(SwapOutcome::Rejected);
        }

        self.board.swap(source, target);
        self.moves += 1;
        view.board_changed(&self.board)?;
        view.moves_changed(self.moves)?;

        let solved = self.board.is_solved();
        if solved {
            self.phase = Phase::Solved;
            view.solved_changed(true)?;
            log::info!(
                "solved in {} moves after {}s",
                self.moves,
                self.elapsed_secs
            );
        }
        Ok(SwapOutcome::Accepted { solved })
    }

    /// One second passed. Counts only while the session is active; a solved
    /// or not-yet-initialized session ignores ticks.
    pub fn tick(&mut self, view: &mut dyn PuzzleView) -> io::Result<()> {
        if self.phase != Phase::Active {
            return Ok(());
        }
        self.elapsed_secs += 1;
        view.elapsed_changed(self.elapsed_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use image::RgbaImage;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::view::{RecordingView, ViewEvent};

    fn home_order_tiles(size: usize) -> Vec<Tile> {
        (0..size * size)
            .map(|i| Tile::new(RgbaImage::new(1, 1), Position::from_index(i, size)))
            .collect()
    }

    fn board(size: usize) -> Board {
        Board::new(home_order_tiles(size), size).unwrap()
    }

    fn active_session(size: usize) -> Session {
        let mut session = Session::new(board(size));
        session.phase = Phase::Active;
        session
    }

    #[test]
    fn board_rejects_wrong_tile_count() {
        let mut tiles = home_order_tiles(2);
        tiles.pop();
        assert!(matches!(
            Board::new(tiles, 2),
            Err(PuzzleError::WrongTileCount {
                expected: 4,
                found: 3,
                ..
            })
        ));
    }

    #[test]
    fn board_rejects_duplicate_homes() {
        let mut tiles = home_order_tiles(2);
        tiles[3] = Tile::new(RgbaImage::new(1, 1), Position::new(0, 0));
        assert!(matches!(
            Board::new(tiles, 2),
            Err(PuzzleError::MalformedHomes)
        ));
    }

    #[test]
    fn home_order_board_is_solved_immediately() {
        // The N=2 scenario with the shuffle stubbed out to identity.
        assert!(board(2).is_solved());
    }

    #[test]
    fn initialize_keeps_the_home_multiset_and_resets_counters() {
        for size in [2, 3, 4, 5, 6] {
            let mut session = Session::new(board(size));
            let mut view = RecordingView::default();
            let mut rng = StdRng::seed_from_u64(7);
            session.initialize(&mut rng, &mut view).unwrap();

            assert_eq!(session.board().len(), size * size);
            let homes: HashSet<_> = session.board().tiles().iter().map(|t| t.home()).collect();
            assert_eq!(homes.len(), size * size);
            for i in 0..size * size {
                assert!(homes.contains(&Position::from_index(i, size)));
            }

            assert_eq!(session.moves(), 0);
            assert_eq!(session.elapsed_secs(), 0);
            assert_eq!(session.phase(), Phase::Active);
        }
    }

    #[test]
    fn initialize_notifies_the_view_of_the_fresh_state() {
        let mut session = Session::new(board(3));
        let mut view = RecordingView::default();
        let mut rng = StdRng::seed_from_u64(1);
        session.initialize(&mut rng, &mut view).unwrap();

        assert!(matches!(view.events[0], ViewEvent::Board(_)));
        assert_eq!(
            &view.events[1..],
            &[
                ViewEvent::Moves(0),
                ViewEvent::Elapsed(0),
                ViewEvent::Solved(false)
            ]
        );
    }

    #[test]
    fn scramble_never_lands_in_home_order() {
        // Tiny boards make a solved-order shuffle likely, so the retry loop
        // is what this exercises.
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let mut b = board(2);
            b.scramble(&mut rng);
            assert!(!b.is_solved());
        }
    }

    #[test]
    fn swaps_before_initialize_are_rejected() {
        let mut session = Session::new(board(2));
        let mut view = RecordingView::default();
        assert_eq!(
            session.attempt_swap(0, 1, &mut view).unwrap(),
            SwapOutcome::Rejected
        );
        assert!(view.events.is_empty());
    }

    #[test]
    fn adjacent_swap_on_a_two_by_two_board_is_accepted() {
        let mut session = active_session(2);
        let mut view = RecordingView::default();
        let outcome = session.attempt_swap(0, 1, &mut view).unwrap();
        assert_eq!(outcome, SwapOutcome::Accepted { solved: false });
        assert_eq!(session.moves(), 1);
        assert!(!session.board().is_solved());
        assert!(matches!(view.events[0], ViewEvent::Board(_)));
        assert_eq!(view.events[1], ViewEvent::Moves(1));
    }

    #[test]
    fn diagonal_swap_is_rejected_without_side_effects() {
        // Slots 0 and 3 of a 2x2 board are diagonal, Manhattan distance 2.
        let mut session = active_session(2);
        let mut view = RecordingView::default();
        assert_eq!(
            session.attempt_swap(0, 3, &mut view).unwrap(),
            SwapOutcome::Rejected
        );
        assert_eq!(session.moves(), 0);
        assert!(session.board().is_solved());
        assert!(view.events.is_empty());
    }

    #[test]
    fn same_slot_and_out_of_range_swaps_are_rejected() {
        let mut session = active_session(3);
        let mut view = RecordingView::default();
        for (a, b) in [(4, 4), (0, 9), (9, 0), (8, 100)] {
            assert_eq!(
                session.attempt_swap(a, b, &mut view).unwrap(),
                SwapOutcome::Rejected
            );
        }
        assert_eq!(session.moves(), 0);
        assert!(view.events.is_empty());
    }

    #[test]
    fn swap_mutates_iff_slots_are_grid_adjacent() {
        let size = 3;
        for a in 0..size * size {
            for b in 0..size * size {
                let mut session = active_session(size);
                let mut view = RecordingView::default();
                let outcome = session.attempt_swap(a, b, &mut view).unwrap();
                let adjacent =
                    Position::from_index(a, size).is_adjacent(Position::from_index(b, size));
                match outcome {
                    SwapOutcome::Accepted { .. } => {
                        assert!(adjacent);
                        assert_eq!(session.moves(), 1);
                    }
                    SwapOutcome::Rejected => {
                        assert!(!adjacent || a == b);
                        assert_eq!(session.moves(), 0);
                        assert!(session.board().is_solved());
                    }
                }
            }
        }
    }

    #[test]
    fn solving_swap_freezes_the_board_and_shows_success() {
        // One adjacent swap away from home order.
        let mut session = active_session(2);
        let mut view = RecordingView::default();
        session.board.swap(2, 3);
        assert!(!session.board().is_solved());

        let outcome = session.attempt_swap(2, 3, &mut view).unwrap();
        assert_eq!(outcome, SwapOutcome::Accepted { solved: true });
        assert_eq!(session.phase(), Phase::Solved);
        assert_eq!(*view.events.last().unwrap(), ViewEvent::Solved(true));

        // Frozen: further swaps and ticks are ignored.
        view.clear();
        assert_eq!(
            session.attempt_swap(0, 1, &mut view).unwrap(),
            SwapOutcome::Rejected
        );
        session.tick(&mut view).unwrap();
        assert_eq!(session.moves(), 1);
        assert_eq!(session.elapsed_secs(), 0);
        assert!(view.events.is_empty());
    }

    #[test]
    fn move_count_tracks_accepted_swaps_only() {
        let mut session = active_session(3);
        let mut view = RecordingView::default();
        session.attempt_swap(0, 1, &mut view).unwrap(); // accepted
        session.attempt_swap(1, 1, &mut view).unwrap(); // same slot
        session.attempt_swap(0, 8, &mut view).unwrap(); // far apart
        session.attempt_swap(1, 0, &mut view).unwrap(); // accepted
        assert_eq!(session.moves(), 2);
    }

    #[test]
    fn ticks_accumulate_only_while_active() {
        let mut session = Session::new(board(2));
        let mut view = RecordingView::default();
        session.tick(&mut view).unwrap();
        assert_eq!(session.elapsed_secs(), 0);

        let mut rng = StdRng::seed_from_u64(3);
        session.initialize(&mut rng, &mut view).unwrap();
        view.clear();
        session.tick(&mut view).unwrap();
        session.tick(&mut view).unwrap();
        assert_eq!(session.elapsed_secs(), 2);
        assert_eq!(
            view.events,
            vec![ViewEvent::Elapsed(1), ViewEvent::Elapsed(2)]
        );
    }

    #[test]
    fn reinitializing_resets_a_played_session() {
        let mut session = active_session(3);
        let mut view = RecordingView::default();
        session.attempt_swap(0, 1, &mut view).unwrap();
        session.tick(&mut view).unwrap();
        assert_eq!(session.moves(), 1);
        assert_eq!(session.elapsed_secs(), 1);

        let mut rng = StdRng::seed_from_u64(9);
        session.initialize(&mut rng, &mut view).unwrap();
        assert_eq!(session.moves(), 0);
        assert_eq!(session.elapsed_secs(), 0);
        assert_eq!(session.phase(), Phase::Active);
    }
}
