//! The cooperative event loop: one thread, handlers reacting to input events
//! and a once-per-second tick deadline.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, MouseEvent};
use crossterm::terminal;
use image::DynamicImage;
use rand::Rng;

use crate::error::PuzzleError;
use crate::grid;
use crate::input::{Direction, Gestures};
use crate::render::TerminalView;
use crate::session::{Board, Session};

/// Nominal viewport width handed to the grid builder; wide enough that the
/// working canvas hits its pixel cap.
pub const DEFAULT_VIEWPORT_PX: u32 = 720;

const TICK: Duration = Duration::from_secs(1);

/// Builds tiles from the source image and stands up a freshly initialized
/// session. Assigning the result over an old session drops that session and
/// with it the only thing its clock could tick through.
fn new_session<R: Rng, W: io::Write>(
    source: &DynamicImage,
    size: usize,
    viewport_px: u32,
    rng: &mut R,
    view: &mut TerminalView<W>,
) -> Result<Session, PuzzleError> {
    let tiles = grid::build_tiles(source, size, viewport_px)?;
    let board = Board::new(tiles, size)?;
    let mut session = Session::new(board);
    session.initialize(rng, view)?;
    log::info!("started a {size}x{size} session");
    Ok(session)
}

/// Runs the puzzle until the user quits. The terminal is expected to already
/// be in raw mode with mouse capture on; the caller restores it.
pub fn run(source: &DynamicImage, size: usize, viewport_px: u32) -> Result<(), PuzzleError> {
    let (cols, rows) = terminal::size()?;
    let mut view = TerminalView::new(io::stdout(), size, cols, rows)?;
    let mut rng = rand::thread_rng();
    let mut session = new_session(source, size, viewport_px, &mut rng, &mut view)?;
    let mut gestures = Gestures::new(size);
    view.selection_changed(gestures.cursor(), gestures.held(), session.board())?;

    let mut next_tick = Instant::now() + TICK;
    loop {
        let timeout = next_tick.saturating_duration_since(Instant::now());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(KeyEvent { code, .. }) => match code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('r') => {
                        session = new_session(source, size, viewport_px, &mut rng, &mut view)?;
                        gestures.reset(size);
                        view.selection_changed(
                            gestures.cursor(),
                            gestures.held(),
                            session.board(),
                        )?;
                        next_tick = Instant::now() + TICK;
                    }
                    KeyCode::Up => move_cursor(&mut gestures, Direction::Up, &session, &mut view)?,
                    KeyCode::Down => {
                        move_cursor(&mut gestures, Direction::Down, &session, &mut view)?
                    }
                    KeyCode::Left => {
                        move_cursor(&mut gestures, Direction::Left, &session, &mut view)?
                    }
                    KeyCode::Right => {
                        move_cursor(&mut gestures, Direction::Right, &session, &mut view)?
                    }
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        if let Some(req) = gestures.select() {
                            let _ = session.attempt_swap(req.source, req.target, &mut view)?;
                        }
                        view.selection_changed(
                            gestures.cursor(),
                            gestures.held(),
                            session.board(),
                        )?;
                    }
                    _ => {}
                },
                Event::Mouse(MouseEvent {
                    kind, column, row, ..
                }) => {
                    let slot = view.slot_at(column, row);
                    if let Some(req) = gestures.mouse(kind, slot) {
                        let _ = session.attempt_swap(req.source, req.target, &mut view)?;
                    }
                    view.selection_changed(gestures.cursor(), gestures.held(), session.board())?;
                }
                Event::Resize(new_cols, new_rows) => {
                    view.resize(new_cols, new_rows, session.board())?;
                }
                _ => {}
            }
        }
        while Instant::now() >= next_tick {
            session.tick(&mut view)?;
            next_tick += TICK;
        }
    }
    Ok(())
}

fn move_cursor<W: io::Write>(
    gestures: &mut Gestures,
    direction: Direction,
    session: &Session,
    view: &mut TerminalView<W>,
) -> io::Result<()> {
    gestures.move_cursor(direction);
    view.selection_changed(gestures.cursor(), gestures.held(), session.board())
}
