use thiserror::Error;

/// Everything that can go wrong while building or running a puzzle.
#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("grid size {0} is unsupported")]
    UnsupportedGridSize(usize),
    #[error("source image has no pixels")]
    EmptyImage,
    #[error("a {canvas}px canvas cannot fit a {size}x{size} grid")]
    CanvasTooSmall { canvas: u32, size: usize },
    #[error("expected {expected} tiles for a {size}x{size} board, got {found}")]
    WrongTileCount {
        size: usize,
        expected: usize,
        found: usize,
    },
    #[error("tile home positions do not cover the board exactly once")]
    MalformedHomes,
    #[error("terminal of {cols}x{rows} cells is too small for a {size}x{size} board")]
    TerminalTooSmall { cols: u16, rows: u16, size: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
