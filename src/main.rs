use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use image::DynamicImage;

use slidepix::{app, grid};

const SAMPLE_PX: u32 = 512;

/// Slide shuffled pieces of a picture back into place.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Image to slice into the puzzle (anything decodable: PNG, JPEG, ...).
    image: Option<PathBuf>,

    /// Play with the built-in sample picture instead of a file.
    #[arg(long, conflicts_with = "image")]
    sample: bool,

    /// Grid dimension: the board is SIZE x SIZE tiles.
    #[arg(short, long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(3..=6))]
    size: u8,
}

/// Puts the terminal into game mode and restores it on drop, so errors and
/// panics still leave a usable shell.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            Hide
        )?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = disable_raw_mode();
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let source = if let Some(path) = &args.image {
        image::open(path).with_context(|| format!("could not decode {}", path.display()))?
    } else if args.sample {
        DynamicImage::ImageRgba8(grid::sample_image(SAMPLE_PX))
    } else {
        bail!("pass an image file or --sample to pick the built-in picture");
    };

    let guard = TerminalGuard::enter()?;
    let result = app::run(&source, args.size as usize, app::DEFAULT_VIEWPORT_PX);
    drop(guard);
    result.map_err(Into::into)
}
