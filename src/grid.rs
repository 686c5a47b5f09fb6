//! Grid builder: slices a decoded bitmap into the N x N tiles a session
//! starts from.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

use crate::error::PuzzleError;
use crate::tile::{Position, Tile};

/// Hard cap on the square working canvas, in pixels.
pub const MAX_CANVAS_PX: u32 = 500;

/// Working canvas edge for a given viewport width: 90% of the viewport,
/// capped at [`MAX_CANVAS_PX`].
pub fn canvas_size(viewport_px: u32) -> u32 {
    ((viewport_px as u64 * 9 / 10) as u32).min(MAX_CANVAS_PX)
}

/// Slices `source` into `size * size` tiles in row-major order, each tagged
/// with its home position.
///
/// The source is scaled (aspect ignored) onto a square working canvas sized
/// by [`canvas_size`], then cut into `floor(canvas / size)` pixel squares.
/// When `size` does not divide the canvas evenly the rightmost and bottom
/// remainder pixels are dropped.
pub fn build_tiles(
    source: &DynamicImage,
    size: usize,
    viewport_px: u32,
) -> Result<Vec<Tile>, PuzzleError> {
    if size == 0 {
        return Err(PuzzleError::UnsupportedGridSize(size));
    }
    let (w, h) = source.dimensions();
    if w == 0 || h == 0 {
        return Err(PuzzleError::EmptyImage);
    }

    let canvas_px = canvas_size(viewport_px);
    let tile_px = canvas_px / size as u32;
    if tile_px == 0 {
        return Err(PuzzleError::CanvasTooSmall {
            canvas: canvas_px,
            size,
        });
    }

    let canvas = imageops::resize(
        &source.to_rgba8(),
        canvas_px,
        canvas_px,
        FilterType::Triangle,
    );

    let mut tiles = Vec::with_capacity(size * size);
    for row in 0..size {
        for col in 0..size {
            let fragment = imageops::crop_imm(
                &canvas,
                col as u32 * tile_px,
                row as u32 * tile_px,
                tile_px,
                tile_px,
            )
            .to_image();
            tiles.push(Tile::new(fragment, Position::new(row, col)));
        }
    }

    log::debug!(
        "built {} tiles of {}px from a {}px canvas ({}x{} source)",
        tiles.len(),
        tile_px,
        canvas_px,
        w,
        h
    );
    Ok(tiles)
}

/// Built-in sample picture for play without an image file: a two-axis color
/// ramp with concentric rings, so every tile looks different.
pub fn sample_image(px: u32) -> RgbaImage {
    RgbaImage::from_fn(px, px, |x, y| {
        let fx = x as f32 / px as f32;
        let fy = y as f32 / px as f32;
        let rings = ((fx - 0.5).hypot(fy - 0.5) * 24.0).sin() * 0.5 + 0.5;
        Rgba([
            (fx * 255.0) as u8,
            (fy * 255.0) as u8,
            (rings * 255.0) as u8,
            255,
        ])
    })
}
