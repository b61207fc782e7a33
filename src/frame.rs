// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The frame buffer and the single-threaded renderer.
//!
//! A frame is a flat run of bytes, four per pixel, in row-major order.
//! Each pixel is stored as alpha, blue, green, red, which is what a
//! 4-byte ABGR raster expects, so a presentation layer can blit the
//! bytes without touching them.
//!
//! [`compute_rows`] is the per-pixel kernel: map the pixel to the
//! complex plane, count its escape iterations, colour it, store it.
//! Everything that renders goes through it, which is what keeps the
//! single-threaded and tiled paths byte-for-byte identical.

use crate::escape::escape_iterations;
use crate::palette::colorize;
use crate::tiles::{Tile, BYTES_PER_PIXEL};
use crate::viewport::Viewport;
use itertools::iproduct;
use std::ops::Range;

/// One fully computed frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    bytes: Vec<u8>,
}

impl FrameBuffer {
    /// An all-zero frame of the given size.
    pub fn new(width: usize, height: usize) -> FrameBuffer {
        FrameBuffer {
            width,
            height,
            bytes: vec![0 as u8; width * height * BYTES_PER_PIXEL],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The raw ABGR bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Give up the frame and keep the bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The four bytes of the pixel at column `x`, row `y`.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let at = (y * self.width + x) * BYTES_PER_PIXEL;
        [
            self.bytes[at],
            self.bytes[at + 1],
            self.bytes[at + 2],
            self.bytes[at + 3],
        ]
    }

    /// Overwrite one tile's band with a worker's output.
    pub(crate) fn copy_tile(&mut self, tile: &Tile, band: &[u8]) {
        self.bytes[tile.bytes()].copy_from_slice(band);
    }

    /// The same image reordered to red, green, blue, alpha, for image
    /// encoders.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.bytes.len());
        for p in self.bytes.chunks(BYTES_PER_PIXEL) {
            rgba.extend_from_slice(&[p[3], p[2], p[1], p[0]]);
        }
        rgba
    }
}

/// Render the pixels of `rows` of a `width` by `height` frame into
/// `out`, which must be exactly those rows long.
pub fn compute_rows(
    viewport: &Viewport,
    width: usize,
    height: usize,
    rows: Range<usize>,
    out: &mut [u8],
) {
    assert!(
        out.len() == rows.len() * width * BYTES_PER_PIXEL,
        "band of {} bytes cannot hold {} rows of {} pixels",
        out.len(),
        rows.len(),
        width
    );
    let limit = viewport.max_iterations();
    for ((row, column), pixel) in iproduct!(rows, 0..width).zip(out.chunks_mut(BYTES_PER_PIXEL)) {
        let c = viewport.map_to_complex(column, row, width, height);
        pixel.copy_from_slice(&colorize(escape_iterations(c, limit)).to_abgr());
    }
}

/// The reference renderer: every pixel, in order, on the calling
/// thread.
///
/// # Panics
///
/// If either dimension is zero.
pub fn compute_frame(viewport: &Viewport, width: usize, height: usize) -> FrameBuffer {
    assert!(width > 0 && height > 0, "cannot render a {}x{} frame", width, height);
    let mut frame = FrameBuffer::new(width, height);
    compute_rows(viewport, width, height, 0..height, &mut frame.bytes);
    frame
}
