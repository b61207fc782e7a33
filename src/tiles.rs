//! Static row-band tiling.  A frame is cut into one horizontal band
//! per worker, once, when the pool is built.  Bands are equal height;
//! whatever rows are left over after the division go to the last band.
//! Iteration cost is not uniform across rows, so the bands are not
//! equally expensive, and nothing here tries to rebalance them.

use crate::errors::RenderError;
use std::ops::Range;

/// Bytes per pixel in a frame buffer.
pub const BYTES_PER_PIXEL: usize = 4;

/// One worker's share of the frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    /// First row of the band.
    pub row_start: usize,
    /// Number of rows in the band.
    pub row_count: usize,
    /// Where the band begins in the frame buffer.
    pub byte_offset: usize,
    /// Length of the band in the frame buffer.
    pub byte_length: usize,
}

impl Tile {
    /// The rows this tile covers.
    pub fn rows(&self) -> Range<usize> {
        self.row_start..self.row_start + self.row_count
    }

    /// The slice of the frame buffer this tile owns.
    pub fn bytes(&self) -> Range<usize> {
        self.byte_offset..self.byte_offset + self.byte_length
    }
}

/// Cut a `width` by `height` frame into `workers` row bands.
pub fn partition(width: usize, height: usize, workers: usize) -> Result<Vec<Tile>, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyFrame { width, height });
    }
    if workers == 0 {
        return Err(RenderError::NoWorkers);
    }
    if workers > height {
        return Err(RenderError::TooManyWorkers { workers, height });
    }

    let band = height / workers;
    let stride = width * BYTES_PER_PIXEL;
    let tiles = (0..workers)
        .map(|i| {
            let row_start = i * band;
            let row_count = if i + 1 == workers {
                height - row_start
            } else {
                band
            };
            Tile {
                row_start,
                row_count,
                byte_offset: row_start * stride,
                byte_length: row_count * stride,
            }
        })
        .collect();
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_split() {
        let tiles = partition(10, 100, 4).unwrap();
        assert_eq!(tiles.len(), 4);
        for (i, tile) in tiles.iter().enumerate() {
            assert_eq!(tile.row_start, i * 25);
            assert_eq!(tile.row_count, 25);
            assert_eq!(tile.byte_offset, i * 25 * 40);
            assert_eq!(tile.byte_length, 25 * 40);
        }
    }

    #[test]
    fn remainder_goes_to_last_band() {
        let tiles = partition(3, 10, 4).unwrap();
        let counts: Vec<usize> = tiles.iter().map(|t| t.row_count).collect();
        assert_eq!(counts, vec![2, 2, 2, 4]);
    }

    #[test]
    fn every_row_covered_once() {
        for height in 1..60 {
            for workers in 1..=height {
                let tiles = partition(7, height, workers).unwrap();
                let mut seen = vec![0; height];
                for tile in &tiles {
                    for row in tile.rows() {
                        seen[row] += 1;
                    }
                }
                assert!(seen.iter().all(|&n| n == 1), "{} rows over {}", height, workers);
                let last = tiles.last().unwrap();
                assert_eq!(last.bytes().end, 7 * height * BYTES_PER_PIXEL);
            }
        }
    }

    #[test]
    fn rejects_degenerate_pools() {
        assert!(partition(10, 10, 0).is_err());
        assert!(partition(10, 10, 11).is_err());
        assert!(partition(0, 10, 1).is_err());
        assert!(partition(10, 0, 1).is_err());
    }
}
