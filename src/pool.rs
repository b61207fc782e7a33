// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The parallel coordinator.  A `Pool` owns a fixed set of tile
//! workers, one per row band, created once and kept for the life of
//! the pool.  A frame is one round trip: every worker is handed the
//! same viewport snapshot, then each is waited on in turn and its band
//! copied into the frame once it has reported back idle.
//!
//! `compute_frame` takes `&mut self`, so a new frame cannot be started
//! while the previous one is still draining.

use crate::errors::RenderError;
use crate::frame::FrameBuffer;
use crate::tiles::{partition, Tile};
use crate::viewport::Viewport;
use crate::worker::{TileWorker, WorkerState};

/// A fixed pool of tile workers for frames of one size.
pub struct Pool {
    width: usize,
    height: usize,
    workers: Vec<TileWorker>,
    generation: u64,
    stopped: bool,
}

impl Pool {
    /// Tile a `width` by `height` frame into `workers` bands and start
    /// one thread per band.
    pub fn new(workers: usize, width: usize, height: usize) -> Result<Pool, RenderError> {
        let tiles = partition(width, height, workers)?;
        let workers = tiles
            .into_iter()
            .enumerate()
            .map(|(index, tile)| TileWorker::spawn(index, tile, width, height))
            .collect::<Result<Vec<TileWorker>, RenderError>>()?;
        info!(
            "started {} tile workers for {}x{} frames",
            workers.len(),
            width,
            height
        );
        Ok(Pool {
            width,
            height,
            workers,
            generation: 0,
            stopped: false,
        })
    }

    /// Number of workers, fixed for the life of the pool.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Frame size the pool renders, as `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// The bands, in row order.
    pub fn tiles(&self) -> Vec<Tile> {
        self.workers.iter().map(|w| *w.tile()).collect()
    }

    /// The state of every worker, in row order.
    pub fn worker_states(&self) -> Vec<WorkerState> {
        self.workers.iter().map(TileWorker::state).collect()
    }

    /// Render one frame across the pool.
    pub fn compute_frame(&mut self, viewport: &Viewport) -> Result<FrameBuffer, RenderError> {
        let mut frame = FrameBuffer::new(self.width, self.height);
        self.compute_frame_into(viewport, &mut frame)?;
        Ok(frame)
    }

    /// Render one frame across the pool into an existing buffer of the
    /// pool's size.  If a worker has died the frame fails with
    /// `WorkerLost`, as does every later frame; the rest of the pool is
    /// still drained and left idle.
    pub fn compute_frame_into(
        &mut self,
        viewport: &Viewport,
        frame: &mut FrameBuffer,
    ) -> Result<(), RenderError> {
        assert!(
            frame.width() == self.width && frame.height() == self.height,
            "pool renders {}x{} frames, got a {}x{} buffer",
            self.width,
            self.height,
            frame.width(),
            frame.height()
        );
        if self.stopped {
            return Err(RenderError::PoolStopped);
        }

        self.generation += 1;
        let generation = self.generation;
        let snapshot = *viewport;
        debug!(
            "frame {}: {:?} across {} workers",
            generation,
            snapshot,
            self.workers.len()
        );

        for i in 0..self.workers.len() {
            if let Err(e) = self.workers[i].request_update(generation, snapshot) {
                // take back the bands already handed out
                for worker in &mut self.workers[..i] {
                    if let Err(also) = worker.wait(generation) {
                        warn!("frame {}: {}", generation, also);
                    }
                }
                return Err(e);
            }
        }

        // Every worker is drained even after a failure, so none is left
        // holding its buffer into the next frame.
        let mut failure = None;
        for worker in &mut self.workers {
            let tile = *worker.tile();
            match worker.wait(generation) {
                Ok(band) => {
                    if failure.is_none() {
                        frame.copy_tile(&tile, band);
                    }
                }
                Err(e) => {
                    if failure.is_none() {
                        failure = Some(e);
                    } else {
                        warn!("frame {}: {}", generation, e);
                    }
                }
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Stop every worker.  Bands already in progress are allowed to
    /// finish.  Calling this again does nothing.
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        for worker in &mut self.workers {
            worker.stop();
        }
        self.stopped = true;
        info!("stopped {} tile workers", self.workers.len());
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::compute_frame;

    #[test]
    fn pool_matches_single_threaded_frame() {
        let vp = Viewport::new(-2.0, 1.0, -1.2, 1.2, 100).unwrap();
        for &workers in &[1, 2, 3, 5, 8] {
            let mut pool = Pool::new(workers, 31, 40).unwrap();
            assert_eq!(pool.compute_frame(&vp).unwrap(), compute_frame(&vp, 31, 40));
        }
    }

    #[test]
    fn pool_handles_uneven_bands() {
        let vp = Viewport::default();
        let mut pool = Pool::new(7, 20, 23).unwrap();
        assert_eq!(pool.compute_frame(&vp).unwrap(), compute_frame(&vp, 20, 23));
    }

    #[test]
    fn workers_idle_between_frames() {
        let mut pool = Pool::new(4, 16, 16).unwrap();
        assert!(pool.worker_states().iter().all(|s| *s == WorkerState::Idle));
        let mut vp = Viewport::default();
        let mut frame = FrameBuffer::new(16, 16);
        for _ in 0..5 {
            pool.compute_frame_into(&vp, &mut frame).unwrap();
            assert!(pool.worker_states().iter().all(|s| *s == WorkerState::Idle));
            assert_eq!(frame, compute_frame(&vp, 16, 16));
            vp = vp.zoom(-0.2).scale_iterations(2.0);
        }
    }

    #[test]
    fn shutdown_stops_workers_and_refuses_frames() {
        let mut pool = Pool::new(3, 9, 9).unwrap();
        pool.compute_frame(&Viewport::default()).unwrap();
        pool.shutdown();
        assert!(pool.worker_states().iter().all(|s| *s == WorkerState::Stopped));
        match pool.compute_frame(&Viewport::default()) {
            Err(RenderError::PoolStopped) => {}
            other => panic!("expected PoolStopped, got {:?}", other.map(|_| ())),
        }
        pool.shutdown();
    }

    #[test]
    fn pool_rejects_bad_sizes() {
        assert!(Pool::new(0, 10, 10).is_err());
        assert!(Pool::new(11, 10, 10).is_err());
        assert!(Pool::new(2, 0, 10).is_err());
    }

    #[test]
    fn tiles_cover_the_frame() {
        let pool = Pool::new(4, 10, 18).unwrap();
        let tiles = pool.tiles();
        assert_eq!(tiles.len(), pool.worker_count());
        assert_eq!(tiles[0].row_start, 0);
        assert_eq!(tiles[3].row_count, 6);
        assert_eq!(pool.dimensions(), (10, 18));
    }

    #[test]
    fn lost_worker_fails_this_frame_and_the_next() {
        let mut pool = Pool::new(3, 12, 12).unwrap();
        pool.workers[1].truncate_output();
        for _ in 0..2 {
            match pool.compute_frame(&Viewport::default()) {
                Err(RenderError::WorkerLost(1)) => {}
                other => panic!("expected WorkerLost(1), got {:?}", other.map(|_| ())),
            }
            assert_eq!(
                pool.worker_states(),
                vec![WorkerState::Idle, WorkerState::Stopped, WorkerState::Idle]
            );
        }
        pool.shutdown();
        assert!(pool.worker_states().iter().all(|s| *s == WorkerState::Stopped));
    }
}
