// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A tile worker is a long-lived thread that owns one band of the
//! frame.  It sleeps on its request channel until the coordinator hands
//! it a viewport snapshot along with its output buffer, fills the
//! buffer, and hands it back on its completion channel.  A worker that
//! dies drops its end of that channel, so the coordinator finds out
//! instead of waiting forever.
//!
//! The output buffer travels with the messages.  While a worker is
//! computing, the coordinator does not have the buffer at all; while it
//! is idle, the worker does not.  That is the whole synchronization
//! story for the pixels.  The state atomic exists so either side can
//! see where a worker is in its cycle.

use crate::errors::RenderError;
use crate::frame::compute_rows;
use crate::tiles::Tile;
use crate::viewport::Viewport;
use crossbeam::channel::{bounded, Receiver, SendError, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Where a worker is in its cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for work; its output may be read.
    Idle,
    /// Recomputing its band; its output must not be read.
    Computing,
    /// Shut down for good.
    Stopped,
}

const IDLE: usize = 0;
const COMPUTING: usize = 1;
const STOPPED: usize = 2;

#[derive(Clone, Debug)]
struct StateCell(Arc<AtomicUsize>);

impl StateCell {
    fn new() -> StateCell {
        StateCell(Arc::new(AtomicUsize::new(IDLE)))
    }

    fn get(&self) -> WorkerState {
        match self.0.load(Ordering::Acquire) {
            IDLE => WorkerState::Idle,
            COMPUTING => WorkerState::Computing,
            _ => WorkerState::Stopped,
        }
    }

    fn set(&self, state: WorkerState) {
        let raw = match state {
            WorkerState::Idle => IDLE,
            WorkerState::Computing => COMPUTING,
            WorkerState::Stopped => STOPPED,
        };
        self.0.store(raw, Ordering::Release);
    }
}

pub(crate) enum Request {
    Update {
        generation: u64,
        viewport: Viewport,
        output: Vec<u8>,
    },
    Shutdown,
}

struct Completion {
    generation: u64,
    output: Vec<u8>,
}

/// The coordinator's handle on one worker thread.
pub struct TileWorker {
    index: usize,
    tile: Tile,
    state: StateCell,
    requests: Sender<Request>,
    completions: Receiver<Completion>,
    handle: Option<JoinHandle<()>>,
    // Present exactly when the worker is idle.
    output: Option<Vec<u8>>,
    // Set once the thread is found dead; it is never restarted.
    lost: bool,
}

impl TileWorker {
    /// Start worker `index` on `tile` of a `width` by `height` frame.
    pub(crate) fn spawn(
        index: usize,
        tile: Tile,
        width: usize,
        height: usize,
    ) -> Result<TileWorker, RenderError> {
        let (requests, inbox) = bounded(1);
        let (outbox, completions) = bounded(1);
        let state = StateCell::new();
        let worker_state = state.clone();
        let handle = thread::Builder::new()
            .name(format!("tile-worker-{}", index))
            .spawn(move || run(tile, width, height, worker_state, inbox, outbox))
            .map_err(|cause| RenderError::Spawn {
                worker: index,
                cause,
            })?;
        Ok(TileWorker {
            index,
            tile,
            state,
            requests,
            completions,
            handle: Some(handle),
            output: Some(vec![0 as u8; tile.byte_length]),
            lost: false,
        })
    }

    /// Position of this worker in the pool.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The band this worker renders.
    pub fn tile(&self) -> &Tile {
        &self.tile
    }

    /// The worker's current state.
    pub fn state(&self) -> WorkerState {
        self.state.get()
    }

    /// Lend the worker its buffer and a viewport snapshot, and mark it
    /// computing.  A worker whose thread has died answers `WorkerLost`
    /// from then on.
    pub(crate) fn request_update(
        &mut self,
        generation: u64,
        viewport: Viewport,
    ) -> Result<(), RenderError> {
        if self.lost {
            return Err(RenderError::WorkerLost(self.index));
        }
        if self.state() == WorkerState::Stopped {
            return Err(RenderError::PoolStopped);
        }
        let output = self
            .output
            .take()
            .ok_or(RenderError::WorkerBusy(self.index))?;
        self.state.set(WorkerState::Computing);
        trace!(
            "worker {} <- generation {}, rows {:?}",
            self.index,
            generation,
            self.tile.rows()
        );
        let request = Request::Update {
            generation,
            viewport,
            output,
        };
        match self.requests.send(request) {
            Ok(()) => Ok(()),
            Err(SendError(request)) => {
                if let Request::Update { output, .. } = request {
                    self.output = Some(output);
                }
                Err(self.mark_lost())
            }
        }
    }

    /// Block until the worker hands back the band for `generation`,
    /// and return it for the coordinator to copy.
    pub(crate) fn wait(&mut self, generation: u64) -> Result<&[u8], RenderError> {
        if self.output.is_none() {
            let done = match self.completions.recv() {
                Ok(done) => done,
                Err(_) => return Err(self.mark_lost()),
            };
            assert_eq!(
                done.generation, generation,
                "worker {} answered for the wrong frame",
                self.index
            );
            assert_eq!(
                self.state(),
                WorkerState::Idle,
                "worker {} returned its band before going idle",
                self.index
            );
            self.output = Some(done.output);
        }
        match self.output {
            Some(ref output) => Ok(output.as_slice()),
            None => Err(RenderError::WorkerLost(self.index)),
        }
    }

    fn mark_lost(&mut self) -> RenderError {
        if !self.lost {
            error!("tile worker {} died", self.index);
        }
        self.lost = true;
        self.state.set(WorkerState::Stopped);
        RenderError::WorkerLost(self.index)
    }

    /// Swap in a buffer of the wrong size, so the next band computed
    /// panics inside the worker thread.
    #[cfg(test)]
    pub(crate) fn truncate_output(&mut self) {
        if let Some(ref mut output) = self.output {
            output.clear();
        }
    }

    /// Ask the worker to exit and wait for it.  A band already being
    /// computed is finished first.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // An Err means the thread is already gone; join below reports it.
            let _ = self.requests.send(Request::Shutdown);
            if handle.join().is_err() {
                warn!("tile worker {} panicked", self.index);
            }
            self.state.set(WorkerState::Stopped);
        }
    }
}

impl Drop for TileWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    tile: Tile,
    width: usize,
    height: usize,
    state: StateCell,
    inbox: Receiver<Request>,
    outbox: Sender<Completion>,
) {
    for request in inbox.iter() {
        match request {
            Request::Update {
                generation,
                viewport,
                mut output,
            } => {
                compute_rows(&viewport, width, height, tile.rows(), &mut output);
                state.set(WorkerState::Idle);
                if outbox.send(Completion { generation, output }).is_err() {
                    break;
                }
            }
            Request::Shutdown => break,
        }
    }
    state.set(WorkerState::Stopped);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::compute_frame;
    use crate::tiles::partition;

    #[test]
    fn worker_renders_its_band() {
        let vp = Viewport::default();
        let tile = partition(16, 12, 3).unwrap()[1];
        let mut worker = TileWorker::spawn(1, tile, 16, 12).unwrap();
        assert_eq!(worker.state(), WorkerState::Idle);

        worker.request_update(1, vp).unwrap();
        let band = worker.wait(1).unwrap().to_vec();
        assert_eq!(worker.state(), WorkerState::Idle);

        let reference = compute_frame(&vp, 16, 12);
        assert_eq!(&reference.as_bytes()[tile.bytes()], &band[..]);
    }

    #[test]
    fn worker_refuses_second_request_while_busy() {
        let tile = partition(4, 4, 1).unwrap()[0];
        let mut worker = TileWorker::spawn(0, tile, 4, 4).unwrap();
        worker.request_update(1, Viewport::default()).unwrap();
        match worker.request_update(2, Viewport::default()) {
            Err(RenderError::WorkerBusy(0)) => {}
            other => panic!("expected WorkerBusy, got {:?}", other),
        }
        worker.wait(1).unwrap();
        worker.request_update(3, Viewport::default()).unwrap();
        worker.wait(3).unwrap();
    }

    #[test]
    fn later_frames_see_later_viewports() {
        let tile = partition(10, 10, 2).unwrap()[0];
        let mut worker = TileWorker::spawn(0, tile, 10, 10).unwrap();
        let first = Viewport::default();
        let second = first.zoom(-0.5).pan(0.2, 0.1);

        worker.request_update(1, first).unwrap();
        worker.wait(1).unwrap();
        worker.request_update(2, second).unwrap();
        let band = worker.wait(2).unwrap().to_vec();

        let reference = compute_frame(&second, 10, 10);
        assert_eq!(&reference.as_bytes()[tile.bytes()], &band[..]);
    }

    #[test]
    fn stopped_worker_reports_stopped() {
        let tile = partition(4, 4, 1).unwrap()[0];
        let mut worker = TileWorker::spawn(0, tile, 4, 4).unwrap();
        worker.stop();
        assert_eq!(worker.state(), WorkerState::Stopped);
        match worker.request_update(1, Viewport::default()) {
            Err(RenderError::PoolStopped) => {}
            other => panic!("expected PoolStopped, got {:?}", other),
        }
    }

    #[test]
    fn dead_worker_is_lost_not_busy() {
        let tile = partition(8, 8, 2).unwrap()[1];
        let mut worker = TileWorker::spawn(1, tile, 8, 8).unwrap();
        worker.truncate_output();
        worker.request_update(1, Viewport::default()).unwrap();
        match worker.wait(1) {
            Err(RenderError::WorkerLost(1)) => {}
            other => panic!("expected WorkerLost, got {:?}", other.map(|_| ())),
        }
        assert_eq!(worker.state(), WorkerState::Stopped);
        for generation in 2..4 {
            match worker.request_update(generation, Viewport::default()) {
                Err(RenderError::WorkerLost(1)) => {}
                other => panic!("expected WorkerLost, got {:?}", other),
            }
        }
    }

    #[test]
    fn failed_send_keeps_the_buffer() {
        let tile = partition(4, 4, 1).unwrap()[0];
        let mut worker = TileWorker::spawn(0, tile, 4, 4).unwrap();
        let (closed, _) = bounded(1);
        let live = std::mem::replace(&mut worker.requests, closed);
        match worker.request_update(1, Viewport::default()) {
            Err(RenderError::WorkerLost(0)) => {}
            other => panic!("expected WorkerLost, got {:?}", other),
        }
        assert_eq!(worker.output.as_ref().map(Vec::len), Some(tile.byte_length));
        assert_eq!(worker.state(), WorkerState::Stopped);
        match worker.request_update(2, Viewport::default()) {
            Err(RenderError::WorkerLost(0)) => {}
            other => panic!("expected WorkerLost, got {:?}", other),
        }
        drop(live);
        worker.stop();
    }
}
