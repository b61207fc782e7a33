// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can go wrong while setting up or driving a render.
//! Collapsed viewports and zero-sized frames are not here; those are
//! caller bugs and panic where they are detected.

use failure::Fail;
use std::io;

/// The error type shared by the viewport, the tiler, and the pool.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// A viewport was built from bounds that do not describe a
    /// rectangle, or with an empty iteration budget.
    #[fail(display = "invalid viewport: {}", _0)]
    InvalidViewport(String),

    /// The frame has no pixels to tile.
    #[fail(display = "a {}x{} frame has no pixels", width, height)]
    EmptyFrame {
        /// Requested width in pixels.
        width: usize,
        /// Requested height in pixels.
        height: usize,
    },

    /// A pool was requested with zero workers.
    #[fail(display = "a worker pool needs at least one worker")]
    NoWorkers,

    /// More workers than rows; some bands would be empty.
    #[fail(
        display = "{} workers cannot share a frame {} rows high",
        workers, height
    )]
    TooManyWorkers {
        /// Requested worker count.
        workers: usize,
        /// Frame height in rows.
        height: usize,
    },

    /// The operating system refused to start a worker thread.
    #[fail(display = "could not start tile worker {}: {}", worker, cause)]
    Spawn {
        /// Index of the worker that failed to start.
        worker: usize,
        /// The underlying failure.
        #[cause]
        cause: io::Error,
    },

    /// A worker hung up before finishing its band, most likely because
    /// it panicked.
    #[fail(display = "tile worker {} went away mid-frame", _0)]
    WorkerLost(usize),

    /// A worker was asked for a new band before handing back the last.
    #[fail(display = "tile worker {} has not finished its band", _0)]
    WorkerBusy(usize),

    /// The pool has been shut down and accepts no more frames.
    #[fail(display = "the worker pool has been shut down")]
    PoolStopped,

    /// A scripted interaction could not be parsed.
    #[fail(display = "unrecognized action: {}", _0)]
    UnknownAction(String),
}
