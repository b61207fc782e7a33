#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Interactive Mandelbrot renderer
//!
//! The Mandelbrot set is drawn by taking every pixel of the window,
//! finding the point of the complex plane it covers, and iterating
//! `z = z * z + c` from that point until it either runs away or an
//! iteration budget is used up.  The number of iterations survived is
//! turned into a colour, and the colours together make the image.
//!
//! This crate is the compute core behind an explorer that lets the
//! user pan, zoom, and change the iteration budget, re-rendering after
//! every change.  A frame is computed either on the calling thread
//! ([`compute_frame`]) or by a [`Pool`] of long-lived workers, each of
//! which owns one fixed horizontal band of the image.  Both paths run
//! the same per-pixel kernel and produce identical bytes.
//!
//! Windowing and input capture are left to the caller; [`Action`]
//! describes what each interaction does to the [`Viewport`], and
//! [`Renderer`] is the one call a presentation layer needs.

extern crate crossbeam;
extern crate failure;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;

pub mod controls;
pub mod errors;
pub mod escape;
pub mod frame;
pub mod palette;
pub mod pool;
pub mod render;
pub mod tiles;
pub mod viewport;
pub mod worker;

pub use controls::Action;
pub use errors::RenderError;
pub use escape::escape_iterations;
pub use frame::{compute_frame, FrameBuffer};
pub use palette::{colorize, Rgba};
pub use pool::Pool;
pub use render::{FrameReport, RenderMode, Renderer};
pub use tiles::{partition, Tile};
pub use viewport::Viewport;
pub use worker::{TileWorker, WorkerState};
