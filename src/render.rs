//! The entry point for a presentation layer: pick a mode, hand over a
//! viewport, get a frame back.

use crate::errors::RenderError;
use crate::frame::{compute_frame, FrameBuffer};
use crate::pool::Pool;
use crate::viewport::Viewport;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// How a frame is computed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Every pixel on the calling thread.
    SingleThread,
    /// One band per pool worker.
    Parallel,
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<RenderMode, String> {
        match s {
            "single" => Ok(RenderMode::SingleThread),
            "parallel" => Ok(RenderMode::Parallel),
            _ => Err(format!("unknown render mode '{}'", s)),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RenderMode::SingleThread => write!(f, "single"),
            RenderMode::Parallel => write!(f, "parallel"),
        }
    }
}

/// What it took to produce a frame.
#[derive(Copy, Clone, Debug)]
pub struct FrameReport {
    /// The path that computed the frame.
    pub mode: RenderMode,
    /// Iteration budget the frame was rendered with.
    pub max_iterations: u32,
    /// Wall time spent computing.
    pub elapsed: Duration,
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Iterations: {}  Calc Time: {:.4} seconds",
            self.max_iterations,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Renders frames of a fixed size, either directly or through a worker
/// pool built up front.
pub struct Renderer {
    width: usize,
    height: usize,
    pool: Pool,
}

impl Renderer {
    /// A renderer for `width` by `height` frames with `workers` pool
    /// threads.
    pub fn new(width: usize, height: usize, workers: usize) -> Result<Renderer, RenderError> {
        Ok(Renderer {
            width,
            height,
            pool: Pool::new(workers, width, height)?,
        })
    }

    /// Frame size, as `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// The worker pool behind parallel renders.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Compute one frame of `viewport`.
    pub fn render(&mut self, viewport: &Viewport, mode: RenderMode) -> Result<FrameBuffer, RenderError> {
        match mode {
            RenderMode::SingleThread => Ok(compute_frame(viewport, self.width, self.height)),
            RenderMode::Parallel => self.pool.compute_frame(viewport),
        }
    }

    /// Compute one frame and report how long it took.
    pub fn render_timed(
        &mut self,
        viewport: &Viewport,
        mode: RenderMode,
    ) -> Result<(FrameBuffer, FrameReport), RenderError> {
        let start = Instant::now();
        let frame = self.render(viewport, mode)?;
        let report = FrameReport {
            mode,
            max_iterations: viewport.max_iterations(),
            elapsed: start.elapsed(),
        };
        debug!("{} frame: {}", mode, report);
        Ok((frame, report))
    }

    /// Stop the pool.  Single-threaded renders still work afterwards;
    /// parallel ones fail with [`RenderError::PoolStopped`].
    pub fn shutdown(&mut self) {
        self.pool.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modes() {
        assert_eq!("single".parse::<RenderMode>(), Ok(RenderMode::SingleThread));
        assert_eq!("parallel".parse::<RenderMode>(), Ok(RenderMode::Parallel));
        assert!("gpu".parse::<RenderMode>().is_err());
    }

    #[test]
    fn both_modes_agree() {
        let mut renderer = Renderer::new(24, 18, 3).unwrap();
        let vp = Viewport::default().pan(-0.2, 0.0);
        let single = renderer.render(&vp, RenderMode::SingleThread).unwrap();
        let parallel = renderer.render(&vp, RenderMode::Parallel).unwrap();
        assert_eq!(single, parallel);
    }

    #[test]
    fn report_shows_iterations_and_time() {
        let mut renderer = Renderer::new(8, 8, 2).unwrap();
        let (_, report) = renderer
            .render_timed(&Viewport::default(), RenderMode::Parallel)
            .unwrap();
        let status = report.to_string();
        assert!(status.starts_with("Iterations: 64  Calc Time: "));
        assert!(status.ends_with(" seconds"));
    }

    #[test]
    fn single_mode_survives_shutdown() {
        let mut renderer = Renderer::new(8, 8, 2).unwrap();
        renderer.shutdown();
        assert!(renderer.render(&Viewport::default(), RenderMode::SingleThread).is_ok());
        assert!(renderer.render(&Viewport::default(), RenderMode::Parallel).is_err());
    }
}
