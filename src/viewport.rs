//! The viewport is the rectangle of the complex plane currently mapped
//! onto the pixel grid, along with the iteration budget used to decide
//! whether a point has escaped.  Interaction never edits a viewport in
//! place; every transform hands back a fresh one for the next frame.

use crate::errors::RenderError;
use num::{clamp, Complex};

/// Iteration budget a session starts with.
pub const DEFAULT_MAX_ITERATIONS: u32 = 64;

/// Fraction of the vertical span moved per pixel of drag.
const DRAG_SCALE: f64 = 0.002;

/// The visible region of the complex plane, treating the real part as
/// the horizontal axis and the imaginary part as the vertical axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    hmin: f64,
    hmax: f64,
    vmin: f64,
    vmax: f64,
    max_iterations: u32,
}

impl Default for Viewport {
    fn default() -> Viewport {
        Viewport {
            hmin: -1.5,
            hmax: 1.5,
            vmin: -1.5,
            vmax: 1.5,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Viewport {
    /// Constructor.  Both axes must be finite and strictly increasing,
    /// and at least one iteration must be allowed.
    pub fn new(
        hmin: f64,
        hmax: f64,
        vmin: f64,
        vmax: f64,
        max_iterations: u32,
    ) -> Result<Viewport, RenderError> {
        if !(hmin.is_finite() && hmax.is_finite() && vmin.is_finite() && vmax.is_finite()) {
            return Err(RenderError::InvalidViewport(
                "bounds must be finite".to_string(),
            ));
        }
        if hmin >= hmax {
            return Err(RenderError::InvalidViewport(format!(
                "horizontal range {}..{} is empty",
                hmin, hmax
            )));
        }
        if vmin >= vmax {
            return Err(RenderError::InvalidViewport(format!(
                "vertical range {}..{} is empty",
                vmin, vmax
            )));
        }
        if max_iterations == 0 {
            return Err(RenderError::InvalidViewport(
                "at least one iteration is required".to_string(),
            ));
        }
        Ok(Viewport {
            hmin,
            hmax,
            vmin,
            vmax,
            max_iterations,
        })
    }

    /// Left edge.
    pub fn hmin(&self) -> f64 {
        self.hmin
    }

    /// Right edge.
    pub fn hmax(&self) -> f64 {
        self.hmax
    }

    /// Top edge (the first pixel row maps here).
    pub fn vmin(&self) -> f64 {
        self.vmin
    }

    /// Bottom edge.
    pub fn vmax(&self) -> f64 {
        self.vmax
    }

    /// Iteration budget for the escape test.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Width of the region on the complex plane.
    pub fn hspan(&self) -> f64 {
        self.hmax - self.hmin
    }

    /// Height of the region on the complex plane.
    pub fn vspan(&self) -> f64 {
        self.vmax - self.vmin
    }

    /// Given the column and row of a pixel in a `width` by `height`
    /// grid, return the point of the complex plane it samples.  Each
    /// axis is interpolated on its own; neither dimension may be zero,
    /// but that is not checked here.
    #[inline]
    pub fn map_to_complex(&self, x: usize, y: usize, width: usize, height: usize) -> Complex<f64> {
        Complex::new(
            self.hmin + (x as f64 / width as f64) * (self.hmax - self.hmin),
            self.vmin + (y as f64 / height as f64) * (self.vmax - self.vmin),
        )
    }

    fn with_bounds(
        &self,
        hmin: f64,
        hmax: f64,
        vmin: f64,
        vmax: f64,
    ) -> Result<Viewport, RenderError> {
        Viewport::new(hmin, hmax, vmin, vmax, self.max_iterations)
    }

    /// Shift the region by a fraction of its own span on each axis.
    /// `pan(0.0, -0.1)` moves the view a tenth of a screen up.
    ///
    /// Fails if the shifted bounds leave double range or stop being
    /// ordered.
    pub fn try_pan(&self, dx_fraction: f64, dy_fraction: f64) -> Result<Viewport, RenderError> {
        let hshift = self.hspan() * dx_fraction;
        let vshift = self.vspan() * dy_fraction;
        self.with_bounds(
            self.hmin + hshift,
            self.hmax + hshift,
            self.vmin + vshift,
            self.vmax + vshift,
        )
    }

    /// [`try_pan`](Viewport::try_pan), panicking on failure.
    pub fn pan(&self, dx_fraction: f64, dy_fraction: f64) -> Viewport {
        self.try_pan(dx_fraction, dy_fraction)
            .unwrap_or_else(|e| panic!("pan({}, {}): {}", dx_fraction, dy_fraction, e))
    }

    /// Follow a mouse drag of `dx` by `dy` pixels.  The image moves with
    /// the pointer, so the region moves the other way.  Both axes are
    /// scaled by the vertical span, so a drag feels the same in either
    /// direction on a non-square window.
    pub fn try_drag(&self, dx_pixels: f64, dy_pixels: f64) -> Result<Viewport, RenderError> {
        let step = self.vspan() * DRAG_SCALE;
        self.with_bounds(
            self.hmin - dx_pixels * step,
            self.hmax - dx_pixels * step,
            self.vmin - dy_pixels * step,
            self.vmax - dy_pixels * step,
        )
    }

    /// [`try_drag`](Viewport::try_drag), panicking on failure.
    pub fn drag(&self, dx_pixels: f64, dy_pixels: f64) -> Viewport {
        self.try_drag(dx_pixels, dy_pixels)
            .unwrap_or_else(|e| panic!("drag({}, {}): {}", dx_pixels, dy_pixels, e))
    }

    /// Scale both spans about their centres so that each becomes
    /// `span * (1 + factor)`.  Positive factors zoom out, negative ones
    /// zoom in.  A factor of -1 or less would collapse or invert the
    /// region and is refused.
    pub fn try_zoom(&self, factor: f64) -> Result<Viewport, RenderError> {
        if !(factor > -1.0) {
            return Err(RenderError::InvalidViewport(format!(
                "zoom factor {} would collapse the viewport",
                factor
            )));
        }
        let hgrow = self.hspan() * factor / 2.0;
        let vgrow = self.vspan() * factor / 2.0;
        self.with_bounds(
            self.hmin - hgrow,
            self.hmax + hgrow,
            self.vmin - vgrow,
            self.vmax + vgrow,
        )
    }

    /// [`try_zoom`](Viewport::try_zoom), panicking on failure.
    pub fn zoom(&self, factor: f64) -> Viewport {
        self.try_zoom(factor)
            .unwrap_or_else(|e| panic!("zoom({}): {}", factor, e))
    }

    /// Multiply the iteration budget, rounding down.  The result never
    /// drops below one, so repeated halving bottoms out instead of
    /// producing a frame where every point escapes immediately.
    pub fn scale_iterations(&self, multiplier: f64) -> Viewport {
        assert!(
            multiplier.is_finite() && multiplier >= 0.0,
            "iteration multiplier {} is not a non-negative number",
            multiplier
        );
        let scaled = (f64::from(self.max_iterations) * multiplier).floor();
        Viewport {
            max_iterations: clamp(scaled, 1.0, f64::from(u32::MAX)) as u32,
            ..*self
        }
    }
}
