//! What the interactive handlers do to the viewport, without any of
//! the window-system types.  An input layer maps its key, wheel and
//! mouse events onto an [`Action`], applies it, and renders the
//! resulting viewport before accepting the next event.

use crate::errors::RenderError;
use crate::viewport::Viewport;
use std::str::FromStr;

/// Fraction of a span moved by one arrow-key press.
pub const PAN_STEP: f64 = 0.1;

/// Span change per zoom key press or wheel notch.
pub const ZOOM_STEP: f64 = 0.2;

/// Factor applied to the iteration budget per press or click.
pub const ITERATION_STEP: f64 = 2.0;

/// A single user interaction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Action {
    /// Up arrow.
    PanUp,
    /// Down arrow.
    PanDown,
    /// Left arrow.
    PanLeft,
    /// Right arrow.
    PanRight,
    /// The `.` key.
    ZoomIn,
    /// The `,` key.
    ZoomOut,
    /// Mouse wheel; positive rotation zooms out, negative zooms in.
    Wheel(i32),
    /// Mouse drag with the primary button, in pixels since the last
    /// motion event.
    Drag {
        /// Horizontal movement.
        dx: f64,
        /// Vertical movement.
        dy: f64,
    },
    /// The `X` key or a primary click.
    MoreIterations,
    /// The `Z` key or a secondary click.
    FewerIterations,
}

impl Action {
    /// The viewport after this interaction.  Fails if the interaction
    /// would leave the region empty or push a bound past the range of a
    /// double; the caller keeps its current viewport in that case.
    ///
    /// A wheel rotation of `n` notches is a single zoom by `n` steps, so
    /// the span becomes `span * (1 + 0.2 * n)`.  Five or more notches
    /// inward in a single event collapse the region and are refused.
    pub fn apply(&self, viewport: &Viewport) -> Result<Viewport, RenderError> {
        match *self {
            Action::PanUp => viewport.try_pan(0.0, -PAN_STEP),
            Action::PanDown => viewport.try_pan(0.0, PAN_STEP),
            Action::PanLeft => viewport.try_pan(-PAN_STEP, 0.0),
            Action::PanRight => viewport.try_pan(PAN_STEP, 0.0),
            Action::ZoomIn => viewport.try_zoom(-ZOOM_STEP),
            Action::ZoomOut => viewport.try_zoom(ZOOM_STEP),
            Action::Wheel(rotation) => viewport.try_zoom(ZOOM_STEP * f64::from(rotation)),
            Action::Drag { dx, dy } => viewport.try_drag(dx, dy),
            Action::MoreIterations => Ok(viewport.scale_iterations(ITERATION_STEP)),
            Action::FewerIterations => Ok(viewport.scale_iterations(1.0 / ITERATION_STEP)),
        }
    }
}

fn parse_number<T: FromStr>(s: &str, whole: &str) -> Result<T, RenderError> {
    s.trim()
        .parse()
        .map_err(|_| RenderError::UnknownAction(whole.to_string()))
}

/// Parses the names used by scripted sessions: `up`, `down`, `left`,
/// `right`, `in`, `out`, `more`, `fewer`, `wheel:N`, and `drag:DX,DY`.
impl FromStr for Action {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Action, RenderError> {
        let (name, argument) = match s.find(':') {
            Some(index) => (&s[..index], Some(&s[index + 1..])),
            None => (s, None),
        };
        match (name, argument) {
            ("up", None) => Ok(Action::PanUp),
            ("down", None) => Ok(Action::PanDown),
            ("left", None) => Ok(Action::PanLeft),
            ("right", None) => Ok(Action::PanRight),
            ("in", None) => Ok(Action::ZoomIn),
            ("out", None) => Ok(Action::ZoomOut),
            ("more", None) => Ok(Action::MoreIterations),
            ("fewer", None) => Ok(Action::FewerIterations),
            ("wheel", Some(rotation)) => Ok(Action::Wheel(parse_number(rotation, s)?)),
            ("drag", Some(delta)) => match delta.find(',') {
                Some(index) => {
                    let dx: f64 = parse_number(&delta[..index], s)?;
                    let dy: f64 = parse_number(&delta[index + 1..], s)?;
                    if dx.is_finite() && dy.is_finite() {
                        Ok(Action::Drag { dx, dy })
                    } else {
                        Err(RenderError::UnknownAction(s.to_string()))
                    }
                }
                None => Err(RenderError::UnknownAction(s.to_string())),
            },
            _ => Err(RenderError::UnknownAction(s.to_string())),
        }
    }
}
