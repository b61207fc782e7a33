//! Turns an iteration count into a colour.  The palette is three sine
//! waves a third of a cycle apart, so it repeats every 20π iterations
//! and never depends on where the pixel is.

const FREQUENCY: f64 = 0.1;
const RED_PHASE: f64 = 0.0;
const GREEN_PHASE: f64 = 2.0;
const BLUE_PHASE: f64 = 4.0;

/// An 8-bit-per-channel colour.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel; always opaque for rendered pixels.
    pub a: u8,
}

impl Rgba {
    /// The colour as it is laid out in a frame buffer: alpha, blue,
    /// green, red.
    #[inline]
    pub fn to_abgr(self) -> [u8; 4] {
        [self.a, self.b, self.g, self.r]
    }
}

#[inline]
fn channel(n: u32, phase: f64) -> u8 {
    let level = 0.5 * (FREQUENCY * f64::from(n) + phase).sin() + 0.5;
    (level * 255.0) as u8
}

/// Colour for a pixel that survived `n` iterations.
#[inline]
pub fn colorize(n: u32) -> Rgba {
    Rgba {
        r: channel(n, RED_PHASE),
        g: channel(n, GREEN_PHASE),
        b: channel(n, BLUE_PHASE),
        a: 255,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn zero_iterations_shows_phase_offsets() {
        // sin(0), sin(2) and sin(4), rescaled and truncated
        assert_eq!(
            colorize(0),
            Rgba {
                r: 127,
                g: 243,
                b: 31,
                a: 255
            }
        );
    }

    #[test]
    fn alpha_is_always_opaque() {
        for n in 0..500 {
            assert_eq!(colorize(n).a, 255);
        }
    }

    #[test]
    fn palette_is_periodic() {
        let period = 2.0 * PI / FREQUENCY;
        for n in 0..200u32 {
            let shifted = f64::from(n) + period;
            let near = shifted.round() as u32;
            let a = colorize(n);
            let b = colorize(near);
            // rounding to a whole iteration moves the phase by at most 0.05 rad
            for (x, y) in [(a.r, b.r), (a.g, b.g), (a.b, b.b)].iter() {
                assert!((i16::from(*x) - i16::from(*y)).abs() <= 8);
            }
        }
    }

    #[test]
    fn abgr_layout() {
        let c = Rgba {
            r: 1,
            g: 2,
            b: 3,
            a: 4,
        };
        assert_eq!(c.to_abgr(), [4, 3, 2, 1]);
    }
}
