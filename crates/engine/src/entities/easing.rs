//! Easing curves for card and scene interpolation.

/// Maps linear progress `k` in `[0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Standard ease for routine formation changes
    #[default]
    ExponentialInOut,
    /// Slow start, fast middle, slow end. Used for reveals and de-formation.
    ThreePhase,
}

impl Easing {
    pub fn apply(self, k: f64) -> f64 {
        let k = if k.is_nan() { 1.0 } else { k.clamp(0.0, 1.0) };
        match self {
            Self::Linear => k,
            Self::ExponentialInOut => exponential_in_out(k),
            Self::ThreePhase => three_phase(k),
        }
    }
}

fn exponential_in_out(k: f64) -> f64 {
    if k == 0.0 {
        return 0.0;
    }
    if k == 1.0 {
        return 1.0;
    }
    let k = k * 2.0;
    if k < 1.0 {
        0.5 * 1024f64.powf(k - 1.0)
    } else {
        0.5 * (2.0 - 2f64.powf(-10.0 * (k - 1.0)))
    }
}

/// Cubic ease-in over the first 20%, linear through the middle 60%, cubic
/// ease-out over the last 20%. The first join steps from 0.016 to 0.08; the
/// curve stays monotonic.
fn three_phase(k: f64) -> f64 {
    if k <= 0.2 {
        2.0 * k * k * k
    } else if k <= 0.8 {
        0.08 + 0.84 * (k - 0.2) / 0.6
    } else {
        let t = 1.0 - (k - 0.8) / 0.2;
        0.92 + 0.08 * (1.0 - t * t * t)
    }
}
