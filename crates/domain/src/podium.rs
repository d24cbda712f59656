//! Winner podium - where revealed winners are shown in front of the sphere

use serde::{Deserialize, Serialize};

use crate::value_objects::{CardSize, Transform, Vec3};

/// Winners per podium row.
pub const PODIUM_ROW_LEN: usize = 5;
/// Depth at which winners float in front of the sphere.
pub const PODIUM_DEPTH: f64 = 1000.0;

const SPACING: f64 = 1.2;
const MIN_SCALE: f64 = 0.5;
const MAX_SCALE: f64 = 2.0;

/// Visible screen area the podium has to fit into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// Target for one revealed winner card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PodiumSlot {
    pub transform: Transform,
    pub scale: f64,
}

/// Lay out `count` winners in centered rows of at most five.
///
/// Cards are scaled up when few winners are shown and down when a large
/// round would overflow the viewport; every winner in a round shares one scale.
pub fn winner_display_targets(
    count: usize,
    card_size: CardSize,
    viewport: Viewport,
) -> Vec<PodiumSlot> {
    if count == 0 {
        return Vec::new();
    }
    let columns = count.min(PODIUM_ROW_LEN);
    let rows = count.div_ceil(PODIUM_ROW_LEN);
    let step_x = card_size.width * SPACING;
    let step_y = card_size.height * SPACING;

    let fit_x = viewport.width * 0.9 / (columns as f64 * step_x);
    let fit_y = viewport.height * 0.8 / (rows as f64 * step_y);
    let scale = fit_x.min(fit_y);
    let scale = if scale.is_finite() {
        scale.clamp(MIN_SCALE, MAX_SCALE)
    } else {
        1.0
    };

    let y_offset = (rows as f64 - 1.0) / 2.0;
    (0..count)
        .map(|index| {
            let row = index / PODIUM_ROW_LEN;
            // The last row may be shorter and is centered on its own
            let in_row = (count - row * PODIUM_ROW_LEN).min(PODIUM_ROW_LEN);
            let column = (index % PODIUM_ROW_LEN) as f64;
            let x_offset = (in_row as f64 - 1.0) / 2.0;
            PodiumSlot {
                transform: Transform::at(Vec3::new(
                    (column - x_offset) * step_x * scale,
                    (y_offset - row as f64) * step_y * scale,
                    PODIUM_DEPTH,
                )),
                scale,
            }
        })
        .collect()
}
