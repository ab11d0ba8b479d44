use serde::Serialize;

use super::surface::{Rect, Viewport};
use crate::config::TooltipConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipSide {
    Above,
    Below,
}

/// Fixed-position tooltip anchor; `left` is the horizontal centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TooltipPlacement {
    pub top: f64,
    pub left: f64,
    pub side: TooltipSide,
}

/// Place the label below the target unless it would not fit there and fits above.
pub fn place_tooltip(rect: &Rect, viewport: &Viewport, config: &TooltipConfig) -> TooltipPlacement {
    let space_below = viewport.height - rect.bottom();
    let side = if space_below < config.flip_threshold && rect.top > config.flip_threshold {
        TooltipSide::Above
    } else {
        TooltipSide::Below
    };

    let top = match side {
        TooltipSide::Above => rect.top - config.above_offset,
        TooltipSide::Below => rect.bottom() + config.below_offset,
    };

    // Narrow viewports pin to the left margin.
    let left = rect
        .center_x()
        .min(viewport.width - config.horizontal_margin)
        .max(config.horizontal_margin);

    TooltipPlacement { top, left, side }
}
