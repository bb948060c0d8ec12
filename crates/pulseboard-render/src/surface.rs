//! The drawing surface abstraction.
//!
//! The renderer emits primitive operations; the host shell maps them onto
//! a real canvas. Keeping the seam this narrow makes the whole draw pass
//! testable: the [`DrawList`] implementation just records every call.

use pulseboard_sim::Vec2;

use crate::palette::Color;

/// A pixel surface the renderer draws onto, one frame per tick.
pub trait Surface {
    /// Fade the whole surface toward the background by `alpha` in `[0, 1]`
    /// (1 clears completely). Called first each frame; the partial fade is
    /// what produces particle trails.
    fn fade(&mut self, alpha: f64);

    /// Draw a straight line.
    fn line(&mut self, from: Vec2, to: Vec2, color: Color, width: f64, opacity: f64);

    /// Draw a filled circle.
    fn circle(&mut self, center: Vec2, radius: f64, color: Color, opacity: f64);

    /// Draw an unfilled ring.
    fn ring(&mut self, center: Vec2, radius: f64, color: Color, width: f64, opacity: f64);

    /// Draw a radial glow (soft gradient falling off to transparent).
    fn glow(&mut self, center: Vec2, radius: f64, color: Color, opacity: f64);

    /// Draw text anchored at `position`.
    fn text(&mut self, position: Vec2, content: &str, size: f64, color: Color, opacity: f64);
}

/// One recorded draw operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// A [`Surface::fade`] call.
    Fade {
        /// Fade strength.
        alpha: f64,
    },
    /// A [`Surface::line`] call.
    Line {
        /// Start point.
        from: Vec2,
        /// End point.
        to: Vec2,
        /// Stroke color.
        color: Color,
        /// Stroke width.
        width: f64,
        /// Stroke opacity.
        opacity: f64,
    },
    /// A [`Surface::circle`] call.
    Circle {
        /// Center point.
        center: Vec2,
        /// Circle radius.
        radius: f64,
        /// Fill color.
        color: Color,
        /// Fill opacity.
        opacity: f64,
    },
    /// A [`Surface::ring`] call.
    Ring {
        /// Center point.
        center: Vec2,
        /// Ring radius.
        radius: f64,
        /// Stroke color.
        color: Color,
        /// Stroke width.
        width: f64,
        /// Stroke opacity.
        opacity: f64,
    },
    /// A [`Surface::glow`] call.
    Glow {
        /// Center point.
        center: Vec2,
        /// Glow radius.
        radius: f64,
        /// Glow color.
        color: Color,
        /// Glow opacity.
        opacity: f64,
    },
    /// A [`Surface::text`] call.
    Text {
        /// Anchor position.
        position: Vec2,
        /// Rendered string.
        content: String,
        /// Font size.
        size: f64,
        /// Text color.
        color: Color,
        /// Text opacity.
        opacity: f64,
    },
}

/// A surface that records every operation, for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    /// Recorded operations in call order.
    pub ops: Vec<DrawOp>,
}

impl DrawList {
    /// Create an empty recorder.
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Drop all recorded operations.
    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl Surface for DrawList {
    fn fade(&mut self, alpha: f64) {
        self.ops.push(DrawOp::Fade { alpha });
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Color, width: f64, opacity: f64) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            color,
            width,
            opacity,
        });
    }

    fn circle(&mut self, center: Vec2, radius: f64, color: Color, opacity: f64) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            color,
            opacity,
        });
    }

    fn ring(&mut self, center: Vec2, radius: f64, color: Color, width: f64, opacity: f64) {
        self.ops.push(DrawOp::Ring {
            center,
            radius,
            color,
            width,
            opacity,
        });
    }

    fn glow(&mut self, center: Vec2, radius: f64, color: Color, opacity: f64) {
        self.ops.push(DrawOp::Glow {
            center,
            radius,
            color,
            opacity,
        });
    }

    fn text(&mut self, position: Vec2, content: &str, size: f64, color: Color, opacity: f64) {
        self.ops.push(DrawOp::Text {
            position,
            content: content.to_owned(),
            size,
            color,
            opacity,
        });
    }
}
