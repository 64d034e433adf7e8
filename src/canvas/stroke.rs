use vello_cpu::kurbo::Shape as _;

use crate::canvas::mask::MaskLayer;
use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::{PaintoverError, PaintoverResult};
use crate::render::blend::premul_over_region;
use crate::render::surface::{point_to_cpu, render_layer};

/// Default brush diameter in image pixels.
pub const DEFAULT_BRUSH_PX: f64 = 40.0;

/// Semi-transparent red used to display painted regions.
pub const HIGHLIGHT_COLOR: Rgba8 = Rgba8::new(239, 68, 68, 179);

/// Brush diameter in image pixels; always positive and finite.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct BrushSize(f64);

impl BrushSize {
    /// Validate a diameter.
    pub fn new(px: f64) -> PaintoverResult<Self> {
        if !px.is_finite() || px <= 0.0 {
            return Err(PaintoverError::validation(format!(
                "brush size must be positive and finite, got {px}"
            )));
        }
        Ok(Self(px))
    }

    /// Diameter in pixels.
    pub fn px(self) -> f64 {
        self.0
    }
}

impl Default for BrushSize {
    fn default() -> Self {
        Self(DEFAULT_BRUSH_PX)
    }
}

impl TryFrom<f64> for BrushSize {
    type Error = PaintoverError;

    fn try_from(px: f64) -> Result<Self, Self::Error> {
        Self::new(px)
    }
}

impl From<BrushSize> for f64 {
    fn from(b: BrushSize) -> Self {
        b.0
    }
}

/// One segment of a freehand stroke, in image-pixel space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stroke {
    /// Segment start (previous pointer position).
    pub from: Point,
    /// Segment end (current pointer position).
    pub to: Point,
    /// Brush diameter.
    pub brush: BrushSize,
}

impl Stroke {
    /// Whether the segment degenerates to a single dot.
    pub fn is_dot(&self) -> bool {
        self.from.distance_squared(self.to) < 1e-12
    }

    /// Area touched by the round-capped segment.
    pub fn bounds(&self) -> Rect {
        let r = self.brush.px() * 0.5;
        Rect::from_points(self.from, self.to).inflate(r, r)
    }

    /// Rasterize onto `mask` with source-over.
    ///
    /// Only the segment's bounding box is rasterized; pixels outside the mask are dropped.
    pub fn draw(&self, color: Rgba8, mask: &mut MaskLayer) -> PaintoverResult<()> {
        let canvas = mask.canvas();
        let clip = self
            .bounds()
            .expand()
            .intersect(Rect::new(0.0, 0.0, f64::from(canvas.width), f64::from(canvas.height)));
        if clip.width() <= 0.0 || clip.height() <= 0.0 {
            tracing::debug!(stroke = ?self, "stroke outside canvas, skipped");
            return Ok(());
        }

        let x0 = clip.x0 as u32;
        let y0 = clip.y0 as u32;
        let w = clip.width() as u32;
        let h = clip.height() as u32;
        let offset = Point::new(f64::from(x0), f64::from(y0)).to_vec2();
        let from = point_to_cpu(self.from - offset);
        let to = point_to_cpu(self.to - offset);
        let diameter = self.brush.px();
        let dot = self.is_dot();

        let tile = render_layer(w, h, |ctx| {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                color.r, color.g, color.b, color.a,
            ));
            if dot {
                let circle = vello_cpu::kurbo::Circle::new(from, diameter * 0.5);
                ctx.fill_path(&circle.to_path(0.1));
            } else {
                let mut path = vello_cpu::kurbo::BezPath::new();
                path.move_to(from);
                path.line_to(to);
                ctx.set_stroke(
                    vello_cpu::kurbo::Stroke::new(diameter)
                        .with_caps(vello_cpu::kurbo::Cap::Round)
                        .with_join(vello_cpu::kurbo::Join::Round),
                );
                ctx.stroke_path(&path);
            }
            Ok(())
        })?;

        premul_over_region(mask.data_mut(), canvas, &tile, w, h, x0, y0)
    }
}

/// Accumulates pointer movement into a [`MaskLayer`].
#[derive(Clone, Debug)]
pub struct StrokeRenderer {
    is_drawing: bool,
    last_point: Option<Point>,
    brush: BrushSize,
    color: Rgba8,
}

impl Default for StrokeRenderer {
    fn default() -> Self {
        Self::new(BrushSize::default(), HIGHLIGHT_COLOR)
    }
}

impl StrokeRenderer {
    /// Idle renderer with the given brush and highlight color.
    pub fn new(brush: BrushSize, color: Rgba8) -> Self {
        Self {
            is_drawing: false,
            last_point: None,
            brush,
            color,
        }
    }

    /// Current brush.
    pub fn brush(&self) -> BrushSize {
        self.brush
    }

    /// Change the brush; takes effect on the next segment.
    pub fn set_brush(&mut self, brush: BrushSize) {
        self.brush = brush;
    }

    /// Highlight color.
    pub fn color(&self) -> Rgba8 {
        self.color
    }

    /// Whether a stroke is in progress.
    pub fn is_drawing(&self) -> bool {
        self.is_drawing
    }

    /// Last recorded pointer position of the active stroke.
    pub fn last_point(&self) -> Option<Point> {
        self.last_point
    }

    /// Start a stroke at `point` (which may be unknown, e.g. a touch event without touches).
    pub fn begin(&mut self, point: Option<Point>) {
        self.is_drawing = true;
        self.last_point = point;
    }

    /// Draw a segment from the last position to `point` and advance.
    ///
    /// Does nothing when no stroke is active or no start position was recorded.
    pub fn extend(&mut self, point: Point, mask: &mut MaskLayer) -> PaintoverResult<()> {
        if !self.is_drawing {
            return Ok(());
        }
        let Some(from) = self.last_point else {
            return Ok(());
        };
        let stroke = Stroke {
            from,
            to: point,
            brush: self.brush,
        };
        tracing::debug!(?from, to = ?point, brush = self.brush.px(), "stroke segment");
        stroke.draw(self.color, mask)?;
        self.last_point = Some(point);
        Ok(())
    }

    /// Finish the active stroke.
    pub fn end(&mut self) {
        self.is_drawing = false;
        self.last_point = None;
    }

    /// Erase the mask to fully transparent.
    pub fn clear(&self, mask: &mut MaskLayer) {
        mask.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/stroke.rs"]
mod tests;
