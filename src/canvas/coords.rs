use crate::foundation::core::{Canvas, Point};

/// Pointing-device sample in client (viewport) coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent {
    /// Mouse event at `client`.
    Mouse {
        /// Cursor position.
        client: Point,
    },
    /// Touch event; only the first active touch is used.
    Touch {
        /// Active touch points, possibly empty (e.g. on touch end).
        touches: Vec<Point>,
    },
}

impl PointerEvent {
    /// Mouse event at `(x, y)`.
    pub fn mouse(x: f64, y: f64) -> Self {
        Self::Mouse {
            client: Point::new(x, y),
        }
    }

    /// Single-touch event at `(x, y)`.
    pub fn touch(x: f64, y: f64) -> Self {
        Self::Touch {
            touches: vec![Point::new(x, y)],
        }
    }

    fn client_point(&self) -> Option<Point> {
        match self {
            Self::Mouse { client } => Some(*client),
            Self::Touch { touches } => touches.first().copied(),
        }
    }
}

/// On-screen bounding rectangle of the drawing canvas, in client coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CanvasRect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Displayed width.
    pub width: f64,
    /// Displayed height.
    pub height: f64,
}

/// Map a pointer event to image-pixel coordinates.
///
/// The displayed canvas may be scaled independently on each axis; the offset from `rect`'s
/// top-left is multiplied by `intrinsic / displayed`. Returns `None` when the event carries no
/// point or the displayed rectangle is degenerate.
pub fn map_pointer(event: &PointerEvent, rect: CanvasRect, intrinsic: Canvas) -> Option<Point> {
    let client = event.client_point()?;
    if !(rect.width.is_finite() && rect.height.is_finite()) || rect.width <= 0.0 || rect.height <= 0.0
    {
        return None;
    }
    let scale_x = f64::from(intrinsic.width) / rect.width;
    let scale_y = f64::from(intrinsic.height) / rect.height;
    Some(Point::new(
        (client.x - rect.left) * scale_x,
        (client.y - rect.top) * scale_y,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/coords.rs"]
mod tests;
