use std::cmp::Ordering;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::SeriesPoint;
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MarkerPosition {
    AboveBar,
    BelowBar,
    InBar,
    Price(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerShape {
    Circle,
    Square,
    ArrowUp,
    ArrowDown,
}

/// Point annotation anchored at a horizontal value of its series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesMarker<X> {
    pub id: String,
    pub horz: X,
    pub position: MarkerPosition,
    pub shape: MarkerShape,
    pub color: Option<Color>,
    pub text: Option<String>,
    pub priority: i32,
}

impl<X> SeriesMarker<X> {
    #[must_use]
    pub fn new(id: impl Into<String>, horz: X, position: MarkerPosition) -> Self {
        Self {
            id: id.into(),
            horz,
            position,
            shape: MarkerShape::Circle,
            color: None,
            text: None,
            priority: 0,
        }
    }

    #[must_use]
    pub fn with_shape(mut self, shape: MarkerShape) -> Self {
        self.shape = shape;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Pure derivation of a marker set from the series' current data.
pub type MarkerFn<X> = Rc<dyn Fn(&[SeriesPoint<X>]) -> Vec<SeriesMarker<X>>>;

/// Default derivation: no markers.
#[must_use]
pub fn no_markers<X: 'static>() -> MarkerFn<X> {
    Rc::new(|_| Vec::new())
}

/// Orders markers by horizontal value, priority (desc), then id.
pub fn sort_markers<X: PartialOrd>(markers: &mut [SeriesMarker<X>]) {
    markers.sort_by(|a, b| {
        a.horz
            .partial_cmp(&b.horz)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.priority.cmp(&a.priority))
            .then_with(|| a.id.cmp(&b.id))
    });
}

pub fn validate_markers<X>(markers: &[SeriesMarker<X>]) -> ChartResult<()> {
    for marker in markers {
        if let MarkerPosition::Price(price) = marker.position {
            if !price.is_finite() {
                return Err(ChartError::InvalidData(format!(
                    "marker `{}` price must be finite",
                    marker.id
                )));
            }
        }
        if let Some(color) = marker.color {
            color.validate()?;
        }
    }
    Ok(())
}
