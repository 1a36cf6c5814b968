use std::fmt;
use std::rc::Rc;

use crate::api::SeriesOptions;
use crate::core::{SeriesData, SeriesKind};

/// Pane view implementation backing a custom series.
pub trait CustomSeriesView {
    fn name(&self) -> &str;

    fn default_options(&self) -> SeriesOptions {
        SeriesOptions::default()
    }

    /// Values contributing to autoscale; the last one is the "current" value.
    fn price_values(&self, data: &SeriesData) -> Vec<f64>;

    fn is_whitespace(&self, data: &SeriesData) -> bool {
        data.is_whitespace()
    }
}

/// What a series is created from: a built-in kind or a custom pane view.
#[derive(Clone)]
pub enum SeriesDefinition {
    BuiltIn(SeriesKind),
    Custom(Rc<dyn CustomSeriesView>),
}

impl SeriesDefinition {
    #[must_use]
    pub fn custom(view: impl CustomSeriesView + 'static) -> Self {
        Self::Custom(Rc::new(view))
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::BuiltIn(SeriesKind::Line) => "line",
            Self::BuiltIn(SeriesKind::Area) => "area",
            Self::BuiltIn(SeriesKind::Baseline) => "baseline",
            Self::BuiltIn(SeriesKind::Histogram) => "histogram",
            Self::BuiltIn(SeriesKind::Bar) => "bar",
            Self::BuiltIn(SeriesKind::Candlestick) => "candlestick",
            Self::Custom(view) => view.name(),
        }
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl From<SeriesKind> for SeriesDefinition {
    fn from(kind: SeriesKind) -> Self {
        Self::BuiltIn(kind)
    }
}

impl fmt::Debug for SeriesDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuiltIn(kind) => f.debug_tuple("BuiltIn").field(kind).finish(),
            Self::Custom(view) => f.debug_tuple("Custom").field(&view.name()).finish(),
        }
    }
}
