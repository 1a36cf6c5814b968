use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{PaneIndex, Point, SeriesData, SeriesId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrosshairMode {
    /// Crosshair snaps to the nearest data sample.
    Magnet,
    /// Crosshair follows the raw pointer position.
    Normal,
    /// Crosshair stays hidden; crosshair-move events are still emitted.
    Hidden,
}

/// Mouse event sources exposed by a chart instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartEventKind {
    Click,
    DoubleClick,
    CrosshairMove,
}

impl ChartEventKind {
    pub const ALL: [Self; 3] = [Self::Click, Self::DoubleClick, Self::CrosshairMove];
}

/// Payload of click, double-click and crosshair-move notifications.
///
/// `point` and `horz` are `None` when the pointer left the plot area.
/// `series_data` only lists series with data at `horz`.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEventParams<X> {
    pub point: Option<Point>,
    pub horz: Option<X>,
    pub pane: Option<PaneIndex>,
    pub hovered_series: Option<SeriesId>,
    pub series_data: IndexMap<SeriesId, SeriesData>,
}

impl<X> MouseEventParams<X> {
    #[must_use]
    pub fn at(point: Point, horz: X) -> Self {
        Self {
            point: Some(point),
            horz: Some(horz),
            pane: None,
            hovered_series: None,
            series_data: IndexMap::new(),
        }
    }

    /// Pointer left the chart.
    #[must_use]
    pub fn outside() -> Self {
        Self {
            point: None,
            horz: None,
            pane: None,
            hovered_series: None,
            series_data: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_pane(mut self, pane: PaneIndex) -> Self {
        self.pane = Some(pane);
        self
    }

    #[must_use]
    pub fn with_series_data(mut self, series: SeriesId, data: SeriesData) -> Self {
        self.series_data.insert(series, data);
        self
    }
}

pub type MouseEventHandler<X> = Rc<dyn Fn(&MouseEventParams<X>)>;

#[must_use]
pub fn handler<X>(callback: impl Fn(&MouseEventParams<X>) + 'static) -> MouseEventHandler<X> {
    Rc::new(callback)
}

#[must_use]
pub fn same_handler<X>(left: &MouseEventHandler<X>, right: &MouseEventHandler<X>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(left), Rc::as_ptr(right))
}

/// Either a single handler or a list of handlers for one event source.
pub enum Handlers<X> {
    None,
    One(MouseEventHandler<X>),
    Many(Vec<MouseEventHandler<X>>),
}

impl<X> Handlers<X> {
    #[must_use]
    pub fn as_slice(&self) -> &[MouseEventHandler<X>] {
        match self {
            Self::None => &[],
            Self::One(handler) => std::slice::from_ref(handler),
            Self::Many(handlers) => handlers,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Same handlers, in the same order, by reference identity.
    #[must_use]
    pub fn same_as(&self, handlers: &[MouseEventHandler<X>]) -> bool {
        let own = self.as_slice();
        own.len() == handlers.len()
            && own
                .iter()
                .zip(handlers)
                .all(|(left, right)| same_handler(left, right))
    }
}

impl<X> Default for Handlers<X> {
    fn default() -> Self {
        Self::None
    }
}

impl<X> Clone for Handlers<X> {
    fn clone(&self) -> Self {
        match self {
            Self::None => Self::None,
            Self::One(handler) => Self::One(handler.clone()),
            Self::Many(handlers) => Self::Many(handlers.clone()),
        }
    }
}

impl<X> From<MouseEventHandler<X>> for Handlers<X> {
    fn from(handler: MouseEventHandler<X>) -> Self {
        Self::One(handler)
    }
}

impl<X> From<Vec<MouseEventHandler<X>>> for Handlers<X> {
    fn from(handlers: Vec<MouseEventHandler<X>>) -> Self {
        Self::Many(handlers)
    }
}

impl<X> fmt::Debug for Handlers<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("Handlers::None"),
            Self::One(_) => f.write_str("Handlers::One"),
            Self::Many(handlers) => write!(f, "Handlers::Many({})", handlers.len()),
        }
    }
}
