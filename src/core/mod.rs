pub mod domain;
pub mod ids;
pub mod pane;
pub mod primitives;
pub mod series;
pub mod types;

pub use domain::{CalendarTime, ChartFamily, DurationMonths, HorzDomain, Numeric};
pub use ids::{ChartId, SeriesId};
pub use pane::{PaneIndex, PaneIndexAllocator};
pub use series::{Ohlc, SeriesData, SeriesKind, SeriesPoint, validate_series_points};
pub use types::{Point, SurfaceBounds, Viewport};
