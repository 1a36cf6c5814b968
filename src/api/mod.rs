//! Declarative lifecycle layer: the Chart Host and the declarations mounted
//! inside it.
//!
//! Each component is a plain value with `mount`, explicit setters and
//! `unmount`; setters re-run the matching effect immediately. Teardown also
//! runs on drop.

mod chart_host;
mod context;
mod event_subscription;
mod options;
mod pane;
mod primitive_coordinator;
mod series_binder;
mod tooltip;

pub use chart_host::{
    ChartCallbacks, ChartHost, ChartHostProps, CreateChartCallback, ResizeCallback,
};
pub use context::{ChartContext, PaneContext, Scope};
pub use event_subscription::EventSubscription;
pub use options::{ChartOptions, HorzScaleOptions, LayoutOptions, SeriesOptions};
pub use pane::{Pane, PaneProps};
pub use primitive_coordinator::{AttachedPrimitives, PrimitiveCoordinator, PrimitiveScope};
pub use series_binder::{
    SeriesBinder, SeriesCallbacks, SeriesDataCallback, SeriesDataEvent, SeriesLifecycleCallback,
    SeriesMarkersCallback, SeriesMarkersEvent, SeriesProps,
};
pub use tooltip::{
    AdjustPositionFn, MemoryOverlay, OverlayLayer, Tooltip, TooltipBody, TooltipContent,
    TooltipFrame, TooltipHideCallback, TooltipPosition, TooltipProps, TooltipShowCallback,
    TooltipState,
};
