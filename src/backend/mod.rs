//! Boundary to the charting library.
//!
//! The lifecycle layer never draws anything. Everything it needs from the
//! engine (series creation, pane primitives, event sources, sizing) goes
//! through [`ChartBackend`], so any engine can be adapted by implementing it.

mod headless;

use std::cell::RefCell;
use std::rc::Rc;

pub use headless::{
    BackendCall, HeadlessChart, HeadlessPriceChart, HeadlessSeries, HeadlessTimeChart,
    HeadlessYieldCurveChart, primitive_key,
};

use crate::api::{ChartOptions, SeriesOptions};
use crate::core::{ChartId, HorzDomain, PaneIndex, SeriesId, SeriesPoint, SurfaceBounds};
use crate::error::ChartResult;
use crate::extensions::{PrimitiveRef, PrimitiveTarget, SeriesDefinition, SeriesMarker};
use crate::interaction::{ChartEventKind, MouseEventHandler};

/// Horizontal value type of a backend's chart family.
pub type Horz<B> = <<B as ChartBackend>::Domain as HorzDomain>::Value;

/// Chart instance shared by the host and its descendants.
pub type SharedChart<B> = Rc<RefCell<B>>;

/// Contract implemented by a charting engine for one horizontal-axis domain.
pub trait ChartBackend: Sized + 'static {
    type Domain: HorzDomain;

    /// Chart factory for this domain variant.
    fn create(surface: SurfaceBounds, options: &ChartOptions) -> ChartResult<Self>;

    fn chart_id(&self) -> ChartId;

    fn apply_options(&mut self, options: &ChartOptions) -> ChartResult<()>;

    fn options(&self) -> &ChartOptions;

    fn resize(&mut self, width: u32, height: u32, force_repaint: bool) -> ChartResult<()>;

    /// Destroys the chart. Calling it twice is a no-op.
    fn remove(&mut self);

    fn is_removed(&self) -> bool;

    /// Creates a series in `pane`, creating the pane if it does not exist yet.
    fn add_series(
        &mut self,
        definition: &SeriesDefinition,
        options: &SeriesOptions,
        pane: PaneIndex,
    ) -> ChartResult<SeriesId>;

    fn remove_series(&mut self, series: SeriesId) -> ChartResult<()>;

    /// Replaces the whole dataset of `series`.
    fn set_series_data(&mut self, series: SeriesId, data: &[SeriesPoint<Horz<Self>>])
    -> ChartResult<()>;

    /// Replaces the whole marker set of `series`.
    fn set_series_markers(
        &mut self,
        series: SeriesId,
        markers: &[SeriesMarker<Horz<Self>>],
    ) -> ChartResult<()>;

    fn apply_series_options(&mut self, series: SeriesId, options: &SeriesOptions)
    -> ChartResult<()>;

    fn attach_primitive(
        &mut self,
        target: PrimitiveTarget,
        primitive: &PrimitiveRef,
    ) -> ChartResult<()>;

    /// Must be a no-op when `primitive` is not attached to `target`.
    fn detach_primitive(
        &mut self,
        target: PrimitiveTarget,
        primitive: &PrimitiveRef,
    ) -> ChartResult<()>;

    fn subscribe(&mut self, kind: ChartEventKind, handler: MouseEventHandler<Horz<Self>>);

    fn unsubscribe(&mut self, kind: ChartEventKind, handler: &MouseEventHandler<Horz<Self>>);
}
