use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::backend::{ChartBackend, Horz};
use crate::core::{ChartId, PaneIndex, SeriesId, SeriesKind, SeriesPoint};
use crate::error::ChartResult;
use crate::extensions::{
    CustomSeriesView, MarkerFn, PrimitiveCallbacks, PrimitiveList, PrimitiveTarget,
    SeriesDefinition, SeriesMarker, empty_primitive_list, no_markers, same_list,
};

use super::{
    AttachedPrimitives, ChartContext, PrimitiveCoordinator, PrimitiveScope, Scope, SeriesOptions,
};

/// Payload of the data-set callback.
#[derive(Debug)]
pub struct SeriesDataEvent<'a, X> {
    pub chart: ChartId,
    pub series: SeriesId,
    pub data: &'a [SeriesPoint<X>],
}

/// Payload of the markers-set callback.
#[derive(Debug)]
pub struct SeriesMarkersEvent<'a, X> {
    pub chart: ChartId,
    pub series: SeriesId,
    pub markers: &'a [SeriesMarker<X>],
}

pub type SeriesLifecycleCallback = Rc<dyn Fn(SeriesId, PaneIndex)>;
pub type SeriesDataCallback<X> = Rc<dyn Fn(&SeriesDataEvent<'_, X>)>;
pub type SeriesMarkersCallback<X> = Rc<dyn Fn(&SeriesMarkersEvent<'_, X>)>;

/// Inputs of a Series (or Custom Series) declaration.
pub struct SeriesProps<X> {
    pub definition: SeriesDefinition,
    /// Overrides the enclosing pane's index.
    pub pane_index: Option<PaneIndex>,
    pub data: Vec<SeriesPoint<X>>,
    /// Falls back to the definition's defaults when `None`.
    pub options: Option<SeriesOptions>,
    pub markers: MarkerFn<X>,
    /// Primitives attached to the series itself.
    pub primitives: PrimitiveList,
}

impl<X: 'static> SeriesProps<X> {
    #[must_use]
    pub fn new(definition: impl Into<SeriesDefinition>) -> Self {
        Self {
            definition: definition.into(),
            pane_index: None,
            data: Vec::new(),
            options: None,
            markers: no_markers(),
            primitives: empty_primitive_list(),
        }
    }

    #[must_use]
    pub fn line() -> Self {
        Self::new(SeriesKind::Line)
    }

    #[must_use]
    pub fn custom(view: impl CustomSeriesView + 'static) -> Self {
        Self::new(SeriesDefinition::custom(view))
    }

    #[must_use]
    pub fn in_pane(mut self, pane: PaneIndex) -> Self {
        self.pane_index = Some(pane);
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: Vec<SeriesPoint<X>>) -> Self {
        self.data = data;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: SeriesOptions) -> Self {
        self.options = Some(options);
        self
    }

    #[must_use]
    pub fn with_markers(mut self, markers: impl Fn(&[SeriesPoint<X>]) -> Vec<SeriesMarker<X>> + 'static) -> Self {
        self.markers = Rc::new(markers);
        self
    }

    #[must_use]
    pub fn with_primitives(mut self, primitives: PrimitiveList) -> Self {
        self.primitives = primitives;
        self
    }
}

/// Lifecycle callbacks of a series declaration.
pub struct SeriesCallbacks<X> {
    pub on_create_series: Option<SeriesLifecycleCallback>,
    pub on_remove_series: Option<SeriesLifecycleCallback>,
    pub on_set_data: Option<SeriesDataCallback<X>>,
    pub on_set_markers: Option<SeriesMarkersCallback<X>>,
    /// Attached/detached notifications for the series' own primitives.
    pub primitives: PrimitiveCallbacks,
}

impl<X> Default for SeriesCallbacks<X> {
    fn default() -> Self {
        Self {
            on_create_series: None,
            on_remove_series: None,
            on_set_data: None,
            on_set_markers: None,
            primitives: PrimitiveCallbacks::default(),
        }
    }
}

impl<X> SeriesCallbacks<X> {
    #[must_use]
    pub fn on_create_series(mut self, callback: impl Fn(SeriesId, PaneIndex) + 'static) -> Self {
        self.on_create_series = Some(Rc::new(callback));
        self
    }

    #[must_use]
    pub fn on_remove_series(mut self, callback: impl Fn(SeriesId, PaneIndex) + 'static) -> Self {
        self.on_remove_series = Some(Rc::new(callback));
        self
    }

    #[must_use]
    pub fn on_set_data(mut self, callback: impl Fn(&SeriesDataEvent<'_, X>) + 'static) -> Self {
        self.on_set_data = Some(Rc::new(callback));
        self
    }

    #[must_use]
    pub fn on_set_markers(mut self, callback: impl Fn(&SeriesMarkersEvent<'_, X>) + 'static) -> Self {
        self.on_set_markers = Some(Rc::new(callback));
        self
    }

    #[must_use]
    pub fn with_primitive_callbacks(mut self, callbacks: PrimitiveCallbacks) -> Self {
        self.primitives = callbacks;
        self
    }
}

/// Binds one declared series to the chart.
///
/// Keeps four independent effects: data (+ derived markers), pane-scope
/// primitives, series primitives and style options. Each setter re-runs the
/// matching effect synchronously.
pub struct SeriesBinder<B: ChartBackend> {
    context: Rc<ChartContext<B>>,
    series: SeriesId,
    pane: PaneIndex,
    scope_primitives: Option<Rc<PrimitiveCoordinator>>,
    data: Vec<SeriesPoint<Horz<B>>>,
    markers_fn: MarkerFn<Horz<B>>,
    markers: Vec<SeriesMarker<Horz<B>>>,
    options: SeriesOptions,
    primitives: PrimitiveList,
    attached: AttachedPrimitives,
    callbacks: SeriesCallbacks<Horz<B>>,
    mounted: bool,
}

impl<B: ChartBackend> SeriesBinder<B> {
    pub fn mount(
        parent: &Scope<B>,
        props: SeriesProps<Horz<B>>,
        callbacks: SeriesCallbacks<Horz<B>>,
    ) -> ChartResult<Self> {
        let component = if props.definition.is_custom() {
            "CustomSeries"
        } else {
            "Series"
        };
        let context = parent.require_chart(component)?;
        let pane = props.pane_index.unwrap_or_else(|| parent.pane_index());
        let options = props.options.unwrap_or_else(|| match &props.definition {
            SeriesDefinition::Custom(view) => view.default_options(),
            SeriesDefinition::BuiltIn(_) => SeriesOptions::default(),
        });

        let series = context
            .chart()
            .borrow_mut()
            .add_series(&props.definition, &options, pane)?;
        debug!(
            chart = %context.chart_id(),
            %series,
            %pane,
            kind = props.definition.label(),
            "series created"
        );
        if let Some(on_create_series) = &callbacks.on_create_series {
            on_create_series(series, pane);
        }

        let scope_primitives = match PrimitiveScope::for_pane(pane) {
            PrimitiveScope::Chart => Some(context.chart_primitives().clone()),
            PrimitiveScope::Pane => parent.pane_primitives_for(pane),
        };

        let mut binder = Self {
            context,
            series,
            pane,
            scope_primitives: None,
            data: Vec::new(),
            markers_fn: props.markers,
            markers: Vec::new(),
            options,
            primitives: props.primitives.clone(),
            attached: AttachedPrimitives::default(),
            callbacks,
            mounted: true,
        };

        binder.set_data(props.data)?;
        if let Some(source) = scope_primitives {
            source.acquire(&binder.context, pane)?;
            binder.scope_primitives = Some(source);
        }
        binder.attached.replace(
            &binder.context,
            PrimitiveTarget::Series(series),
            props.primitives,
            &binder.callbacks.primitives,
        )?;
        Ok(binder)
    }

    #[must_use]
    pub fn series(&self) -> SeriesId {
        self.series
    }

    #[must_use]
    pub fn pane(&self) -> PaneIndex {
        self.pane
    }

    #[must_use]
    pub fn data(&self) -> &[SeriesPoint<Horz<B>>] {
        &self.data
    }

    /// Markers derived from the current data.
    #[must_use]
    pub fn markers(&self) -> &[SeriesMarker<Horz<B>>] {
        &self.markers
    }

    #[must_use]
    pub fn options(&self) -> &SeriesOptions {
        &self.options
    }

    /// Pane-scope primitive source this series is bound to, if any.
    #[must_use]
    pub fn scope_primitives(&self) -> Option<&Rc<PrimitiveCoordinator>> {
        self.scope_primitives.as_ref()
    }

    /// Replaces the dataset wholesale and re-derives markers from it.
    ///
    /// The binder keeps its previous data when the backend rejects `data`.
    pub fn set_data(&mut self, data: Vec<SeriesPoint<Horz<B>>>) -> ChartResult<()> {
        self.context
            .chart()
            .borrow_mut()
            .set_series_data(self.series, &data)?;
        self.data = data;
        self.notify_data();
        self.apply_markers()
    }

    /// Swaps the marker derivation and re-runs the data effect with it. The
    /// previous function is restored when the derived markers are rejected.
    pub fn set_markers_fn(
        &mut self,
        markers: impl Fn(&[SeriesPoint<Horz<B>>]) -> Vec<SeriesMarker<Horz<B>>> + 'static,
    ) -> ChartResult<()> {
        let previous = std::mem::replace(&mut self.markers_fn, Rc::new(markers));
        let result = self.reapply_data();
        if result.is_err() {
            self.markers_fn = previous;
        }
        result
    }

    /// Re-applies the full options object when it differs from the last one.
    pub fn set_options(&mut self, options: SeriesOptions) -> ChartResult<()> {
        if options == self.options {
            return Ok(());
        }
        self.context
            .chart()
            .borrow_mut()
            .apply_series_options(self.series, &options)?;
        self.options = options;
        Ok(())
    }

    /// Swaps the series' own primitives when the list identity changes.
    pub fn set_primitives(&mut self, primitives: PrimitiveList) -> ChartResult<()> {
        if same_list(&self.primitives, &primitives) {
            return Ok(());
        }
        self.primitives = primitives.clone();
        self.attached.replace(
            &self.context,
            PrimitiveTarget::Series(self.series),
            primitives,
            &self.callbacks.primitives,
        )
    }

    pub fn set_callbacks(&mut self, callbacks: SeriesCallbacks<Horz<B>>) {
        self.callbacks = callbacks;
    }

    /// Detaches every primitive, removes the series and reports the removal.
    pub fn unmount(mut self) -> ChartResult<()> {
        self.teardown()
    }

    fn reapply_data(&mut self) -> ChartResult<()> {
        self.context
            .chart()
            .borrow_mut()
            .set_series_data(self.series, &self.data)?;
        self.notify_data();
        self.apply_markers()
    }

    fn notify_data(&self) {
        if let Some(on_set_data) = &self.callbacks.on_set_data {
            on_set_data(&SeriesDataEvent {
                chart: self.context.chart_id(),
                series: self.series,
                data: &self.data,
            });
        }
    }

    fn apply_markers(&mut self) -> ChartResult<()> {
        let markers = (self.markers_fn)(&self.data);
        self.context
            .chart()
            .borrow_mut()
            .set_series_markers(self.series, &markers)?;
        self.markers = markers;
        if let Some(on_set_markers) = &self.callbacks.on_set_markers {
            on_set_markers(&SeriesMarkersEvent {
                chart: self.context.chart_id(),
                series: self.series,
                markers: &self.markers,
            });
        }
        Ok(())
    }

    fn teardown(&mut self) -> ChartResult<()> {
        if !self.mounted {
            return Ok(());
        }
        self.mounted = false;

        let scope_result = match self.scope_primitives.take() {
            Some(source) => source.release(&self.context, self.pane),
            None => Ok(()),
        };
        let series_result = self.attached.clear(
            &self.context,
            PrimitiveTarget::Series(self.series),
            &self.callbacks.primitives,
        );
        let remove_result = if self.context.is_removed() {
            Ok(())
        } else {
            self.context.chart().borrow_mut().remove_series(self.series)
        };
        debug!(chart = %self.context.chart_id(), series = %self.series, pane = %self.pane, "series removed");
        if let Some(on_remove_series) = &self.callbacks.on_remove_series {
            on_remove_series(self.series, self.pane);
        }
        scope_result.and(series_result).and(remove_result)
    }
}

impl<B: ChartBackend> Drop for SeriesBinder<B> {
    fn drop(&mut self) {
        if let Err(err) = self.teardown() {
            warn!(error = %err, series = %self.series, "series teardown failed");
        }
    }
}

impl<B: ChartBackend> fmt::Debug for SeriesBinder<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeriesBinder")
            .field("chart", &self.context.chart_id())
            .field("series", &self.series)
            .field("pane", &self.pane)
            .field("points", &self.data.len())
            .field("markers", &self.markers.len())
            .field("mounted", &self.mounted)
            .finish()
    }
}
