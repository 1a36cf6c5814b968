use std::marker::PhantomData;
use std::rc::Rc;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use tracing::{debug, trace};

use crate::api::{ChartOptions, SeriesOptions};
use crate::core::{
    CalendarTime, ChartId, DurationMonths, HorzDomain, Numeric, PaneIndex, Point, SeriesData,
    SeriesId, SeriesPoint, SurfaceBounds, Viewport, validate_series_points,
};
use crate::error::{ChartError, ChartResult};
use crate::extensions::{
    AttachedParams, PrimitiveRef, PrimitiveTarget, SeriesDefinition, SeriesMarker,
    same_primitive, validate_markers,
};
use crate::interaction::{ChartEventKind, MouseEventHandler, MouseEventParams, same_handler};
use crate::render::OverlayFrame;

use super::{ChartBackend, SharedChart};

pub type HeadlessTimeChart = HeadlessChart<CalendarTime>;
pub type HeadlessPriceChart = HeadlessChart<Numeric>;
pub type HeadlessYieldCurveChart = HeadlessChart<DurationMonths>;

/// Stable identity of a primitive allocation, for journals and assertions.
#[must_use]
pub fn primitive_key(primitive: &PrimitiveRef) -> usize {
    Rc::as_ptr(primitive).cast::<()>() as usize
}

/// Effective operations observed by a [`HeadlessChart`], in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall {
    ApplyOptions,
    Resize {
        width: u32,
        height: u32,
        force_repaint: bool,
    },
    Remove,
    AddSeries {
        series: SeriesId,
        pane: PaneIndex,
    },
    RemoveSeries {
        series: SeriesId,
    },
    SetData {
        series: SeriesId,
        len: usize,
    },
    SetMarkers {
        series: SeriesId,
        len: usize,
    },
    ApplySeriesOptions {
        series: SeriesId,
    },
    Attach {
        target: PrimitiveTarget,
        primitive: usize,
    },
    Detach {
        target: PrimitiveTarget,
        primitive: usize,
    },
    Subscribe {
        kind: ChartEventKind,
    },
    Unsubscribe {
        kind: ChartEventKind,
    },
}

#[derive(Clone)]
pub struct HeadlessSeries<X> {
    pub definition: SeriesDefinition,
    pub options: SeriesOptions,
    pub pane: PaneIndex,
    pub data: Vec<SeriesPoint<X>>,
    pub markers: Vec<SeriesMarker<X>>,
    pub primitives: Vec<PrimitiveRef>,
}

/// In-memory chart engine.
///
/// Keeps the state a real engine would keep (panes, series, attached
/// primitives, subscribers) and journals every effective call. Panes are
/// created lazily when a series targets an unknown index.
pub struct HeadlessChart<D: HorzDomain> {
    id: ChartId,
    surface: SurfaceBounds,
    options: ChartOptions,
    removed: bool,
    next_series: u64,
    series: IndexMap<SeriesId, HeadlessSeries<D::Value>>,
    panes: IndexMap<PaneIndex, Vec<PrimitiveRef>>,
    handlers: IndexMap<ChartEventKind, Vec<MouseEventHandler<D::Value>>>,
    journal: Vec<BackendCall>,
    _domain: PhantomData<D>,
}

impl<D: HorzDomain> HeadlessChart<D> {
    #[must_use]
    pub fn surface(&self) -> SurfaceBounds {
        self.surface
    }

    #[must_use]
    pub fn journal(&self) -> &[BackendCall] {
        &self.journal
    }

    pub fn take_journal(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.journal)
    }

    #[must_use]
    pub fn series(&self, series: SeriesId) -> Option<&HeadlessSeries<D::Value>> {
        self.series.get(&series)
    }

    #[must_use]
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    #[must_use]
    pub fn pane_indices(&self) -> Vec<PaneIndex> {
        self.panes.keys().copied().collect()
    }

    #[must_use]
    pub fn pane_primitives(&self, pane: PaneIndex) -> &[PrimitiveRef] {
        self.panes.get(&pane).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn series_primitives(&self, series: SeriesId) -> &[PrimitiveRef] {
        self.series
            .get(&series)
            .map_or(&[], |entry| entry.primitives.as_slice())
    }

    #[must_use]
    pub fn subscriber_count(&self, kind: ChartEventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Builds event params for a pointer at `point` over `horz`, listing every
    /// series with non-whitespace data exactly at `horz`.
    #[must_use]
    pub fn pointer_params(&self, point: Point, horz: D::Value) -> MouseEventParams<D::Value> {
        let mut params = MouseEventParams::at(point, horz);
        let key = OrderedFloat(D::ordinal(horz));
        for (id, entry) in &self.series {
            let found = entry
                .data
                .binary_search_by_key(&key, |item| OrderedFloat(D::ordinal(item.horz)));
            if let Ok(position) = found {
                let data = &entry.data[position].data;
                if !is_whitespace(&entry.definition, data) {
                    params.series_data.insert(*id, data.clone());
                }
            }
        }
        params
    }

    /// Delivers `params` to every handler subscribed to `kind`.
    ///
    /// Handlers run after the chart borrow is released so they may call back
    /// into the chart.
    pub fn dispatch(chart: &SharedChart<Self>, kind: ChartEventKind, params: &MouseEventParams<D::Value>) {
        let handlers = chart
            .borrow()
            .handlers
            .get(&kind)
            .cloned()
            .unwrap_or_default();
        trace!(?kind, handlers = handlers.len(), "dispatching mouse event");
        for handler in handlers {
            handler(params);
        }
    }

    /// Runs one overlay pass over every attached primitive.
    pub fn collect_overlays(&self) -> ChartResult<OverlayFrame> {
        self.ensure_alive()?;
        let mut frame = OverlayFrame::new(self.surface.size);
        let attached = self
            .panes
            .values()
            .flatten()
            .chain(self.series.values().flat_map(|entry| entry.primitives.iter()));
        for primitive in attached {
            primitive.update_all_views();
            for shape in primitive.pane_views() {
                frame.push(shape);
            }
        }
        frame.validate()?;
        Ok(frame)
    }

    fn ensure_alive(&self) -> ChartResult<()> {
        if self.removed {
            return Err(ChartError::ChartRemoved);
        }
        Ok(())
    }

    fn series_entry(&mut self, series: SeriesId) -> ChartResult<&mut HeadlessSeries<D::Value>> {
        self.ensure_alive()?;
        self.series
            .get_mut(&series)
            .ok_or(ChartError::UnknownSeries { series })
    }

    fn attached_list(&mut self, target: PrimitiveTarget) -> ChartResult<&mut Vec<PrimitiveRef>> {
        match target {
            PrimitiveTarget::Pane(pane) => Ok(self.panes.entry(pane).or_default()),
            PrimitiveTarget::Series(series) => Ok(&mut self.series_entry(series)?.primitives),
        }
    }
}

fn is_whitespace(definition: &SeriesDefinition, data: &SeriesData) -> bool {
    match definition {
        SeriesDefinition::BuiltIn(_) => data.is_whitespace(),
        SeriesDefinition::Custom(view) => view.is_whitespace(data),
    }
}

fn validate_payloads<X>(definition: &SeriesDefinition, data: &[SeriesPoint<X>]) -> ChartResult<()> {
    for point in data {
        let valid = match (definition, &point.data) {
            (_, SeriesData::Whitespace) => true,
            (SeriesDefinition::BuiltIn(kind), SeriesData::Ohlc(_)) => kind.is_ohlc(),
            (SeriesDefinition::BuiltIn(kind), SeriesData::Value(_)) => !kind.is_ohlc(),
            (SeriesDefinition::BuiltIn(_), SeriesData::Custom(_)) => false,
            (SeriesDefinition::Custom(view), payload) => {
                view.is_whitespace(payload)
                    || view
                        .price_values(payload)
                        .iter()
                        .all(|value| value.is_finite())
            }
        };
        if !valid {
            return Err(ChartError::InvalidData(format!(
                "payload {:?} does not match `{}` series",
                point.data,
                definition.label()
            )));
        }
    }
    Ok(())
}

impl<D: HorzDomain> ChartBackend for HeadlessChart<D> {
    type Domain = D;

    fn create(surface: SurfaceBounds, options: &ChartOptions) -> ChartResult<Self> {
        let surface = surface.validate()?;
        options.validate()?;
        let id = ChartId::next();
        let mut panes = IndexMap::new();
        panes.insert(PaneIndex::DEFAULT, Vec::new());
        debug!(chart = %id, family = %D::FAMILY, "headless chart created");
        Ok(Self {
            id,
            surface,
            options: options.clone(),
            removed: false,
            next_series: 1,
            series: IndexMap::new(),
            panes,
            handlers: IndexMap::new(),
            journal: Vec::new(),
            _domain: PhantomData,
        })
    }

    fn chart_id(&self) -> ChartId {
        self.id
    }

    fn apply_options(&mut self, options: &ChartOptions) -> ChartResult<()> {
        self.ensure_alive()?;
        options.validate()?;
        self.options = options.clone();
        self.journal.push(BackendCall::ApplyOptions);
        Ok(())
    }

    fn options(&self) -> &ChartOptions {
        &self.options
    }

    fn resize(&mut self, width: u32, height: u32, force_repaint: bool) -> ChartResult<()> {
        self.ensure_alive()?;
        let mut surface = self.surface;
        surface.size = Viewport::new(width, height);
        self.surface = surface.validate()?;
        self.journal.push(BackendCall::Resize {
            width,
            height,
            force_repaint,
        });
        Ok(())
    }

    fn remove(&mut self) {
        if self.removed {
            return;
        }
        for primitive in self
            .panes
            .values()
            .flatten()
            .chain(self.series.values().flat_map(|entry| entry.primitives.iter()))
        {
            primitive.detached();
        }
        self.series.clear();
        self.panes.clear();
        self.handlers.clear();
        self.removed = true;
        self.journal.push(BackendCall::Remove);
        debug!(chart = %self.id, "headless chart removed");
    }

    fn is_removed(&self) -> bool {
        self.removed
    }

    fn add_series(
        &mut self,
        definition: &SeriesDefinition,
        options: &SeriesOptions,
        pane: PaneIndex,
    ) -> ChartResult<SeriesId> {
        self.ensure_alive()?;
        options.validate()?;
        let series = SeriesId::new(self.next_series);
        self.next_series += 1;
        self.panes.entry(pane).or_default();
        self.series.insert(
            series,
            HeadlessSeries {
                definition: definition.clone(),
                options: options.clone(),
                pane,
                data: Vec::new(),
                markers: Vec::new(),
                primitives: Vec::new(),
            },
        );
        self.journal.push(BackendCall::AddSeries { series, pane });
        Ok(series)
    }

    fn remove_series(&mut self, series: SeriesId) -> ChartResult<()> {
        self.ensure_alive()?;
        let entry = self
            .series
            .shift_remove(&series)
            .ok_or(ChartError::UnknownSeries { series })?;
        for primitive in &entry.primitives {
            primitive.detached();
        }
        self.journal.push(BackendCall::RemoveSeries { series });
        Ok(())
    }

    fn set_series_data(&mut self, series: SeriesId, data: &[SeriesPoint<D::Value>]) -> ChartResult<()> {
        validate_series_points(data)?;
        let entry = self.series_entry(series)?;
        validate_payloads(&entry.definition, data)?;
        entry.data = data.to_vec();
        self.journal.push(BackendCall::SetData {
            series,
            len: data.len(),
        });
        Ok(())
    }

    fn set_series_markers(
        &mut self,
        series: SeriesId,
        markers: &[SeriesMarker<D::Value>],
    ) -> ChartResult<()> {
        validate_markers(markers)?;
        let entry = self.series_entry(series)?;
        entry.markers = markers.to_vec();
        self.journal.push(BackendCall::SetMarkers {
            series,
            len: markers.len(),
        });
        Ok(())
    }

    fn apply_series_options(&mut self, series: SeriesId, options: &SeriesOptions) -> ChartResult<()> {
        options.validate()?;
        let entry = self.series_entry(series)?;
        entry.options = options.clone();
        self.journal.push(BackendCall::ApplySeriesOptions { series });
        Ok(())
    }

    fn attach_primitive(
        &mut self,
        target: PrimitiveTarget,
        primitive: &PrimitiveRef,
    ) -> ChartResult<()> {
        self.ensure_alive()?;
        let chart = self.id;
        let attached = self.attached_list(target)?;
        if attached.iter().any(|entry| same_primitive(entry, primitive)) {
            return Err(ChartError::InvalidData(format!(
                "primitive is already attached to {target:?}"
            )));
        }
        attached.push(primitive.clone());
        primitive.attached(AttachedParams { chart, target });
        self.journal.push(BackendCall::Attach {
            target,
            primitive: primitive_key(primitive),
        });
        Ok(())
    }

    fn detach_primitive(
        &mut self,
        target: PrimitiveTarget,
        primitive: &PrimitiveRef,
    ) -> ChartResult<()> {
        if self.removed {
            return Ok(());
        }
        let attached = match target {
            PrimitiveTarget::Pane(pane) => self.panes.get_mut(&pane),
            PrimitiveTarget::Series(series) => {
                self.series.get_mut(&series).map(|entry| &mut entry.primitives)
            }
        };
        let Some(attached) = attached else {
            return Ok(());
        };
        let Some(position) = attached
            .iter()
            .position(|entry| same_primitive(entry, primitive))
        else {
            return Ok(());
        };
        let removed = attached.remove(position);
        removed.detached();
        self.journal.push(BackendCall::Detach {
            target,
            primitive: primitive_key(primitive),
        });
        Ok(())
    }

    fn subscribe(&mut self, kind: ChartEventKind, handler: MouseEventHandler<D::Value>) {
        if self.removed {
            return;
        }
        self.handlers.entry(kind).or_default().push(handler);
        self.journal.push(BackendCall::Subscribe { kind });
    }

    fn unsubscribe(&mut self, kind: ChartEventKind, handler: &MouseEventHandler<D::Value>) {
        let Some(handlers) = self.handlers.get_mut(&kind) else {
            return;
        };
        let Some(position) = handlers.iter().position(|entry| same_handler(entry, handler)) else {
            return;
        };
        handlers.remove(position);
        self.journal.push(BackendCall::Unsubscribe { kind });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{BackendCall, HeadlessPriceChart};
    use crate::api::{ChartOptions, SeriesOptions};
    use crate::backend::ChartBackend;
    use crate::core::{PaneIndex, Point, SeriesData, SeriesKind, SeriesPoint, SurfaceBounds};
    use crate::error::ChartError;
    use crate::extensions::{Primitive, PrimitiveRef, PrimitiveTarget, SeriesDefinition};
    use crate::interaction::{ChartEventKind, handler};
    use crate::render::{Color, LinePrimitive, OverlayShape};

    struct Guide;

    impl Primitive for Guide {
        fn update_all_views(&self) {}

        fn pane_views(&self) -> Vec<OverlayShape> {
            vec![OverlayShape::Line(LinePrimitive::new(
                0.0,
                10.0,
                100.0,
                10.0,
                1.0,
                Color::BLACK,
            ))]
        }
    }

    fn chart() -> HeadlessPriceChart {
        HeadlessPriceChart::create(SurfaceBounds::new(800, 400), &ChartOptions::default())
            .expect("create")
    }

    #[test]
    fn series_in_unknown_pane_creates_it_lazily() {
        let mut chart = chart();
        let series = chart
            .add_series(
                &SeriesDefinition::BuiltIn(SeriesKind::Line),
                &SeriesOptions::default(),
                PaneIndex::new(3),
            )
            .expect("series");
        assert_eq!(chart.pane_indices(), vec![PaneIndex::DEFAULT, PaneIndex::new(3)]);
        assert_eq!(
            chart.journal(),
            &[BackendCall::AddSeries {
                series,
                pane: PaneIndex::new(3)
            }]
        );
    }

    #[test]
    fn detaching_unattached_primitive_is_a_no_op() {
        let mut chart = chart();
        let guide: PrimitiveRef = Rc::new(Guide);
        chart
            .detach_primitive(PrimitiveTarget::Pane(PaneIndex::DEFAULT), &guide)
            .expect("detach");
        assert!(chart.journal().is_empty());

        chart
            .attach_primitive(PrimitiveTarget::Pane(PaneIndex::DEFAULT), &guide)
            .expect("attach");
        let err = chart
            .attach_primitive(PrimitiveTarget::Pane(PaneIndex::DEFAULT), &guide)
            .expect_err("double attach must fail");
        assert!(matches!(err, ChartError::InvalidData(_)));
        assert_eq!(chart.collect_overlays().expect("overlays").lines.len(), 1);
    }

    #[test]
    fn payload_kind_must_match_series_kind() {
        let mut chart = chart();
        let series = chart
            .add_series(
                &SeriesDefinition::BuiltIn(SeriesKind::Candlestick),
                &SeriesOptions::default(),
                PaneIndex::DEFAULT,
            )
            .expect("series");
        let err = chart
            .set_series_data(series, &[SeriesPoint::value(1.0, 2.0)])
            .expect_err("value payload on candlestick must fail");
        assert!(matches!(err, ChartError::InvalidData(_)));
    }

    #[test]
    fn pointer_params_skip_series_without_data_at_position() {
        let mut chart = chart();
        let line = SeriesDefinition::BuiltIn(SeriesKind::Line);
        let options = SeriesOptions::default();
        let a = chart.add_series(&line, &options, PaneIndex::DEFAULT).expect("a");
        let b = chart.add_series(&line, &options, PaneIndex::DEFAULT).expect("b");
        chart
            .set_series_data(a, &[SeriesPoint::value(1.0, 10.0), SeriesPoint::value(2.0, 11.0)])
            .expect("data a");
        chart
            .set_series_data(b, &[SeriesPoint::value(1.0, 5.0), SeriesPoint::whitespace(2.0)])
            .expect("data b");

        let params = chart.pointer_params(Point::new(10.0, 10.0), 2.0);
        assert_eq!(params.series_data.len(), 1);
        assert_eq!(params.series_data.get(&a), Some(&SeriesData::Value(11.0)));
    }

    #[test]
    fn removed_chart_rejects_calls_and_drops_subscribers() {
        let shared = Rc::new(RefCell::new(chart()));
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        shared
            .borrow_mut()
            .subscribe(ChartEventKind::Click, handler(move |_| *counter.borrow_mut() += 1));
        shared.borrow_mut().remove();
        shared.borrow_mut().remove();

        HeadlessPriceChart::dispatch(
            &shared,
            ChartEventKind::Click,
            &crate::interaction::MouseEventParams::outside(),
        );
        assert_eq!(*hits.borrow(), 0);
        assert!(matches!(
            shared.borrow_mut().resize(10, 10, false),
            Err(ChartError::ChartRemoved)
        ));
        let removes = shared
            .borrow()
            .journal()
            .iter()
            .filter(|call| matches!(call, BackendCall::Remove))
            .count();
        assert_eq!(removes, 1);
    }
}
