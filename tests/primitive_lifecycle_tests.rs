use std::cell::RefCell;
use std::rc::Rc;

use chart_lifecycle::api::{
    ChartCallbacks, ChartHost, ChartHostProps, Pane, PaneProps, SeriesBinder, SeriesCallbacks,
    SeriesProps,
};
use chart_lifecycle::backend::{BackendCall, ChartBackend, HeadlessPriceChart, primitive_key};
use chart_lifecycle::core::{PaneIndex, SurfaceBounds};
use chart_lifecycle::extensions::{
    AttachedParams, Primitive, PrimitiveCallbacks, PrimitiveRef, PrimitiveTarget, primitive_list,
};
use chart_lifecycle::render::{Color, OverlayShape, RectPrimitive};
use proptest::prelude::*;

type Log = Rc<RefCell<Vec<String>>>;

struct RecordingPrimitive {
    name: &'static str,
    log: Log,
}

impl Primitive for RecordingPrimitive {
    fn update_all_views(&self) {}

    fn pane_views(&self) -> Vec<OverlayShape> {
        vec![OverlayShape::Rect(RectPrimitive::new(
            0.0,
            0.0,
            10.0,
            10.0,
            Color::rgba(0.2, 0.4, 0.8, 0.5),
        ))]
    }

    fn attached(&self, params: AttachedParams) {
        self.log
            .borrow_mut()
            .push(format!("attached:{}@{:?}", self.name, params.target));
    }

    fn detached(&self) {
        self.log.borrow_mut().push(format!("detached:{}", self.name));
    }
}

fn primitive(name: &'static str, log: &Log) -> PrimitiveRef {
    Rc::new(RecordingPrimitive {
        name,
        log: log.clone(),
    })
}

fn recording_callbacks(log: &Log, label: &'static str) -> PrimitiveCallbacks {
    let attached = log.clone();
    let detached = log.clone();
    PrimitiveCallbacks::default()
        .on_attached(move |list| attached.borrow_mut().push(format!("{label}:on_attached:{}", list.len())))
        .on_detached(move |list| detached.borrow_mut().push(format!("{label}:on_detached:{}", list.len())))
}

fn host_with(list: &[PrimitiveRef], callbacks: PrimitiveCallbacks) -> ChartHost<HeadlessPriceChart> {
    ChartHost::mount(
        SurfaceBounds::new(800, 400),
        ChartHostProps::new(800, 400).with_primitives(primitive_list(list.iter().cloned())),
        ChartCallbacks::default().with_primitive_callbacks(callbacks),
    )
    .expect("mount host")
}

/// Attach/detach calls in journal order as `(attach?, target, key)`.
fn primitive_calls(host: &ChartHost<HeadlessPriceChart>) -> Vec<(bool, PrimitiveTarget, usize)> {
    host.chart()
        .borrow()
        .journal()
        .iter()
        .filter_map(|call| match *call {
            BackendCall::Attach { target, primitive } => Some((true, target, primitive)),
            BackendCall::Detach { target, primitive } => Some((false, target, primitive)),
            _ => None,
        })
        .collect()
}

fn keys(list: &[PrimitiveRef]) -> Vec<usize> {
    list.iter().map(primitive_key).collect()
}

#[test]
fn chart_list_attaches_to_default_pane_once_first_series_binds() {
    let log = Log::default();
    let a = primitive("a", &log);
    let b = primitive("b", &log);
    let host = host_with(&[a.clone(), b.clone()], PrimitiveCallbacks::default());
    assert!(primitive_calls(&host).is_empty());

    let _series = SeriesBinder::mount(&host.scope(), SeriesProps::line(), SeriesCallbacks::default())
        .expect("series");

    let pane = PrimitiveTarget::Pane(PaneIndex::DEFAULT);
    assert_eq!(
        primitive_calls(&host),
        vec![
            (true, pane, primitive_key(&a)),
            (true, pane, primitive_key(&b)),
        ]
    );
    assert_eq!(host.chart().borrow().pane_primitives(PaneIndex::DEFAULT).len(), 2);
    assert_eq!(
        host.chart()
            .borrow()
            .collect_overlays()
            .expect("overlays")
            .rects
            .len(),
        2
    );
}

#[test]
fn chart_list_replacement_detaches_previous_then_attaches_new() {
    let log = Log::default();
    let a = primitive("a", &log);
    let b = primitive("b", &log);
    let c = primitive("c", &log);
    let mut host = host_with(&[a.clone(), b.clone()], recording_callbacks(&log, "chart"));
    let _series = SeriesBinder::mount(&host.scope(), SeriesProps::line(), SeriesCallbacks::default())
        .expect("series");
    host.chart().borrow_mut().take_journal();
    log.borrow_mut().clear();

    host.set_primitives(primitive_list([c.clone()])).expect("replace");

    let pane = PrimitiveTarget::Pane(PaneIndex::DEFAULT);
    assert_eq!(
        primitive_calls(&host),
        vec![
            (false, pane, primitive_key(&a)),
            (false, pane, primitive_key(&b)),
            (true, pane, primitive_key(&c)),
        ]
    );
    assert_eq!(
        log.borrow().as_slice(),
        &[
            "detached:a",
            "detached:b",
            "chart:on_detached:2",
            "attached:c@Pane(PaneIndex(0))",
            "chart:on_attached:1",
        ]
    );
}

#[test]
fn same_list_identity_is_not_reattached() {
    let log = Log::default();
    let list = primitive_list([primitive("a", &log)]);
    let mut host: ChartHost<HeadlessPriceChart> = ChartHost::mount(
        SurfaceBounds::new(800, 400),
        ChartHostProps::new(800, 400).with_primitives(list.clone()),
        ChartCallbacks::default(),
    )
    .expect("mount host");
    let _series = SeriesBinder::mount(&host.scope(), SeriesProps::line(), SeriesCallbacks::default())
        .expect("series");
    host.chart().borrow_mut().take_journal();

    host.set_primitives(list.clone()).expect("same list");
    assert!(primitive_calls(&host).is_empty());

    let same_contents = primitive_list(list.iter().cloned());
    host.set_primitives(same_contents).expect("new identity");
    assert_eq!(primitive_calls(&host).len(), 2);
}

#[test]
fn two_series_in_one_pane_observe_each_attach_once() {
    let log = Log::default();
    let p = primitive("p", &log);
    let q = primitive("q", &log);
    let host = host_with(&[], PrimitiveCallbacks::default());
    let mut pane = Pane::mount(
        &host.scope(),
        PaneProps::new().with_primitives(primitive_list([p.clone()])),
    )
    .expect("pane");
    let first = SeriesBinder::mount(&pane.scope(), SeriesProps::line(), SeriesCallbacks::default())
        .expect("first");
    let second = SeriesBinder::mount(&pane.scope(), SeriesProps::line(), SeriesCallbacks::default())
        .expect("second");

    let target = PrimitiveTarget::Pane(PaneIndex::new(1));
    assert_eq!(primitive_calls(&host), vec![(true, target, primitive_key(&p))]);
    assert_eq!(pane.primitives().holders(PaneIndex::new(1)), 2);
    host.chart().borrow_mut().take_journal();

    pane.set_primitives(primitive_list([p.clone(), q.clone()]))
        .expect("extend list");
    assert_eq!(
        primitive_calls(&host),
        vec![
            (false, target, primitive_key(&p)),
            (true, target, primitive_key(&p)),
            (true, target, primitive_key(&q)),
        ]
    );
    host.chart().borrow_mut().take_journal();

    first.unmount().expect("first gone");
    assert!(primitive_calls(&host).is_empty());
    assert_eq!(host.chart().borrow().pane_primitives(PaneIndex::new(1)).len(), 2);

    second.unmount().expect("second gone");
    assert_eq!(
        primitive_calls(&host),
        vec![
            (false, target, primitive_key(&p)),
            (false, target, primitive_key(&q)),
        ]
    );
    assert!(host.chart().borrow().pane_primitives(PaneIndex::new(1)).is_empty());
}

#[test]
fn default_pane_uses_chart_list_and_named_pane_uses_its_own() {
    let log = Log::default();
    let chart_level = primitive("chart", &log);
    let pane_level = primitive("pane", &log);
    let host = host_with(&[chart_level.clone()], PrimitiveCallbacks::default());
    let pane = Pane::mount(
        &host.scope(),
        PaneProps::new().with_primitives(primitive_list([pane_level.clone()])),
    )
    .expect("pane");

    let _in_pane =
        SeriesBinder::mount(&pane.scope(), SeriesProps::line(), SeriesCallbacks::default())
            .expect("pane series");
    {
        let chart = host.chart().borrow();
        assert!(chart.pane_primitives(PaneIndex::DEFAULT).is_empty());
        assert_eq!(
            keys(chart.pane_primitives(PaneIndex::new(1))),
            vec![primitive_key(&pane_level)]
        );
    }

    let _in_default = SeriesBinder::mount(
        &pane.scope(),
        SeriesProps::line().in_pane(PaneIndex::DEFAULT),
        SeriesCallbacks::default(),
    )
    .expect("default pane series");
    let chart = host.chart().borrow();
    assert_eq!(
        keys(chart.pane_primitives(PaneIndex::DEFAULT)),
        vec![primitive_key(&chart_level)]
    );
}

#[test]
fn series_primitives_follow_replace_and_teardown() {
    let log = Log::default();
    let s = primitive("s", &log);
    let t = primitive("t", &log);
    let host = host_with(&[], PrimitiveCallbacks::default());
    let mut binder = SeriesBinder::mount(
        &host.scope(),
        SeriesProps::line().with_primitives(primitive_list([s.clone()])),
        SeriesCallbacks::default().with_primitive_callbacks(recording_callbacks(&log, "series")),
    )
    .expect("series");
    let target = PrimitiveTarget::Series(binder.series());
    assert_eq!(
        keys(host.chart().borrow().series_primitives(binder.series())),
        vec![primitive_key(&s)]
    );

    binder
        .set_primitives(primitive_list([t.clone()]))
        .expect("replace series list");
    log.borrow_mut().clear();
    host.chart().borrow_mut().take_journal();

    binder.unmount().expect("unmount");

    assert_eq!(primitive_calls(&host), vec![(false, target, primitive_key(&t))]);
    assert_eq!(
        log.borrow().as_slice(),
        &["detached:t", "series:on_detached:1"]
    );
}

#[test]
fn pane_unmounted_before_its_series_still_detaches() {
    let log = Log::default();
    let p = primitive("p", &log);
    let host = host_with(&[], PrimitiveCallbacks::default());
    let pane = Pane::mount(
        &host.scope(),
        PaneProps::new()
            .with_primitives(primitive_list([p.clone()]))
            .with_callbacks(recording_callbacks(&log, "pane")),
    )
    .expect("pane");
    let series = SeriesBinder::mount(&pane.scope(), SeriesProps::line(), SeriesCallbacks::default())
        .expect("series");
    log.borrow_mut().clear();

    pane.unmount().expect("pane gone");
    assert_eq!(log.borrow().as_slice(), &["detached:p", "pane:on_detached:1"]);

    log.borrow_mut().clear();
    series.unmount().expect("series gone");
    assert!(log.borrow().is_empty());
}

#[test]
fn host_unmount_notifies_primitives_once() {
    let log = Log::default();
    let a = primitive("a", &log);
    let host = host_with(&[a], PrimitiveCallbacks::default());
    let series = SeriesBinder::mount(&host.scope(), SeriesProps::line(), SeriesCallbacks::default())
        .expect("series");
    log.borrow_mut().clear();

    host.unmount().expect("host gone");
    series.unmount().expect("series gone");

    assert_eq!(log.borrow().as_slice(), &["detached:a"]);
}

#[test]
fn rejected_chart_list_is_rolled_back_when_series_mount_fails() {
    let log = Log::default();
    let p = primitive("p", &log);
    let host = host_with(&[p.clone(), p.clone()], recording_callbacks(&log, "chart"));

    let err = SeriesBinder::mount(&host.scope(), SeriesProps::line(), SeriesCallbacks::default())
        .expect_err("second attach of the same primitive is rejected");
    assert!(matches!(err, chart_lifecycle::ChartError::InvalidData(_)));

    assert_eq!(host.context().chart_primitives().holders(PaneIndex::DEFAULT), 0);
    assert!(host.context().chart_primitives().attached_list(PaneIndex::DEFAULT).is_none());
    assert!(host.chart().borrow().pane_primitives(PaneIndex::DEFAULT).is_empty());
    assert_eq!(host.chart().borrow().series_count(), 0);
    assert_eq!(log.borrow().as_slice(), &["attached:p@Pane(PaneIndex(0))", "detached:p"]);

    let pane = PrimitiveTarget::Pane(PaneIndex::DEFAULT);
    assert_eq!(
        primitive_calls(&host),
        vec![(true, pane, primitive_key(&p)), (false, pane, primitive_key(&p))]
    );
}

#[test]
fn first_activation_detaches_before_attaching() {
    let log = Log::default();
    let a = primitive("a", &log);
    let host = host_with(&[a.clone()], recording_callbacks(&log, "chart"));
    let pane = PrimitiveTarget::Pane(PaneIndex::DEFAULT);
    host.chart()
        .borrow_mut()
        .attach_primitive(pane, &a)
        .expect("stale attach");
    host.chart().borrow_mut().take_journal();
    log.borrow_mut().clear();

    let _series = SeriesBinder::mount(&host.scope(), SeriesProps::line(), SeriesCallbacks::default())
        .expect("series");

    assert_eq!(
        primitive_calls(&host),
        vec![(false, pane, primitive_key(&a)), (true, pane, primitive_key(&a))]
    );
    assert_eq!(host.chart().borrow().pane_primitives(PaneIndex::DEFAULT).len(), 1);
    assert_eq!(
        log.borrow().as_slice(),
        &["detached:a", "attached:a@Pane(PaneIndex(0))", "chart:on_attached:1"]
    );
}

proptest! {
    #[test]
    fn detach_set_always_equals_previous_attach_set(
        selections in prop::collection::vec(prop::collection::vec(0usize..5, 0..5), 1..12)
    ) {
        let log = Log::default();
        let pool: Vec<PrimitiveRef> = ["p0", "p1", "p2", "p3", "p4"]
            .iter()
            .map(|name| primitive(*name, &log))
            .collect();
        let host = host_with(&[], PrimitiveCallbacks::default());
        let mut pane = Pane::mount(&host.scope(), PaneProps::new()).expect("pane");
        let _series = SeriesBinder::mount(&pane.scope(), SeriesProps::line(), SeriesCallbacks::default())
            .expect("series");

        let mut previous: Vec<usize> = Vec::new();
        for selection in selections {
            let mut picked: Vec<PrimitiveRef> = Vec::new();
            for index in selection {
                let candidate = &pool[index];
                if !picked.iter().any(|item| primitive_key(item) == primitive_key(candidate)) {
                    picked.push(candidate.clone());
                }
            }
            host.chart().borrow_mut().take_journal();
            pane.set_primitives(primitive_list(picked.iter().cloned())).expect("replace");

            let calls = primitive_calls(&host);
            let detached: Vec<usize> = calls.iter().filter(|call| !call.0).map(|call| call.2).collect();
            let attached: Vec<usize> = calls.iter().filter(|call| call.0).map(|call| call.2).collect();
            let first_attach = calls.iter().position(|call| call.0).unwrap_or(calls.len());
            prop_assert!(calls[first_attach..].iter().all(|call| call.0));
            prop_assert_eq!(&detached, &previous);
            prop_assert_eq!(&attached, &keys(&picked));
            previous = keys(&picked);
        }
    }
}
