use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use chart_lifecycle::api::{
    ChartCallbacks, ChartHost, ChartHostProps, MemoryOverlay, OverlayLayer, Tooltip, TooltipBody,
    TooltipContent, TooltipFrame, TooltipPosition, TooltipProps, TooltipState,
};
use chart_lifecycle::backend::{HeadlessChart, HeadlessPriceChart};
use chart_lifecycle::core::{Point, SeriesData, SeriesId, SurfaceBounds};
use chart_lifecycle::interaction::{ChartEventKind, MouseEventParams};
use proptest::prelude::*;

fn host_at(surface: SurfaceBounds) -> ChartHost<HeadlessPriceChart> {
    ChartHost::mount(
        surface,
        ChartHostProps::new(surface.size.width, surface.size.height),
        ChartCallbacks::default(),
    )
    .expect("mount host")
}

fn host() -> ChartHost<HeadlessPriceChart> {
    host_at(SurfaceBounds::new(800, 400))
}

fn move_to(host: &ChartHost<HeadlessPriceChart>, params: MouseEventParams<f64>) {
    HeadlessChart::dispatch(host.chart(), ChartEventKind::CrosshairMove, &params);
}

fn value_label(state: &TooltipState<f64>) -> String {
    let values: Vec<String> = state
        .series_data
        .values()
        .filter_map(SeriesData::primary_value)
        .map(|value| format!("{value:.1}"))
        .collect();
    format!("{}: {}", state.horz, values.join(", "))
}

fn text_tooltip(
    host: &ChartHost<HeadlessPriceChart>,
    props: TooltipProps<f64, String>,
) -> Tooltip<HeadlessPriceChart, String> {
    Tooltip::mount(&host.scope(), props, MemoryOverlay::default()).expect("mount tooltip")
}

#[test]
fn starts_hidden_and_renders_nothing() {
    let host = host();
    let mut tooltip = text_tooltip(&host, TooltipProps::new(TooltipBody::render(value_label)));

    assert!(!tooltip.is_visible());
    assert!(tooltip.state().is_none());
    assert_eq!(tooltip.render(), None);
    assert_eq!(tooltip.layer().mounts(), 0);
    assert_eq!(
        host.chart()
            .borrow()
            .subscriber_count(ChartEventKind::CrosshairMove),
        1
    );
}

#[test]
fn in_bounds_event_shows_snapshot_at_cursor_plus_offset() {
    let host = host();
    let shown = Rc::new(RefCell::new(Vec::new()));
    let sink = shown.clone();
    let mut tooltip = text_tooltip(
        &host,
        TooltipProps::new(TooltipBody::render(value_label))
            .with_offset(12.0, -8.0)
            .on_show(move |state| sink.borrow_mut().push(state.point)),
    );

    move_to(
        &host,
        MouseEventParams::at(Point::new(100.0, 50.0), 7.0)
            .with_series_data(SeriesId::new(1), SeriesData::Value(42.5)),
    );

    assert!(tooltip.is_visible());
    assert_eq!(shown.borrow().as_slice(), &[Point::new(100.0, 50.0)]);
    let state = tooltip.state().expect("visible state");
    assert_eq!(state.chart, host.chart_id());
    assert_eq!(state.series_data.len(), 1);

    let position = tooltip.render().expect("rendered");
    assert_relative_eq!(position.x, 112.0);
    assert_relative_eq!(position.y, 42.0);
    let layer = tooltip.layer();
    let frame = layer.mounted().expect("mounted frame");
    assert_eq!(frame.content, "7: 42.5");
}

#[test]
fn state_is_replaced_wholesale_on_each_event() {
    let host = host();
    let tooltip = text_tooltip(&host, TooltipProps::new(TooltipBody::render(value_label)));

    move_to(
        &host,
        MouseEventParams::at(Point::new(10.0, 10.0), 1.0)
            .with_series_data(SeriesId::new(1), SeriesData::Value(1.0))
            .with_series_data(SeriesId::new(2), SeriesData::Value(2.0)),
    );
    move_to(
        &host,
        MouseEventParams::at(Point::new(20.0, 30.0), 2.0)
            .with_series_data(SeriesId::new(2), SeriesData::Value(5.0)),
    );

    let state = tooltip.state().expect("visible");
    assert_eq!(state.point, Point::new(20.0, 30.0));
    assert_relative_eq!(state.horz, 2.0);
    assert_eq!(state.series_data.keys().copied().collect::<Vec<_>>(), vec![SeriesId::new(2)]);
}

#[test]
fn out_of_bounds_event_hides_and_reports_every_time() {
    let host = host();
    let hides = Rc::new(RefCell::new(0));
    let sink = hides.clone();
    let mut tooltip = text_tooltip(
        &host,
        TooltipProps::new(TooltipBody::render(value_label))
            .on_hide(move || *sink.borrow_mut() += 1),
    );

    move_to(&host, MouseEventParams::at(Point::new(5.0, 5.0), 1.0));
    tooltip.render();
    assert_eq!(tooltip.layer().mounts(), 1);

    move_to(&host, MouseEventParams::at(Point::new(-1.0, 0.0), 1.0));
    assert!(!tooltip.is_visible());
    assert_eq!(*hides.borrow(), 1);
    assert_eq!(tooltip.layer().unmounts(), 1);

    move_to(&host, MouseEventParams::at(Point::new(-1.0, 0.0), 1.0));
    assert_eq!(*hides.borrow(), 2);

    assert_eq!(tooltip.render(), None);
    assert!(tooltip.layer().mounted().is_none());
    assert_eq!(tooltip.layer().unmounts(), 1);
}

#[test]
fn leaving_the_surface_unmounts_the_rendered_frame() {
    let host = host();
    let mut tooltip = text_tooltip(&host, TooltipProps::new(TooltipBody::render(value_label)));

    move_to(&host, MouseEventParams::at(Point::new(40.0, 40.0), 3.0));
    tooltip.render().expect("rendered");
    assert!(tooltip.layer().mounted().is_some());

    move_to(&host, MouseEventParams::outside());

    assert!(!tooltip.is_visible());
    assert!(tooltip.layer().mounted().is_none());
    assert_eq!(tooltip.layer().mounts(), 1);
    assert_eq!(tooltip.layer().unmounts(), 1);

    move_to(&host, MouseEventParams::at(Point::new(40.0, 40.0), 3.0));
    assert!(tooltip.layer().mounted().is_none());
    tooltip.render().expect("rendered again");
    assert_eq!(tooltip.layer().mounts(), 2);
}

#[test]
fn missing_point_or_value_hides() {
    let host = host();
    let hides = Rc::new(RefCell::new(0));
    let sink = hides.clone();
    let tooltip = text_tooltip(
        &host,
        TooltipProps::new(TooltipBody::render(value_label))
            .on_hide(move || *sink.borrow_mut() += 1),
    );

    move_to(&host, MouseEventParams::outside());
    let mut without_value = MouseEventParams::at(Point::new(5.0, 5.0), 1.0);
    without_value.horz = None;
    move_to(&host, without_value);

    assert!(!tooltip.is_visible());
    assert_eq!(*hides.borrow(), 2);
}

#[test]
fn surface_edges_are_inside() {
    let host = host();
    let tooltip = text_tooltip(&host, TooltipProps::new(TooltipBody::render(value_label)));
    move_to(&host, MouseEventParams::at(Point::new(800.0, 400.0), 1.0));
    assert!(tooltip.is_visible());
    move_to(&host, MouseEventParams::at(Point::new(800.5, 400.0), 1.0));
    assert!(!tooltip.is_visible());
}

#[test]
fn fixed_position_adds_surface_origin_before_adjustment() {
    let host = host_at(SurfaceBounds::new(800, 400).with_origin(30.0, 40.0));
    let mut tooltip = text_tooltip(
        &host,
        TooltipProps::new(TooltipBody::render(value_label))
            .with_offset(10.0, 10.0)
            .with_position(TooltipPosition::Fixed)
            .with_adjust_position(|point, _| Point::new(point.x.min(150.0), point.y)),
    );

    move_to(&host, MouseEventParams::at(Point::new(200.0, 100.0), 1.0));

    let position = tooltip.render().expect("rendered");
    assert_relative_eq!(position.x, 150.0);
    assert_relative_eq!(position.y, 150.0);

    tooltip.set_position(TooltipPosition::Relative);
    tooltip.set_adjust_position(None);
    let relative = tooltip.position().expect("visible");
    assert_relative_eq!(relative.x, 210.0);
    assert_relative_eq!(relative.y, 110.0);
}

struct ValueCount;

impl TooltipContent<f64, String> for ValueCount {
    fn render(&self, state: &TooltipState<f64>) -> String {
        format!("{} series", state.series_data.len())
    }
}

#[test]
fn component_body_receives_the_same_state() {
    let host = host();
    let mut tooltip = text_tooltip(&host, TooltipProps::new(TooltipBody::component(ValueCount)));

    move_to(
        &host,
        MouseEventParams::at(Point::new(1.0, 1.0), 3.0)
            .with_series_data(SeriesId::new(4), SeriesData::Value(1.0)),
    );
    tooltip.render();

    assert_eq!(
        tooltip.layer().mounted().map(|frame| frame.content.as_str()),
        Some("1 series")
    );
}

#[derive(Clone, Default)]
struct SharedLayer {
    events: Rc<RefCell<Vec<String>>>,
}

impl OverlayLayer<String> for SharedLayer {
    fn mount(&mut self, frame: TooltipFrame<String>) {
        self.events.borrow_mut().push(format!("mount:{}", frame.content));
    }

    fn unmount(&mut self) {
        self.events.borrow_mut().push("unmount".to_owned());
    }
}

#[test]
fn unmount_unsubscribes_and_removes_mounted_node() {
    let host = host();
    let layer = SharedLayer::default();
    let events = layer.events.clone();
    let mut tooltip: Tooltip<HeadlessPriceChart, String, SharedLayer> = Tooltip::mount(
        &host.scope(),
        TooltipProps::new(TooltipBody::render(|_| "tip".to_owned())),
        layer,
    )
    .expect("mount tooltip");

    move_to(&host, MouseEventParams::at(Point::new(1.0, 1.0), 3.0));
    tooltip.render();
    tooltip.unmount();

    assert_eq!(events.borrow().as_slice(), &["mount:tip", "unmount"]);
    assert_eq!(
        host.chart()
            .borrow()
            .subscriber_count(ChartEventKind::CrosshairMove),
        0
    );
    move_to(&host, MouseEventParams::at(Point::new(2.0, 2.0), 3.0));
}

proptest! {
    #[test]
    fn outside_points_always_hide_exactly_once(
        x in prop_oneof![-1000.0f64..-0.001, 800.001f64..5000.0],
        y in -100.0f64..500.0,
        repeats in 1usize..4
    ) {
        let host = host();
        let hides = Rc::new(RefCell::new(0usize));
        let sink = hides.clone();
        let tooltip = text_tooltip(
            &host,
            TooltipProps::new(TooltipBody::render(value_label))
                .on_hide(move || *sink.borrow_mut() += 1),
        );
        move_to(&host, MouseEventParams::at(Point::new(400.0, 200.0), 1.0));

        for round in 1..=repeats {
            move_to(&host, MouseEventParams::at(Point::new(x, y), 1.0));
            prop_assert!(!tooltip.is_visible());
            prop_assert_eq!(*hides.borrow(), round);
        }
    }
}
