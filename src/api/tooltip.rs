use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::backend::{ChartBackend, Horz};
use crate::core::{ChartId, Point, SeriesData, SeriesId};
use crate::error::ChartResult;
use crate::interaction::{ChartEventKind, Handlers, MouseEventHandler, MouseEventParams};

use super::{ChartContext, EventSubscription, Scope};

/// Coordinate space of the rendered tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TooltipPosition {
    /// Relative to the chart surface.
    #[default]
    Relative,
    /// Relative to the viewport: translated by the surface origin.
    Fixed,
}

/// Snapshot taken from one accepted crosshair-move event.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipState<X> {
    pub chart: ChartId,
    /// Only series with data at `horz`.
    pub series_data: IndexMap<SeriesId, SeriesData>,
    pub point: Point,
    pub horz: X,
}

/// Stateless tooltip content component.
pub trait TooltipContent<X, C> {
    fn render(&self, state: &TooltipState<X>) -> C;
}

/// Exactly one authoring mode for tooltip content.
pub enum TooltipBody<X, C> {
    Render(Rc<dyn Fn(&TooltipState<X>) -> C>),
    Component(Rc<dyn TooltipContent<X, C>>),
}

impl<X, C> TooltipBody<X, C> {
    #[must_use]
    pub fn render(render: impl Fn(&TooltipState<X>) -> C + 'static) -> Self {
        Self::Render(Rc::new(render))
    }

    #[must_use]
    pub fn component(component: impl TooltipContent<X, C> + 'static) -> Self {
        Self::Component(Rc::new(component))
    }

    fn produce(&self, state: &TooltipState<X>) -> C {
        match self {
            Self::Render(render) => render(state),
            Self::Component(component) => component.render(state),
        }
    }
}

impl<X, C> Clone for TooltipBody<X, C> {
    fn clone(&self) -> Self {
        match self {
            Self::Render(render) => Self::Render(render.clone()),
            Self::Component(component) => Self::Component(component.clone()),
        }
    }
}

impl<X, C> fmt::Debug for TooltipBody<X, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render(_) => f.write_str("TooltipBody::Render"),
            Self::Component(_) => f.write_str("TooltipBody::Component"),
        }
    }
}

pub type AdjustPositionFn<X> = Rc<dyn Fn(Point, &TooltipState<X>) -> Point>;
pub type TooltipShowCallback<X> = Rc<dyn Fn(&TooltipState<X>)>;
pub type TooltipHideCallback = Rc<dyn Fn()>;

/// Inputs of a Tooltip declaration.
pub struct TooltipProps<X, C> {
    pub body: TooltipBody<X, C>,
    pub offset: Point,
    pub position: TooltipPosition,
    pub adjust_position: Option<AdjustPositionFn<X>>,
    pub on_show: Option<TooltipShowCallback<X>>,
    pub on_hide: Option<TooltipHideCallback>,
}

impl<X, C> TooltipProps<X, C> {
    #[must_use]
    pub fn new(body: TooltipBody<X, C>) -> Self {
        Self {
            body,
            offset: Point::new(0.0, 0.0),
            position: TooltipPosition::Relative,
            adjust_position: None,
            on_show: None,
            on_hide: None,
        }
    }

    #[must_use]
    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset = Point::new(x, y);
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: TooltipPosition) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_adjust_position(
        mut self,
        adjust: impl Fn(Point, &TooltipState<X>) -> Point + 'static,
    ) -> Self {
        self.adjust_position = Some(Rc::new(adjust));
        self
    }

    #[must_use]
    pub fn on_show(mut self, callback: impl Fn(&TooltipState<X>) + 'static) -> Self {
        self.on_show = Some(Rc::new(callback));
        self
    }

    #[must_use]
    pub fn on_hide(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_hide = Some(Rc::new(callback));
        self
    }
}

/// Positioned content handed to the overlay layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipFrame<C> {
    pub position: Point,
    pub content: C,
}

/// Surface into which the tooltip injects its node.
pub trait OverlayLayer<C> {
    fn mount(&mut self, frame: TooltipFrame<C>);
    fn unmount(&mut self);
}

/// Overlay layer that keeps the mounted frame in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryOverlay<C> {
    mounted: Option<TooltipFrame<C>>,
    mounts: usize,
    unmounts: usize,
}

impl<C> Default for MemoryOverlay<C> {
    fn default() -> Self {
        Self {
            mounted: None,
            mounts: 0,
            unmounts: 0,
        }
    }
}

impl<C> MemoryOverlay<C> {
    #[must_use]
    pub fn mounted(&self) -> Option<&TooltipFrame<C>> {
        self.mounted.as_ref()
    }

    #[must_use]
    pub fn mounts(&self) -> usize {
        self.mounts
    }

    #[must_use]
    pub fn unmounts(&self) -> usize {
        self.unmounts
    }
}

impl<C> OverlayLayer<C> for MemoryOverlay<C> {
    fn mount(&mut self, frame: TooltipFrame<C>) {
        self.mounted = Some(frame);
        self.mounts += 1;
    }

    fn unmount(&mut self) {
        if self.mounted.take().is_some() {
            self.unmounts += 1;
        }
    }
}

enum TooltipPhase<X> {
    Hidden,
    Visible(TooltipState<X>),
}

struct TooltipShared<X> {
    phase: TooltipPhase<X>,
    on_show: Option<TooltipShowCallback<X>>,
    on_hide: Option<TooltipHideCallback>,
}

/// Cursor-following overlay driven by the chart's crosshair-move stream.
///
/// Starts Hidden. An event whose point or horizontal value is missing, or
/// whose point falls outside the surface, hides it (and reports `on_hide`
/// every time). Any other event replaces the whole state and shows it.
/// Leaving the Visible state unmounts the layer right away; mounting only
/// happens in `render`.
pub struct Tooltip<B: ChartBackend, C: 'static, L: OverlayLayer<C> + 'static = MemoryOverlay<C>> {
    context: Rc<ChartContext<B>>,
    shared: Rc<RefCell<TooltipShared<Horz<B>>>>,
    subscription: EventSubscription<B>,
    body: TooltipBody<Horz<B>, C>,
    offset: Point,
    position: TooltipPosition,
    adjust_position: Option<AdjustPositionFn<Horz<B>>>,
    layer: Rc<RefCell<L>>,
    mounted: bool,
}

impl<B: ChartBackend, C: 'static, L: OverlayLayer<C> + 'static> Tooltip<B, C, L> {
    pub fn mount(parent: &Scope<B>, props: TooltipProps<Horz<B>, C>, layer: L) -> ChartResult<Self> {
        let context = parent.require_chart("Tooltip")?;
        let shared = Rc::new(RefCell::new(TooltipShared {
            phase: TooltipPhase::Hidden,
            on_show: props.on_show,
            on_hide: props.on_hide,
        }));

        let layer = Rc::new(RefCell::new(layer));
        let mut subscription = EventSubscription::new(ChartEventKind::CrosshairMove);
        let handler = crosshair_handler::<B, C, L>(
            Rc::downgrade(&context),
            Rc::downgrade(&shared),
            Rc::downgrade(&layer),
        );
        subscription.replace(&context, &Handlers::One(handler));
        debug!(chart = %context.chart_id(), "tooltip mounted");

        Ok(Self {
            context,
            shared,
            subscription,
            body: props.body,
            offset: props.offset,
            position: props.position,
            adjust_position: props.adjust_position,
            layer,
            mounted: true,
        })
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        matches!(self.shared.borrow().phase, TooltipPhase::Visible(_))
    }

    /// Current snapshot; `None` while Hidden.
    #[must_use]
    pub fn state(&self) -> Option<TooltipState<Horz<B>>> {
        match &self.shared.borrow().phase {
            TooltipPhase::Hidden => None,
            TooltipPhase::Visible(state) => Some(state.clone()),
        }
    }

    #[must_use]
    pub fn layer(&self) -> Ref<'_, L> {
        self.layer.borrow()
    }

    /// Position the next render would use; `None` while Hidden.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        self.state().map(|state| self.place(&state))
    }

    /// Mounts the content at the computed position while Visible and removes
    /// any mounted node while Hidden. Returns the applied position.
    pub fn render(&mut self) -> Option<Point> {
        let Some(state) = self.state() else {
            self.layer.borrow_mut().unmount();
            return None;
        };
        let position = self.place(&state);
        let content = self.body.produce(&state);
        self.layer.borrow_mut().mount(TooltipFrame { position, content });
        Some(position)
    }

    pub fn set_body(&mut self, body: TooltipBody<Horz<B>, C>) {
        self.body = body;
    }

    pub fn set_offset(&mut self, x: f64, y: f64) {
        self.offset = Point::new(x, y);
    }

    pub fn set_position(&mut self, position: TooltipPosition) {
        self.position = position;
    }

    pub fn set_adjust_position(&mut self, adjust: Option<AdjustPositionFn<Horz<B>>>) {
        self.adjust_position = adjust;
    }

    pub fn set_on_show(&mut self, callback: Option<TooltipShowCallback<Horz<B>>>) {
        self.shared.borrow_mut().on_show = callback;
    }

    pub fn set_on_hide(&mut self, callback: Option<TooltipHideCallback>) {
        self.shared.borrow_mut().on_hide = callback;
    }

    /// Unsubscribes from the crosshair stream and removes the mounted node.
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn place(&self, state: &TooltipState<Horz<B>>) -> Point {
        let mut position = state.point.translate(self.offset);
        if self.position == TooltipPosition::Fixed {
            position = position.translate(self.context.surface().origin());
        }
        match &self.adjust_position {
            Some(adjust) => adjust(position, state),
            None => position,
        }
    }

    fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.subscription.clear(&self.context);
        self.layer.borrow_mut().unmount();
        self.shared.borrow_mut().phase = TooltipPhase::Hidden;
        debug!(chart = %self.context.chart_id(), "tooltip unmounted");
    }
}

impl<B: ChartBackend, C: 'static, L: OverlayLayer<C> + 'static> Drop for Tooltip<B, C, L> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<B: ChartBackend, C: 'static, L: OverlayLayer<C> + 'static> fmt::Debug for Tooltip<B, C, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tooltip")
            .field("chart", &self.context.chart_id())
            .field("visible", &self.is_visible())
            .field("body", &self.body)
            .field("offset", &self.offset)
            .field("position", &self.position)
            .field("mounted", &self.mounted)
            .finish()
    }
}

fn crosshair_handler<B: ChartBackend, C: 'static, L: OverlayLayer<C> + 'static>(
    context: Weak<ChartContext<B>>,
    shared: Weak<RefCell<TooltipShared<Horz<B>>>>,
    layer: Weak<RefCell<L>>,
) -> MouseEventHandler<Horz<B>> {
    Rc::new(move |params: &MouseEventParams<Horz<B>>| {
        let (Some(context), Some(shared)) = (context.upgrade(), shared.upgrade()) else {
            return;
        };
        let bounds = context.surface().size;
        let accepted = match (params.point, params.horz) {
            (Some(point), Some(horz)) if bounds.contains(point) => Some(TooltipState {
                chart: context.chart_id(),
                series_data: params.series_data.clone(),
                point,
                horz,
            }),
            _ => None,
        };

        match accepted {
            Some(state) => {
                let on_show = {
                    let mut shared = shared.borrow_mut();
                    shared.phase = TooltipPhase::Visible(state.clone());
                    shared.on_show.clone()
                };
                trace!(x = state.point.x, y = state.point.y, "tooltip shown");
                if let Some(on_show) = on_show {
                    on_show(&state);
                }
            }
            None => {
                let (was_visible, on_hide) = {
                    let mut shared = shared.borrow_mut();
                    let previous = std::mem::replace(&mut shared.phase, TooltipPhase::Hidden);
                    (
                        matches!(previous, TooltipPhase::Visible(_)),
                        shared.on_hide.clone(),
                    )
                };
                if was_visible {
                    if let Some(layer) = layer.upgrade() {
                        layer.borrow_mut().unmount();
                    }
                }
                trace!("tooltip hidden");
                if let Some(on_hide) = on_hide {
                    on_hide();
                }
            }
        }
    })
}
