use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::backend::{ChartBackend, Horz, SharedChart};
use crate::core::{ChartId, HorzDomain, SurfaceBounds, Viewport};
use crate::error::ChartResult;
use crate::extensions::{PrimitiveCallbacks, PrimitiveList, empty_primitive_list};
use crate::interaction::{ChartEventKind, Handlers};

use super::{
    ChartContext, ChartOptions, EventSubscription, PrimitiveCoordinator, PrimitiveScope, Scope,
};

pub type CreateChartCallback = Rc<dyn Fn(ChartId)>;
pub type ResizeCallback = Rc<dyn Fn(u32, u32)>;

/// Inputs of a Chart Host.
#[derive(Clone)]
pub struct ChartHostProps {
    pub options: ChartOptions,
    pub width: u32,
    pub height: u32,
    pub force_repaint: bool,
    /// Primitives for the default pane.
    pub primitives: PrimitiveList,
}

impl ChartHostProps {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            options: ChartOptions::default(),
            width,
            height,
            force_repaint: false,
            primitives: empty_primitive_list(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ChartOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_force_repaint(mut self, force_repaint: bool) -> Self {
        self.force_repaint = force_repaint;
        self
    }

    #[must_use]
    pub fn with_primitives(mut self, primitives: PrimitiveList) -> Self {
        self.primitives = primitives;
        self
    }
}

impl fmt::Debug for ChartHostProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartHostProps")
            .field("options", &self.options)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("force_repaint", &self.force_repaint)
            .field("primitives", &self.primitives.len())
            .finish()
    }
}

/// Lifecycle callbacks of a Chart Host.
pub struct ChartCallbacks<X> {
    pub on_create_chart: Option<CreateChartCallback>,
    pub on_resize: Option<ResizeCallback>,
    pub on_click: Handlers<X>,
    pub on_dbl_click: Handlers<X>,
    pub on_crosshair_move: Handlers<X>,
    pub primitives: PrimitiveCallbacks,
}

impl<X> Default for ChartCallbacks<X> {
    fn default() -> Self {
        Self {
            on_create_chart: None,
            on_resize: None,
            on_click: Handlers::None,
            on_dbl_click: Handlers::None,
            on_crosshair_move: Handlers::None,
            primitives: PrimitiveCallbacks::default(),
        }
    }
}

impl<X> ChartCallbacks<X> {
    #[must_use]
    pub fn on_create_chart(mut self, callback: impl Fn(ChartId) + 'static) -> Self {
        self.on_create_chart = Some(Rc::new(callback));
        self
    }

    #[must_use]
    pub fn on_resize(mut self, callback: impl Fn(u32, u32) + 'static) -> Self {
        self.on_resize = Some(Rc::new(callback));
        self
    }

    #[must_use]
    pub fn on_click(mut self, handlers: impl Into<Handlers<X>>) -> Self {
        self.on_click = handlers.into();
        self
    }

    #[must_use]
    pub fn on_dbl_click(mut self, handlers: impl Into<Handlers<X>>) -> Self {
        self.on_dbl_click = handlers.into();
        self
    }

    #[must_use]
    pub fn on_crosshair_move(mut self, handlers: impl Into<Handlers<X>>) -> Self {
        self.on_crosshair_move = handlers.into();
        self
    }

    #[must_use]
    pub fn with_primitive_callbacks(mut self, callbacks: PrimitiveCallbacks) -> Self {
        self.primitives = callbacks;
        self
    }
}

/// Owns one chart instance for its whole lifetime.
///
/// Created by [`ChartHost::mount`], destroyed by [`ChartHost::unmount`] (or
/// on drop). Descendants reach the chart through [`ChartHost::scope`].
pub struct ChartHost<B: ChartBackend> {
    context: Rc<ChartContext<B>>,
    options: ChartOptions,
    width: u32,
    height: u32,
    force_repaint: bool,
    on_resize: Option<ResizeCallback>,
    click: EventSubscription<B>,
    dbl_click: EventSubscription<B>,
    crosshair_move: EventSubscription<B>,
    mounted: bool,
}

impl<B: ChartBackend> ChartHost<B> {
    /// Creates the chart against `surface` and runs every effect once.
    pub fn mount(
        surface: SurfaceBounds,
        props: ChartHostProps,
        callbacks: ChartCallbacks<Horz<B>>,
    ) -> ChartResult<Self> {
        let surface = if props.options.auto_size {
            surface
        } else {
            SurfaceBounds {
                size: Viewport::new(props.width, props.height),
                ..surface
            }
        };
        let chart = B::create(surface, &props.options)?;
        let chart: SharedChart<B> = Rc::new(RefCell::new(chart));
        let coordinator = PrimitiveCoordinator::new(
            PrimitiveScope::Chart,
            props.primitives,
            callbacks.primitives,
        );
        let context = Rc::new(ChartContext::new(chart, surface, coordinator));
        debug!(
            chart = %context.chart_id(),
            family = %<B::Domain as HorzDomain>::FAMILY,
            auto_size = props.options.auto_size,
            "chart mounted"
        );

        let mut host = Self {
            context,
            options: props.options,
            width: props.width,
            height: props.height,
            force_repaint: props.force_repaint,
            on_resize: callbacks.on_resize,
            click: EventSubscription::new(ChartEventKind::Click),
            dbl_click: EventSubscription::new(ChartEventKind::DoubleClick),
            crosshair_move: EventSubscription::new(ChartEventKind::CrosshairMove),
            mounted: true,
        };

        if let Some(on_create_chart) = &callbacks.on_create_chart {
            on_create_chart(host.context.chart_id());
        }
        host.click.replace(&host.context, &callbacks.on_click);
        host.dbl_click.replace(&host.context, &callbacks.on_dbl_click);
        host.crosshair_move
            .replace(&host.context, &callbacks.on_crosshair_move);
        host.apply_size()?;
        Ok(host)
    }

    /// Lookup value for Pane, Series and Tooltip declarations.
    #[must_use]
    pub fn scope(&self) -> Scope<B> {
        Scope::for_chart(self.context.clone())
    }

    #[must_use]
    pub fn context(&self) -> &Rc<ChartContext<B>> {
        &self.context
    }

    #[must_use]
    pub fn chart(&self) -> &SharedChart<B> {
        self.context.chart()
    }

    #[must_use]
    pub fn chart_id(&self) -> ChartId {
        self.context.chart_id()
    }

    #[must_use]
    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Re-applies the full options object when it differs from the last one.
    pub fn set_options(&mut self, options: ChartOptions) -> ChartResult<()> {
        if options == self.options {
            return Ok(());
        }
        let auto_size_changed = options.auto_size != self.options.auto_size;
        self.context.chart().borrow_mut().apply_options(&options)?;
        self.options = options;
        if auto_size_changed {
            self.apply_size()?;
        }
        Ok(())
    }

    /// Requests a new size. Ignored by the chart while auto-size is enabled.
    pub fn set_size(&mut self, width: u32, height: u32) -> ChartResult<()> {
        if (width, height) == (self.width, self.height) {
            return Ok(());
        }
        self.width = width;
        self.height = height;
        self.apply_size()
    }

    pub fn set_force_repaint(&mut self, force_repaint: bool) -> ChartResult<()> {
        if force_repaint == self.force_repaint {
            return Ok(());
        }
        self.force_repaint = force_repaint;
        self.apply_size()
    }

    /// Reports a new surface placement, e.g. after layout or when the surface
    /// auto-sizes the chart.
    pub fn set_surface(&mut self, surface: SurfaceBounds) -> ChartResult<()> {
        let surface = surface.validate()?;
        if self.options.auto_size {
            self.context.set_surface(surface);
        } else {
            self.context.set_surface(SurfaceBounds {
                size: self.context.surface().size,
                ..surface
            });
        }
        Ok(())
    }

    pub fn set_on_resize(&mut self, callback: Option<ResizeCallback>) {
        self.on_resize = callback;
    }

    pub fn set_click_handlers(&mut self, handlers: impl Into<Handlers<Horz<B>>>) {
        self.click.replace(&self.context, &handlers.into());
    }

    pub fn set_dbl_click_handlers(&mut self, handlers: impl Into<Handlers<Horz<B>>>) {
        self.dbl_click.replace(&self.context, &handlers.into());
    }

    pub fn set_crosshair_move_handlers(&mut self, handlers: impl Into<Handlers<Horz<B>>>) {
        self.crosshair_move.replace(&self.context, &handlers.into());
    }

    /// Replaces the default pane's primitive list.
    pub fn set_primitives(&mut self, primitives: PrimitiveList) -> ChartResult<()> {
        self.context
            .chart_primitives()
            .replace(&self.context, primitives)
    }

    pub fn set_primitive_callbacks(&mut self, callbacks: PrimitiveCallbacks) {
        self.context.chart_primitives().set_callbacks(callbacks);
    }

    /// Unsubscribes every handler and destroys the chart.
    pub fn unmount(mut self) -> ChartResult<()> {
        self.teardown()
    }

    fn apply_size(&mut self) -> ChartResult<()> {
        if self.options.auto_size {
            return Ok(());
        }
        self.context
            .chart()
            .borrow_mut()
            .resize(self.width, self.height, self.force_repaint)?;
        let surface = self.context.surface();
        self.context.set_surface(SurfaceBounds {
            size: Viewport::new(self.width, self.height),
            ..surface
        });
        if let Some(on_resize) = &self.on_resize {
            on_resize(self.width, self.height);
        }
        Ok(())
    }

    fn teardown(&mut self) -> ChartResult<()> {
        if !self.mounted {
            return Ok(());
        }
        self.mounted = false;
        self.click.clear(&self.context);
        self.dbl_click.clear(&self.context);
        self.crosshair_move.clear(&self.context);
        self.context.chart().borrow_mut().remove();
        self.context.mark_removed();
        debug!(chart = %self.context.chart_id(), "chart unmounted");
        Ok(())
    }
}

impl<B: ChartBackend> Drop for ChartHost<B> {
    fn drop(&mut self) {
        if let Err(err) = self.teardown() {
            warn!(error = %err, chart = %self.context.chart_id(), "chart teardown failed");
        }
    }
}

impl<B: ChartBackend> fmt::Debug for ChartHost<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartHost")
            .field("chart", &self.context.chart_id())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("auto_size", &self.options.auto_size)
            .field("mounted", &self.mounted)
            .finish()
    }
}
