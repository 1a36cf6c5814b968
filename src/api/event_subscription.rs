use smallvec::SmallVec;
use tracing::trace;

use crate::backend::{ChartBackend, Horz};
use crate::interaction::{ChartEventKind, Handlers, MouseEventHandler};

use super::ChartContext;

/// Subscribe/unsubscribe effect for one chart event source.
///
/// Holds the handlers currently subscribed; a new handler set replaces the
/// old one by unsubscribing everything first.
pub struct EventSubscription<B: ChartBackend> {
    kind: ChartEventKind,
    active: SmallVec<[MouseEventHandler<Horz<B>>; 2]>,
}

impl<B: ChartBackend> EventSubscription<B> {
    #[must_use]
    pub fn new(kind: ChartEventKind) -> Self {
        Self {
            kind,
            active: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ChartEventKind {
        self.kind
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Re-subscribes when `handlers` differs by identity from the active set.
    pub fn replace(&mut self, context: &ChartContext<B>, handlers: &Handlers<Horz<B>>) {
        if handlers.same_as(&self.active) {
            return;
        }
        self.clear(context);
        if context.is_removed() {
            return;
        }
        let mut chart = context.chart().borrow_mut();
        for handler in handlers.as_slice() {
            chart.subscribe(self.kind, handler.clone());
            self.active.push(handler.clone());
        }
        trace!(kind = ?self.kind, handlers = self.active.len(), "event handlers subscribed");
    }

    pub fn clear(&mut self, context: &ChartContext<B>) {
        if self.active.is_empty() {
            return;
        }
        if !context.is_removed() {
            let mut chart = context.chart().borrow_mut();
            for handler in &self.active {
                chart.unsubscribe(self.kind, handler);
            }
        }
        self.active.clear();
    }
}
