use std::rc::Rc;

use log::debug;

use crate::config::StickyConfig;
use crate::debounce::Debounced;
use crate::dom::{Attached, Dom, Target};
use crate::error::PageError;
use crate::timers::Scheduler;

/// Publishes the header height (plus padding) as a CSS custom property so
/// anchor targets clear the sticky header.
pub struct StickyOffset<D: Dom> {
    dom: D,
    config: StickyConfig,
}

impl<D: Dom> StickyOffset<D> {
    pub fn new(dom: &D, config: &StickyConfig) -> Rc<Self> {
        Rc::new(Self {
            dom: dom.clone(),
            config: config.clone(),
        })
    }

    pub fn recompute(&self) -> f64 {
        let height = self
            .dom
            .query_first(&self.config.header_selector)
            .map_or(0.0, |header| self.dom.offset_height(&header));
        let offset = height + self.config.padding;
        self.dom
            .set_root_property(&self.config.property, &format!("{}px", offset));
        debug!("{} = {}px", self.config.property, offset);
        offset
    }

    /// Recomputes once a burst of resize events has been quiet for the
    /// configured debounce window.
    pub fn attach<S: Scheduler>(self: &Rc<Self>, scheduler: S) -> Result<Attached<D>, PageError> {
        let this = Rc::clone(self);
        let debounced = Debounced::new(scheduler, self.config.debounce_ms, move || {
            this.recompute();
        });
        let mut attached = Attached::new();
        attached.push(self.dom.listen(
            Target::Window,
            "resize",
            Box::new(move |_: &D::Event| debounced.call()),
        )?);
        Ok(attached)
    }
}
