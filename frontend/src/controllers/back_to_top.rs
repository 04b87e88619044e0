use std::rc::Rc;

use log::debug;

use crate::config::BackToTopConfig;
use crate::dom::{Attached, Dom, Target};
use crate::error::PageError;
use crate::interaction::{Interaction, InteractionLog};

fn markup(id: &str) -> String {
    format!(
        r#"<button id="{id}" class="cta-btn" aria-label="Back to top" style="position:fixed; bottom:2rem; right:2rem; padding:0.5rem 1rem; font-size:1.2rem; z-index:1000; display:none;">↑ Top</button>"#
    )
}

pub struct BackToTop<D: Dom> {
    dom: D,
    button: D::Node,
    show_after: f64,
    log: Rc<dyn InteractionLog>,
}

impl<D: Dom> BackToTop<D> {
    /// Adds a hidden button. `None` when the page already has its own, which
    /// is left alone.
    pub fn install(
        dom: &D,
        config: &BackToTopConfig,
        log: Rc<dyn InteractionLog>,
    ) -> Result<Option<Rc<Self>>, PageError> {
        if dom.element_by_id(&config.id).is_some() {
            debug!("Page has its own #{}, skipping back-to-top", config.id);
            return Ok(None);
        }
        dom.append_html(&markup(&config.id))?;
        Ok(dom.element_by_id(&config.id).map(|button| {
            Rc::new(Self {
                dom: dom.clone(),
                button,
                show_after: config.show_after,
                log,
            })
        }))
    }

    pub fn button(&self) -> &D::Node {
        &self.button
    }

    pub fn on_scroll(&self) {
        let display = if self.dom.scroll_y() > self.show_after {
            "block"
        } else {
            "none"
        };
        self.dom.set_style(&self.button, "display", display);
    }

    pub fn go_top(&self) {
        self.dom.scroll_to_top();
        self.log.record(&Interaction::BackToTop);
    }

    pub fn attach(self: &Rc<Self>) -> Result<Attached<D>, PageError> {
        let mut attached = Attached::new();
        let this = Rc::clone(self);
        attached.push(self.dom.listen(
            Target::Window,
            "scroll",
            Box::new(move |_: &D::Event| this.on_scroll()),
        )?);
        let this = Rc::clone(self);
        attached.push(self.dom.listen(
            Target::Node(&self.button),
            "click",
            Box::new(move |_: &D::Event| this.go_top()),
        )?);
        Ok(attached)
    }
}
