//! In-page navigation: smooth-scrolling anchor links and the mobile menu toggle.

use std::rc::Rc;

use log::debug;

use crate::config::PageConfig;
use crate::dom::{Attached, Dom, DomEvent, Target};
use crate::error::PageError;
use crate::interaction::{Interaction, InteractionLog};

const OPEN_CLASS: &str = "open";

/// A nav anchor pointing at `#target_id`.
#[derive(Debug, Clone)]
pub struct NavLink<N> {
    pub element: N,
    pub target_id: String,
}

pub fn nav_links<D: Dom>(dom: &D, selector: &str) -> Vec<NavLink<D::Node>> {
    dom.query_all(selector)
        .into_iter()
        .filter_map(|element| {
            let href = dom.attribute(&element, "href")?;
            let target_id = href.strip_prefix('#')?.to_string();
            Some(NavLink { element, target_id })
        })
        .collect()
}

pub struct MobileNav<D: Dom> {
    dom: D,
    nav: D::Node,
    toggle: D::Node,
    log: Rc<dyn InteractionLog>,
}

impl<D: Dom> MobileNav<D> {
    /// `None` when the page has no nav container or no toggle button.
    pub fn locate(dom: &D, config: &PageConfig, log: Rc<dyn InteractionLog>) -> Option<Rc<Self>> {
        let nav = dom.element_by_id(&config.nav_id)?;
        let toggle = dom.element_by_id(&config.nav_toggle_id)?;
        Some(Rc::new(Self {
            dom: dom.clone(),
            nav,
            toggle,
            log,
        }))
    }

    pub fn is_open(&self) -> bool {
        self.dom.has_class(&self.nav, OPEN_CLASS)
    }

    pub fn toggle(&self) -> bool {
        let open = self.dom.toggle_class(&self.nav, OPEN_CLASS);
        self.mirror_expanded(open);
        self.log.record(&Interaction::NavToggled { open });
        open
    }

    /// Closes the menu without recording a toggle.
    pub fn close(&self) {
        if self.is_open() {
            self.dom.remove_class(&self.nav, OPEN_CLASS);
            self.mirror_expanded(false);
        }
    }

    fn mirror_expanded(&self, open: bool) {
        self.dom
            .set_attribute(&self.toggle, "aria-expanded", if open { "true" } else { "false" });
    }

    pub fn attach(self: &Rc<Self>) -> Result<Attached<D>, PageError> {
        let mut attached = Attached::new();
        let this = Rc::clone(self);
        attached.push(self.dom.listen(
            Target::Node(&self.toggle),
            "click",
            Box::new(move |_: &D::Event| {
                this.toggle();
            }),
        )?);
        Ok(attached)
    }
}

pub struct Navigation<D: Dom> {
    dom: D,
    links: Vec<NavLink<D::Node>>,
    mobile: Option<Rc<MobileNav<D>>>,
    log: Rc<dyn InteractionLog>,
}

impl<D: Dom> Navigation<D> {
    pub fn new(
        dom: &D,
        links: Vec<NavLink<D::Node>>,
        mobile: Option<Rc<MobileNav<D>>>,
        log: Rc<dyn InteractionLog>,
    ) -> Rc<Self> {
        Rc::new(Self {
            dom: dom.clone(),
            links,
            mobile,
            log,
        })
    }

    pub fn follow(&self, event: &D::Event, target_id: &str) {
        event.prevent_default();
        let Some(target) = self.dom.element_by_id(target_id) else {
            debug!("Nav link points at missing #{}", target_id);
            return;
        };

        self.dom.scroll_into_view(&target);
        self.dom.set_attribute(&target, "tabindex", "-1");
        self.dom.focus(&target);
        self.log.record(&Interaction::Navigated(target_id.to_string()));

        if let Some(mobile) = &self.mobile {
            mobile.close();
        }
    }

    pub fn attach(self: &Rc<Self>) -> Result<Attached<D>, PageError> {
        let mut attached = Attached::new();
        for link in &self.links {
            let this = Rc::clone(self);
            let target_id = link.target_id.clone();
            attached.push(self.dom.listen(
                Target::Node(&link.element),
                "click",
                Box::new(move |event: &D::Event| this.follow(event, &target_id)),
            )?);
        }
        Ok(attached)
    }
}
