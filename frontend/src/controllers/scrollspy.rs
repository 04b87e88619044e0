use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::ObserverOptions;
use crate::controllers::nav::NavLink;
use crate::dom::{Attached, Dom, Intersection};
use crate::error::PageError;

const ACTIVE_CLASS: &str = "active";

/// Marks the nav link of the section currently in view.
///
/// When several sections qualify in one batch the last one in the batch
/// wins; there is no ranking by position.
pub struct Scrollspy<D: Dom> {
    dom: D,
    links: Vec<NavLink<D::Node>>,
    by_section: HashMap<String, usize>,
    options: ObserverOptions,
    active: RefCell<Option<String>>,
}

impl<D: Dom> Scrollspy<D> {
    pub fn new(dom: &D, links: Vec<NavLink<D::Node>>, options: ObserverOptions) -> Rc<Self> {
        // Later links shadow earlier ones pointing at the same section.
        let by_section = links
            .iter()
            .enumerate()
            .map(|(index, link)| (link.target_id.clone(), index))
            .collect();
        Rc::new(Self {
            dom: dom.clone(),
            links,
            by_section,
            options,
            active: RefCell::new(None),
        })
    }

    pub fn active(&self) -> Option<String> {
        self.active.borrow().clone()
    }

    pub fn track(&self, batch: &[Intersection<D::Node>]) {
        for entry in batch {
            let section = self.dom.id(&entry.target);
            let Some(&index) = self.by_section.get(&section) else {
                continue;
            };
            if !entry.reaches(self.options.threshold) {
                continue;
            }
            for link in &self.links {
                self.dom.remove_class(&link.element, ACTIVE_CLASS);
                self.dom.remove_attribute(&link.element, "aria-current");
            }
            let link = &self.links[index].element;
            self.dom.add_class(link, ACTIVE_CLASS);
            self.dom.set_attribute(link, "aria-current", "page");
            self.active.replace(Some(section));
        }
    }

    pub fn attach(self: &Rc<Self>, sections: &[D::Node]) -> Result<Attached<D>, PageError> {
        let mut attached = Attached::new();
        if sections.is_empty() {
            return Ok(attached);
        }
        let this = Rc::clone(self);
        attached.push(self.dom.observe(
            sections,
            &self.options,
            Box::new(move |batch: &[Intersection<D::Node>]| {
                this.track(batch);
                Vec::new()
            }),
        )?);
        Ok(attached)
    }
}
