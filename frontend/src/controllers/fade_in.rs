use std::rc::Rc;

use crate::config::ObserverOptions;
use crate::dom::{Attached, Dom, Intersection};
use crate::error::PageError;
use crate::interaction::{Interaction, InteractionLog};

const VISIBLE_CLASS: &str = "visible";

/// One-shot reveal: a section gets `visible` the first time enough of it is in
/// view, and is never watched again.
pub struct FadeIn<D: Dom> {
    dom: D,
    options: ObserverOptions,
    log: Rc<dyn InteractionLog>,
}

impl<D: Dom> FadeIn<D> {
    pub fn new(dom: &D, options: ObserverOptions, log: Rc<dyn InteractionLog>) -> Rc<Self> {
        Rc::new(Self {
            dom: dom.clone(),
            options,
            log,
        })
    }

    /// Returns the sections revealed by this batch.
    pub fn reveal(&self, batch: &[Intersection<D::Node>]) -> Vec<D::Node> {
        batch
            .iter()
            .filter(|entry| entry.reaches(self.options.threshold))
            .map(|entry| {
                self.dom.add_class(&entry.target, VISIBLE_CLASS);
                self.log
                    .record(&Interaction::SectionVisible(self.dom.id(&entry.target)));
                entry.target.clone()
            })
            .collect()
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
            Box::new(move |batch: &[Intersection<D::Node>]| this.reveal(batch)),
        )?);
        Ok(attached)
    }
}
