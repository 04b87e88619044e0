use std::rc::Rc;

use log::{debug, info};

use crate::config::PageConfig;
use crate::controllers::back_to_top::BackToTop;
use crate::controllers::contact::ContactModal;
use crate::controllers::fade_in::FadeIn;
use crate::controllers::nav::{nav_links, MobileNav, Navigation};
use crate::controllers::scrollspy::Scrollspy;
use crate::controllers::sticky::StickyOffset;
use crate::dom::{Attached, Dom};
use crate::error::PageError;
use crate::interaction::{Interaction, InteractionLog};
use crate::timers::Scheduler;

/// Every controller wired to one document. Dropping it (or calling
/// [`Page::dispose`]) detaches them all.
pub struct Page<D: Dom> {
    attached: Attached<D>,
}

impl<D: Dom> Page<D> {
    pub fn attach<S: Scheduler>(
        dom: &D,
        scheduler: S,
        config: &PageConfig,
        log: Rc<dyn InteractionLog>,
    ) -> Result<Self, PageError> {
        let mut attached = Attached::new();

        let mobile = MobileNav::locate(dom, config, Rc::clone(&log));
        let links = nav_links(dom, &config.nav_link_selector);
        attached.extend(Navigation::new(dom, links.clone(), mobile.clone(), Rc::clone(&log)).attach()?);
        match &mobile {
            Some(mobile) => attached.extend(mobile.attach()?),
            None => debug!("No mobile nav toggle"),
        }

        let sections = dom.query_all(&config.section_selector);
        attached.extend(FadeIn::new(dom, config.fade_in.clone(), Rc::clone(&log)).attach(&sections)?);

        let spied = dom.query_all(&config.scrollspy_section_selector);
        attached.extend(Scrollspy::new(dom, links, config.scrollspy.clone()).attach(&spied)?);

        if let Some(modal) = ContactModal::install(dom, scheduler.clone(), &config.contact, Rc::clone(&log))? {
            attached.extend(modal.attach()?);
        }

        if dom.invoke_hook(&config.dark_mode_hook) {
            debug!("Ran {}", config.dark_mode_hook);
        }

        if let Some(button) = BackToTop::install(dom, &config.back_to_top, Rc::clone(&log))? {
            attached.extend(button.attach()?);
        }

        let sticky = StickyOffset::new(dom, &config.sticky);
        sticky.recompute();
        attached.extend(sticky.attach(scheduler)?);

        info!("Wired {} page listeners", attached.len());
        log.record(&Interaction::PageLoaded);
        Ok(Self { attached })
    }

    pub fn dispose(self) {
        self.attached.dispose();
    }
}
