//! Contact dialog: injection, open/close, validation and the simulated send.
//!
//! Nothing leaves the browser. A valid submission shows "Sending...", waits
//! `send_delay_ms`, shows the success message, then closes itself after
//! `close_delay_ms`. Closing the dialog by hand while that is in flight
//! abandons it: no success message, no "submitted" entry, no auto-close.

pub mod form;
pub mod markup;

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, warn};

use crate::config::ContactConfig;
use crate::dom::{Attached, Dom, DomEvent, Target};
use crate::error::PageError;
use crate::interaction::{Interaction, InteractionLog};
use crate::timers::Scheduler;
use form::ContactForm;
use markup::{
    BACKDROP_ID, CLOSE_SELECTOR, EMAIL_ID, FORM_ID, MESSAGE_ID, MODAL_ID, MODAL_MARKUP, NAME_ID,
    STATUS_ID,
};

pub const INVALID_STATUS: &str = "Please fill out all fields correctly.";
pub const SENDING_STATUS: &str = "Sending...";
pub const SENT_STATUS: &str = "Message sent successfully! Thank you.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Open,
    Sending,
    Sent,
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Error,
    Pending,
    Success,
}

impl Tone {
    fn color(self) -> &'static str {
        match self {
            Tone::Error => "red",
            Tone::Pending => "black",
            Tone::Success => "green",
        }
    }
}

struct Elements<N> {
    modal: N,
    backdrop: N,
    open_button: N,
    close_button: N,
    form: N,
    status: N,
    name: N,
    email: N,
    message: N,
}

pub struct ContactModal<D: Dom, S: Scheduler> {
    dom: D,
    scheduler: S,
    el: Elements<D::Node>,
    send_delay_ms: u32,
    close_delay_ms: u32,
    phase: Cell<Phase>,
    // Bumped on every close so an in-flight send can tell it was abandoned.
    session: Cell<u64>,
    log: Rc<dyn InteractionLog>,
}

impl<D: Dom, S: Scheduler> ContactModal<D, S> {
    /// Injects the dialog and binds to it. Returns `None` when there is no
    /// button to open it with, or when the page already carries its own
    /// modal or backdrop, which is left alone.
    pub fn install(
        dom: &D,
        scheduler: S,
        config: &ContactConfig,
        log: Rc<dyn InteractionLog>,
    ) -> Result<Option<Rc<Self>>, PageError> {
        let Some(open_button) = dom.element_by_id(&config.open_button_id) else {
            debug!("No #{} on this page, skipping contact form", config.open_button_id);
            return Ok(None);
        };

        if dom.element_by_id(MODAL_ID).is_some() || dom.element_by_id(BACKDROP_ID).is_some() {
            debug!("Contact modal already on the page, skipping contact form");
            return Ok(None);
        }
        dom.append_html(MODAL_MARKUP)?;

        let Some(el) = Self::bind(dom, open_button) else {
            warn!("Injected contact modal is incomplete, skipping contact form");
            return Ok(None);
        };

        Ok(Some(Rc::new(Self {
            dom: dom.clone(),
            scheduler,
            el,
            send_delay_ms: config.send_delay_ms,
            close_delay_ms: config.close_delay_ms,
            phase: Cell::new(Phase::Closed),
            session: Cell::new(0),
            log,
        })))
    }

    fn bind(dom: &D, open_button: D::Node) -> Option<Elements<D::Node>> {
        let modal = dom.element_by_id(MODAL_ID)?;
        Some(Elements {
            close_button: dom.query_within(&modal, CLOSE_SELECTOR)?,
            backdrop: dom.element_by_id(BACKDROP_ID)?,
            form: dom.element_by_id(FORM_ID)?,
            status: dom.element_by_id(STATUS_ID)?,
            name: dom.element_by_id(NAME_ID)?,
            email: dom.element_by_id(EMAIL_ID)?,
            message: dom.element_by_id(MESSAGE_ID)?,
            open_button,
            modal,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn is_open(&self) -> bool {
        self.phase.get() != Phase::Closed
    }

    pub fn open(&self) {
        self.dom.set_style(&self.el.modal, "display", "block");
        self.dom.set_style(&self.el.backdrop, "display", "block");
        self.dom.set_attribute(&self.el.modal, "aria-hidden", "false");
        self.dom.focus(&self.el.name);
        if self.phase.get() == Phase::Closed {
            self.phase.set(Phase::Open);
        }
        self.log.record(&Interaction::ContactOpened);
    }

    pub fn close(&self) {
        self.dom.set_style(&self.el.modal, "display", "none");
        self.dom.set_style(&self.el.backdrop, "display", "none");
        self.dom.set_attribute(&self.el.modal, "aria-hidden", "true");
        self.dom.focus(&self.el.open_button);
        self.dom.set_text(&self.el.status, "");
        self.dom.reset_form(&self.el.form);
        self.phase.set(Phase::Closed);
        self.session.set(self.session.get() + 1);
        self.log.record(&Interaction::ContactClosed);
    }

    pub fn on_key(&self, key: &str) {
        if key == "Escape" && self.is_open() {
            self.close();
        }
    }

    fn show_status(&self, text: &str, tone: Tone) {
        self.dom.set_text(&self.el.status, text);
        self.dom.set_style(&self.el.status, "color", tone.color());
    }

    fn read_form(&self) -> ContactForm {
        ContactForm {
            name: self.dom.value(&self.el.name),
            email: self.dom.value(&self.el.email),
            message: self.dom.value(&self.el.message),
        }
    }

    pub fn submit(self: &Rc<Self>, event: &D::Event) {
        event.prevent_default();
        if matches!(self.phase.get(), Phase::Sending | Phase::Sent) {
            debug!("Contact form already submitted, ignoring");
            return;
        }
        self.dom.set_text(&self.el.status, "");

        if let Err(e) = self.read_form().validate() {
            debug!("Contact form rejected: {}", e);
            self.show_status(INVALID_STATUS, Tone::Error);
            return;
        }

        self.show_status(SENDING_STATUS, Tone::Pending);
        self.phase.set(Phase::Sending);
        let this = Rc::clone(self);
        let session = self.session.get();
        self.scheduler.spawn(Box::pin(this.deliver(session)));
    }

    async fn deliver(self: Rc<Self>, session: u64) {
        self.scheduler.sleep(self.send_delay_ms).await;
        if self.session.get() != session {
            debug!("Contact modal closed while sending, dropping the result");
            return;
        }
        self.show_status(SENT_STATUS, Tone::Success);
        self.phase.set(Phase::Sent);
        self.log.record(&Interaction::ContactSubmitted);

        self.scheduler.sleep(self.close_delay_ms).await;
        if self.session.get() == session {
            self.close();
        }
    }

    pub fn attach(self: &Rc<Self>) -> Result<Attached<D>, PageError> {
        let mut attached = Attached::new();

        let this = Rc::clone(self);
        attached.push(self.dom.listen(
            Target::Node(&self.el.open_button),
            "click",
            Box::new(move |_: &D::Event| this.open()),
        )?);

        for closer in [&self.el.close_button, &self.el.backdrop] {
            let this = Rc::clone(self);
            attached.push(self.dom.listen(
                Target::Node(closer),
                "click",
                Box::new(move |_: &D::Event| this.close()),
            )?);
        }

        let this = Rc::clone(self);
        attached.push(self.dom.listen(
            Target::Document,
            "keydown",
            Box::new(move |event: &D::Event| {
                if let Some(key) = event.key() {
                    this.on_key(&key);
                }
            }),
        )?);

        let this = Rc::clone(self);
        attached.push(self.dom.listen(
            Target::Node(&self.el.form),
            "submit",
            Box::new(move |event: &D::Event| this.submit(event)),
        )?);

        Ok(attached)
    }
}
