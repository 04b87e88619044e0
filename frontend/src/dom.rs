//! The slice of the browser page the controllers work against.
//!
//! Controllers are generic over [`Dom`] so the same wiring runs on the real
//! document ([`web::WebDom`]) and on the in-memory page used by tests.

pub mod web;

use crate::config::ObserverOptions;
use crate::error::PageError;

// Browsers may report a ratio a hair under the threshold that was crossed.
const RATIO_SLACK: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a, N> {
    Node(&'a N),
    Window,
    Document,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Intersection<N> {
    pub target: N,
    pub is_intersecting: bool,
    pub ratio: f64,
}

impl<N> Intersection<N> {
    pub fn reaches(&self, threshold: f64) -> bool {
        self.is_intersecting && self.ratio + RATIO_SLACK >= threshold
    }
}

pub trait DomEvent {
    fn prevent_default(&self);
    /// `KeyboardEvent.key`, when this is a keyboard event.
    fn key(&self) -> Option<String>;
}

pub type Handler<E> = Box<dyn FnMut(&E)>;

/// Receives one batch of observations and returns the targets to stop observing.
pub type IntersectionHandler<N> = Box<dyn FnMut(&[Intersection<N>]) -> Vec<N>>;

pub trait Dom: Clone + 'static {
    type Node: Clone + PartialEq + 'static;
    type Event: DomEvent + 'static;
    /// Removes the listener or disconnects the observer when dropped.
    type Subscription: 'static;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;
    fn query_all(&self, selector: &str) -> Vec<Self::Node>;
    fn query_within(&self, scope: &Self::Node, selector: &str) -> Option<Self::Node>;

    fn query_first(&self, selector: &str) -> Option<Self::Node> {
        self.query_all(selector).into_iter().next()
    }

    /// Parses `html` and appends it to the end of `<body>`.
    fn append_html(&self, html: &str) -> Result<(), PageError>;

    fn id(&self, node: &Self::Node) -> String;
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    fn remove_attribute(&self, node: &Self::Node, name: &str);

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);
    /// Flips `class` and returns whether it is now present.
    fn toggle_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Inline style property, empty when unset.
    fn style(&self, node: &Self::Node, property: &str) -> String;
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);
    fn set_root_property(&self, property: &str, value: &str);

    fn text_content(&self, node: &Self::Node) -> String;
    fn set_text(&self, node: &Self::Node, text: &str);
    /// Current value of an `<input>` or `<textarea>`.
    fn value(&self, node: &Self::Node) -> String;
    fn reset_form(&self, form: &Self::Node);

    fn focus(&self, node: &Self::Node);
    /// Smoothly scrolls so the top of `node` meets the top of the viewport.
    fn scroll_into_view(&self, node: &Self::Node);
    fn scroll_to_top(&self);
    fn scroll_y(&self) -> f64;
    fn offset_height(&self, node: &Self::Node) -> f64;

    /// Calls the global function `name` if the page defines one.
    fn invoke_hook(&self, name: &str) -> bool;

    fn listen(
        &self,
        target: Target<'_, Self::Node>,
        event: &str,
        handler: Handler<Self::Event>,
    ) -> Result<Self::Subscription, PageError>;

    fn observe(
        &self,
        targets: &[Self::Node],
        options: &ObserverOptions,
        handler: IntersectionHandler<Self::Node>,
    ) -> Result<Self::Subscription, PageError>;
}

/// Everything one controller hooked into the page.
pub struct Attached<D: Dom> {
    subscriptions: Vec<D::Subscription>,
}

impl<D: Dom> Attached<D> {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    pub fn push(&mut self, subscription: D::Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn extend(&mut self, other: Attached<D>) {
        self.subscriptions.extend(other.subscriptions);
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn dispose(self) {
        drop(self.subscriptions);
    }
}

impl<D: Dom> Default for Attached<D> {
    fn default() -> Self {
        Self::new()
    }
}
