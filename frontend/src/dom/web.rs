use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{Array, Function, Reflect};
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, HtmlFormElement,
    HtmlInputElement, HtmlTextAreaElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, KeyboardEvent, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, ScrollToOptions, Window,
};

use super::{Dom, DomEvent, Handler, Intersection, IntersectionHandler, Target};
use crate::config::ObserverOptions;
use crate::error::PageError;

/// The live document of the current window.
#[derive(Clone)]
pub struct WebDom {
    window: Window,
    document: Document,
}

impl WebDom {
    pub fn from_window() -> Result<Self, PageError> {
        let window = web_sys::window().ok_or(PageError::NoWindow)?;
        let document = window.document().ok_or(PageError::NoDocument)?;
        Ok(Self { window, document })
    }

    fn html(node: &Element) -> Option<&HtmlElement> {
        node.dyn_ref::<HtmlElement>()
    }
}

/// Runs `start` once the document structure is parsed.
pub fn when_ready(start: impl FnOnce() + 'static) -> Result<(), PageError> {
    let dom = WebDom::from_window()?;
    if dom.document.ready_state() != "loading" {
        start();
        return Ok(());
    }
    let callback = Closure::once_into_js(start);
    dom.document
        .add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())?;
    Ok(())
}

pub enum Subscription {
    Listener {
        target: EventTarget,
        event: String,
        callback: Closure<dyn FnMut(Event)>,
    },
    Observer {
        observer: IntersectionObserver,
        _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
    },
}

impl Drop for Subscription {
    fn drop(&mut self) {
        match self {
            Subscription::Listener {
                target,
                event,
                callback,
            } => {
                let _ = target
                    .remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
            }
            Subscription::Observer { observer, .. } => observer.disconnect(),
        }
    }
}

impl DomEvent for Event {
    fn prevent_default(&self) {
        Event::prevent_default(self);
    }

    fn key(&self) -> Option<String> {
        self.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key)
    }
}

impl Dom for WebDom {
    type Node = Element;
    type Event = Event;
    type Subscription = Subscription;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(e) => {
                warn!("Bad selector {:?}: {:?}", selector, e);
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Option<Element> {
        scope.query_selector(selector).ok().flatten()
    }

    fn append_html(&self, html: &str) -> Result<(), PageError> {
        let body = self.document.body().ok_or(PageError::NoBody)?;
        body.insert_adjacent_html("beforeend", html)?;
        Ok(())
    }

    fn id(&self, node: &Element) -> String {
        node.id()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        let _ = node.set_attribute(name, value);
    }

    fn remove_attribute(&self, node: &Element, name: &str) {
        let _ = node.remove_attribute(name);
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().remove_1(class);
    }

    fn toggle_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().toggle(class).unwrap_or(false)
    }

    fn style(&self, node: &Element, property: &str) -> String {
        Self::html(node)
            .and_then(|el| el.style().get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) {
        if let Some(el) = Self::html(node) {
            let _ = el.style().set_property(property, value);
        }
    }

    fn set_root_property(&self, property: &str, value: &str) {
        if let Some(root) = self
            .document
            .document_element()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let _ = root.style().set_property(property, value);
        }
    }

    fn text_content(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn value(&self, node: &Element) -> String {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else {
            String::new()
        }
    }

    fn reset_form(&self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }

    fn focus(&self, node: &Element) {
        if let Some(el) = Self::html(node) {
            let _ = el.focus();
        }
    }

    fn scroll_into_view(&self, node: &Element) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        node.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn scroll_to_top(&self) {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn offset_height(&self, node: &Element) -> f64 {
        Self::html(node).map_or(0.0, |el| f64::from(el.offset_height()))
    }

    fn invoke_hook(&self, name: &str) -> bool {
        let Ok(value) = Reflect::get(self.window.as_ref(), &JsValue::from_str(name)) else {
            return false;
        };
        let Ok(hook) = value.dyn_into::<Function>() else {
            return false;
        };
        if let Err(e) = hook.call0(self.window.as_ref()) {
            warn!("{} threw: {:?}", name, e);
        }
        true
    }

    fn listen(
        &self,
        target: Target<'_, Element>,
        event: &str,
        mut handler: Handler<Event>,
    ) -> Result<Subscription, PageError> {
        let target: EventTarget = match target {
            Target::Node(node) => node.clone().into(),
            Target::Window => self.window.clone().into(),
            Target::Document => self.document.clone().into(),
        };
        let callback = Closure::wrap(Box::new(move |e: Event| handler(&e)) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Subscription::Listener {
            target,
            event: event.to_string(),
            callback,
        })
    }

    fn observe(
        &self,
        targets: &[Element],
        options: &ObserverOptions,
        mut handler: IntersectionHandler<Element>,
    ) -> Result<Subscription, PageError> {
        let callback = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
            let batch: Vec<Intersection<Element>> = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|entry| Intersection {
                    target: entry.target(),
                    is_intersecting: entry.is_intersecting(),
                    ratio: entry.intersection_ratio(),
                })
                .collect();
            for done in handler(&batch) {
                observer.unobserve(&done);
            }
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin);
        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        for target in targets {
            observer.observe(target);
        }
        Ok(Subscription::Observer {
            observer,
            _callback: callback,
        })
    }
}
