//! In-memory stand-ins for the browser: a scriptable page, a manual clock and
//! a recording interaction log.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll, Waker};

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ObserverOptions;
use crate::dom::{Dom, DomEvent, Handler, Intersection, IntersectionHandler, Target};
use crate::error::PageError;
use crate::interaction::{Interaction, InteractionLog};
use crate::timers::Scheduler;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<([a-z0-9]+)([^>]*)>").unwrap());
static ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"([a-z-]+)="([^"]*)""#).unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum Scroll {
    IntoView(NodeId),
    Top,
}

#[derive(Default)]
struct NodeData {
    id: String,
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: HashMap<String, String>,
    text: String,
    value: String,
    height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetKey {
    Node(NodeId),
    Window,
    Document,
}

type SharedHandler = Rc<RefCell<Handler<FakeEvent>>>;
type SharedObserver = Rc<RefCell<IntersectionHandler<NodeId>>>;

struct Listener {
    sub: u64,
    target: TargetKey,
    event: String,
    handler: SharedHandler,
}

struct Observer {
    sub: u64,
    targets: Vec<NodeId>,
    handler: SharedObserver,
}

#[derive(Default)]
struct State {
    nodes: Vec<NodeData>,
    selectors: HashMap<String, Vec<NodeId>>,
    listeners: Vec<Listener>,
    observers: Vec<Observer>,
    next_sub: u64,
    root_properties: HashMap<String, String>,
    scroll_y: f64,
    scrolls: Vec<Scroll>,
    focused: Option<NodeId>,
    appended: Vec<String>,
    hooks: HashMap<String, usize>,
}

impl State {
    fn node(&self, node: &NodeId) -> &NodeData {
        &self.nodes[node.0]
    }

    fn node_mut(&mut self, node: &NodeId) -> &mut NodeData {
        &mut self.nodes[node.0]
    }

    fn insert(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(data);
        NodeId(self.nodes.len() - 1)
    }

    fn subscription(&mut self) -> u64 {
        self.next_sub += 1;
        self.next_sub
    }
}

pub struct FakeEvent {
    key: Option<String>,
    prevented: Cell<bool>,
}

impl FakeEvent {
    fn new(key: Option<&str>) -> Self {
        Self {
            key: key.map(str::to_string),
            prevented: Cell::new(false),
        }
    }
}

impl DomEvent for FakeEvent {
    fn prevent_default(&self) {
        self.prevented.set(true);
    }

    fn key(&self) -> Option<String> {
        self.key.clone()
    }
}

pub struct FakeSubscription {
    sub: u64,
    state: Weak<RefCell<State>>,
}

impl Drop for FakeSubscription {
    fn drop(&mut self) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        // Handlers are dropped after the borrow ends; they may own page handles.
        let removed = {
            let mut state = state.borrow_mut();
            let listeners = std::mem::take(&mut state.listeners);
            let (gone, kept): (Vec<_>, Vec<_>) = listeners.into_iter().partition(|l| l.sub == self.sub);
            state.listeners = kept;
            let observers = std::mem::take(&mut state.observers);
            let (gone_observers, kept): (Vec<_>, Vec<_>) =
                observers.into_iter().partition(|o| o.sub == self.sub);
            state.observers = kept;
            (gone, gone_observers)
        };
        drop(removed);
    }
}

/// A page held entirely in memory.
///
/// Selectors other than `#id` and `.class` only match nodes explicitly
/// registered for that exact selector string, and scoped queries ignore
/// their scope.
#[derive(Clone, Default)]
pub struct MemoryDom {
    state: Rc<RefCell<State>>,
}

impl MemoryDom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, tag: &str, id: &str) -> NodeId {
        self.state.borrow_mut().insert(NodeData {
            id: id.to_string(),
            tag: tag.to_string(),
            ..NodeData::default()
        })
    }

    pub fn register(&self, selector: &str, node: NodeId) {
        self.state
            .borrow_mut()
            .selectors
            .entry(selector.to_string())
            .or_default()
            .push(node);
    }

    pub fn set_height(&self, node: NodeId, height: f64) {
        self.state.borrow_mut().node_mut(&node).height = height;
    }

    pub fn type_into(&self, node: NodeId, value: &str) {
        self.state.borrow_mut().node_mut(&node).value = value.to_string();
    }

    pub fn define_hook(&self, name: &str) {
        self.state.borrow_mut().hooks.insert(name.to_string(), 0);
    }

    pub fn hook_calls(&self, name: &str) -> usize {
        self.state.borrow().hooks.get(name).copied().unwrap_or(0)
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.state.borrow().focused
    }

    pub fn scrolls(&self) -> Vec<Scroll> {
        self.state.borrow().scrolls.clone()
    }

    pub fn root_property(&self, property: &str) -> Option<String> {
        self.state.borrow().root_properties.get(property).cloned()
    }

    pub fn appended(&self) -> usize {
        self.state.borrow().appended.len()
    }

    pub fn count_id(&self, id: &str) -> usize {
        self.state.borrow().nodes.iter().filter(|n| n.id == id).count()
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    pub fn is_observed(&self, node: NodeId) -> bool {
        self.state
            .borrow()
            .observers
            .iter()
            .any(|o| o.targets.contains(&node))
    }

    fn dispatch(&self, target: TargetKey, event: &str, payload: &FakeEvent) {
        let handlers: Vec<SharedHandler> = self
            .state
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.target == target && l.event == event)
            .map(|l| Rc::clone(&l.handler))
            .collect();
        for shared in handlers {
            let mut handler = shared.borrow_mut();
            (*handler)(payload);
        }
    }

    /// Returns whether a handler prevented the default action.
    pub fn click(&self, node: NodeId) -> bool {
        let event = FakeEvent::new(None);
        self.dispatch(TargetKey::Node(node), "click", &event);
        event.prevented.get()
    }

    pub fn submit(&self, form: NodeId) -> bool {
        let event = FakeEvent::new(None);
        self.dispatch(TargetKey::Node(form), "submit", &event);
        event.prevented.get()
    }

    pub fn key_down(&self, key: &str) {
        let event = FakeEvent::new(Some(key));
        self.dispatch(TargetKey::Document, "keydown", &event);
    }

    pub fn scroll_window(&self, y: f64) {
        self.state.borrow_mut().scroll_y = y;
        self.dispatch(TargetKey::Window, "scroll", &FakeEvent::new(None));
    }

    pub fn resize(&self) {
        self.dispatch(TargetKey::Window, "resize", &FakeEvent::new(None));
    }

    /// Delivers one batch of `(target, visible ratio)` to every observer
    /// watching any of the targets.
    pub fn intersect(&self, entries: &[(NodeId, f64)]) {
        let observers: Vec<(u64, Vec<NodeId>, SharedObserver)> = self
            .state
            .borrow()
            .observers
            .iter()
            .map(|o| (o.sub, o.targets.clone(), Rc::clone(&o.handler)))
            .collect();
        for (sub, targets, shared) in observers {
            let batch: Vec<Intersection<NodeId>> = entries
                .iter()
                .filter(|(node, _)| targets.contains(node))
                .map(|&(target, ratio)| Intersection {
                    target,
                    is_intersecting: ratio > 0.0,
                    ratio,
                })
                .collect();
            if batch.is_empty() {
                continue;
            }
            let done = {
                let mut handler = shared.borrow_mut();
                (*handler)(&batch)
            };
            let mut state = self.state.borrow_mut();
            if let Some(observer) = state.observers.iter_mut().find(|o| o.sub == sub) {
                observer.targets.retain(|t| !done.contains(t));
            }
        }
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;
    type Event = FakeEvent;
    type Subscription = FakeSubscription;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.state
            .borrow()
            .nodes
            .iter()
            .position(|n| n.id == id)
            .map(NodeId)
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        if let Some(id) = selector.strip_prefix('#') {
            return self.element_by_id(id).into_iter().collect();
        }
        let state = self.state.borrow();
        if let Some(class) = selector.strip_prefix('.') {
            return state
                .nodes
                .iter()
                .enumerate()
                .filter(|(_, n)| n.classes.iter().any(|c| c == class))
                .map(|(i, _)| NodeId(i))
                .collect();
        }
        state.selectors.get(selector).cloned().unwrap_or_default()
    }

    fn query_within(&self, _scope: &NodeId, selector: &str) -> Option<NodeId> {
        self.query_first(selector)
    }

    fn append_html(&self, html: &str) -> Result<(), PageError> {
        let mut state = self.state.borrow_mut();
        state.appended.push(html.to_string());
        for tag in TAG.captures_iter(html) {
            let mut data = NodeData {
                tag: tag[1].to_string(),
                ..NodeData::default()
            };
            for attr in ATTR.captures_iter(&tag[2]) {
                let value = attr[2].to_string();
                match &attr[1] {
                    "id" => data.id = value,
                    "class" => data.classes = value.split_whitespace().map(str::to_string).collect(),
                    "style" => {
                        for rule in value.split(';') {
                            if let Some((property, v)) = rule.split_once(':') {
                                data.styles.insert(property.trim().to_string(), v.trim().to_string());
                            }
                        }
                    }
                    name => {
                        data.attributes.insert(name.to_string(), value);
                    }
                }
            }
            if !data.id.is_empty() || !data.classes.is_empty() {
                state.insert(data);
            }
        }
        Ok(())
    }

    fn id(&self, node: &NodeId) -> String {
        self.state.borrow().node(node).id.clone()
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.state.borrow().node(node).attributes.get(name).cloned()
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        self.state
            .borrow_mut()
            .node_mut(node)
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn remove_attribute(&self, node: &NodeId, name: &str) {
        self.state.borrow_mut().node_mut(node).attributes.remove(name);
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.state.borrow().node(node).classes.iter().any(|c| c == class)
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        if !self.has_class(node, class) {
            self.state.borrow_mut().node_mut(node).classes.push(class.to_string());
        }
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.state.borrow_mut().node_mut(node).classes.retain(|c| c != class);
    }

    fn toggle_class(&self, node: &NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            true
        }
    }

    fn style(&self, node: &NodeId, property: &str) -> String {
        self.state
            .borrow()
            .node(node)
            .styles
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) {
        self.state
            .borrow_mut()
            .node_mut(node)
            .styles
            .insert(property.to_string(), value.to_string());
    }

    fn set_root_property(&self, property: &str, value: &str) {
        self.state
            .borrow_mut()
            .root_properties
            .insert(property.to_string(), value.to_string());
    }

    fn text_content(&self, node: &NodeId) -> String {
        self.state.borrow().node(node).text.clone()
    }

    fn set_text(&self, node: &NodeId, text: &str) {
        self.state.borrow_mut().node_mut(node).text = text.to_string();
    }

    fn value(&self, node: &NodeId) -> String {
        self.state.borrow().node(node).value.clone()
    }

    fn reset_form(&self, _form: &NodeId) {
        for node in self.state.borrow_mut().nodes.iter_mut() {
            if node.tag == "input" || node.tag == "textarea" {
                node.value.clear();
            }
        }
    }

    fn focus(&self, node: &NodeId) {
        self.state.borrow_mut().focused = Some(*node);
    }

    fn scroll_into_view(&self, node: &NodeId) {
        self.state.borrow_mut().scrolls.push(Scroll::IntoView(*node));
    }

    fn scroll_to_top(&self) {
        let mut state = self.state.borrow_mut();
        state.scrolls.push(Scroll::Top);
        state.scroll_y = 0.0;
    }

    fn scroll_y(&self) -> f64 {
        self.state.borrow().scroll_y
    }

    fn offset_height(&self, node: &NodeId) -> f64 {
        self.state.borrow().node(node).height
    }

    fn invoke_hook(&self, name: &str) -> bool {
        match self.state.borrow_mut().hooks.get_mut(name) {
            Some(calls) => {
                *calls += 1;
                true
            }
            None => false,
        }
    }

    fn listen(
        &self,
        target: Target<'_, NodeId>,
        event: &str,
        handler: Handler<FakeEvent>,
    ) -> Result<FakeSubscription, PageError> {
        let target = match target {
            Target::Node(node) => TargetKey::Node(*node),
            Target::Window => TargetKey::Window,
            Target::Document => TargetKey::Document,
        };
        let mut state = self.state.borrow_mut();
        let sub = state.subscription();
        state.listeners.push(Listener {
            sub,
            target,
            event: event.to_string(),
            handler: Rc::new(RefCell::new(handler)),
        });
        Ok(FakeSubscription {
            sub,
            state: Rc::downgrade(&self.state),
        })
    }

    fn observe(
        &self,
        targets: &[NodeId],
        _options: &ObserverOptions,
        handler: IntersectionHandler<NodeId>,
    ) -> Result<FakeSubscription, PageError> {
        let mut state = self.state.borrow_mut();
        let sub = state.subscription();
        state.observers.push(Observer {
            sub,
            targets: targets.to_vec(),
            handler: Rc::new(RefCell::new(handler)),
        });
        Ok(FakeSubscription {
            sub,
            state: Rc::downgrade(&self.state),
        })
    }
}

/// Ids of the sections on [`landing_page`], in document order.
pub const SECTIONS: [&str; 4] = ["home", "features", "pricing", "contact"];

pub struct Fixture {
    pub nav: NodeId,
    pub toggle: NodeId,
    pub header: NodeId,
    pub contact_button: NodeId,
    pub links: Vec<NodeId>,
    pub sections: Vec<NodeId>,
}

/// A header with a 64px tall nav, one link per section, the sections inside
/// `<main>` and a contact button.
pub fn landing_page() -> (MemoryDom, Fixture) {
    let dom = MemoryDom::new();
    let header = dom.add("header", "");
    dom.set_height(header, 64.0);
    dom.register("header", header);

    let nav = dom.add("nav", "primaryNav");
    let toggle = dom.add("button", "navToggle");
    dom.set_attribute(&toggle, "aria-expanded", "false");

    let links = SECTIONS
        .iter()
        .map(|section| {
            let link = dom.add("a", "");
            dom.set_attribute(&link, "href", &format!("#{}", section));
            dom.register(r##"nav a[href^="#"]"##, link);
            link
        })
        .collect();

    let sections = SECTIONS
        .iter()
        .map(|section| {
            let node = dom.add("section", section);
            dom.register("section", node);
            dom.register("main section[id]", node);
            node
        })
        .collect();

    let contact_button = dom.add("button", "contactBtn");

    let fixture = Fixture {
        nav,
        toggle,
        header,
        contact_button,
        links,
        sections,
    };
    (dom, fixture)
}

#[derive(Default)]
struct Clock {
    now: u64,
    next_id: u64,
    timers: Vec<Timer>,
    sleepers: Vec<(u64, Waker)>,
}

struct Timer {
    id: u64,
    due: u64,
    task: Box<dyn FnOnce()>,
}

pub struct ManualTimeout {
    id: u64,
    clock: Weak<RefCell<Clock>>,
}

impl Drop for ManualTimeout {
    fn drop(&mut self) {
        let Some(clock) = self.clock.upgrade() else {
            return;
        };
        let removed: Vec<Timer> = {
            let mut clock = clock.borrow_mut();
            let timers = std::mem::take(&mut clock.timers);
            let (gone, kept): (Vec<Timer>, Vec<Timer>) = timers.into_iter().partition(|t| t.id == self.id);
            clock.timers = kept;
            gone
        };
        drop(removed);
    }
}

struct ManualSleep {
    deadline: u64,
    clock: Rc<RefCell<Clock>>,
}

impl Future for ManualSleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut clock = self.clock.borrow_mut();
        if clock.now >= self.deadline {
            Poll::Ready(())
        } else {
            clock.sleepers.push((self.deadline, cx.waker().clone()));
            Poll::Pending
        }
    }
}

/// Virtual time: nothing happens until [`ManualScheduler::advance`].
#[derive(Clone)]
pub struct ManualScheduler {
    clock: Rc<RefCell<Clock>>,
    pool: Rc<RefCell<LocalPool>>,
    spawner: LocalSpawner,
}

impl ManualScheduler {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            clock: Rc::new(RefCell::new(Clock::default())),
            pool: Rc::new(RefCell::new(pool)),
            spawner,
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.borrow().now
    }

    pub fn pending_timers(&self) -> usize {
        self.clock.borrow().timers.len()
    }

    /// Moves time forward, firing timers and waking sleeps in deadline order.
    pub fn advance(&self, millis: u64) {
        let target = self.now() + millis;
        self.run_ready();
        loop {
            let next = {
                let clock = self.clock.borrow();
                clock
                    .timers
                    .iter()
                    .map(|t| t.due)
                    .chain(clock.sleepers.iter().map(|(due, _)| *due))
                    .filter(|due| *due <= target)
                    .min()
            };
            let Some(next) = next else {
                break;
            };
            let (mut due, wake) = {
                let mut clock = self.clock.borrow_mut();
                clock.now = clock.now.max(next);
                let now = clock.now;
                let timers = std::mem::take(&mut clock.timers);
                let (due, kept): (Vec<Timer>, Vec<Timer>) = timers.into_iter().partition(|t| t.due <= now);
                clock.timers = kept;
                let sleepers = std::mem::take(&mut clock.sleepers);
                let (wake, kept): (Vec<_>, Vec<_>) = sleepers.into_iter().partition(|(d, _)| *d <= now);
                clock.sleepers = kept;
                (due, wake)
            };
            due.sort_by_key(|t| t.id);
            for timer in due {
                (timer.task)();
            }
            for (_, waker) in wake {
                waker.wake();
            }
            self.run_ready();
        }
        self.clock.borrow_mut().now = target;
    }

    fn run_ready(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }
}

impl Scheduler for ManualScheduler {
    type Pending = ManualTimeout;

    fn after(&self, millis: u32, task: Box<dyn FnOnce()>) -> ManualTimeout {
        let mut clock = self.clock.borrow_mut();
        clock.next_id += 1;
        let id = clock.next_id;
        let due = clock.now + u64::from(millis);
        clock.timers.push(Timer { id, due, task });
        ManualTimeout {
            id,
            clock: Rc::downgrade(&self.clock),
        }
    }

    fn sleep(&self, millis: u32) -> LocalBoxFuture<'static, ()> {
        Box::pin(ManualSleep {
            deadline: self.now() + u64::from(millis),
            clock: Rc::clone(&self.clock),
        })
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.spawner
            .spawn_local(task)
            .expect("local pool accepts tasks");
    }
}

#[derive(Default)]
pub struct RecordingLog {
    entries: RefCell<Vec<String>>,
}

impl RecordingLog {
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    pub fn count(&self, message: &str) -> usize {
        self.entries.borrow().iter().filter(|e| *e == message).count()
    }
}

impl InteractionLog for RecordingLog {
    fn record(&self, interaction: &Interaction) {
        self.entries.borrow_mut().push(interaction.to_string());
    }
}
