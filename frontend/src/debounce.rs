use std::cell::RefCell;
use std::rc::Rc;

use crate::timers::Scheduler;

/// Collapses a burst of calls into one run of `action`, `wait` ms after the
/// last call.
pub struct Debounced<S: Scheduler> {
    scheduler: S,
    wait: u32,
    action: Rc<dyn Fn()>,
    pending: RefCell<Option<S::Pending>>,
}

impl<S: Scheduler> Debounced<S> {
    pub fn new(scheduler: S, wait: u32, action: impl Fn() + 'static) -> Self {
        Self {
            scheduler,
            wait,
            action: Rc::new(action),
            pending: RefCell::new(None),
        }
    }

    pub fn call(&self) {
        let action = Rc::clone(&self.action);
        let next = self.scheduler.after(self.wait, Box::new(move || action()));
        // Dropping the previous handle cancels it.
        let previous = self.pending.replace(Some(next));
        drop(previous);
    }
}
