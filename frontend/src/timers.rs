use futures::future::LocalBoxFuture;
use gloo_timers::callback::Timeout;
use gloo_timers::future::TimeoutFuture;

/// Deferred work on the UI thread.
pub trait Scheduler: Clone + 'static {
    /// Handle to a scheduled task; dropping it cancels the task.
    type Pending: 'static;

    fn after(&self, millis: u32, task: Box<dyn FnOnce()>) -> Self::Pending;
    fn sleep(&self, millis: u32) -> LocalBoxFuture<'static, ()>;
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// Browser timers via `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooScheduler;

impl Scheduler for GlooScheduler {
    type Pending = Timeout;

    fn after(&self, millis: u32, task: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(millis, task)
    }

    fn sleep(&self, millis: u32) -> LocalBoxFuture<'static, ()> {
        Box::pin(TimeoutFuture::new(millis))
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
