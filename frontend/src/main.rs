use std::cell::RefCell;
use std::rc::Rc;

use log::{error, info};

mod config;
mod debounce;
mod dom;
mod error;
mod interaction;
mod page;
mod timers;
mod controllers {
    pub mod back_to_top;
    pub mod contact;
    pub mod fade_in;
    pub mod nav;
    pub mod scrollspy;
    pub mod sticky;
}
#[cfg(test)]
mod testing;

use config::PageConfig;
use dom::web::{when_ready, WebDom};
use interaction::ConsoleLog;
use page::Page;
use timers::GlooScheduler;

thread_local! {
    // Lives for the whole page session.
    static PAGE: RefCell<Option<Page<WebDom>>> = RefCell::new(None);
}

fn start() {
    let dom = match WebDom::from_window() {
        Ok(dom) => dom,
        Err(e) => {
            error!("Cannot reach the page: {}", e);
            return;
        }
    };
    let config = PageConfig::from_page(&dom);
    match Page::attach(&dom, GlooScheduler, &config, Rc::new(ConsoleLog)) {
        Ok(page) => PAGE.with(|slot| *slot.borrow_mut() = Some(page)),
        Err(e) => error!("Failed to wire page interactions: {}", e),
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting page interactions");
    if let Err(e) = when_ready(start) {
        error!("Cannot wait for the document: {}", e);
    }
}
