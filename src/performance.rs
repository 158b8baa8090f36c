use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::{debug, info};
use web_sys::Window;

use crate::dom::EventListener;
use crate::error::Result;

/// Milliseconds from navigation start to the end of the load event, if the
/// browser has finished recording it.
pub fn load_time_ms(navigation_start: f64, load_event_end: f64) -> Option<f64> {
    if navigation_start <= 0.0 || load_event_end < navigation_start {
        return None;
    }
    Some(load_event_end - navigation_start)
}

fn report(window: &Window) {
    let Some(timing) = window.performance().map(|p| p.timing()) else {
        debug!("performance timing unavailable");
        return;
    };
    match load_time_ms(timing.navigation_start(), timing.load_event_end()) {
        Some(ms) => info!("Page load time: {}ms", ms),
        None => debug!("load timing incomplete"),
    }
}

/// The wasm module usually finishes instantiating after `load` has fired.
pub fn load_already_fired(ready_state: &str) -> bool {
    ready_state == "complete"
}

/// Logs the page load time once the window has finished loading.
pub struct LoadMonitor {
    _listener: Option<EventListener>,
    _deferred: Rc<RefCell<Option<Timeout>>>,
}

pub fn monitor(window: &Window) -> Result<LoadMonitor> {
    let deferred: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));

    let ready_state = window.document().map(|d| d.ready_state()).unwrap_or_default();
    if load_already_fired(&ready_state) {
        let loaded = window.clone();
        deferred.replace(Some(Timeout::new(0, move || report(&loaded))));
        return Ok(LoadMonitor {
            _listener: None,
            _deferred: deferred,
        });
    }

    let listener = {
        let deferred = deferred.clone();
        let loaded = window.clone();
        EventListener::new(window, "load", move |_| {
            // loadEventEnd is only set after the load handlers return
            let loaded = loaded.clone();
            deferred.replace(Some(Timeout::new(0, move || report(&loaded))));
        })?
    };
    Ok(LoadMonitor {
        _listener: Some(listener),
        _deferred: deferred,
    })
}
