use std::rc::Rc;

use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{Function, Reflect};
use web_sys::Window;

type Sink = Rc<dyn Fn(&str, &Value)>;

/// Forwards page events to whatever analytics the page was started with.
/// Without a sink, events are only logged.
#[derive(Clone, Default)]
pub struct Tracker {
    sink: Option<Sink>,
}

impl Tracker {
    pub fn noop() -> Self {
        Self::default()
    }

    pub fn with_callback<F>(callback: F) -> Self
    where
        F: Fn(&str, &Value) + 'static,
    {
        Self {
            sink: Some(Rc::new(callback)),
        }
    }

    /// Uses `window.gtag` if the page loaded it before us.
    pub fn from_gtag(window: &Window) -> Self {
        let gtag = Reflect::get(window, &JsValue::from_str("gtag"))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok());
        match gtag {
            Some(gtag) => {
                info!("forwarding analytics events to gtag");
                Self::with_callback(move |name, data| {
                    let payload = match data.serialize(&serde_wasm_bindgen::Serializer::json_compatible()) {
                        Ok(payload) => payload,
                        Err(err) => {
                            warn!("analytics payload for {} not convertible: {}", name, err);
                            return;
                        }
                    };
                    if let Err(err) = gtag.call3(
                        &JsValue::NULL,
                        &JsValue::from_str("event"),
                        &JsValue::from_str(name),
                        &payload,
                    ) {
                        warn!("gtag call failed: {:?}", err);
                    }
                })
            }
            None => Self::noop(),
        }
    }

    pub fn track_event(&self, name: &str, data: &Value) {
        info!("Analytics event: {} {}", name, data);
        if let Some(sink) = &self.sink {
            sink(name, data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn noop_tracker_accepts_events() {
        Tracker::noop().track_event("cta_click", &json!({}));
    }

    #[test]
    fn injected_callback_receives_events() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let tracker = {
            let seen = seen.clone();
            Tracker::with_callback(move |name, data| {
                seen.borrow_mut().push((name.to_string(), data.clone()));
            })
        };
        tracker.track_event("signup", &json!({"plan": "team"}));
        tracker.clone().track_event("scroll_depth", &json!({"percent": 50}));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ("signup".to_string(), json!({"plan": "team"})));
        assert_eq!(seen[1].0, "scroll_depth");
    }
}
