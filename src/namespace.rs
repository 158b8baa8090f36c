//! The `window.SyncronyApp` object other scripts on the page can call into.

use log::{debug, warn};
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{Function, Object, Reflect};
use web_sys::{Element, Window};

use crate::analytics::Tracker;
use crate::error::Result;
use crate::utils::{self, Debounce, Throttle};

fn set(target: &Object, key: &str, value: &JsValue) -> Result<()> {
    Reflect::set(target, &JsValue::from_str(key), value)?;
    Ok(())
}

/// `debounce(fn, waitMs)` / `throttle(fn, limitMs)` wrap a JS function. The
/// wrapper forwards its first argument.
fn wrap_function<W>(make: W) -> JsValue
where
    W: Fn(Function, u32) -> Box<dyn FnMut(JsValue)> + 'static,
{
    Closure::wrap(Box::new(move |func: JsValue, wait: JsValue| -> JsValue {
        let Ok(func) = func.dyn_into::<Function>() else {
            warn!("expected a function");
            return JsValue::UNDEFINED;
        };
        let wait = wait.as_f64().unwrap_or(0.0).max(0.0) as u32;
        Closure::wrap(make(func, wait)).into_js_value()
    }) as Box<dyn FnMut(JsValue, JsValue) -> JsValue>)
    .into_js_value()
}

fn invoke(func: &Function, arg: &JsValue) {
    if let Err(err) = func.call1(&JsValue::NULL, arg) {
        warn!("wrapped callback threw: {:?}", err);
    }
}

fn debounce_js() -> JsValue {
    wrap_function(|func, wait| {
        let debounced = Debounce::new(wait, move |arg: JsValue| invoke(&func, &arg));
        Box::new(move |arg| debounced.call(arg)) as Box<dyn FnMut(JsValue)>
    })
}

fn throttle_js() -> JsValue {
    wrap_function(|func, limit| {
        let throttled = Throttle::new(limit, move |arg: JsValue| invoke(&func, &arg));
        Box::new(move |arg| {
            throttled.call(arg);
        }) as Box<dyn FnMut(JsValue)>
    })
}

fn is_in_viewport_js() -> JsValue {
    Closure::wrap(Box::new(|element: JsValue| -> bool {
        let Ok(element) = element.dyn_into::<Element>() else {
            return false;
        };
        utils::is_in_viewport(&element).unwrap_or(false)
    }) as Box<dyn FnMut(JsValue) -> bool>)
    .into_js_value()
}

fn scroll_to_element_js() -> JsValue {
    Closure::wrap(Box::new(|element: JsValue, offset: JsValue| {
        let Ok(element) = element.dyn_into::<Element>() else {
            warn!("scrollToElement needs an element");
            return;
        };
        let offset = offset.as_f64().unwrap_or(0.0);
        if let Err(err) = utils::scroll_to_element(&element, offset) {
            warn!("scrollToElement failed: {}", err);
        }
    }) as Box<dyn FnMut(JsValue, JsValue)>)
    .into_js_value()
}

fn track_event_js(tracker: Tracker) -> JsValue {
    Closure::wrap(Box::new(move |name: JsValue, data: JsValue| {
        let Some(name) = name.as_string() else {
            warn!("trackEvent needs an event name");
            return;
        };
        let data = if data.is_undefined() || data.is_null() {
            Value::Object(Default::default())
        } else {
            match serde_wasm_bindgen::from_value::<Value>(data) {
                Ok(data) => data,
                Err(err) => {
                    warn!("trackEvent data for {} is not plain data: {}", name, err);
                    return;
                }
            }
        };
        tracker.track_event(&name, &data);
    }) as Box<dyn FnMut(JsValue, JsValue)>)
    .into_js_value()
}

/// Installs `window[name]` with `utils`, `trackEvent` and `scrollToElement`.
pub fn install(window: &Window, name: &str, tracker: Tracker) -> Result<()> {
    let utils = Object::new();
    let scroll_to_element = scroll_to_element_js();
    set(&utils, "debounce", &debounce_js())?;
    set(&utils, "throttle", &throttle_js())?;
    set(&utils, "isInViewport", &is_in_viewport_js())?;
    set(&utils, "scrollToElement", &scroll_to_element)?;

    let app = Object::new();
    set(&app, "utils", &utils)?;
    set(&app, "trackEvent", &track_event_js(tracker))?;
    set(&app, "scrollToElement", &scroll_to_element)?;

    Reflect::set(window, &JsValue::from_str(name), &app)?;
    debug!("installed window.{}", name);
    Ok(())
}
