use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use web_sys::{Element, ScrollBehavior, ScrollToOptions, Window};

use crate::dom;
use crate::error::Result;

/// Axis-aligned box in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Rect {
    /// Whether the whole box lies inside a `width` x `height` viewport.
    pub fn fits_within(&self, width: f64, height: f64) -> bool {
        self.top >= 0.0 && self.left >= 0.0 && self.bottom <= height && self.right <= width
    }
}

impl From<web_sys::DomRect> for Rect {
    fn from(rect: web_sys::DomRect) -> Self {
        Self {
            top: rect.top(),
            left: rect.left(),
            bottom: rect.bottom(),
            right: rect.right(),
        }
    }
}

/// Scroll offset that brings `element_top` just below a fixed header of
/// `offset` pixels.
pub fn scroll_offset(element_top: f64, offset: f64) -> f64 {
    element_top - offset
}

pub fn smooth_scroll_to(window: &Window, top: f64) {
    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
}

pub fn scroll_to_element(element: &Element, offset: f64) -> Result<()> {
    let window = dom::window()?;
    smooth_scroll_to(&window, scroll_offset(dom::offset_top(element), offset));
    Ok(())
}

fn viewport_size(window: &Window) -> (f64, f64) {
    let from_window = |v: std::result::Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).filter(|v| *v > 0.0)
    };
    let root = window.document().and_then(|d| d.document_element());
    let width = from_window(window.inner_width())
        .or_else(|| root.as_ref().map(|r| r.client_width() as f64))
        .unwrap_or(0.0);
    let height = from_window(window.inner_height())
        .or_else(|| root.as_ref().map(|r| r.client_height() as f64))
        .unwrap_or(0.0);
    (width, height)
}

pub fn is_in_viewport(element: &Element) -> Result<bool> {
    let window = dom::window()?;
    let (width, height) = viewport_size(&window);
    Ok(Rect::from(element.get_bounding_client_rect()).fits_within(width, height))
}

/// Delays a call until `wait_ms` has passed without another call. Only the
/// most recent argument is delivered.
pub struct Debounce<A: 'static> {
    wait_ms: u32,
    func: Rc<RefCell<dyn FnMut(A)>>,
    pending: RefCell<Option<Timeout>>,
}

impl<A: 'static> Debounce<A> {
    pub fn new<F: FnMut(A) + 'static>(wait_ms: u32, func: F) -> Self {
        Self {
            wait_ms,
            func: Rc::new(RefCell::new(func)),
            pending: RefCell::new(None),
        }
    }

    pub fn call(&self, arg: A) {
        let func = self.func.clone();
        let timeout = Timeout::new(self.wait_ms, move || (&mut *func.borrow_mut())(arg));
        // replacing the handle cancels the previous timer
        self.pending.replace(Some(timeout));
    }
}

/// Runs a call immediately, then drops further calls for `limit_ms`.
pub struct Throttle<A: 'static> {
    limit_ms: u32,
    func: RefCell<Box<dyn FnMut(A)>>,
    blocked: Rc<Cell<bool>>,
    reset: RefCell<Option<Timeout>>,
}

impl<A: 'static> Throttle<A> {
    pub fn new<F: FnMut(A) + 'static>(limit_ms: u32, func: F) -> Self {
        Self {
            limit_ms,
            func: RefCell::new(Box::new(func)),
            blocked: Rc::new(Cell::new(false)),
            reset: RefCell::new(None),
        }
    }

    /// Returns whether the call went through.
    pub fn call(&self, arg: A) -> bool {
        if self.blocked.get() {
            return false;
        }
        (&mut *self.func.borrow_mut())(arg);
        self.blocked.set(true);
        let blocked = self.blocked.clone();
        self.reset
            .replace(Some(Timeout::new(self.limit_ms, move || blocked.set(false))));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(top: f64, left: f64, bottom: f64, right: f64) -> Rect {
        Rect { top, left, bottom, right }
    }

    #[test]
    fn rect_inside_viewport() {
        assert!(rect(0.0, 0.0, 200.0, 300.0).fits_within(300.0, 200.0));
        assert!(rect(10.0, 10.0, 50.0, 50.0).fits_within(1024.0, 768.0));
    }

    #[test]
    fn rect_partially_outside_viewport() {
        assert!(!rect(-1.0, 0.0, 100.0, 100.0).fits_within(1024.0, 768.0));
        assert!(!rect(0.0, -5.0, 100.0, 100.0).fits_within(1024.0, 768.0));
        assert!(!rect(700.0, 0.0, 769.0, 100.0).fits_within(1024.0, 768.0));
        assert!(!rect(0.0, 1000.0, 100.0, 1025.0).fits_within(1024.0, 768.0));
    }

    #[test]
    fn scroll_offset_subtracts_header() {
        assert_eq!(scroll_offset(1200.0, 64.0), 1136.0);
        assert_eq!(scroll_offset(500.0, 0.0), 500.0);
    }
}
