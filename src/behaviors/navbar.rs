use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Window};

use crate::config::SiteConfig;
use crate::dom::{self, EventListener};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavbarStyle {
    Top,
    Scrolled,
}

impl NavbarStyle {
    pub fn for_offset(scroll_y: f64, threshold: f64) -> Self {
        if scroll_y > threshold {
            NavbarStyle::Scrolled
        } else {
            NavbarStyle::Top
        }
    }
}

/// Remembers the last applied style so the class list is only touched when
/// the threshold is actually crossed.
#[derive(Debug, Clone)]
pub struct ScrollStyleTracker {
    threshold: f64,
    applied: Option<NavbarStyle>,
}

impl ScrollStyleTracker {
    pub fn new(threshold: f64) -> Self {
        Self { threshold, applied: None }
    }

    /// Returns the style to apply, or `None` if nothing changed.
    pub fn observe(&mut self, scroll_y: f64) -> Option<NavbarStyle> {
        let style = NavbarStyle::for_offset(scroll_y, self.threshold);
        if self.applied == Some(style) {
            return None;
        }
        self.applied = Some(style);
        Some(style)
    }

    pub fn applied(&self) -> Option<NavbarStyle> {
        self.applied
    }
}

/// At most one frame callback in flight.
#[derive(Debug, Default)]
pub struct FrameGate {
    pending: Cell<bool>,
}

impl FrameGate {
    /// `true` if the caller should schedule a frame.
    pub fn try_schedule(&self) -> bool {
        !self.pending.replace(true)
    }

    pub fn release(&self) {
        self.pending.set(false);
    }
}

struct Navbar {
    element: Element,
    scrolled_classes: Vec<String>,
    top_classes: Vec<String>,
    tracker: RefCell<ScrollStyleTracker>,
    gate: FrameGate,
}

impl Navbar {
    fn update(&self, window: &Window) -> Result<()> {
        let scroll_y = window.scroll_y()?;
        let change = self.tracker.borrow_mut().observe(scroll_y);
        match change {
            Some(NavbarStyle::Scrolled) => {
                dom::add_classes(&self.element, &self.scrolled_classes)?;
                dom::remove_classes(&self.element, &self.top_classes)?;
            }
            Some(NavbarStyle::Top) => {
                dom::add_classes(&self.element, &self.top_classes)?;
                dom::remove_classes(&self.element, &self.scrolled_classes)?;
            }
            None => {}
        }
        Ok(())
    }
}

pub struct NavbarScroll {
    _listener: EventListener,
    _frame: Rc<Closure<dyn FnMut(f64)>>,
}

pub fn setup(window: &Window, document: &Document, config: &SiteConfig) -> Result<Option<NavbarScroll>> {
    let Some(element) = document.query_selector(&config.navbar_selector)? else {
        debug!("no navbar, skipping scroll style");
        return Ok(None);
    };

    let navbar = Rc::new(Navbar {
        element,
        scrolled_classes: config.navbar_scrolled_classes.clone(),
        top_classes: config.navbar_top_classes.clone(),
        tracker: RefCell::new(ScrollStyleTracker::new(config.navbar_threshold_px)),
        gate: FrameGate::default(),
    });

    // match the current position before the first scroll event
    navbar.update(window)?;

    let frame = {
        let navbar = navbar.clone();
        let window = window.clone();
        Rc::new(Closure::wrap(Box::new(move |_timestamp: f64| {
            if let Err(err) = navbar.update(&window) {
                warn!("navbar update failed: {}", err);
            }
            navbar.gate.release();
        }) as Box<dyn FnMut(f64)>))
    };

    let listener = {
        let frame = frame.clone();
        let scheduler = window.clone();
        EventListener::new(window, "scroll", move |_| {
            if !navbar.gate.try_schedule() {
                return;
            }
            if let Err(err) = scheduler.request_animation_frame((*frame).as_ref().unchecked_ref()) {
                warn!("requestAnimationFrame failed: {:?}", err);
                navbar.gate.release();
            }
        })?
    };

    Ok(Some(NavbarScroll {
        _listener: listener,
        _frame: frame,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn threshold_is_exclusive() {
        assert_eq!(NavbarStyle::for_offset(100.0, 100.0), NavbarStyle::Top);
        assert_eq!(NavbarStyle::for_offset(100.5, 100.0), NavbarStyle::Scrolled);
    }

    #[test]
    fn scroll_down_then_back_up() {
        let mut tracker = ScrollStyleTracker::new(100.0);
        assert_eq!(tracker.observe(0.0), Some(NavbarStyle::Top));
        assert_eq!(tracker.observe(150.0), Some(NavbarStyle::Scrolled));
        assert_eq!(tracker.observe(50.0), Some(NavbarStyle::Top));
        assert_eq!(tracker.applied(), Some(NavbarStyle::Top));
    }

    #[test]
    fn repeated_offsets_change_nothing() {
        let mut tracker = ScrollStyleTracker::new(100.0);
        tracker.observe(300.0);
        assert_eq!(tracker.observe(320.0), None);
        assert_eq!(tracker.observe(101.0), None);
    }

    #[test]
    fn frame_gate_allows_one_pending_frame() {
        let gate = FrameGate::default();
        assert!(gate.try_schedule());
        assert!(!gate.try_schedule());
        assert!(!gate.try_schedule());
        gate.release();
        assert!(gate.try_schedule());
    }

    proptest! {
        #[test]
        fn scrolled_style_applied_once_per_crossing(
            offsets in proptest::collection::vec(0.0f64..400.0, 1..60)
        ) {
            let mut tracker = ScrollStyleTracker::new(100.0);
            tracker.observe(0.0);
            let mut above = false;
            for y in offsets {
                let change = tracker.observe(y);
                let now_above = y > 100.0;
                if now_above != above {
                    let expected = if now_above { NavbarStyle::Scrolled } else { NavbarStyle::Top };
                    prop_assert_eq!(change, Some(expected));
                } else {
                    prop_assert_eq!(change, None);
                }
                above = now_above;
            }
        }
    }
}
