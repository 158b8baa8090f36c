use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::config::SiteConfig;
use crate::dom;
use crate::error::Result;

/// Delay before each staggered child becomes visible.
pub fn stagger_delays(count: usize, step_ms: u32) -> Vec<u32> {
    (0..count as u32).map(|index| index.saturating_mul(step_ms)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryAction {
    Ignore,
    /// In view but already shown: stop watching it.
    Unobserve,
    Reveal,
}

/// Reveal is one-way: once shown an element stays shown, and anything that
/// has been in view is no longer watched.
pub fn entry_action(is_intersecting: bool, already_visible: bool) -> EntryAction {
    match (is_intersecting, already_visible) {
        (false, _) => EntryAction::Ignore,
        (true, true) => EntryAction::Unobserve,
        (true, false) => EntryAction::Reveal,
    }
}

/// A stagger timer is still worth keeping while its child is in the
/// document and not yet shown.
pub fn stagger_pending(connected: bool, visible: bool) -> bool {
    connected && !visible
}

struct Reveal {
    visible_class: String,
    stagger_selector: String,
    stagger_step_ms: u32,
    // pending stagger timers, cancelled when the behavior is dropped;
    // finished ones are pruned on every reveal
    staggers: RefCell<Vec<(Element, Timeout)>>,
}

impl Reveal {
    fn reveal(&self, target: &Element) -> Result<()> {
        target.class_list().add_1(&self.visible_class)?;

        let children = dom::query_all_within(target, &self.stagger_selector)?;
        let delays = stagger_delays(children.len(), self.stagger_step_ms);
        let mut staggers = self.staggers.borrow_mut();
        staggers.retain(|(child, _)| {
            stagger_pending(
                child.is_connected(),
                child.class_list().contains(&self.visible_class),
            )
        });
        for (child, delay) in children.into_iter().zip(delays) {
            let class = self.visible_class.clone();
            let shown = child.clone();
            let timeout = Timeout::new(delay, move || {
                if !shown.is_connected() {
                    return;
                }
                if let Err(err) = shown.class_list().add_1(&class) {
                    warn!("staggered reveal failed: {:?}", err);
                }
            });
            staggers.push((child, timeout));
        }
        Ok(())
    }

    fn on_entries(&self, entries: Array, observer: &IntersectionObserver) {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            let target = entry.target();
            let already = target.class_list().contains(&self.visible_class);
            match entry_action(entry.is_intersecting(), already) {
                EntryAction::Ignore => {}
                EntryAction::Unobserve => observer.unobserve(&target),
                EntryAction::Reveal => {
                    observer.unobserve(&target);
                    if let Err(err) = self.reveal(&target) {
                        warn!("reveal failed: {}", err);
                    }
                }
            }
        }
    }
}

pub struct ScrollReveal {
    observer: IntersectionObserver,
    _reveal: Rc<Reveal>,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl Drop for ScrollReveal {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

pub fn setup(document: &Document, config: &SiteConfig) -> Result<Option<ScrollReveal>> {
    let targets = dom::query_all(document, &config.reveal_selector)?;
    if targets.is_empty() {
        debug!("no {} elements, skipping scroll reveal", config.reveal_selector);
        return Ok(None);
    }

    let reveal = Rc::new(Reveal {
        visible_class: config.visible_class.clone(),
        stagger_selector: config.stagger_selector.clone(),
        stagger_step_ms: config.stagger_step_ms,
        staggers: RefCell::new(Vec::new()),
    });

    let callback = {
        let reveal = reveal.clone();
        Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
            reveal.on_entries(entries, &observer);
        }) as Box<dyn FnMut(Array, IntersectionObserver)>)
    };

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(config.reveal_threshold));
    options.set_root_margin(&config.reveal_root_margin());
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;

    for target in &targets {
        observer.observe(target);
    }
    debug!("observing {} reveal targets", targets.len());

    Ok(Some(ScrollReveal {
        observer,
        _reveal: reveal,
        _callback: callback,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stagger_delays_grow_linearly() {
        assert_eq!(stagger_delays(4, 100), vec![0, 100, 200, 300]);
        assert!(stagger_delays(0, 100).is_empty());
    }

    #[test]
    fn first_child_is_not_delayed() {
        assert_eq!(stagger_delays(1, 250), vec![0]);
    }

    #[test]
    fn reveal_is_one_shot() {
        assert_eq!(entry_action(true, false), EntryAction::Reveal);
        // scrolling away never hides a revealed element
        assert_eq!(entry_action(false, true), EntryAction::Ignore);
        assert_eq!(entry_action(false, false), EntryAction::Ignore);
    }

    #[test]
    fn visible_in_markup_is_unobserved_once_in_view() {
        assert_eq!(entry_action(true, true), EntryAction::Unobserve);
    }

    #[test]
    fn finished_or_detached_staggers_are_pruned() {
        assert!(stagger_pending(true, false));
        assert!(!stagger_pending(true, true));
        assert!(!stagger_pending(false, false));
        assert!(!stagger_pending(false, true));
    }
}
