use std::fmt::Display;
use std::rc::Rc;

use log::{info, warn};
use web_sys::{Document, Window};

use crate::analytics::Tracker;
use crate::behaviors::forms::{self, ConsoleFeedback, FormFeedback, FormIntercept};
use crate::behaviors::logos::{self, LogoHover};
use crate::behaviors::menu::{self, MobileMenuBehavior};
use crate::behaviors::navbar::{self, NavbarScroll};
use crate::behaviors::reveal::{self, ScrollReveal};
use crate::behaviors::smooth_scroll::{self, SmoothScroll};
use crate::config::SiteConfig;
use crate::dom::{self, EventListener};
use crate::error::Result;
use crate::{namespace, performance};

/// Collaborators handed to the initializer.
pub struct SiteOptions {
    pub config: SiteConfig,
    pub tracker: Tracker,
    pub feedback: Rc<dyn FormFeedback>,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            config: SiteConfig::default(),
            tracker: Tracker::noop(),
            feedback: Rc::new(ConsoleFeedback),
        }
    }
}

/// Every behavior wired on this page. Dropping it detaches them all.
pub struct Site {
    pub menu: Option<MobileMenuBehavior>,
    pub reveal: Option<ScrollReveal>,
    pub smooth_scroll: Option<SmoothScroll>,
    pub navbar: Option<NavbarScroll>,
    pub logos: Option<LogoHover>,
    pub forms: Option<FormIntercept>,
}

/// A failing behavior is logged and left out; the rest still get wired.
fn wire<T>(name: &str, result: Result<Option<T>>) -> Option<T> {
    match result {
        Ok(Some(behavior)) => {
            info!("{} ready", name);
            Some(behavior)
        }
        Ok(None) => None,
        Err(err) => {
            warn_disabled(name, err);
            None
        }
    }
}

fn warn_disabled(name: &str, err: impl Display) {
    warn!("{} disabled: {}", name, err);
}

impl Site {
    pub fn init(window: &Window, document: &Document, options: SiteOptions) -> Self {
        let SiteOptions { config, tracker, feedback } = options;

        let menu = wire("mobile menu", menu::setup(document, &config));
        let reveal = wire("scroll reveal", reveal::setup(document, &config));
        let smooth_scroll = wire(
            "smooth scroll",
            smooth_scroll::setup(document, &config, menu.as_ref().map(|m| m.menu.clone())),
        );
        let navbar = wire("navbar scroll style", navbar::setup(window, document, &config));
        let logos = wire("logo hover", logos::setup(document, &config));
        let forms = wire("form intercept", forms::setup(document, &config, feedback));

        if let Err(err) = namespace::install(window, &config.namespace, tracker) {
            warn_disabled("global namespace", err);
        }

        Site {
            menu,
            reveal,
            smooth_scroll,
            navbar,
            logos,
            forms,
        }
    }

    /// Keeps every listener attached for the rest of the page's life.
    pub fn keep_alive(self) {
        std::mem::forget(self);
    }
}

/// Runs `start` once the DOM is parsed. Returns the pending listener when the
/// document is still loading; the caller must keep it alive until it fires.
pub fn on_ready<F>(document: &Document, start: F) -> Result<Option<EventListener>>
where
    F: FnOnce() + 'static,
{
    if document.ready_state() != "loading" {
        start();
        return Ok(None);
    }
    let mut start = Some(start);
    let listener = EventListener::new(document, "DOMContentLoaded", move |_| {
        if let Some(start) = start.take() {
            start();
        }
    })?;
    Ok(Some(listener))
}

/// Reads the page config, picks up analytics and wires everything.
pub fn boot() -> Result<()> {
    let window = dom::window()?;
    let document = dom::document()?;

    let config = SiteConfig::from_window(&window).unwrap_or_else(|err| {
        warn!("{}, using defaults", err);
        SiteConfig::default()
    });
    let options = SiteOptions {
        config,
        tracker: Tracker::from_gtag(&window),
        ..SiteOptions::default()
    };

    let start = {
        let window = window.clone();
        let document = document.clone();
        move || Site::init(&window, &document, options).keep_alive()
    };
    if let Some(pending) = on_ready(&document, start)? {
        std::mem::forget(pending);
    }

    match performance::monitor(&window) {
        Ok(monitor) => std::mem::forget(monitor),
        Err(err) => warn_disabled("load time monitor", err),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SiteError;

    #[test]
    fn wire_keeps_ready_behaviors() {
        assert_eq!(wire("menu", Ok(Some(7))), Some(7));
    }

    #[test]
    fn wire_drops_absent_and_failed_behaviors() {
        assert_eq!(wire::<u8>("logos", Ok(None)), None);
        assert_eq!(
            wire::<u8>("forms", Err(SiteError::Js("SyntaxError".into()))),
            None
        );
    }

    #[test]
    fn default_options_use_stock_config() {
        let options = SiteOptions::default();
        assert_eq!(options.config, SiteConfig::default());
    }
}
