use log::{debug, warn};
use web_sys::{Document, Element, Event};

use crate::behaviors::menu::MobileMenu;
use crate::config::SiteConfig;
use crate::dom::{self, EventListener};
use crate::error::Result;
use crate::utils;

/// Only real fragment targets are resolved; a bare `#` points nowhere.
pub fn fragment_selector(href: &str) -> Option<&str> {
    match href.strip_prefix('#') {
        Some(id) if !id.trim().is_empty() => Some(href),
        _ => None,
    }
}

pub struct SmoothScroll {
    _listeners: Vec<EventListener>,
}

fn navigate(document: &Document, anchor: &Element, navbar_selector: &str) -> Result<bool> {
    let Some(href) = anchor.get_attribute("href") else {
        return Ok(false);
    };
    let Some(selector) = fragment_selector(&href) else {
        return Ok(false);
    };
    // an href like "#1-intro" is not a valid selector; treat it as missing
    let Some(target) = document.query_selector(selector).ok().flatten() else {
        debug!("anchor target {} not found", selector);
        return Ok(false);
    };

    let navbar_height = document
        .query_selector(navbar_selector)?
        .map(|nav| dom::offset_height(&nav))
        .unwrap_or(0.0);
    let window = dom::window()?;
    utils::smooth_scroll_to(
        &window,
        utils::scroll_offset(dom::offset_top(&target), navbar_height),
    );
    Ok(true)
}

pub fn setup(
    document: &Document,
    config: &SiteConfig,
    menu: Option<MobileMenu>,
) -> Result<Option<SmoothScroll>> {
    let anchors = dom::query_all(document, &config.anchor_selector)?;
    if anchors.is_empty() {
        debug!("no in-page anchors, skipping smooth scroll");
        return Ok(None);
    }

    let mut listeners = Vec::with_capacity(anchors.len());
    for anchor in anchors {
        let document = document.clone();
        let navbar_selector = config.navbar_selector.clone();
        let menu = menu.clone();
        let target = anchor.clone();
        listeners.push(EventListener::new(&target, "click", move |event: Event| {
            event.prevent_default();
            match navigate(&document, &anchor, &navbar_selector) {
                Ok(true) => {
                    if let Some(menu) = &menu {
                        if let Err(err) = menu.close() {
                            warn!("closing mobile menu after navigation failed: {}", err);
                        }
                    }
                }
                Ok(false) => {}
                Err(err) => warn!("smooth scroll failed: {}", err),
            }
        })?);
    }

    Ok(Some(SmoothScroll {
        _listeners: listeners,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_selector_accepts_ids() {
        assert_eq!(fragment_selector("#features"), Some("#features"));
        assert_eq!(fragment_selector("#pricing-table"), Some("#pricing-table"));
    }

    #[test]
    fn fragment_selector_rejects_empty_fragments() {
        assert_eq!(fragment_selector("#"), None);
        assert_eq!(fragment_selector("#  "), None);
        assert_eq!(fragment_selector("/about"), None);
    }
}
