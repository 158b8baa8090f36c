use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::config::SiteConfig;
use crate::dom::EventListener;
use crate::error::Result;

/// CSS `animation-play-state` for the logo strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Running,
    Paused,
}

impl PlayState {
    pub fn css_value(self) -> &'static str {
        match self {
            PlayState::Running => "running",
            PlayState::Paused => "paused",
        }
    }

    /// Hovering any logo pauses the strip. Overlapping hovers are not
    /// counted, the latest event decides.
    pub fn on_hover(hovered: bool) -> Self {
        if hovered {
            PlayState::Paused
        } else {
            PlayState::Running
        }
    }
}

pub struct LogoHover {
    _listeners: Vec<EventListener>,
}

fn hover(strip: &HtmlElement, logo: &Element, hover_class: &str, hovered: bool) -> Result<()> {
    strip
        .style()
        .set_property("animation-play-state", PlayState::on_hover(hovered).css_value())?;
    logo.class_list().toggle_with_force(hover_class, hovered)?;
    Ok(())
}

pub fn setup(document: &Document, config: &SiteConfig) -> Result<Option<LogoHover>> {
    let Some(strip) = document
        .query_selector(&config.logo_strip_selector)?
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        debug!("no logo strip, skipping hover pause");
        return Ok(None);
    };

    let children = strip.children();
    let logos: Vec<Element> = (0..children.length())
        .filter_map(|i| children.item(i))
        .filter(|el| el.tag_name().eq_ignore_ascii_case("div"))
        .collect();

    let mut listeners = Vec::with_capacity(logos.len() * 2);
    for logo in logos {
        for (event, hovered) in [("mouseenter", true), ("mouseleave", false)] {
            let strip = strip.clone();
            let target = logo.clone();
            let hover_class = config.logo_hover_class.clone();
            listeners.push(EventListener::new(&logo, event, move |_| {
                if let Err(err) = hover(&strip, &target, &hover_class, hovered) {
                    warn!("logo hover failed: {}", err);
                }
            })?);
        }
    }

    Ok(Some(LogoHover {
        _listeners: listeners,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_pauses_and_leave_resumes() {
        assert_eq!(PlayState::on_hover(true).css_value(), "paused");
        assert_eq!(PlayState::on_hover(false).css_value(), "running");
    }

    #[test]
    fn last_event_wins_for_overlapping_hovers() {
        // enter A, enter B, leave A: the strip runs again while B is hovered
        let events = [true, true, false];
        let last = events.iter().map(|h| PlayState::on_hover(*h)).last();
        assert_eq!(last, Some(PlayState::Running));
    }
}
