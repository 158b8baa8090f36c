use std::cell::Cell;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, Node};

use crate::config::SiteConfig;
use crate::dom::EventListener;
use crate::error::Result;

/// Open/closed flag of the mobile navigation panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn new(open: bool) -> Self {
        Self { open }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Flips the panel and returns the new open state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Returns `true` if the panel was open.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    pub fn aria_expanded(&self) -> &'static str {
        if self.open {
            "true"
        } else {
            "false"
        }
    }
}

/// A click closes the panel only when it lands on neither the toggle button
/// nor the panel itself, and only if the panel is open.
pub fn outside_click_closes(state: MenuState, in_button: bool, in_panel: bool) -> bool {
    state.is_open() && !in_button && !in_panel
}

struct Inner {
    button: Element,
    panel: Element,
    hidden_class: String,
    state: Cell<MenuState>,
}

impl Inner {
    fn render(&self) -> Result<()> {
        let state = self.state.get();
        self.panel
            .class_list()
            .toggle_with_force(&self.hidden_class, !state.is_open())?;
        self.button.set_attribute("aria-expanded", state.aria_expanded())?;
        Ok(())
    }

    fn toggle(&self) -> Result<()> {
        let mut state = self.state.get();
        state.toggle();
        self.state.set(state);
        self.render()
    }

    fn close(&self) -> Result<()> {
        let mut state = self.state.get();
        if state.close() {
            self.state.set(state);
            self.render()?;
        }
        Ok(())
    }

    fn on_document_click(&self, target: Option<&Node>) -> Result<()> {
        let closes = outside_click_closes(
            self.state.get(),
            self.button.contains(target),
            self.panel.contains(target),
        );
        if closes {
            self.close()?;
        }
        Ok(())
    }
}

/// Cloneable handle so other behaviors can close the panel.
#[derive(Clone)]
pub struct MobileMenu {
    inner: Rc<Inner>,
}

impl MobileMenu {
    pub fn is_open(&self) -> bool {
        self.inner.state.get().is_open()
    }

    pub fn close(&self) -> Result<()> {
        self.inner.close()
    }
}

pub struct MobileMenuBehavior {
    pub menu: MobileMenu,
    _listeners: Vec<EventListener>,
}

pub fn setup(document: &Document, config: &SiteConfig) -> Result<Option<MobileMenuBehavior>> {
    let (Some(button), Some(panel)) = (
        document.get_element_by_id(&config.menu_button_id),
        document.get_element_by_id(&config.menu_panel_id),
    ) else {
        debug!("mobile menu markup not found, skipping");
        return Ok(None);
    };

    let open = !panel.class_list().contains(&config.menu_hidden_class);
    let menu = MobileMenu {
        inner: Rc::new(Inner {
            button: button.clone(),
            panel,
            hidden_class: config.menu_hidden_class.clone(),
            state: Cell::new(MenuState::new(open)),
        }),
    };

    let on_click = {
        let inner = menu.inner.clone();
        EventListener::new(&button, "click", move |_| {
            if let Err(err) = inner.toggle() {
                log::warn!("mobile menu toggle failed: {}", err);
            }
        })?
    };

    let on_outside_click = {
        let inner = menu.inner.clone();
        EventListener::new(document, "click", move |event: Event| {
            let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
            if let Err(err) = inner.on_document_click(target.as_ref()) {
                log::warn!("mobile menu close failed: {}", err);
            }
        })?
    };

    Ok(Some(MobileMenuBehavior {
        menu,
        _listeners: vec![on_click, on_outside_click],
    }))
}
