use log::Level;
use serde::Deserialize;
use wasm_bindgen::JsValue;
use web_sys::Window;

use crate::error::Result;

/// Global the page may define before the wasm bundle loads to override
/// selectors or thresholds.
pub const CONFIG_GLOBAL: &str = "SyncronyConfig";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    /// Name of the object installed on `window`.
    pub namespace: String,

    pub menu_button_id: String,
    pub menu_panel_id: String,
    pub menu_hidden_class: String,

    pub navbar_selector: String,
    pub navbar_threshold_px: f64,
    pub navbar_scrolled_classes: Vec<String>,
    pub navbar_top_classes: Vec<String>,

    pub reveal_selector: String,
    pub stagger_selector: String,
    pub visible_class: String,
    pub reveal_threshold: f64,
    pub reveal_bottom_margin_px: u32,
    pub stagger_step_ms: u32,

    pub anchor_selector: String,

    pub logo_strip_selector: String,
    pub logo_hover_class: String,

    pub form_selector: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            namespace: "SyncronyApp".to_string(),
            menu_button_id: "mobile-menu-btn".to_string(),
            menu_panel_id: "mobile-menu".to_string(),
            menu_hidden_class: "hidden".to_string(),
            navbar_selector: "nav".to_string(),
            navbar_threshold_px: 100.0,
            navbar_scrolled_classes: vec!["bg-white/95".to_string(), "shadow-lg".to_string()],
            navbar_top_classes: vec!["bg-white/90".to_string()],
            reveal_selector: ".fade-in".to_string(),
            stagger_selector: ".stagger".to_string(),
            visible_class: "visible".to_string(),
            reveal_threshold: 0.1,
            reveal_bottom_margin_px: 50,
            stagger_step_ms: 100,
            anchor_selector: "a[href^=\"#\"]".to_string(),
            logo_strip_selector: ".logo-scroll".to_string(),
            logo_hover_class: "hover-lift".to_string(),
            form_selector: "form".to_string(),
        }
    }
}

impl SiteConfig {
    /// Reads `window.SyncronyConfig`, falling back to the defaults when the
    /// page did not define one.
    pub fn from_window(window: &Window) -> Result<Self> {
        let raw = web_sys::js_sys::Reflect::get(window, &JsValue::from_str(CONFIG_GLOBAL))?;
        if raw.is_undefined() || raw.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_wasm_bindgen::from_value(raw)?)
    }

    /// Root margin handed to the reveal observer; a negative bottom margin
    /// makes elements count as visible only once they are that far inside.
    pub fn reveal_root_margin(&self) -> String {
        format!("0px 0px -{}px 0px", self.reveal_bottom_margin_px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_page_markup() {
        let config = SiteConfig::default();
        assert_eq!(config.menu_button_id, "mobile-menu-btn");
        assert_eq!(config.navbar_threshold_px, 100.0);
        assert_eq!(config.stagger_step_ms, 100);
        assert_eq!(config.reveal_root_margin(), "0px 0px -50px 0px");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config: SiteConfig = serde_json::from_str(
            r#"{"navbarThresholdPx": 240.0, "namespace": "Landing"}"#,
        )
        .unwrap();
        assert_eq!(config.navbar_threshold_px, 240.0);
        assert_eq!(config.namespace, "Landing");
        assert_eq!(config.reveal_selector, ".fade-in");
        assert_eq!(config.navbar_top_classes, vec!["bg-white/90".to_string()]);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config: SiteConfig = serde_json::from_str(r#"{"theme": "dark"}"#).unwrap();
        assert_eq!(config, SiteConfig::default());
    }
}
