use wasm_bindgen::JsValue;

/// Failures raised while wiring a behavior to the page.
///
/// Absent markup is not an error: setup functions report it as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("no global window")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    /// A browser API rejected the call.
    #[error("browser call failed: {0}")]
    Js(String),

    #[error("invalid site config: {0}")]
    Config(String),
}

impl From<JsValue> for SiteError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                web_sys::js_sys::Reflect::get(&value, &JsValue::from_str("message"))
                    .ok()
                    .and_then(|m| m.as_string())
            })
            .unwrap_or_else(|| format!("{:?}", value));
        SiteError::Js(message)
    }
}

impl From<serde_wasm_bindgen::Error> for SiteError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        SiteError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
