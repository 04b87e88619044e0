use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("no global `window` object")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("document has no body")]
    NoBody,
    #[error("javascript error: {0}")]
    Js(String),
    #[error("invalid page config: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<JsValue> for PageError {
    fn from(value: JsValue) -> Self {
        PageError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}
