use log::{warn, Level};
use serde::Deserialize;

use crate::dom::Dom;
use crate::error::PageError;

/// Id of the optional `<script type="application/json">` block carrying overrides.
pub const CONFIG_ELEMENT_ID: &str = "page-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Chatty while developing locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObserverOptions {
    /// Visible fraction of the target at which it counts as in view.
    pub threshold: f64,
    pub root_margin: String,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: "0px".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactConfig {
    pub open_button_id: String,
    pub send_delay_ms: u32,
    pub close_delay_ms: u32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            open_button_id: "contactBtn".to_string(),
            send_delay_ms: 2_000,
            close_delay_ms: 3_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackToTopConfig {
    pub id: String,
    pub show_after: f64,
}

impl Default for BackToTopConfig {
    fn default() -> Self {
        Self {
            id: "backToTop".to_string(),
            show_after: 300.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StickyConfig {
    pub header_selector: String,
    /// CSS custom property set on the document element.
    pub property: String,
    pub padding: f64,
    pub debounce_ms: u32,
}

impl Default for StickyConfig {
    fn default() -> Self {
        Self {
            header_selector: "header".to_string(),
            property: "--sticky-offset".to_string(),
            padding: 8.0,
            debounce_ms: 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    pub nav_id: String,
    pub nav_toggle_id: String,
    pub nav_link_selector: String,
    pub section_selector: String,
    pub fade_in: ObserverOptions,
    pub scrollspy_section_selector: String,
    pub scrollspy: ObserverOptions,
    pub contact: ContactConfig,
    pub back_to_top: BackToTopConfig,
    pub sticky: StickyConfig,
    /// Global function called once at startup when the page defines it.
    pub dark_mode_hook: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            nav_id: "primaryNav".to_string(),
            nav_toggle_id: "navToggle".to_string(),
            nav_link_selector: r##"nav a[href^="#"]"##.to_string(),
            section_selector: "section".to_string(),
            fade_in: ObserverOptions {
                threshold: 0.15,
                root_margin: "0px".to_string(),
            },
            scrollspy_section_selector: "main section[id]".to_string(),
            scrollspy: ObserverOptions {
                threshold: 0.6,
                root_margin: "0px 0px -20% 0px".to_string(),
            },
            contact: ContactConfig::default(),
            back_to_top: BackToTopConfig::default(),
            sticky: StickyConfig::default(),
            dark_mode_hook: "setupDarkModeToggle".to_string(),
        }
    }
}

impl PageConfig {
    pub fn from_json(json: &str) -> Result<Self, PageError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads overrides from the page, falling back to defaults when the block
    /// is missing or malformed.
    pub fn from_page<D: Dom>(dom: &D) -> Self {
        let Some(element) = dom.element_by_id(CONFIG_ELEMENT_ID) else {
            return Self::default();
        };
        match Self::from_json(&dom.text_content(&element)) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring #{}: {}", CONFIG_ELEMENT_ID, e);
                Self::default()
            }
        }
    }
}
