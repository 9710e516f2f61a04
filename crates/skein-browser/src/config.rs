//! Browser configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```toml
//! home_url = "http://example.org/"
//! viewport_width = 1024
//! max_redirects = 3
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use skein_types::error::{Result, SkeinError};

use crate::layout::LayoutParams;
use crate::loader::{FetchOptions, Url};

/// Transport, layout and viewport settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Page opened when no URL is given.
    pub home_url: String,
    pub user_agent: String,

    // Transport
    pub max_redirects: u8,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub max_body_bytes: usize,

    // Viewport
    pub viewport_width: u32,
    pub viewport_height: u32,

    // Layout
    /// Left margin and right wrap margin.
    pub hstep: f32,
    /// Top margin and paragraph gap.
    pub vstep: f32,
    pub base_font_size: u16,
    pub min_font_size: u16,
    pub max_font_size: u16,
    pub zoom_step: u16,

    // Scroll
    pub scroll_step: f32,
    pub max_wheel_notches: i32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        let fetch = FetchOptions::default();
        Self {
            home_url: "file:///public/index.html".to_string(),
            user_agent: fetch.user_agent,
            max_redirects: fetch.max_redirects,
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            read_timeout_secs: fetch.read_timeout.as_secs(),
            max_body_bytes: fetch.max_body_bytes,
            viewport_width: 800,
            viewport_height: 600,
            hstep: 13.0,
            vstep: 18.0,
            base_font_size: 16,
            min_font_size: 8,
            max_font_size: 48,
            zoom_step: 2,
            scroll_step: 100.0,
            max_wheel_notches: 3,
        }
    }
}

impl BrowserConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::debug!("loading config from {}", path.display());
        Self::from_toml(&text)
    }

    /// Reject settings the layout and scroll code cannot work with.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.home_url)
            .map_err(|e| SkeinError::Config(format!("home_url: {e}")))?;
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(SkeinError::Config("viewport must be non-empty".to_string()));
        }
        if self.min_font_size == 0 || self.min_font_size > self.max_font_size {
            return Err(SkeinError::Config(format!(
                "font size range {}..={} is empty",
                self.min_font_size, self.max_font_size
            )));
        }
        if !(self.min_font_size..=self.max_font_size).contains(&self.base_font_size) {
            return Err(SkeinError::Config(format!(
                "base_font_size {} outside {}..={}",
                self.base_font_size, self.min_font_size, self.max_font_size
            )));
        }
        if self.hstep < 0.0 || self.vstep < 0.0 || self.scroll_step <= 0.0 {
            return Err(SkeinError::Config(
                "margins and scroll step must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Transport settings for [`crate::loader::fetch`].
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            max_redirects: self.max_redirects,
            user_agent: self.user_agent.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            max_body_bytes: self.max_body_bytes,
        }
    }

    /// Layout settings for a viewport `width` wide at `base_size`.
    pub fn layout_params(&self, width: f32, base_size: u16) -> LayoutParams {
        LayoutParams {
            width,
            hstep: self.hstep,
            vstep: self.vstep,
            base_size,
        }
    }
}
