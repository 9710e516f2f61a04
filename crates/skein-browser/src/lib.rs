//! Browser core: URL resolution, document loading, tokenizing and inline
//! layout.
//!
//! Data flows one way: a URL is parsed, fetched over HTTP(S) or read from
//! a `file:`/`data:` source, tokenized, and laid out into positioned
//! words. [`Browser`] drives that pipeline and re-runs only the layout
//! step when the viewport or zoom changes.

pub mod config;
pub mod html;
pub mod layout;
pub mod loader;
pub mod scroll;

#[cfg(test)]
pub(crate) mod test_utils;

// -----------------------------------------------------------------------
// Public re-exports
// -----------------------------------------------------------------------

pub use config::BrowserConfig;
pub use html::{TagKind, Token, tokenize};
pub use layout::{FontDescriptor, FontMetrics, LayoutParams, MonospaceMetrics, Placement};
pub use loader::{FetchOptions, Headers, Resource, Scheme, Url};
pub use scroll::ScrollState;
pub use skein_types::error::{Result, SkeinError};
pub use skein_types::tls::TlsProvider;

/// Parse `raw` and fetch it.
pub fn load(raw: &str, options: &FetchOptions, tls: Option<&dyn TlsProvider>) -> Result<Resource> {
    let url = Url::parse(raw)?;
    loader::fetch(&url, options, tls)
}

// -----------------------------------------------------------------------
// Page
// -----------------------------------------------------------------------

/// The currently loaded document, kept so layout can be recomputed
/// without fetching again.
#[derive(Debug, Clone)]
struct Page {
    url: Url,
    resource: Resource,
    tokens: Vec<Token>,
}

impl Page {
    fn new(url: Url, resource: Resource) -> Self {
        let tokens = if url.view_source {
            // Raw markup shown as one text run.
            vec![
                Token::Tag("body".to_string()),
                Token::Text(resource.body.clone()),
            ]
        } else {
            tokenize(&resource.body)
        };
        Self {
            url,
            resource,
            tokens,
        }
    }
}

// -----------------------------------------------------------------------
// Browser
// -----------------------------------------------------------------------

/// Pipeline orchestrator: navigation, layout and scrolling for one
/// viewport.
pub struct Browser {
    pub config: BrowserConfig,
    metrics: Box<dyn FontMetrics>,
    tls: Option<Box<dyn TlsProvider>>,
    page: Option<Page>,
    display_list: Vec<Placement>,
    width: f32,
    font_size: u16,
    scroll: ScrollState,
}

impl Browser {
    pub fn new(config: BrowserConfig, metrics: Box<dyn FontMetrics>) -> Self {
        let scroll = ScrollState::new(
            config.viewport_height as f32,
            config.scroll_step,
            config.max_wheel_notches,
        );
        Self {
            width: config.viewport_width as f32,
            font_size: config.base_font_size,
            config,
            metrics,
            tls: None,
            page: None,
            display_list: Vec::new(),
            scroll,
        }
    }

    /// Install the TLS provider used for `https` URLs.
    pub fn set_tls_provider(&mut self, tls: Box<dyn TlsProvider>) {
        self.tls = Some(tls);
    }

    /// Use rustls with the bundled webpki roots for `https` URLs.
    #[cfg(feature = "tls-rustls")]
    pub fn with_default_tls(mut self) -> Self {
        self.set_tls_provider(Box::new(skein_net::RustlsTlsProvider::new()));
        self
    }

    /// Load `raw`, tokenize it and lay it out.
    ///
    /// On failure the previous page, display list and scroll position are
    /// left untouched.
    pub fn navigate(&mut self, raw: &str) -> Result<()> {
        let url = Url::parse(raw)?;
        log::info!("navigating to {url}");
        let resource = loader::fetch(&url, &self.config.fetch_options(), self.tls.as_deref())?;
        self.page = Some(Page::new(url, resource));
        self.relayout();
        self.scroll.scroll_to_top();
        Ok(())
    }

    /// Navigate to the configured home page.
    pub fn home(&mut self) -> Result<()> {
        let home = self.config.home_url.clone();
        self.navigate(&home)
    }

    /// Viewport size changed; lays out again without refetching.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width as f32;
        self.scroll.set_viewport_height(height as f32);
        self.relayout();
    }

    /// Grow the base font size by one zoom step. Returns whether the size
    /// changed.
    pub fn zoom_in(&mut self) -> bool {
        let size = self
            .font_size
            .saturating_add(self.config.zoom_step)
            .min(self.config.max_font_size);
        self.set_font_size(size)
    }

    /// Shrink the base font size by one zoom step. Returns whether the
    /// size changed.
    pub fn zoom_out(&mut self) -> bool {
        let size = self
            .font_size
            .saturating_sub(self.config.zoom_step)
            .max(self.config.min_font_size);
        self.set_font_size(size)
    }

    fn set_font_size(&mut self, size: u16) -> bool {
        if size == self.font_size {
            return false;
        }
        self.font_size = size;
        self.relayout();
        true
    }

    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    pub fn scroll_down(&mut self) {
        self.scroll.scroll_down();
    }

    pub fn scroll_up(&mut self) {
        self.scroll.scroll_up();
    }

    /// Mouse wheel, in notches; positive scrolls down.
    pub fn wheel(&mut self, notches: i32) {
        self.scroll.wheel(notches);
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll.offset
    }

    /// Placements inside the viewport, in viewport coordinates.
    pub fn visible(&self) -> Vec<Placement> {
        self.scroll.visible(&self.display_list, self.metrics.as_ref())
    }

    /// Every placement of the current page, in document coordinates.
    pub fn display_list(&self) -> &[Placement] {
        &self.display_list
    }

    pub fn headers(&self) -> Option<&Headers> {
        self.page.as_ref().map(|p| &p.resource.headers)
    }

    /// Decoded body of the current page.
    pub fn source(&self) -> Option<&str> {
        self.page.as_ref().map(|p| p.resource.body.as_str())
    }

    pub fn tokens(&self) -> &[Token] {
        self.page
            .as_ref()
            .map(|p| p.tokens.as_slice())
            .unwrap_or_default()
    }

    pub fn current_url(&self) -> Option<&Url> {
        self.page.as_ref().map(|p| &p.url)
    }

    fn relayout(&mut self) {
        let Some(page) = &self.page else {
            return;
        };
        let params = self.config.layout_params(self.width, self.font_size);
        self.display_list = layout::layout_with(&page.tokens, &params, self.metrics.as_ref());
        let height = layout::content_height(&self.display_list, self.metrics.as_ref());
        self.scroll.set_content_height(height);
        log::debug!(
            "laid out {} words at width {}, height {height}",
            self.display_list.len(),
            self.width
        );
    }
}
