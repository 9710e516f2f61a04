//! Resource loading: URL parsing, header maps, and loader dispatch.

pub mod data;
pub mod file;
pub mod gzip;
pub mod http;

use std::fmt;
use std::time::Duration;

use skein_types::error::{Result, SkeinError};
use skein_types::tls::TlsProvider;

/// Prefix that turns any URL into a raw-source view of it.
const VIEW_SOURCE_PREFIX: &str = "view-source:";

// ---------------------------------------------------------------------------
// URL parsing
// ---------------------------------------------------------------------------

/// The URL schemes the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
    File,
    Data,
}

impl Scheme {
    /// Look up a scheme by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "http" => Some(Scheme::Http),
            "https" => Some(Scheme::Https),
            "file" => Some(Scheme::File),
            "data" => Some(Scheme::Data),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::File => "file",
            Scheme::Data => "data",
        }
    }

    /// Port used when the URL does not name one. Zero for schemes that
    /// never touch the network.
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
            Scheme::File | Scheme::Data => 0,
        }
    }
}

/// A parsed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    pub scheme: Scheme,
    /// Host name. Empty for `data:` URLs and for `file:///path`.
    pub host: String,
    /// Explicit `host:port` value, or the scheme default.
    pub port: u16,
    /// Path starting with `/` (query kept, fragment dropped). For `data:`
    /// URLs this is the payload after the first comma.
    pub path: String,
    /// Media type of a `data:` URL (the text before the first comma).
    pub media_type: Option<String>,
    /// Display the raw body instead of rendering it.
    pub view_source: bool,
}

impl Url {
    /// Parse a URL string.
    ///
    /// Accepts `http://host[:port]/path`, `https://...`, `file:///path`
    /// and `data:<mediatype>,<payload>`, each optionally prefixed with
    /// `view-source:`.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();

        if let Some(inner) = raw.strip_prefix(VIEW_SOURCE_PREFIX) {
            let mut url = Url::parse(inner)?;
            url.view_source = true;
            return Ok(url);
        }

        if let Some(rest) = raw.strip_prefix("data:") {
            return Self::parse_data(rest);
        }

        let (scheme_name, rest) = raw
            .split_once("://")
            .ok_or_else(|| SkeinError::MalformedUrl(format!("missing '://' in {raw:?}")))?;
        let scheme = Scheme::from_name(scheme_name)
            .ok_or_else(|| SkeinError::MalformedUrl(format!("unknown scheme {scheme_name:?}")))?;

        // Fragments never leave the client.
        let rest = rest.split('#').next().unwrap_or("");

        let (authority, path) = match rest.split_once('/') {
            Some((authority, remainder)) => (authority, format!("/{remainder}")),
            None => (rest, "/".to_string()),
        };

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    SkeinError::MalformedUrl(format!("bad port {port:?} in {raw:?}"))
                })?;
                (host, port)
            },
            None => (authority, scheme.default_port()),
        };

        if host.is_empty() && scheme != Scheme::File {
            return Err(SkeinError::MalformedUrl(format!("missing host in {raw:?}")));
        }

        Ok(Url {
            scheme,
            host: host.to_string(),
            port,
            path,
            media_type: None,
            view_source: false,
        })
    }

    /// `data:` URLs carry their payload inline after the first comma.
    fn parse_data(rest: &str) -> Result<Self> {
        let (media_type, payload) = rest
            .split_once(',')
            .ok_or_else(|| SkeinError::MalformedUrl("data URL without ','".to_string()))?;
        Ok(Url {
            scheme: Scheme::Data,
            host: String::new(),
            port: 0,
            path: payload.to_string(),
            media_type: Some(media_type.to_string()),
            view_source: false,
        })
    }

    /// Whether fetching this URL goes over the network.
    pub fn is_network(&self) -> bool {
        matches!(self.scheme, Scheme::Http | Scheme::Https)
    }

    /// Directory portion of the path (everything up to and including
    /// the last `/`).
    pub fn directory(&self) -> &str {
        let path = self.path.split('?').next().unwrap_or(&self.path);
        match path.rfind('/') {
            Some(i) => &path[..=i],
            None => "/",
        }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.view_source {
            f.write_str(VIEW_SOURCE_PREFIX)?;
        }
        match self.scheme {
            Scheme::Data => write!(
                f,
                "data:{},{}",
                self.media_type.as_deref().unwrap_or(""),
                self.path
            ),
            scheme => {
                write!(f, "{}://{}", scheme.as_str(), self.host)?;
                if self.port != scheme.default_port() {
                    write!(f, ":{}", self.port)?;
                }
                f.write_str(&self.path)
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

/// Response headers: names stored lowercased, values trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing any previous value with the same name.
    pub fn insert(&mut self, name: &str, value: &str) {
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim().to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self
            .entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Headers {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A loaded document: fully decoded headers and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub headers: Headers,
    pub body: String,
}

/// Transport settings for a single fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Redirect hops allowed before the redirect status is surfaced.
    pub max_redirects: u8,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Cap on raw and decompressed body size.
    pub max_body_bytes: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_redirects: 5,
            user_agent: concat!("skein/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(15),
            max_body_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Fetch `url` through the loader its scheme calls for.
///
/// `tls` is required for `https` URLs; `file` and `data` URLs never
/// touch the network.
pub fn fetch(
    url: &Url,
    options: &FetchOptions,
    tls: Option<&dyn TlsProvider>,
) -> Result<Resource> {
    match url.scheme {
        Scheme::Http | Scheme::Https => http::http_get(url, options, tls),
        Scheme::File => file::read_file(&url.path),
        Scheme::Data => data::read_data(url),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
