//! Minimal HTTP/1.1 GET client.
//!
//! Plain HTTP runs over [`skein_net::StdNetworkStream`]; HTTPS goes through
//! the supplied [`TlsProvider`]. The whole response is read as bytes
//! (never line by line) and then parsed, de-chunked and decompressed
//! before the caller sees it.

use std::io;

use skein_net::tcp_connect;
use skein_types::error::{Result, SkeinError};
use skein_types::stream::NetworkStream;
use skein_types::tls::TlsProvider;

use super::{FetchOptions, Headers, Resource, Scheme, Url, gzip};

/// Extra room for the status line and headers on top of the body cap.
const HEADER_ALLOWANCE: usize = 64 * 1024;

/// Perform an HTTP(S) GET for `url`, following same-host redirects.
///
/// Up to `options.max_redirects` redirect hops are followed. A redirect
/// received once the budget is spent, and any other final status
/// besides 200, fails with [`SkeinError::UnexpectedStatus`].
pub fn http_get(
    url: &Url,
    options: &FetchOptions,
    tls: Option<&dyn TlsProvider>,
) -> Result<Resource> {
    if !url.is_network() {
        return Err(SkeinError::MalformedUrl(format!(
            "not an HTTP URL: {url}"
        )));
    }
    if url.scheme == Scheme::Https && tls.is_none() {
        return Err(SkeinError::Connection(format!(
            "TLS not available for {url}"
        )));
    }

    let mut current = url.clone();
    let mut remaining = options.max_redirects;
    loop {
        let resp = do_request(&current, options, tls)?;

        if is_redirect(resp.status_code) {
            if remaining == 0 {
                log::warn!("redirect budget exhausted at {current}");
                return Err(resp.into_status_error());
            }
            let Some(location) = resp.headers.get("location") else {
                return Err(resp.into_status_error());
            };
            let next = redirect_path(&current, location);
            log::info!("{} redirect: {} -> {next}", resp.status_code, current.path);
            current.path = next;
            remaining -= 1;
            continue;
        }

        if resp.status_code != 200 {
            return Err(resp.into_status_error());
        }

        log::debug!("fetched {current}: {} bytes", resp.body.len());
        return Ok(Resource {
            headers: resp.headers,
            body: String::from_utf8_lossy(&resp.body).into_owned(),
        });
    }
}

// -------------------------------------------------------------------
// Response type
// -------------------------------------------------------------------

/// A parsed HTTP response with its body fully decoded.
#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code (e.g. 200, 404).
    pub status_code: u16,
    /// Reason phrase from the status line.
    pub reason: String,
    /// Headers, minus any transfer/content coding that was removed.
    pub headers: Headers,
    /// Decoded body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    fn into_status_error(self) -> SkeinError {
        SkeinError::UnexpectedStatus {
            code: self.status_code,
            reason: self.reason,
        }
    }
}

// -------------------------------------------------------------------
// Connection handling
// -------------------------------------------------------------------

/// Owns one socket for one request; closes it when dropped so every
/// exit path releases the connection.
struct Connection {
    stream: Box<dyn NetworkStream>,
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Err(e) = self.stream.close() {
            log::debug!("closing connection: {e}");
        }
    }
}

/// Connect, optionally upgrade to TLS, send GET, read and parse.
fn do_request(
    url: &Url,
    options: &FetchOptions,
    tls: Option<&dyn TlsProvider>,
) -> Result<HttpResponse> {
    let stream: Box<dyn NetworkStream> = Box::new(tcp_connect(
        &url.host,
        url.port,
        options.connect_timeout,
        options.read_timeout,
    )?);

    let stream = if url.scheme == Scheme::Https {
        let provider =
            tls.ok_or_else(|| SkeinError::Connection("TLS not available".to_string()))?;
        provider.connect_tls(stream, &url.host)?
    } else {
        stream
    };

    let mut conn = Connection { stream };
    send_request(&mut *conn.stream, url, options)?;
    let raw = read_response(&mut *conn.stream, options.max_body_bytes + HEADER_ALLOWANCE)?;
    drop(conn);

    parse_response(&raw, options.max_body_bytes)
}

/// Build the request head for `url`.
fn build_request(url: &Url, options: &FetchOptions) -> String {
    let host_header = if url.port == url.scheme.default_port() {
        url.host.clone()
    } else {
        format!("{}:{}", url.host, url.port)
    };

    format!(
        "GET {} HTTP/1.1\r\n\
         Host: {host_header}\r\n\
         Connection: close\r\n\
         User-Agent: {}\r\n\
         Accept-Encoding: gzip\r\n\
         \r\n",
        url.path, options.user_agent,
    )
}

/// Send an HTTP/1.1 GET request.
fn send_request(
    stream: &mut dyn NetworkStream,
    url: &Url,
    options: &FetchOptions,
) -> Result<()> {
    let request = build_request(url, options);
    log::debug!("GET {} HTTP/1.1 (host {})", url.path, url.host);

    let mut data = request.as_bytes();
    while !data.is_empty() {
        let n = stream
            .write(data)
            .map_err(|e| SkeinError::Connection(format!("send request: {e}")))?;
        if n == 0 {
            return Err(SkeinError::Connection(
                "send request: connection closed".to_string(),
            ));
        }
        data = &data[n..];
    }
    Ok(())
}

/// Read the entire response until the server closes the connection.
///
/// The request asks for `Connection: close`, so end of stream is the only
/// point at which the response is known to be complete. A read timeout
/// before that fails the fetch.
fn read_response(stream: &mut dyn NetworkStream, limit: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 8192];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                if buf.len() + n > limit {
                    return Err(SkeinError::Decode(format!(
                        "response exceeds {limit} bytes"
                    )));
                }
                buf.extend_from_slice(&chunk[..n]);
            },
            Err(SkeinError::Io(ref e))
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                log::warn!("read timed out after {} bytes", buf.len());
                return Err(SkeinError::Connection(format!(
                    "read timed out after {} bytes",
                    buf.len()
                )));
            },
            Err(SkeinError::Io(e)) => {
                return Err(SkeinError::Connection(format!("read response: {e}")));
            },
            Err(e) => return Err(e),
        }
    }
    Ok(buf)
}

// -------------------------------------------------------------------
// Parsing
// -------------------------------------------------------------------

/// Parse raw bytes into status, headers, and a fully decoded body.
///
/// Redirect bodies are discarded without decoding, along with the
/// framing and coding headers that describe them.
pub fn parse_response(data: &[u8], max_body: usize) -> Result<HttpResponse> {
    let (lines, body_start) = split_head(data)?;

    let mut lines = lines.into_iter();
    let status_line = lines
        .next()
        .ok_or_else(|| SkeinError::BadStatusLine("empty response".to_string()))?;
    let (status_code, reason) = parse_status_line(&status_line)?;

    let mut headers = Headers::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name, value);
        }
    }

    let body = if is_redirect(status_code) {
        for name in ["transfer-encoding", "content-encoding", "content-length"] {
            headers.remove(name);
        }
        Vec::new()
    } else {
        decode_body(&mut headers, &data[body_start..], max_body)?
    };

    Ok(HttpResponse {
        status_code,
        reason,
        headers,
        body,
    })
}

/// Split the head into lines, up to the blank line (`\r\n` or `\n`).
/// Returns the lines and the offset where the body starts.
fn split_head(data: &[u8]) -> Result<(Vec<String>, usize)> {
    let mut lines = Vec::new();
    let mut pos = 0;
    loop {
        let Some(i) = data[pos..].iter().position(|&b| b == b'\n') else {
            if lines.is_empty() {
                let partial = String::from_utf8_lossy(&data[pos..]).into_owned();
                return Err(SkeinError::BadStatusLine(if partial.is_empty() {
                    "empty response".to_string()
                } else {
                    partial
                }));
            }
            return Err(SkeinError::Decode(
                "malformed HTTP response: no header terminator".to_string(),
            ));
        };

        let line = &data[pos..pos + i];
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        pos += i + 1;
        if line.is_empty() {
            if lines.is_empty() {
                return Err(SkeinError::BadStatusLine("empty status line".to_string()));
            }
            return Ok((lines, pos));
        }
        lines.push(String::from_utf8_lossy(line).into_owned());
    }
}

/// Parse `HTTP-version SP status SP reason`.
fn parse_status_line(line: &str) -> Result<(u16, String)> {
    let parts: Vec<&str> = line.splitn(3, ' ').collect();
    if parts.len() < 3 || !parts[0].starts_with("HTTP/") {
        return Err(SkeinError::BadStatusLine(line.to_string()));
    }
    let code = parts[1]
        .parse()
        .map_err(|_| SkeinError::BadStatusLine(line.to_string()))?;
    Ok((code, parts[2].trim().to_string()))
}

/// Split a coding list header (`gzip, chunked`) into lowercased tokens.
fn codings(value: &str) -> impl DoubleEndedIterator<Item = String> + '_ {
    value
        .split(',')
        .map(|c| c.trim().to_ascii_lowercase())
        .filter(|c| !c.is_empty())
}

/// Undo transfer and content codings, removing their headers so the
/// result never claims a pending coding.
fn decode_body(headers: &mut Headers, raw: &[u8], max_body: usize) -> Result<Vec<u8>> {
    let mut chunked = false;
    if let Some(te) = headers.remove("transfer-encoding") {
        for coding in codings(&te) {
            match coding.as_str() {
                "chunked" => chunked = true,
                "identity" => {},
                other => {
                    return Err(SkeinError::UnsupportedEncoding(format!(
                        "transfer-encoding: {other}"
                    )));
                },
            }
        }
    }

    let mut body = if chunked {
        headers.remove("content-length");
        decode_chunked(raw, max_body)?
    } else if let Some(cl) = headers.get("content-length") {
        let len: usize = cl
            .parse()
            .map_err(|_| SkeinError::Decode(format!("bad Content-Length: {cl}")))?;
        if len > max_body {
            return Err(SkeinError::Decode(format!(
                "response body exceeds {max_body} byte limit"
            )));
        }
        if raw.len() < len {
            return Err(SkeinError::Decode(format!(
                "body truncated: Content-Length {len}, received {}",
                raw.len()
            )));
        }
        raw[..len].to_vec()
    } else {
        raw.to_vec()
    };

    if body.len() > max_body {
        return Err(SkeinError::Decode(format!(
            "response body exceeds {max_body} byte limit"
        )));
    }

    if let Some(ce) = headers.remove("content-encoding") {
        // Codings are listed in the order they were applied.
        for coding in codings(&ce).rev() {
            match coding.as_str() {
                "gzip" | "x-gzip" => {
                    let before = body.len();
                    body = gzip::decode_gzip(&body, max_body)?;
                    log::debug!("gzip: {before} -> {} bytes", body.len());
                },
                "identity" => {},
                other => {
                    return Err(SkeinError::UnsupportedEncoding(format!(
                        "content-encoding: {other}"
                    )));
                },
            }
        }
        headers.remove("content-length");
    }

    Ok(body)
}

/// Decode a chunked transfer-encoded body.
///
/// Chunk extensions are ignored and so is anything after the zero-size
/// chunk. A chunk cut short, a chunk without its line ending, or a body
/// without the zero-size chunk is a decode error.
fn decode_chunked(data: &[u8], max_body: usize) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut pos = 0;

    while let Some(i) = data[pos..].iter().position(|&b| b == b'\n') {
        let line_end = pos + i;

        let size_line = std::str::from_utf8(&data[pos..line_end])
            .map_err(|_| SkeinError::Decode("bad chunk size".to_string()))?;
        let size_str = size_line.split(';').next().unwrap_or("").trim();

        let chunk_size = usize::from_str_radix(size_str, 16)
            .map_err(|_| SkeinError::Decode(format!("bad chunk size: {size_str:?}")))?;

        if chunk_size == 0 {
            return Ok(result);
        }

        if chunk_size > max_body - result.len() {
            return Err(SkeinError::Decode(format!(
                "chunked body exceeds {max_body} byte limit"
            )));
        }

        let chunk_start = line_end + 1;
        let chunk = chunk_start
            .checked_add(chunk_size)
            .and_then(|chunk_end| data.get(chunk_start..chunk_end))
            .ok_or_else(|| {
                SkeinError::Decode(format!(
                    "chunk of {chunk_size} bytes truncated after {}",
                    data.len() - chunk_start
                ))
            })?;
        result.extend_from_slice(chunk);

        pos = chunk_start + chunk_size;
        let rest = &data[pos..];
        if rest.starts_with(b"\r\n") {
            pos += 2;
        } else if rest.starts_with(b"\n") {
            pos += 1;
        } else {
            return Err(SkeinError::Decode(
                "chunk data not followed by a line ending".to_string(),
            ));
        }
    }

    Err(SkeinError::Decode(
        "chunked body ended without a zero-size chunk".to_string(),
    ))
}

/// Whether a status code asks us to look elsewhere.
fn is_redirect(status: u16) -> bool {
    (300..400).contains(&status)
}

/// Path to request next for a `Location` value.
///
/// Redirects always stay on `current`'s host: absolute and
/// protocol-relative targets contribute only their path, absolute paths
/// are used as-is, and relative paths resolve against the directory of
/// `current`'s path.
fn redirect_path(current: &Url, location: &str) -> String {
    let host = current.host.as_str();
    let location = location.trim();
    let location = location.split('#').next().unwrap_or("");

    let after_authority = location
        .strip_prefix("//")
        .or_else(|| location.split_once("://").map(|(_, rest)| rest));

    if let Some(rest) = after_authority {
        let (authority, path) = match rest.split_once('/') {
            Some((authority, path)) => (authority, format!("/{path}")),
            None => (rest, "/".to_string()),
        };
        let target_host = authority.rsplit_once(':').map_or(authority, |(h, _)| h);
        if !target_host.eq_ignore_ascii_case(host) {
            log::warn!("cross-host redirect to {authority}; following {path} on {host}");
        }
        return path;
    }

    if location.starts_with('/') {
        return location.to_string();
    }

    format!("{}{location}", current.directory())
}
