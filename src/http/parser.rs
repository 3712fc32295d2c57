//! Line-based request parsing.
//!
//! # Responsibilities
//! - Parse the request line into method, url and protocol version
//! - Parse header lines into the parameter map
//! - Normalize the URL (scheme/host stripping, query-string extraction)
//! - Drain any request body without interpreting it
//!
//! # Design Decisions
//! - Linear state machine, no backtracking, no read-ahead beyond one line
//! - Malformed header lines are skipped, not rejected
//! - Duplicate header and query keys keep the first value; headers are parsed
//!   before the query string, so a header beats a same-named query parameter

use thiserror::Error;
use url::form_urlencoded;

use crate::http::request::Request;

/// Failure modes of the parse phase. Recovered by the connection worker into
/// a synthetic error response; never propagated past it.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Request line missing, empty, or fewer than two tokens.
    #[error("malformed request line")]
    MalformedRequest,
    /// The connection failed mid-parse.
    #[error("connection i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// Hook consulted for each parsed header before it lands in `parameters`.
/// Returning `true` claims the header and suppresses the default insertion.
pub type SpecialHeader = fn(&mut Request, &str, &str) -> bool;

/// Parse one request from the connection into `req`.
pub async fn parse_request(req: &mut Request) -> Result<(), ParseError> {
    parse_request_with(req, |_, _, _| false).await
}

/// Parse with a special-header hook installed.
pub async fn parse_request_with(req: &mut Request, special: SpecialHeader) -> Result<(), ParseError> {
    parse_request_line(req).await?;
    parse_headers(req, special).await?;
    normalize_url(req);
    skip_body(req).await?;
    Ok(())
}

/// State 1: `METHOD SP URL [SP VERSION]`.
async fn parse_request_line(req: &mut Request) -> Result<(), ParseError> {
    let line = req.read_trimmed_line().await?;
    if line.is_empty() {
        return Err(ParseError::MalformedRequest);
    }
    let mut tokens = line.split_whitespace();
    let (method, url) = match (tokens.next(), tokens.next()) {
        (Some(method), Some(url)) => (method, url),
        _ => return Err(ParseError::MalformedRequest),
    };
    req.method = method.to_uppercase();
    req.url = url.to_string();
    req.protocol_version = tokens.collect::<Vec<_>>().join(" ");
    Ok(())
}

/// State 2: `Key: Value` lines until an empty line or end of stream.
async fn parse_headers(req: &mut Request, special: SpecialHeader) -> Result<(), ParseError> {
    loop {
        let line = req.read_trimmed_line().await?;
        if line.is_empty() {
            return Ok(());
        }
        // Lines without a colon (or with nothing before it) are skipped.
        let Some((raw_key, raw_value)) = line.split_once(':') else {
            continue;
        };
        let key = raw_key.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        let value = raw_value.trim().to_string();
        if special(req, &key, &value) {
            continue;
        }
        req.insert_param_if_absent(key, value);
    }
}

/// State 3: runs once after the headers.
///
/// Strips a case-insensitive `http://` prefix, moving the host into
/// `parameters["host"]`, then splits off the query string and decodes it into
/// the parameter map without overwriting existing keys.
fn normalize_url(req: &mut Request) {
    let mut url = std::mem::take(&mut req.url);
    let mut host = String::new();

    if url.get(..7).is_some_and(|prefix| prefix.eq_ignore_ascii_case("http://")) {
        let rest = &url[7..];
        match rest.find('/') {
            Some(idx) => {
                host = rest[..idx].to_string();
                url = rest[idx..].to_string();
            }
            None => {
                host = rest.to_string();
                url = "/".to_string();
            }
        }
    }

    if let Some(idx) = url.find('?') {
        let query = url[idx + 1..].to_string();
        url.truncate(idx);
        // A bare `?` is a no-op.
        if !query.is_empty() {
            for (key, value) in form_urlencoded::parse(query.as_bytes()) {
                req.insert_param_if_absent(key.into_owned(), value.into_owned());
            }
        }
    }

    req.url = url;
    if !host.is_empty() {
        // Unconditional assignment: the URL host replaces a `host` header.
        req.parameters.insert("host".to_string(), host);
    }
}

/// State 4: drain a body if one has started to arrive; a bodyless request
/// skips this entirely. No Content-Length accounting, no chunked decoding.
async fn skip_body(req: &mut Request) -> Result<(), ParseError> {
    if !req.has_buffered_input() {
        return Ok(());
    }
    req.drain_input().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    /// Run the parser over an in-memory connection carrying `input`.
    async fn parse(input: &str) -> Result<Request, ParseError> {
        let (mut client, server) = tokio::io::duplex(4096);
        client.write_all(input.as_bytes()).await.unwrap();
        drop(client);
        let (read_half, write_half) = tokio::io::split(server);
        let mut req = Request::from_parts(Box::new(read_half), Box::new(write_half));
        parse_request(&mut req).await.map(|_| req)
    }

    #[tokio::test]
    async fn request_line_three_tokens() {
        let req = parse("get /index.html HTTP/1.1\r\n\r\n").await.unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.url, "/index.html");
        assert_eq!(req.protocol_version, "HTTP/1.1");
    }

    #[tokio::test]
    async fn request_line_without_version() {
        let req = parse("GET /\r\n\r\n").await.unwrap();
        assert_eq!(req.url, "/");
        assert_eq!(req.protocol_version, "");
    }

    #[tokio::test]
    async fn empty_request_line_is_malformed() {
        assert!(matches!(parse("\r\n").await, Err(ParseError::MalformedRequest)));
        assert!(matches!(parse("").await, Err(ParseError::MalformedRequest)));
    }

    #[tokio::test]
    async fn one_token_request_line_is_malformed() {
        assert!(matches!(parse("GET\r\n\r\n").await, Err(ParseError::MalformedRequest)));
    }

    #[tokio::test]
    async fn headers_populate_parameters() {
        let req = parse("GET / HTTP/1.1\r\nHost: example.com\r\nAccept:  text/html \r\n\r\n")
            .await
            .unwrap();
        assert_eq!(req.param("host"), Some("example.com"));
        assert_eq!(req.param("accept"), Some("text/html"));
    }

    #[tokio::test]
    async fn duplicate_header_keeps_first_value() {
        let req = parse("GET / HTTP/1.1\r\nX: one\r\nX: two\r\n\r\n").await.unwrap();
        assert_eq!(req.param("x"), Some("one"));
    }

    #[tokio::test]
    async fn header_line_without_colon_is_skipped() {
        let req = parse("GET / HTTP/1.1\r\nthis is not a header\r\nOk: yes\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(req.param("ok"), Some("yes"));
        assert_eq!(req.parameters.len(), 1);
    }

    #[tokio::test]
    async fn header_beats_query_parameter() {
        let req = parse("GET /p?foo=baz HTTP/1.1\r\nFoo: bar\r\n\r\n").await.unwrap();
        assert_eq!(req.param("foo"), Some("bar"));
    }

    #[tokio::test]
    async fn absolute_url_moves_host_into_parameters() {
        let req = parse("GET http://example.com/path?a=1 HTTP/1.1\r\n\r\n").await.unwrap();
        assert_eq!(req.url, "/path");
        assert_eq!(req.param("host"), Some("example.com"));
        assert_eq!(req.param("a"), Some("1"));
    }

    #[tokio::test]
    async fn absolute_url_without_path_becomes_root() {
        let req = parse("GET HTTP://example.com HTTP/1.1\r\n\r\n").await.unwrap();
        assert_eq!(req.url, "/");
        assert_eq!(req.param("host"), Some("example.com"));
    }

    #[tokio::test]
    async fn url_host_replaces_host_header() {
        let req = parse("GET http://real.example/ HTTP/1.1\r\nHost: fake.example\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(req.param("host"), Some("real.example"));
    }

    #[tokio::test]
    async fn empty_query_string_adds_nothing() {
        let req = parse("GET /path? HTTP/1.1\r\n\r\n").await.unwrap();
        assert_eq!(req.url, "/path");
        assert!(req.parameters.is_empty());
    }

    #[tokio::test]
    async fn query_values_are_url_decoded() {
        let req = parse("GET /q?name=hello%20world&tag=a+b HTTP/1.1\r\n\r\n").await.unwrap();
        assert_eq!(req.param("name"), Some("hello world"));
        assert_eq!(req.param("tag"), Some("a b"));
    }

    #[tokio::test]
    async fn duplicate_query_key_keeps_first_value() {
        let req = parse("GET /q?a=1&a=2 HTTP/1.1\r\n\r\n").await.unwrap();
        assert_eq!(req.param("a"), Some("1"));
    }

    #[tokio::test]
    async fn body_is_drained_without_interpretation() {
        let req = parse("POST /submit HTTP/1.1\r\nContent-Length: 9\r\n\r\nnot=real!").await.unwrap();
        assert_eq!(req.url, "/submit");
        // The body never reaches the parameter map.
        assert_eq!(req.param("not"), None);
    }

    #[tokio::test]
    async fn special_header_hook_suppresses_insertion() {
        let (mut client, server) = tokio::io::duplex(4096);
        client
            .write_all(b"GET / HTTP/1.1\r\nX-Secret: 42\r\nPlain: kept\r\n\r\n")
            .await
            .unwrap();
        drop(client);
        let (read_half, write_half) = tokio::io::split(server);
        let mut req = Request::from_parts(Box::new(read_half), Box::new(write_half));
        parse_request_with(&mut req, |req, key, value| {
            if key == "x-secret" {
                req.insert_param_if_absent("intercepted".to_string(), value.to_string());
                true
            } else {
                false
            }
        })
        .await
        .unwrap();
        assert_eq!(req.param("x-secret"), None);
        assert_eq!(req.param("intercepted"), Some("42"));
        assert_eq!(req.param("plain"), Some("kept"));
    }
}
