//! oauth::encoding
//!
//! RFC 3986 percent-encoding, form decoding and URL splitting.
//!
//! OAuth 1.0a signatures only verify when client and server agree byte for
//! byte on the encoded form. Only the unreserved set `A-Z a-z 0-9 - . _ ~`
//! passes through; every other byte of the UTF-8 encoding becomes `%XX` with
//! uppercase hex.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use super::errors::OAuthError;

/// Bytes escaped by [`percent_encode`]: everything outside the unreserved set.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a string per RFC 3986 section 2.1.
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Decode one `application/x-www-form-urlencoded` component.
///
/// `+` decodes to a space. Escapes that do not form valid UTF-8 are an
/// [`OAuthError::Encoding`] rather than being replaced lossily, since a
/// lossy decode would sign different bytes than were sent.
pub fn form_decode(value: &str) -> Result<String, OAuthError> {
    let spaced = value.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| OAuthError::Encoding(format!("'{}' is not valid UTF-8: {}", value, e)))
}

/// Parse a form-encoded string (`a=1&b=2`) into ordered pairs.
///
/// Empty segments are skipped; a segment without `=` has an empty value.
pub fn parse_form(input: &str) -> Result<Vec<(String, String)>, OAuthError> {
    input
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            Ok((form_decode(key)?, form_decode(value)?))
        })
        .collect()
}

/// Encode pairs as `k=v&k=v` using [`percent_encode`] on each side.
pub fn encode_pairs<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Append an already-encoded `query` to `url`.
///
/// The query lands before any `#fragment`, joined with `?` or `&` as the URL
/// requires.
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let (head, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (url, None),
    };
    let separator = match head.find('?') {
        None => "?",
        Some(_) if head.ends_with('?') || head.ends_with('&') => "",
        Some(_) => "&",
    };
    let mut out = format!("{}{}{}", head, separator, query);
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// A URL split into its signature base URI and its decoded query pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitUrl {
    /// `scheme://host[:port]/path`, scheme and host lowercase, default port
    /// omitted, no query or fragment.
    pub base: String,
    /// Query parameters in their original order.
    pub query: Vec<(String, String)>,
}

/// Split a URL for signing (RFC 5849 section 3.4.1.2).
///
/// # Errors
///
/// [`OAuthError::Encoding`] if the URL does not parse, is not http(s), has no
/// host, or its query does not decode to UTF-8.
pub fn split_url(raw: &str) -> Result<SplitUrl, OAuthError> {
    let url = Url::parse(raw)
        .map_err(|e| OAuthError::Encoding(format!("invalid URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(OAuthError::Encoding(format!(
                "unsupported URL scheme '{}'",
                other
            )))
        }
    }

    let host = url
        .host_str()
        .ok_or_else(|| OAuthError::Encoding(format!("URL '{}' has no host", raw)))?;

    let mut base = format!("{}://{}", url.scheme(), host.to_ascii_lowercase());
    // `port()` is None when the port is the scheme default.
    if let Some(port) = url.port() {
        base.push_str(&format!(":{}", port));
    }
    base.push_str(url.path());

    let query = match url.query() {
        Some(q) => parse_form(q)?,
        None => Vec::new(),
    };

    Ok(SplitUrl { base, query })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreserved_characters_pass_through() {
        assert_eq!(percent_encode("AZaz09-._~"), "AZaz09-._~");
    }

    #[test]
    fn reserved_characters_are_escaped() {
        assert_eq!(percent_encode("hello world"), "hello%20world");
        assert_eq!(percent_encode("foo=bar&baz"), "foo%3Dbar%26baz");
        assert_eq!(percent_encode("a+b*c!"), "a%2Bb%2Ac%21");
        assert_eq!(percent_encode("/:?#"), "%2F%3A%3F%23");
    }

    #[test]
    fn multibyte_characters_encode_each_byte_uppercase() {
        assert_eq!(percent_encode("é"), "%C3%A9");
        assert_eq!(percent_encode("☃"), "%E2%98%83");
    }

    #[test]
    fn form_decode_handles_plus_and_escapes() {
        assert_eq!(form_decode("a+b%21").expect("decode"), "a b!");
        assert_eq!(form_decode("%E2%98%83").expect("decode"), "☃");
    }

    #[test]
    fn form_decode_rejects_invalid_utf8() {
        let err = form_decode("%FF%FE").unwrap_err();
        assert!(matches!(err, OAuthError::Encoding(_)));
    }

    #[test]
    fn parse_form_keeps_order_and_duplicates() {
        let pairs = parse_form("b=2&a=1&b=1&flag").expect("parse");
        assert_eq!(
            pairs,
            vec![
                ("b".to_string(), "2".to_string()),
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "1".to_string()),
                ("flag".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn parse_form_skips_empty_segments() {
        assert!(parse_form("").expect("parse").is_empty());
        assert_eq!(parse_form("&&a=1&").expect("parse").len(), 1);
    }

    #[test]
    fn encode_pairs_joins_encoded() {
        let encoded = encode_pairs([("status", "hi there"), ("x", "1&2")]);
        assert_eq!(encoded, "status=hi%20there&x=1%262");
    }

    #[test]
    fn split_url_normalizes_scheme_host_and_port() {
        let split = split_url("HTTPS://API.Example.COM:443/1.1/Statuses?count=5").expect("split");
        assert_eq!(split.base, "https://api.example.com/1.1/Statuses");
        assert_eq!(split.query, vec![("count".to_string(), "5".to_string())]);
    }

    #[test]
    fn split_url_keeps_non_default_port() {
        let split = split_url("http://localhost:8080/oauth/request_token").expect("split");
        assert_eq!(split.base, "http://localhost:8080/oauth/request_token");
    }

    #[test]
    fn split_url_drops_fragment() {
        let split = split_url("https://example.com/a#frag").expect("split");
        assert_eq!(split.base, "https://example.com/a");
        assert!(split.query.is_empty());
    }

    #[test]
    fn append_query_picks_separator() {
        assert_eq!(append_query("https://example.com/a", "x=1"), "https://example.com/a?x=1");
        assert_eq!(append_query("https://example.com/a?y=2", "x=1"), "https://example.com/a?y=2&x=1");
        assert_eq!(append_query("https://example.com/a?", "x=1"), "https://example.com/a?x=1");
        assert_eq!(append_query("https://example.com/a", ""), "https://example.com/a");
    }

    #[test]
    fn append_query_goes_before_fragment() {
        assert_eq!(
            append_query("https://example.com/a#frag", "x=1"),
            "https://example.com/a?x=1#frag"
        );
        assert_eq!(
            append_query("https://example.com/a?y=2#frag?z", "x=1"),
            "https://example.com/a?y=2&x=1#frag?z"
        );

        let split = split_url(&append_query("https://example.com/a#frag", "x=1")).expect("split");
        assert_eq!(split.base, "https://example.com/a");
        assert_eq!(split.query, vec![("x".to_string(), "1".to_string())]);
    }

    #[test]
    fn split_url_rejects_garbage() {
        assert!(split_url("not a url").is_err());
        assert!(split_url("ftp://example.com/file").is_err());
        assert!(split_url("https://example.com/?q=%FF").is_err());
    }
}
