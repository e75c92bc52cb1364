//! HTML cleanup and link extraction.
//!
//! This is deliberately regex based rather than a full HTML parser: the
//! crawler only needs the visible text of a page and the `href` of its
//! anchors, and malformed markup degrades to slightly noisier text instead of
//! a failed page.
//!
//! # Examples
//!
//! ```
//! use stemdex::crawler::html;
//!
//! let page = r#"<html><head><title>skip</title></head>
//! <body><p>Hello &amp; <a href="../docs/#top">welcome</a></p></body></html>"#;
//!
//! assert_eq!(
//!     html::extract_links("https://Example.com/a/b/index.html", page),
//!     vec!["https://example.com/a/docs/"]
//! );
//! assert_eq!(
//!     html::strip_markup(page).split_whitespace().collect::<Vec<_>>(),
//!     vec!["Hello", "&", "welcome"]
//! );
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));

// The regex crate has no backreferences, so each element gets its own branch.
static BLOCK_ELEMENTS: LazyLock<Regex> = LazyLock::new(|| {
    let branches: Vec<String> = ["head", "style", "script", "noscript", "svg"]
        .iter()
        .map(|name| format!(r"<{name}\b[^>]*>.*?</{name}\s*>"))
        .collect();
    Regex::new(&format!("(?is){}", branches.join("|"))).expect("block pattern is valid")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);").expect("entity pattern is valid")
});

static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("anchor pattern is valid")
});

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").expect("scheme pattern is valid"));

/// Remove comments and the `head`, `style`, `script`, `noscript` and `svg`
/// elements together with their content.
pub fn strip_block_elements(html: &str) -> String {
    let without_comments = COMMENT.replace_all(html, " ");
    BLOCK_ELEMENTS
        .replace_all(&without_comments, " ")
        .into_owned()
}

/// Replace every tag with a space.
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, " ").into_owned()
}

/// Decode common entities and replace the rest with a space.
pub fn strip_entities(html: &str) -> String {
    ENTITY
        .replace_all(html, |caps: &Captures| decode_entity(&caps[1]))
        .into_owned()
}

fn decode_entity(name: &str) -> String {
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => name
            .strip_prefix("#x")
            .or_else(|| name.strip_prefix("#X"))
            .map(|hex| u32::from_str_radix(hex, 16))
            .or_else(|| name.strip_prefix('#').map(str::parse::<u32>))
            .and_then(|code| code.ok())
            .and_then(char::from_u32),
    };

    decoded.map_or_else(|| " ".to_string(), String::from)
}

/// Reduce a page to its visible text.
pub fn strip_markup(html: &str) -> String {
    strip_entities(&strip_tags(&strip_block_elements(html)))
}

/// Absolute, normalized `http`/`https` targets of every anchor in `html`, in
/// document order.
///
/// Relative links are resolved against `base`. Links that do not resolve to
/// an `http` or `https` URL (such as `mailto:` or `javascript:`) are left out.
pub fn extract_links(base: &str, html: &str) -> Vec<String> {
    let Some(base) = ParsedUrl::parse(base) else {
        return Vec::new();
    };

    ANCHOR_HREF
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .filter_map(|href| base.join(&href.as_str().replace("&amp;", "&")))
        .collect()
}

/// Normalize an absolute `http`/`https` URL.
///
/// The fragment is dropped, scheme and host are lower-cased, dot segments
/// are removed and an empty path becomes `/`. Returns `None` for anything
/// else.
///
/// ```
/// use stemdex::crawler::html::normalize_url;
///
/// assert_eq!(
///     normalize_url("HTTP://Example.COM/a/./b/../c#frag").as_deref(),
///     Some("http://example.com/a/c")
/// );
/// assert_eq!(normalize_url("ftp://example.com/"), None);
/// ```
pub fn normalize_url(url: &str) -> Option<String> {
    ParsedUrl::parse(url).map(|parsed| parsed.to_string())
}

/// An absolute http(s) URL split into the parts resolution needs.
#[derive(Debug, Clone, PartialEq)]
struct ParsedUrl {
    scheme: String,
    authority: String,
    path: String,
    query: Option<String>,
}

impl ParsedUrl {
    fn parse(url: &str) -> Option<Self> {
        let url = url.trim();
        let (scheme, rest) = url.split_once("://")?;
        let scheme = scheme.to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return None;
        }

        let rest = strip_fragment(rest);
        let end = rest.find(['/', '?']).unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(end);
        if authority.is_empty() {
            return None;
        }
        let (path, query) = split_query(tail);

        let parsed = ParsedUrl {
            scheme,
            authority: lowercase_host(authority),
            path: remove_dot_segments(path),
            query,
        };

        // Final syntax check against the HTTP client's own URI grammar.
        parsed.to_string().parse::<ureq::http::Uri>().ok()?;
        Some(parsed)
    }

    /// Resolve `reference` against this URL.
    fn join(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();

        if SCHEME.is_match(reference) {
            return normalize_url(reference);
        }
        if let Some(network_path) = reference.strip_prefix("//") {
            return normalize_url(&format!("{}://{network_path}", self.scheme));
        }

        let (path, query) = split_query(strip_fragment(reference));
        let (path, query) = if path.is_empty() {
            (self.path.clone(), query.or_else(|| self.query.clone()))
        } else if path.starts_with('/') {
            (path.to_string(), query)
        } else {
            let directory = &self.path[..=self.path.rfind('/').unwrap_or(0)];
            (format!("{directory}{path}"), query)
        };

        let resolved = ParsedUrl {
            scheme: self.scheme.clone(),
            authority: self.authority.clone(),
            path: remove_dot_segments(&path),
            query,
        };
        normalize_url(&resolved.to_string())
    }
}

impl std::fmt::Display for ParsedUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

fn strip_fragment(reference: &str) -> &str {
    reference.split_once('#').map_or(reference, |(before, _)| before)
}

fn split_query(reference: &str) -> (&str, Option<String>) {
    match reference.split_once('?') {
        Some((path, query)) => (path, Some(query.to_string())),
        None => (reference, None),
    }
}

/// Lower-case the host and port, leaving any userinfo alone.
fn lowercase_host(authority: &str) -> String {
    match authority.rsplit_once('@') {
        Some((userinfo, host)) => format!("{userinfo}@{}", host.to_ascii_lowercase()),
        None => authority.to_ascii_lowercase(),
    }
}

/// Collapse `.` and `..` segments of an absolute path. An empty path
/// becomes `/`.
fn remove_dot_segments(path: &str) -> String {
    let mut output: Vec<&str> = Vec::new();
    let mut segments = path.trim_start_matches('/').split('/').peekable();

    while let Some(segment) = segments.next() {
        let last = segments.peek().is_none();
        match segment {
            "." => {
                if last {
                    output.push("");
                }
            }
            ".." => {
                output.pop();
                if last {
                    output.push("");
                }
            }
            segment => output.push(segment),
        }
    }

    format!("/{}", output.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_compile() {
        LazyLock::force(&COMMENT);
        LazyLock::force(&BLOCK_ELEMENTS);
        LazyLock::force(&TAG);
        LazyLock::force(&ENTITY);
        LazyLock::force(&ANCHOR_HREF);
        LazyLock::force(&SCHEME);
    }

    #[test]
    fn test_strip_block_elements() {
        let html = "<HEAD><title>t</title></HEAD>keep<!-- note --><script type=\"x\">\
                    var a = '<b>';</script>this<style>p{}</style><noscript>no</noscript>\
                    <svg viewBox=\"0 0 1 1\"><text>art</text></svg><p>text</p>";
        let stripped = strip_block_elements(html);

        assert_eq!(
            stripped.split_whitespace().collect::<Vec<_>>(),
            vec!["keep", "this", "<p>text</p>"]
        );
    }

    #[test]
    fn test_strip_tags_leaves_word_boundaries() {
        assert_eq!(strip_tags("one<br>two<p class=\"x\">three</p>"), "one two three ");
    }

    #[test]
    fn test_strip_entities() {
        assert_eq!(strip_entities("a&amp;b &lt;c&gt;"), "a&b <c>");
        assert_eq!(strip_entities("caf&#233; &#x41;"), "café A");
        assert_eq!(strip_entities("x&copy;y &#xZZ;"), "x y &#xZZ;");
    }

    #[test]
    fn test_remove_dot_segments() {
        assert_eq!(remove_dot_segments(""), "/");
        assert_eq!(remove_dot_segments("/"), "/");
        assert_eq!(remove_dot_segments("/a/b/../c"), "/a/c");
        assert_eq!(remove_dot_segments("/a/./b/."), "/a/b/");
        assert_eq!(remove_dot_segments("/a/b/.."), "/a/");
        assert_eq!(remove_dot_segments("/../../x"), "/x");
        assert_eq!(remove_dot_segments("/a/b/"), "/a/b/");
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("https://EXAMPLE.com").as_deref(),
            Some("https://example.com/")
        );
        assert_eq!(
            normalize_url("http://example.com/Path?Q=1#x").as_deref(),
            Some("http://example.com/Path?Q=1")
        );
        assert_eq!(
            normalize_url("http://User@Example.com:8080/").as_deref(),
            Some("http://User@example.com:8080/")
        );
        assert_eq!(normalize_url("mailto:someone@example.com"), None);
        assert_eq!(normalize_url("http:///no-host"), None);
        assert_eq!(normalize_url("not a url"), None);
    }

    #[test]
    fn test_extract_links_resolution() {
        let base = "https://example.com/docs/guide/index.html?page=2";
        let html = r##"
            <a href="intro.html">relative</a>
            <A HREF='../api/'>up</A>
            <a class="x" href=/root.html>absolute path</a>
            <a href="//other.org">network path</a>
            <a href="#section">fragment only</a>
            <a href="?page=3">query only</a>
            <a href="mailto:me@example.com">mail</a>
            <a href="javascript:void(0)">js</a>
            <a href="https://Example.com/x/../y?a=1&amp;b=2#frag">absolute</a>
            <link href="style.css">
        "##;

        assert_eq!(
            extract_links(base, html),
            vec![
                "https://example.com/docs/guide/intro.html",
                "https://example.com/docs/api/",
                "https://example.com/root.html",
                "https://other.org/",
                "https://example.com/docs/guide/index.html?page=2",
                "https://example.com/docs/guide/index.html?page=3",
                "https://example.com/y?a=1&b=2",
            ]
        );
    }

    #[test]
    fn test_extract_links_bad_base() {
        assert!(extract_links("file:///tmp/a.html", "<a href=\"b.html\">b</a>").is_empty());
    }
}
