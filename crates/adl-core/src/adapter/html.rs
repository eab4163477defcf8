//! Minimal HTML scanning for link extraction. Not a parser: start tags and
//! quoted attribute values only.

use std::sync::LazyLock;

use regex::Regex;

static START_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<([a-z][a-z0-9-]*)\b((?:[^>'\x22]|'[^']*'|\x22[^\x22]*\x22)*)>")
        .expect("valid regex")
});
static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:][a-z0-9_:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("valid regex")
});
static ANCHOR_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</a\s*>").expect("valid regex"));
static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// One start tag found in the document.
#[derive(Debug)]
pub(super) struct StartTag<'a> {
    pub name: String,
    attrs: &'a str,
    /// Byte offset just past the closing `>`.
    pub end: usize,
}

impl StartTag<'_> {
    /// Decoded value of attribute `name` (case-insensitive).
    pub fn attr(&self, name: &str) -> Option<String> {
        ATTR.captures_iter(self.attrs).find_map(|c| {
            let key = c.get(1)?.as_str();
            if !key.eq_ignore_ascii_case(name) {
                return None;
            }
            let raw = c.get(2).or_else(|| c.get(3)).or_else(|| c.get(4))?.as_str();
            Some(decode_entities(raw.trim()))
        })
    }
}

pub(super) fn start_tags(html: &str) -> impl Iterator<Item = StartTag<'_>> {
    START_TAG.captures_iter(html).filter_map(|c| {
        let whole = c.get(0)?;
        Some(StartTag {
            name: c.get(1)?.as_str().to_ascii_lowercase(),
            attrs: c.get(2).map_or("", |m| m.as_str()),
            end: whole.end(),
        })
    })
}

/// Visible text of an `<a>` element whose start tag ends at `from`.
pub(super) fn anchor_text(html: &str, from: usize) -> String {
    let rest = &html[from..];
    let inner = match ANCHOR_END.find(rest) {
        Some(m) => &rest[..m.start()],
        None => "",
    };
    let text = ANY_TAG.replace_all(inner, " ");
    let text = decode_entities(&text);
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

pub(super) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
