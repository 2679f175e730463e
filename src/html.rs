//! Minimal HTML scanning used by the email parsers and the page snapshot driver.
//!
//! Markup is treated as text: elements are located by tag name with nesting of
//! the same tag taken into account, attributes are read with a regex, and text
//! content is recovered by skipping tags and decoding the common entities.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ATTRIBUTE: Regex =
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
            .expect("attribute pattern");
}

/// One element of the document: its attributes and the markup between its tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element<'a> {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    /// Markup between the opening and closing tag; empty for void elements.
    pub inner: &'a str,
    /// Byte offset of the opening `<`.
    pub start: usize,
    /// Byte offset just past the closing tag.
    pub end: usize,
}

impl<'a> Element<'a> {
    /// Attribute value by case-insensitive name. Bare attributes yield `""`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Whitespace-separated classes contain `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Visible text of the element.
    pub fn text(&self) -> String {
        text(self.inner)
    }

    /// Child elements named `tag` at any depth.
    pub fn find_all(&self, tag: &str) -> Vec<Element<'a>> {
        find_all(self.inner, tag)
    }
}

const VOID_ELEMENTS: [&str; 8] = ["img", "input", "br", "hr", "meta", "link", "source", "wbr"];

/// Every element named `tag`, in document order.
///
/// Nested elements of the same name are returned too, after their parent.
pub fn find_all<'a>(html: &'a str, tag: &str) -> Vec<Element<'a>> {
    let lower = html.to_ascii_lowercase();
    let tag = tag.to_ascii_lowercase();
    let open = format!("<{tag}");
    let is_void = VOID_ELEMENTS.contains(&tag.as_str());

    let mut elements = Vec::new();
    let mut from = 0;
    while let Some(found) = lower[from..].find(&open) {
        let start = from + found;
        from = start + open.len();

        if !is_tag_boundary(lower.as_bytes().get(from).copied()) {
            continue;
        }

        let Some(open_end) = tag_end(html, start) else {
            break;
        };
        let attrs = parse_attributes(&html[from..open_end - 1]);
        let self_closing = html[..open_end - 1].ends_with('/');

        if is_void || self_closing {
            elements.push(Element {
                name: tag.clone(),
                attrs,
                inner: "",
                start,
                end: open_end,
            });
            continue;
        }

        match closing_tag(&lower, &tag, open_end) {
            Some((inner_end, end)) => elements.push(Element {
                name: tag.clone(),
                attrs,
                inner: &html[open_end..inner_end],
                start,
                end,
            }),
            None => elements.push(Element {
                name: tag.clone(),
                attrs,
                inner: &html[open_end..],
                start,
                end: html.len(),
            }),
        }
    }

    elements
}

/// First element named `tag`.
pub fn find_first<'a>(html: &'a str, tag: &str) -> Option<Element<'a>> {
    find_all(html, tag).into_iter().next()
}

/// Innermost element named `tag` whose markup spans `offset`.
pub fn enclosing<'a>(html: &'a str, tag: &str, offset: usize) -> Option<Element<'a>> {
    find_all(html, tag)
        .into_iter()
        .filter(|element| element.start <= offset && offset < element.end)
        .min_by_key(|element| element.end - element.start)
}

fn is_tag_boundary(byte: Option<u8>) -> bool {
    matches!(byte, None | Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r'))
}

/// Offset just past the `>` closing the tag opened at `start`, honouring quotes.
fn tag_end(html: &str, start: usize) -> Option<usize> {
    let bytes = html.as_bytes();
    let mut in_single = false;
    let mut in_double = false;
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' if !in_double => in_single = !in_single,
            b'"' if !in_single => in_double = !in_double,
            b'>' if !in_single && !in_double => return Some(i + 1),
            _ => {}
        }
        i += 1;
    }
    None
}

/// `(inner_end, end)` of the closing tag matching an element opened before `from`.
fn closing_tag(lower: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let open = format!("<{tag}");
    let close = format!("</{tag}");
    let mut depth = 1;
    let mut cursor = from;

    loop {
        let next_close = lower[cursor..].find(&close).map(|i| cursor + i)?;
        let next_open = lower[cursor..]
            .find(&open)
            .map(|i| cursor + i)
            .filter(|i| *i < next_close)
            .filter(|i| is_tag_boundary(lower.as_bytes().get(i + open.len()).copied()));

        match next_open {
            Some(open_at) => {
                depth += 1;
                cursor = open_at + open.len();
            }
            None => {
                depth -= 1;
                let end = lower[next_close..]
                    .find('>')
                    .map(|i| next_close + i + 1)
                    .unwrap_or(lower.len());
                if depth == 0 {
                    return Some((next_close, end));
                }
                cursor = end;
            }
        }
    }
}

fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    ATTRIBUTE
        .captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            Some((name, value))
        })
        .collect()
}

/// Decode the handful of entities that show up in retailer emails.
pub fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&times;", "×")
        .replace("&amp;", "&")
}

/// Collapse whitespace runs into single spaces and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Visible text of a fragment: tags and comments dropped, entities decoded.
///
/// Adjacent tags are treated as word breaks so `<td>A</td><td>B</td>` reads `A B`.
pub fn text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        let tail = &rest[lt..];
        if let Some(comment) = tail.strip_prefix("<!--") {
            rest = comment.find("-->").map(|i| &comment[i + 3..]).unwrap_or("");
            continue;
        }
        let lower = tail.get(..8).unwrap_or(tail).to_ascii_lowercase();
        if lower.starts_with("<style") || lower.starts_with("<script") {
            let name = if lower.starts_with("<style") { "</style" } else { "</script" };
            let lowered = tail.to_ascii_lowercase();
            rest = match lowered.find(name) {
                Some(i) => tail[i..].find('>').map(|j| &tail[i + j + 1..]).unwrap_or(""),
                None => "",
            };
            continue;
        }
        out.push(' ');
        rest = match tag_end(tail, 0) {
            Some(end) => &tail[end..],
            None => "",
        };
    }
    out.push_str(rest);

    normalize_ws(&decode_entities(&out))
}
