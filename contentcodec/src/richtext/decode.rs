//! HTML → block tree.
//!
//! Only the vocabulary [`super::encode`] produces is understood. Block elements are located
//! with a depth-aware tag scan; inline content is tokenized on tag boundaries and `~~`
//! markers while a stack of open tags supplies the style flags of each text run.
//! Nothing here fails: foreign tags are ignored and unbalanced openers read as text.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::Value;

use super::{Block, Inline, ListFormat, Marks, TextLeaf};

lazy_static! {
    static ref TAG: Regex = Regex::new(r"(?i)<(/?)([a-z][a-z0-9]*)\b([^>]*)>").unwrap();
    static ref WHOLE_TAG: Regex = Regex::new(r"(?i)^<(/?)([a-z][a-z0-9]*)\b([^>]*)>$").unwrap();
    static ref INLINE_TOKEN: Regex = Regex::new(r"<[^>]*>|~~").unwrap();
    static ref ATTRIBUTE: Regex =
        Regex::new(r#"([a-zA-Z][a-zA-Z0-9_:-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap();
    static ref ENTITY: Regex = Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap();
}

/// Decodes HTML into typed blocks.
pub fn decode(html: &str) -> Vec<Block> {
    parse_blocks(html)
}

/// Decodes HTML into the JSON block tree the repository stores.
pub fn decode_to_value(html: &str) -> Value {
    serde_json::to_value(decode(html)).unwrap_or_else(|_| Value::Array(Vec::new()))
}

fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "ul" | "ol" | "blockquote" | "pre" | "img"
    )
}

enum Segment<'a> {
    Loose(String),
    Element {
        name: String,
        attrs: &'a str,
        inner: &'a str,
    },
}

/// Splits `html` into the top-level elements accepted by `is_target` and the loose content
/// between them. Consecutive loose runs are joined.
fn scan<'a>(html: &'a str, is_target: impl Fn(&str) -> bool) -> Vec<Segment<'a>> {
    let mut segments = Vec::new();
    let mut loose = String::new();
    let mut pos = 0;

    while pos < html.len() {
        let opener = TAG.captures_iter(&html[pos..]).find(|caps| {
            caps[1].is_empty() && is_target(&caps[2].to_ascii_lowercase())
        });
        let Some(caps) = opener else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        let start = pos + whole.start();
        let open_end = pos + whole.end();
        let name = caps[2].to_ascii_lowercase();
        let attrs = caps.get(3).map_or("", |m| m.as_str());

        loose.push_str(&html[pos..start]);

        if name == "img" || attrs.trim_end().ends_with('/') {
            flush(&mut loose, &mut segments);
            segments.push(Segment::Element {
                name,
                attrs,
                inner: "",
            });
            pos = open_end;
            continue;
        }

        match find_close(html, open_end, &name) {
            Some((inner_end, close_end)) => {
                flush(&mut loose, &mut segments);
                segments.push(Segment::Element {
                    name,
                    attrs,
                    inner: &html[open_end..inner_end],
                });
                pos = close_end;
            }
            // Unbalanced opener: drop the tag, keep what follows as loose content.
            None => pos = open_end,
        }
    }

    if pos < html.len() {
        loose.push_str(&html[pos..]);
    }
    flush(&mut loose, &mut segments);
    segments
}

fn flush(loose: &mut String, segments: &mut Vec<Segment<'_>>) {
    if !loose.is_empty() {
        segments.push(Segment::Loose(std::mem::take(loose)));
    }
}

/// Finds the `</name>` balancing an opener that ended at `from`.
/// Returns the start of the closing tag and the offset just past it.
fn find_close(html: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    for caps in TAG.captures_iter(&html[from..]) {
        if !caps[2].eq_ignore_ascii_case(name) {
            continue;
        }
        let whole = caps.get(0)?;
        if caps[1].is_empty() {
            if !caps[3].trim_end().ends_with('/') {
                depth += 1;
            }
        } else {
            depth -= 1;
            if depth == 0 {
                return Some((from + whole.start(), from + whole.end()));
            }
        }
    }
    None
}

fn parse_blocks(html: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    for segment in scan(html, is_block_tag) {
        match segment {
            Segment::Loose(text) => {
                if has_text(&text) {
                    blocks.push(Block::Paragraph {
                        children: non_empty(parse_inline(&text)),
                    });
                }
            }
            Segment::Element { name, attrs, inner } => blocks.push(block_element(&name, attrs, inner)),
        }
    }
    blocks
}

fn block_element(name: &str, attrs: &str, inner: &str) -> Block {
    match name {
        "ul" | "ol" => Block::List {
            format: if name == "ol" {
                ListFormat::Ordered
            } else {
                ListFormat::Unordered
            },
            children: parse_list_items(inner),
        },
        "blockquote" => Block::Quote {
            children: parse_blocks(inner),
        },
        "pre" => Block::Code {
            children: vec![Inline::text(plain_text(inner))],
        },
        "img" => Block::Image {
            url: attribute(attrs, "src").unwrap_or_default(),
            alt: attribute(attrs, "alt").unwrap_or_default(),
        },
        heading if heading.len() == 2 && heading.starts_with('h') => Block::Heading {
            level: heading[1..].parse().unwrap_or(1),
            children: non_empty(parse_inline(inner)),
        },
        _ => Block::Paragraph {
            children: non_empty(parse_inline(inner)),
        },
    }
}

fn parse_list_items(html: &str) -> Vec<Block> {
    scan(html, |name| name == "li")
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Element { inner, .. } => Some(Block::ListItem {
                children: non_empty(parse_inline(inner)),
            }),
            Segment::Loose(text) if has_text(&text) => Some(Block::ListItem {
                children: non_empty(parse_inline(&text)),
            }),
            Segment::Loose(_) => None,
        })
        .collect()
}

/// Text-bearing blocks always carry at least one (possibly empty) text node.
fn non_empty(children: Vec<Inline>) -> Vec<Inline> {
    if children.is_empty() {
        vec![Inline::text("")]
    } else {
        children
    }
}

/// Whether loose content carries anything besides markup and whitespace.
fn has_text(html: &str) -> bool {
    !plain_text(html).trim().is_empty()
}

fn plain_text(html: &str) -> String {
    unescape(&TAG.replace_all(html, "")).into_owned()
}

/// Value of attribute `name`. Attributes are scanned left to right so quoted values are
/// never mistaken for attribute names.
fn attribute(attrs: &str, name: &str) -> Option<String> {
    ATTRIBUTE
        .captures_iter(attrs)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str().to_string()))
        .map(|value| unescape(&value).into_owned())
}

/// Canonical name of an inline formatting tag, folding the HTML aliases.
fn inline_mark(name: &str) -> Option<&'static str> {
    match name {
        "strong" | "b" => Some("strong"),
        "em" | "i" => Some("em"),
        "u" => Some("u"),
        "code" => Some("code"),
        "del" | "s" | "strike" => Some("del"),
        "a" => Some("a"),
        _ => None,
    }
}

struct InlineParser {
    out: Vec<Inline>,
    open: Vec<&'static str>,
    link: Option<(String, Vec<Inline>)>,
    /// `<a>` openers seen inside a link; their closers are skipped.
    nested_links: usize,
    strike: bool,
}

impl InlineParser {
    fn marks(&self) -> Marks {
        Marks {
            bold: self.open.contains(&"strong"),
            italic: self.open.contains(&"em"),
            underline: self.open.contains(&"u"),
            code: self.open.contains(&"code"),
            strikethrough: self.strike || self.open.contains(&"del"),
        }
    }

    fn push_run(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let node = Inline::Text(TextLeaf::new(unescape(raw), self.marks()));
        match &mut self.link {
            Some((_, children)) => children.push(node),
            None => self.out.push(node),
        }
    }

    fn open_tag(&mut self, name: &str, attrs: &str) {
        if name == "br" {
            self.push_run("\n");
            return;
        }
        match inline_mark(name) {
            Some("a") => {
                if self.link.is_none() {
                    let url = attribute(attrs, "href").unwrap_or_default();
                    self.link = Some((url, Vec::new()));
                    self.open.push("a");
                } else {
                    self.nested_links += 1;
                }
            }
            Some(mark) => self.open.push(mark),
            None => {}
        }
    }

    fn close_tag(&mut self, name: &str) {
        let Some(mark) = inline_mark(name) else {
            return;
        };
        if mark == "a" && self.nested_links > 0 {
            self.nested_links -= 1;
            return;
        }
        if !self.open.contains(&mark) {
            return;
        }
        while let Some(popped) = self.open.pop() {
            if popped == "a" {
                self.finish_link();
            }
            if popped == mark {
                break;
            }
        }
    }

    fn finish_link(&mut self) {
        self.nested_links = 0;
        if let Some((url, children)) = self.link.take() {
            self.out.push(Inline::Link { url, children });
        }
    }

    fn finish(mut self) -> Vec<Inline> {
        // An unclosed link contributes its content as plain inline nodes.
        if let Some((_, children)) = self.link.take() {
            self.out.extend(children);
        }
        self.out
    }
}

fn parse_inline(html: &str) -> Vec<Inline> {
    let mut parser = InlineParser {
        out: Vec::new(),
        open: Vec::new(),
        link: None,
        nested_links: 0,
        strike: false,
    };

    let mut last = 0;
    for token in INLINE_TOKEN.find_iter(html) {
        parser.push_run(&html[last..token.start()]);
        last = token.end();

        let raw = token.as_str();
        if raw == "~~" {
            parser.strike = !parser.strike;
            continue;
        }
        match WHOLE_TAG.captures(raw) {
            Some(caps) => {
                let name = caps[2].to_ascii_lowercase();
                if caps[1].is_empty() {
                    parser.open_tag(&name, &caps[3]);
                } else {
                    parser.close_tag(&name);
                }
            }
            None => parser.push_run(raw),
        }
    }
    parser.push_run(&html[last..]);
    parser.finish()
}

/// Resolves character references in a single pass, so `&amp;lt;` becomes `&lt;`.
fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    ENTITY.replace_all(text, |caps: &Captures| {
        let entity = &caps[1];
        let resolved = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => {
                if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok().and_then(char::from_u32)
                } else {
                    None
                }
            }
        };
        match resolved {
            Some(ch) => ch.to_string(),
            None => caps[0].to_string(),
        }
    })
}
