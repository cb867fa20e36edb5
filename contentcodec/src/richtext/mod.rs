//! Rich-text block tree and its HTML form.
//!
//! The repository stores formatted text as a JSON tree of [`Block`]s; the translation
//! vendor works on HTML. [`encode`] and [`decode`] convert between the two. The encoder
//! nests inline marks in one canonical order (`code`, `strong`, `em`, `u`, innermost last)
//! and writes strikethrough as `~~text~~`, so `encode(decode(html))` is a fixed point.

pub mod decode;
pub mod encode;

use serde::{Deserialize, Serialize};

pub use decode::{decode, decode_to_value};
pub use encode::{encode, encode_value};

/// A block-level node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Block {
    Paragraph {
        children: Vec<Inline>,
    },
    Heading {
        level: u8,
        children: Vec<Inline>,
    },
    List {
        format: ListFormat,
        children: Vec<Block>,
    },
    ListItem {
        children: Vec<Inline>,
    },
    Quote {
        children: Vec<Block>,
    },
    Code {
        children: Vec<Inline>,
    },
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        alt: String,
    },
}

impl Block {
    pub fn paragraph(children: Vec<Inline>) -> Self {
        Block::Paragraph { children }
    }

    pub fn heading(level: u8, children: Vec<Inline>) -> Self {
        Block::Heading { level, children }
    }

    pub fn list(format: ListFormat, items: Vec<Vec<Inline>>) -> Self {
        Block::List {
            format,
            children: items
                .into_iter()
                .map(|children| Block::ListItem { children })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListFormat {
    Ordered,
    Unordered,
}

/// An inline node: styled text or a link around styled text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Inline {
    Text(TextLeaf),
    Link { url: String, children: Vec<Inline> },
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text(TextLeaf::plain(text))
    }

    pub fn styled(text: impl Into<String>, marks: Marks) -> Self {
        Inline::Text(TextLeaf::new(text, marks))
    }

    pub fn link(url: impl Into<String>, children: Vec<Inline>) -> Self {
        Inline::Link {
            url: url.into(),
            children,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextLeaf {
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strikethrough: bool,
}

impl TextLeaf {
    pub fn new(text: impl Into<String>, marks: Marks) -> Self {
        TextLeaf {
            text: text.into(),
            bold: marks.bold,
            italic: marks.italic,
            underline: marks.underline,
            code: marks.code,
            strikethrough: marks.strikethrough,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Marks::default())
    }

    pub fn marks(&self) -> Marks {
        Marks {
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            code: self.code,
            strikethrough: self.strikethrough,
        }
    }
}

/// The style flag set of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub code: bool,
    pub strikethrough: bool,
}

impl Marks {
    pub fn bold() -> Self {
        Marks {
            bold: true,
            ..Marks::default()
        }
    }

    pub fn italic() -> Self {
        Marks {
            italic: true,
            ..Marks::default()
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Marks::default()
    }
}
