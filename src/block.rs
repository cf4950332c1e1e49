use serde::{Serialize, Serializer};

/// Style flags on a rich text span. Flags combine freely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Annotations {
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub code: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl Annotations {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::default()
        }
    }

    pub fn strikethrough() -> Self {
        Self {
            strikethrough: true,
            ..Self::default()
        }
    }

    pub fn code() -> Self {
        Self {
            code: true,
            ..Self::default()
        }
    }
}

/// One styled run of text, as Notion expects in a `rich_text` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichTextSpan {
    pub content: String,
    pub annotations: Option<Annotations>,
    /// Only set for link spans
    pub href: Option<String>,
}

impl RichTextSpan {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            annotations: None,
            href: None,
        }
    }

    pub fn styled(content: impl Into<String>, annotations: Annotations) -> Self {
        Self {
            content: content.into(),
            annotations: Some(annotations),
            href: None,
        }
    }

    pub fn link(content: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            annotations: None,
            href: Some(href.into()),
        }
    }
}

/// A collapsible block: a plain question label with an optional answer paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleBlock {
    pub question: String,
    /// `None` means no nested paragraph at all, which Notion renders
    /// differently from a paragraph with no text.
    pub answer_spans: Option<Vec<RichTextSpan>>,
}

impl ToggleBlock {
    pub fn has_children(&self) -> bool {
        self.answer_spans.is_some()
    }
}

// Wire format

#[derive(Serialize)]
struct WireLink<'a> {
    url: &'a str,
}

#[derive(Serialize)]
struct WireText<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<WireLink<'a>>,
}

#[derive(Serialize)]
struct WireSpan<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: WireText<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    annotations: Option<&'a Annotations>,
}

impl Serialize for RichTextSpan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireSpan {
            kind: "text",
            text: WireText {
                content: &self.content,
                link: self.href.as_deref().map(|url| WireLink { url }),
            },
            annotations: self.annotations.as_ref(),
        }
        .serialize(serializer)
    }
}

#[derive(Serialize)]
struct WireRichText<'a> {
    rich_text: &'a [RichTextSpan],
}

#[derive(Serialize)]
struct WireParagraph<'a> {
    object: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    paragraph: WireRichText<'a>,
}

#[derive(Serialize)]
struct WireToggleBody<'a> {
    rich_text: [RichTextSpan; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<[WireParagraph<'a>; 1]>,
}

#[derive(Serialize)]
struct WireToggle<'a> {
    object: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    toggle: WireToggleBody<'a>,
}

impl Serialize for ToggleBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let children = self.answer_spans.as_deref().map(|spans| {
            [WireParagraph {
                object: "block",
                kind: "paragraph",
                paragraph: WireRichText { rich_text: spans },
            }]
        });

        WireToggle {
            object: "block",
            kind: "toggle",
            toggle: WireToggleBody {
                rich_text: [RichTextSpan::plain(self.question.as_str())],
                children,
            },
        }
        .serialize(serializer)
    }
}
