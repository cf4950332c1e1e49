use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::block::{Annotations, RichTextSpan};
use crate::error::Result;

/// Inline styles that wrap a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Style {
    Italic,
    Bold,
    Strikethrough,
    Link { href: String },
}

impl Style {
    /// Wrap `content` in a span carrying this style.
    fn apply(self, content: String) -> RichTextSpan {
        match self {
            Style::Italic => RichTextSpan::styled(content, Annotations::italic()),
            Style::Bold => RichTextSpan::styled(content, Annotations::bold()),
            Style::Strikethrough => RichTextSpan::styled(content, Annotations::strikethrough()),
            Style::Link { href } => RichTextSpan::link(content, href),
        }
    }
}

/// One unit of an inline markdown token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineToken {
    Text(String),
    Code(String),
    Open(Style),
    Close(Style),
    /// Anything the converter has no rule for (breaks, paragraph edges, ...)
    Other,
}

/// Turns a markdown string into a flat inline token stream.
pub trait InlineTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<InlineToken>>;
}

/// pulldown-cmark backed tokenizer with strikethrough enabled.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownTokenizer {
    options: Options,
}

impl Default for MarkdownTokenizer {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        Self { options }
    }
}

impl InlineTokenizer for MarkdownTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<InlineToken>> {
        let text = escape_block_syntax(text);
        let mut tokens: Vec<InlineToken> = Vec::new();
        // Image alt text is not part of the inline text
        let mut image_depth = 0usize;

        for event in Parser::new_ext(&text, self.options) {
            match event {
                Event::Start(Tag::Image { .. }) => image_depth += 1,
                Event::End(TagEnd::Image) => image_depth = image_depth.saturating_sub(1),
                _ if image_depth > 0 => {}
                event => push_event(event, &mut tokens),
            }
        }

        Ok(tokens)
    }
}

/// Backslash-escape whatever would open a block construct at the start of
/// a line, so the parser only ever sees paragraphs of inline markup.
/// Leading indentation is dropped so nothing becomes an indented code block.
fn escape_block_syntax(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let line = line.trim_start_matches([' ', '\t']);
        match block_marker_at(line) {
            Some(at) => {
                out.push_str(&line[..at]);
                out.push('\\');
                out.push_str(&line[at..]);
            }
            None => out.push_str(line),
        }
    }

    out
}

/// Byte offset of the character that makes `line` a block marker.
fn block_marker_at(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let first = *bytes.first()?;

    match first {
        b'#' | b'>' => Some(0),
        b'-' | b'+' | b'*' if ends_marker(bytes.get(1)) => Some(0),
        b'-' | b'=' | b'*' | b'_' if is_rule(line, first) => Some(0),
        b'`' | b'~' if is_fence(line, first) => Some(0),
        b'[' if is_link_definition(line) => Some(0),
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            match bytes.get(digits) {
                Some(b'.' | b')') if digits <= 9 && ends_marker(bytes.get(digits + 1)) => {
                    Some(digits)
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn ends_marker(next: Option<&u8>) -> bool {
    matches!(next, None | Some(b' ' | b'\t' | b'\r'))
}

/// Setext underline or thematic break: one repeated character, maybe spaced.
fn is_rule(line: &str, marker: u8) -> bool {
    line.trim_end()
        .bytes()
        .all(|b| b == marker || b == b' ' || b == b'\t')
}

fn is_fence(line: &str, marker: u8) -> bool {
    let run = line.bytes().take_while(|&b| b == marker).count();
    // A backtick info string cannot hold backticks, else it is a code span
    run >= 3 && (marker == b'~' || !line[run..].contains('`'))
}

fn is_link_definition(line: &str) -> bool {
    let Some(rest) = line.strip_prefix('[') else {
        return false;
    };
    match rest.find(']') {
        Some(end) if end > 0 => rest[end + 1..].starts_with(':'),
        _ => false,
    }
}

fn push_event(event: Event, tokens: &mut Vec<InlineToken>) {
    let token = match event {
        // Raw html is not interpreted, it stays literal text
        Event::Text(text) | Event::InlineHtml(text) | Event::Html(text) => {
            // Adjacent text events form a single token
            if let Some(InlineToken::Text(prev)) = tokens.last_mut() {
                prev.push_str(&text);
                return;
            }
            InlineToken::Text(text.into_string())
        }
        Event::Code(code) => InlineToken::Code(code.into_string()),

        Event::Start(Tag::Emphasis) => InlineToken::Open(Style::Italic),
        Event::End(TagEnd::Emphasis) => InlineToken::Close(Style::Italic),
        Event::Start(Tag::Strong) => InlineToken::Open(Style::Bold),
        Event::End(TagEnd::Strong) => InlineToken::Close(Style::Bold),
        Event::Start(Tag::Strikethrough) => InlineToken::Open(Style::Strikethrough),
        Event::End(TagEnd::Strikethrough) => InlineToken::Close(Style::Strikethrough),

        Event::Start(Tag::Link { dest_url, .. }) => InlineToken::Open(Style::Link {
            href: dest_url.into_string(),
        }),
        Event::End(TagEnd::Link) => match open_link_href(tokens) {
            Some(href) => InlineToken::Close(Style::Link { href }),
            None => InlineToken::Other,
        },

        _ => InlineToken::Other,
    };
    tokens.push(token);
}

/// Find the href of the most recent link opener, for its matching close.
fn open_link_href(tokens: &[InlineToken]) -> Option<String> {
    tokens.iter().rev().find_map(|token| match token {
        InlineToken::Open(Style::Link { href }) => Some(href.clone()),
        _ => None,
    })
}

#[derive(Debug)]
enum State {
    Default,
    AwaitingStyledText(Style),
}

/// Converts inline markdown into Notion rich text spans.
///
/// Styling is single level only: an opener must be directly followed by
/// its text. Whatever token follows an opener is consumed with it, so an
/// opener followed by anything other than text emits nothing for the pair.
#[derive(Debug, Clone, Default)]
pub struct InlineConverter<T = MarkdownTokenizer> {
    tokenizer: T,
}

impl InlineConverter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: InlineTokenizer> InlineConverter<T> {
    pub fn with_tokenizer(tokenizer: T) -> Self {
        Self { tokenizer }
    }

    /// Tokenize `text` and convert the tokens into spans.
    pub fn convert(&self, text: &str) -> Result<Vec<RichTextSpan>> {
        let tokens = self.tokenizer.tokenize(text)?;
        Ok(spans_from_tokens(tokens))
    }
}

/// Walk a token stream and emit spans in order.
pub fn spans_from_tokens(tokens: impl IntoIterator<Item = InlineToken>) -> Vec<RichTextSpan> {
    let mut spans = Vec::new();
    let mut state = State::Default;

    for token in tokens {
        state = match (state, token) {
            (State::Default, InlineToken::Text(text)) => {
                spans.push(RichTextSpan::plain(text));
                State::Default
            }
            (State::Default, InlineToken::Code(code)) => {
                spans.push(RichTextSpan::styled(code, Annotations::code()));
                State::Default
            }
            (State::Default, InlineToken::Open(style)) => State::AwaitingStyledText(style),
            // Closers are never matched, they just fall through here
            (State::Default, InlineToken::Close(_) | InlineToken::Other) => State::Default,

            (State::AwaitingStyledText(style), InlineToken::Text(text)) => {
                spans.push(style.apply(text));
                State::Default
            }
            (State::AwaitingStyledText(style), token) => {
                tracing::debug!(?style, ?token, "styled run without text, dropping pair");
                State::Default
            }
        };
    }

    if let State::AwaitingStyledText(style) = state {
        tracing::debug!(?style, "input ended after a style opener");
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn convert(text: &str) -> Vec<RichTextSpan> {
        InlineConverter::new().convert(text).unwrap()
    }

    struct Fixed(Vec<InlineToken>);

    impl InlineTokenizer for Fixed {
        fn tokenize(&self, _text: &str) -> Result<Vec<InlineToken>> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    impl InlineTokenizer for Broken {
        fn tokenize(&self, text: &str) -> Result<Vec<InlineToken>> {
            Err(Error::Markdown(format!("cannot parse {text:?}")))
        }
    }

    #[test]
    fn tokenizes_styles_in_order() {
        let tokens = MarkdownTokenizer::default()
            .tokenize("**bold** and *em*")
            .unwrap();
        let inline: Vec<_> = tokens
            .into_iter()
            .filter(|t| *t != InlineToken::Other)
            .collect();
        assert_eq!(
            inline,
            vec![
                InlineToken::Open(Style::Bold),
                InlineToken::Text("bold".into()),
                InlineToken::Close(Style::Bold),
                InlineToken::Text(" and ".into()),
                InlineToken::Open(Style::Italic),
                InlineToken::Text("em".into()),
                InlineToken::Close(Style::Italic),
            ]
        );
    }

    #[test]
    fn tokenizes_link_with_href() {
        let tokens = MarkdownTokenizer::default()
            .tokenize("[label](http://x)")
            .unwrap();
        let href = Style::Link {
            href: "http://x".into(),
        };
        assert!(tokens.contains(&InlineToken::Open(href.clone())));
        assert!(tokens.contains(&InlineToken::Close(href)));
    }

    #[test]
    fn plain_text() {
        assert_eq!(convert("just words"), vec![RichTextSpan::plain("just words")]);
    }

    #[test]
    fn bold_then_plain_then_italic() {
        assert_eq!(
            convert("**bold** and *em*"),
            vec![
                RichTextSpan::styled("bold", Annotations::bold()),
                RichTextSpan::plain(" and "),
                RichTextSpan::styled("em", Annotations::italic()),
            ]
        );
    }

    #[test]
    fn inline_code() {
        assert_eq!(
            convert("`code`"),
            vec![RichTextSpan::styled("code", Annotations::code())]
        );
    }

    #[test]
    fn link() {
        assert_eq!(
            convert("[label](http://x)"),
            vec![RichTextSpan::link("label", "http://x")]
        );
    }

    #[test]
    fn strikethrough() {
        assert_eq!(
            convert("~~gone~~ kept"),
            vec![
                RichTextSpan::styled("gone", Annotations::strikethrough()),
                RichTextSpan::plain(" kept"),
            ]
        );
    }

    #[test]
    fn nested_emphasis_drops_outer_pair() {
        // The outer opener swallows the inner opener, leaving bare text
        assert_eq!(convert("***both***"), vec![RichTextSpan::plain("both")]);
    }

    #[test]
    fn code_inside_link_is_dropped() {
        assert_eq!(convert("[`x`](http://x)"), Vec::<RichTextSpan>::new());
    }

    #[test]
    fn empty_input() {
        assert!(convert("").is_empty());
    }

    #[test]
    fn image_alt_text_is_skipped() {
        assert_eq!(
            convert("see ![alt](a.png)"),
            vec![RichTextSpan::plain("see ")]
        );
    }

    fn joined(text: &str) -> String {
        convert(text).into_iter().map(|span| span.content).collect()
    }

    #[test]
    fn block_markers_stay_literal() {
        for text in [
            "1. First step",
            "2) Second step",
            "# not a heading",
            "- dash answer",
            "+ plus answer",
            "* star answer",
            "> quoted",
            "[a]: http://x",
            "***",
        ] {
            assert_eq!(joined(text), text);
        }
    }

    #[test]
    fn block_markers_on_later_lines_stay_literal() {
        assert_eq!(joined("before\n\n---\n\nafter"), "before---after");
        assert_eq!(joined("Answer\n---"), "Answer---");
        assert_eq!(joined("Title\n==="), "Title===");
        assert_eq!(joined("steps:\n1. one\n2. two"), "steps:1. one2. two");
    }

    #[test]
    fn indentation_is_not_a_code_block() {
        assert_eq!(convert("    indented"), vec![RichTextSpan::plain("indented")]);
    }

    #[test]
    fn inline_styles_after_a_block_marker() {
        assert_eq!(
            convert("- **bold** item"),
            vec![
                RichTextSpan::plain("- "),
                RichTextSpan::styled("bold", Annotations::bold()),
                RichTextSpan::plain(" item"),
            ]
        );
    }

    #[test]
    fn only_block_syntax_is_escaped() {
        assert_eq!(block_marker_at("**bold**"), None);
        assert_eq!(block_marker_at("*em* text"), None);
        assert_eq!(block_marker_at("```x```"), None);
        assert_eq!(block_marker_at("[label](http://x): after"), None);
        assert_eq!(block_marker_at("2024 was a year"), None);
        assert_eq!(block_marker_at("12. twelve"), Some(2));
        assert_eq!(block_marker_at("```rust"), Some(0));
        assert_eq!(block_marker_at("~~~"), Some(0));
        assert_eq!(joined("```x```"), "x");
    }

    #[test]
    fn opener_without_text_consumes_next_token() {
        let converter = InlineConverter::with_tokenizer(Fixed(vec![
            InlineToken::Open(Style::Bold),
            InlineToken::Close(Style::Bold),
            InlineToken::Text("after".into()),
        ]));
        assert_eq!(
            converter.convert("").unwrap(),
            vec![RichTextSpan::plain("after")]
        );
    }

    #[test]
    fn opener_followed_by_code_emits_nothing_for_pair() {
        let converter = InlineConverter::with_tokenizer(Fixed(vec![
            InlineToken::Open(Style::Italic),
            InlineToken::Code("c".into()),
            InlineToken::Text("tail".into()),
        ]));
        assert_eq!(
            converter.convert("").unwrap(),
            vec![RichTextSpan::plain("tail")]
        );
    }

    #[test]
    fn opener_at_end_of_stream() {
        let spans = spans_from_tokens(vec![
            InlineToken::Text("a".into()),
            InlineToken::Open(Style::Strikethrough),
        ]);
        assert_eq!(spans, vec![RichTextSpan::plain("a")]);
    }

    #[test]
    fn missing_close_is_not_required() {
        let spans = spans_from_tokens(vec![
            InlineToken::Open(Style::Bold),
            InlineToken::Text("x".into()),
            InlineToken::Text("y".into()),
        ]);
        assert_eq!(
            spans,
            vec![
                RichTextSpan::styled("x", Annotations::bold()),
                RichTextSpan::plain("y"),
            ]
        );
    }

    #[test]
    fn tokenizer_errors_propagate() {
        let converter = InlineConverter::with_tokenizer(Broken);
        assert!(matches!(
            converter.convert("**"),
            Err(Error::Markdown(_))
        ));
    }
}
