use crate::block::{RichTextSpan, ToggleBlock};
use crate::error::Result;
use crate::parser::{InlineConverter, InlineTokenizer, MarkdownTokenizer};
use crate::record::Record;

/// Builds toggle blocks from question/answer records.
#[derive(Debug, Clone, Default)]
pub struct ToggleBuilder<T = MarkdownTokenizer> {
    converter: InlineConverter<T>,
}

impl ToggleBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: InlineTokenizer> ToggleBuilder<T> {
    pub fn with_converter(converter: InlineConverter<T>) -> Self {
        Self { converter }
    }

    /// Answer spans for one record. An absent plain answer becomes a single
    /// empty span.
    pub fn answer_spans(&self, answer: Option<&str>, markdown: bool) -> Result<Vec<RichTextSpan>> {
        if markdown {
            self.converter.convert(answer.unwrap_or_default())
        } else {
            Ok(vec![RichTextSpan::plain(answer.unwrap_or_default())])
        }
    }

    /// Build one toggle. With no answer the toggle gets no nested paragraph.
    pub fn build(&self, question: &str, answer: Option<&str>, markdown: bool) -> Result<ToggleBlock> {
        let answer_spans = match answer {
            Some(answer) => Some(self.answer_spans(Some(answer), markdown)?),
            None => None,
        };

        Ok(ToggleBlock {
            question: question.to_string(),
            answer_spans,
        })
    }

    pub fn build_record(&self, record: &Record) -> Result<ToggleBlock> {
        self.build(&record.q, record.a.as_deref(), record.m)
    }

    /// Build every record, keeping input order.
    pub fn build_all(&self, records: &[Record]) -> Result<Vec<ToggleBlock>> {
        records.iter().map(|record| self.build_record(record)).collect()
    }
}
