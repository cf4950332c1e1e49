mod block;
mod config;
mod error;
mod notion;
mod parser;
mod record;
mod toggle;

pub use block::{Annotations, RichTextSpan, ToggleBlock};
pub use config::{
    ApiConfig, Config, Credentials, NOTION_KEY_VAR, OutputConfig, PAGE_ID_LEN, PAGE_ID_VAR,
    validate_page_id,
};
pub use error::{Error, Result};
pub use notion::NotionClient;
pub use parser::{
    InlineConverter, InlineToken, InlineTokenizer, MarkdownTokenizer, Style, spans_from_tokens,
};
pub use record::{Record, load_records, parse_records};
pub use toggle::ToggleBuilder;

use std::path::Path;

/// Convert inline markdown into rich text spans with the default tokenizer.
pub fn markdown_to_rich_text(markdown: &str) -> Result<Vec<RichTextSpan>> {
    InlineConverter::new().convert(markdown)
}

/// Reject input paths without a `.json` extension.
pub fn check_input_path(path: &Path) -> Result<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(()),
        _ => Err(Error::Usage("Please provide a JSON file.".to_string())),
    }
}

/// Read the input file and build one toggle per record.
pub fn load_toggles(path: &Path) -> Result<Vec<ToggleBlock>> {
    let records = load_records(path)?;
    ToggleBuilder::new().build_all(&records)
}

/// Read, build and append in one batch. Returns the number of blocks sent.
pub async fn push_file(path: &Path, client: &NotionClient) -> Result<usize> {
    let toggles = load_toggles(path)?;
    client.append_children(&toggles).await?;
    Ok(toggles.len())
}
