//! Notion API client. Only the append-children call is needed.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::block::ToggleBlock;
use crate::config::{ApiConfig, Credentials};
use crate::error::{Error, Result};

#[derive(Serialize)]
struct AppendChildrenRequest<'a> {
    children: &'a [ToggleBlock],
}

/// Error body returned by Notion on a rejected request.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Client bound to one integration secret and one target page.
pub struct NotionClient {
    client: Client,
    api: ApiConfig,
    credentials: Credentials,
}

impl NotionClient {
    pub fn new(api: ApiConfig, credentials: Credentials) -> Self {
        Self::with_client(Client::new(), api, credentials)
    }

    pub fn with_client(client: Client, api: ApiConfig, credentials: Credentials) -> Self {
        Self {
            client,
            api,
            credentials,
        }
    }

    pub fn page_id(&self) -> &str {
        &self.credentials.page_id
    }

    fn children_url(&self) -> String {
        format!(
            "{}/v1/blocks/{}/children",
            self.api.base_url.trim_end_matches('/'),
            self.credentials.page_id
        )
    }

    /// Build the append request without sending it.
    pub fn append_request(&self, blocks: &[ToggleBlock]) -> Result<reqwest::Request> {
        let request = self
            .client
            .patch(self.children_url())
            .bearer_auth(&self.credentials.notion_key)
            .header("Notion-Version", self.api.notion_version.as_str())
            .json(&AppendChildrenRequest { children: blocks })
            .build()?;
        Ok(request)
    }

    /// Append all `blocks` to the page in a single request.
    pub async fn append_children(&self, blocks: &[ToggleBlock]) -> Result<()> {
        let request = self.append_request(blocks)?;
        tracing::info!(
            page_id = %self.credentials.page_id,
            blocks = blocks.len(),
            "appending toggle blocks"
        );

        let resp = self.client.execute(request).await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = match resp.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "could not read error body");
                    String::new()
                }
            };
            return Err(api_error(status, &text));
        }

        tracing::debug!("append accepted");
        Ok(())
    }
}

/// Decode a rejection. An empty message falls back to the status reason.
fn api_error(status: StatusCode, text: &str) -> Error {
    let (code, message) = match serde_json::from_str::<ApiErrorBody>(text) {
        Ok(body) => (body.code, body.message),
        Err(_) => (String::new(), text.trim().to_string()),
    };
    let message = if message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        message
    };

    Error::Api {
        status: status.as_u16(),
        code,
        message,
    }
}
