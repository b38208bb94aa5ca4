use serde::{Deserialize, Serialize};

/// One signature request discovered by the listing walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub identifier: String,
    /// Envelope title, empty when the API has none.
    pub display_name: String,
}

impl Record {
    pub fn new(identifier: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            display_name: display_name.into(),
        }
    }
}

/// Body of `GET /signature_request/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListPage {
    pub list_info: ListInfo,
    #[serde(default)]
    pub signature_requests: Vec<SignatureRequestSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListInfo {
    pub num_pages: u32,
    #[serde(default)]
    pub num_results: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignatureRequestSummary {
    pub signature_request_id: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl From<SignatureRequestSummary> for Record {
    fn from(summary: SignatureRequestSummary) -> Self {
        let display_name = summary
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_default();

        Record {
            identifier: summary.signature_request_id,
            display_name,
        }
    }
}
