//! Walk every page of the signature-request listing.

use crate::error::{Error, Result};
use crate::models::{ListPage, Record};
use crate::retry::RetryPolicy;
use crate::transport::{Response, Transport};
use tracing::{debug, info, warn};

pub fn list_url(base_url: &str) -> String {
    format!("{}/signature_request/list", base_url.trim_end_matches('/'))
}

fn page_query(page: u32, page_size: u32) -> [(&'static str, String); 2] {
    [("page", page.to_string()), ("page_size", page_size.to_string())]
}

async fn fetch_page<T: Transport + ?Sized>(
    transport: &T,
    policy: &RetryPolicy,
    url: &str,
    page: u32,
    page_size: u32,
) -> Result<Response> {
    let query = page_query(page, page_size);
    policy.run(url, || transport.get(url, &query)).await
}

/// Collect all records in page order, then listing order within a page.
///
/// The first page decides the page count and must succeed. Later pages that
/// answer with a non-200 status, or with a body that does not parse, are
/// logged and skipped. Retry exhaustion on any page is fatal.
pub async fn collect_all<T: Transport + ?Sized>(
    transport: &T,
    policy: &RetryPolicy,
    base_url: &str,
    page_size: u32,
) -> Result<Vec<Record>> {
    let url = list_url(base_url);

    let first = fetch_page(transport, policy, &url, 1, page_size).await?;
    if !first.is_ok() {
        return Err(Error::ListingUnavailable {
            status: first.status,
        });
    }
    let first: ListPage = serde_json::from_slice(&first.body).map_err(Error::InvalidListing)?;
    let total_pages = first.list_info.num_pages;
    info!(total_pages, page_size, "listing scope discovered");

    let mut records: Vec<Record> = first
        .signature_requests
        .into_iter()
        .map(Record::from)
        .collect();

    for page in 2..=total_pages {
        let response = fetch_page(transport, policy, &url, page, page_size).await?;
        if !response.is_ok() {
            warn!(page, status = response.status, "skipping listing page");
            continue;
        }

        match serde_json::from_slice::<ListPage>(&response.body) {
            Ok(listing) => {
                debug!(page, entries = listing.signature_requests.len(), "listing page");
                records.extend(listing.signature_requests.into_iter().map(Record::from));
            }
            Err(e) => warn!(page, error = %e, "skipping unreadable listing page"),
        }
    }

    info!(records = records.len(), "listing complete");
    Ok(records)
}
