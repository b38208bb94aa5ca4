//! Scripted in-memory transport for unit tests.

use crate::error::Result;
use crate::transport::{Response, Transport};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Replays queued responses keyed by `url?k=v&...` (query in call order).
/// The last queued response for a key is repeated once the queue drains.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<HashMap<String, VecDeque<Result<Response>>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, key: &str, response: Result<Response>) -> Self {
        self.script
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, key: &str) -> usize {
        self.calls().iter().filter(|c| *c == key).count()
    }

    fn key(url: &str, query: &[(&str, String)]) -> String {
        if query.is_empty() {
            return url.to_string();
        }
        let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{url}?{}", pairs.join("&"))
    }
}

impl Transport for ScriptedTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        query: &'a [(&'a str, String)],
    ) -> BoxFuture<'a, Result<Response>> {
        let key = Self::key(url, query);
        self.calls.lock().unwrap().push(key.clone());

        let mut script = self.script.lock().unwrap();
        let outcome = match script.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => match queue.front().unwrap() {
                Ok(response) => Ok(response.clone()),
                Err(e) => Err(crate::error::Error::Transport(e.to_string().into())),
            },
            None => Ok(Response::new(404, format!("no script for {key}"))),
        };

        async move { outcome }.boxed()
    }
}

pub fn json(status: u16, value: serde_json::Value) -> Result<Response> {
    Ok(Response::new(status, value.to_string()))
}

/// Listing page body in the remote API's shape.
pub fn list_page(num_pages: u32, entries: &[(&str, Option<&str>)]) -> serde_json::Value {
    let requests: Vec<serde_json::Value> = entries
        .iter()
        .map(|(id, title)| serde_json::json!({"signature_request_id": id, "title": title}))
        .collect();
    serde_json::json!({
        "list_info": {"num_pages": num_pages},
        "signature_requests": requests,
    })
}
