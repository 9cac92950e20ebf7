//! EmoncmsDispatcher - posts reading sets to an emoncms input API
//!
//! init settings:
//! - `buffer_size`: reading sets kept while the server is unreachable (default 1000)
//!
//! runtime settings:
//! - `url`: emoncms base url, nothing is sent without it
//! - `apikey`: write api key
//! - `pause`: stop sending while true
//!
//! Each flush posts the oldest buffered set, one request per node:
//! `{url}/input/post.json?node=<node>&json={field:value,..}&apikey=<key>`.
//! Delivery failures are logged and the set stays buffered, minus the nodes
//! the server already accepted.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use contracts::{settings, ContractError, Dispatcher, InitError, ReadingSet, Settings};
use indexmap::IndexMap;
use reqwest::blocking::Client;
use tracing::{debug, instrument, warn};

use crate::error::DispatcherError;
use crate::metrics::DispatchMetrics;

const DEFAULT_BUFFER_SIZE: u64 = 1000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Dispatcher posting readings to emoncms
#[derive(Debug)]
pub struct EmoncmsDispatcher {
    name: String,
    buffer: VecDeque<ReadingSet>,
    buffer_size: usize,
    url: Option<String>,
    apikey: String,
    paused: bool,
    // Built on first flush
    client: Option<Client>,
    metrics: Arc<DispatchMetrics>,
}

impl EmoncmsDispatcher {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "emoncms";

    /// Create from init settings
    pub fn from_settings(name: &str, init: &Settings) -> Result<Self, InitError> {
        let buffer_size = settings::get_u64(init, "buffer_size")
            .map_err(|e| InitError::from_contract(name, e))?
            .unwrap_or(DEFAULT_BUFFER_SIZE);

        if buffer_size == 0 {
            return Err(InitError::new(name, "'buffer_size' must be positive"));
        }

        Ok(Self {
            name: name.to_string(),
            buffer: VecDeque::new(),
            buffer_size: buffer_size as usize,
            url: None,
            apikey: String::new(),
            paused: false,
            client: None,
            metrics: Arc::new(DispatchMetrics::new()),
        })
    }

    pub(crate) fn construct(
        name: &str,
        init: &Settings,
    ) -> Result<Box<dyn Dispatcher>, InitError> {
        Ok(Box::new(Self::from_settings(name, init)?))
    }

    /// Number of reading sets waiting for delivery
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Shared counters
    pub fn metrics(&self) -> Arc<DispatchMetrics> {
        Arc::clone(&self.metrics)
    }

    fn client(&mut self) -> Result<Client, DispatcherError> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        self.client = Some(client.clone());
        Ok(client)
    }
}

fn post_node(
    client: &Client,
    endpoint: &str,
    apikey: &str,
    node: &str,
    fields: &IndexMap<&str, f64>,
) -> Result<(), DispatcherError> {
    let json = serde_json::to_string(fields)?;
    let response = client
        .post(endpoint)
        .query(&[("node", node), ("json", json.as_str()), ("apikey", apikey)])
        .send()?;

    let status = response.status();
    if !status.is_success() {
        return Err(DispatcherError::Status {
            status: status.as_u16(),
            body: response.text().unwrap_or_default(),
        });
    }
    Ok(())
}

impl Dispatcher for EmoncmsDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn add(&mut self, readings: &ReadingSet) -> Result<(), ContractError> {
        if self.buffer.len() >= self.buffer_size {
            self.buffer.pop_front();
            self.metrics.inc_dropped();
            warn!(dispatcher = %self.name, size = self.buffer_size, "Buffer full, dropping oldest reading set");
        }
        self.buffer.push_back(readings.clone());
        self.metrics.inc_added();
        Ok(())
    }

    #[instrument(name = "emoncms_dispatcher_flush", skip(self), fields(dispatcher = %self.name))]
    fn flush(&mut self) -> Result<(), ContractError> {
        if self.paused {
            return Ok(());
        }
        let Some(url) = self.url.clone() else {
            return Ok(());
        };
        let Some(readings) = self.buffer.front().cloned() else {
            return Ok(());
        };

        let client = match self.client() {
            Ok(client) => client,
            Err(e) => {
                self.metrics.inc_failures();
                warn!(dispatcher = %self.name, error = %e, "Could not build HTTP client");
                return Ok(());
            }
        };
        let endpoint = format!("{}/input/post.json", url.trim_end_matches('/'));

        let mut delivered = Vec::new();
        let mut failure = None;
        for (node, fields) in readings.by_node() {
            match post_node(&client, &endpoint, &self.apikey, node, &fields) {
                Ok(()) => delivered.push(node.to_string()),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        match failure {
            None => {
                self.buffer.pop_front();
                self.metrics.inc_flushed(1);
                debug!(dispatcher = %self.name, remaining = self.buffer.len(), "Reading set posted");
            }
            Some(e) => {
                // Accepted nodes must not be posted again
                if let Some(head) = self.buffer.front_mut() {
                    head.retain(|r| !delivered.contains(&r.node));
                }
                self.metrics.inc_failures();
                warn!(dispatcher = %self.name, delivered = delivered.len(), error = %e, "Error posting to emoncms");
            }
        }
        Ok(())
    }

    fn apply_runtime_settings(&mut self, runtime: &Settings) -> Result<(), ContractError> {
        self.url = settings::get_str(runtime, "url")?
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        self.apikey = settings::get_str(runtime, "apikey")?
            .unwrap_or_default()
            .to_string();
        self.paused = settings::get_bool(runtime, "pause")?.unwrap_or(false);
        Ok(())
    }
}
