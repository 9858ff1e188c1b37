use super::protocol::{HostMethod, OutgoingMessage};
use crate::error::HostError;
use crate::host::{HostApi, Tab, TabQuery, TabUpdate, Window, WindowUpdate};
use async_trait::async_trait;
use crate::safe_lock;
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

type PendingReply = oneshot::Sender<Result<Value, HostError>>;

/// `HostApi` that forwards each command to the extension as a request
/// message and waits for the matching response.
pub struct NativeMessagingHost {
    outgoing: mpsc::UnboundedSender<OutgoingMessage>,
    pending: Mutex<HashMap<u64, PendingReply>>,
    next_request_id: AtomicU64,
    timeout: Duration,
    closed: AtomicBool,
}

impl NativeMessagingHost {
    pub fn new(outgoing: mpsc::UnboundedSender<OutgoingMessage>, timeout: Duration) -> Self {
        Self {
            outgoing,
            pending: Mutex::new(HashMap::new()),
            next_request_id: AtomicU64::new(1),
            timeout,
            closed: AtomicBool::new(false),
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<u64, PendingReply>> {
        safe_lock(&self.pending, "NativeMessagingHost pending")
    }

    /// Deliver a response to the request waiting on `request_id`.
    /// Returns false when nobody is waiting (unknown id or already timed out).
    pub fn resolve(&self, request_id: u64, outcome: Result<Value, HostError>) -> bool {
        match self.lock_pending().remove(&request_id) {
            Some(reply) => reply.send(outcome).is_ok(),
            None => false,
        }
    }

    /// Fail every outstanding request and refuse new ones, once the
    /// extension has disconnected.
    pub fn close(&self, message: &str) {
        self.closed.store(true, Ordering::SeqCst);
        for (_, reply) in self.lock_pending().drain() {
            let _ = reply.send(Err(HostError::new(message)));
        }
    }

    pub fn pending_count(&self) -> usize {
        self.lock_pending().len()
    }

    async fn call(&self, method: HostMethod, params: Value) -> Result<Value, HostError> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.lock_pending().insert(request_id, tx);
        if self.closed.load(Ordering::SeqCst) {
            self.lock_pending().remove(&request_id);
            return Err(HostError::new("extension disconnected"));
        }

        let request = OutgoingMessage::Request { request_id, method, params };
        if self.outgoing.send(request).is_err() {
            self.lock_pending().remove(&request_id);
            return Err(HostError::new("native messaging channel closed"));
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(HostError::new("native messaging channel closed")),
            Err(_) => {
                self.lock_pending().remove(&request_id);
                Err(HostError::new(format!(
                    "{} timed out after {}ms",
                    method.as_str(),
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

fn decode<T: DeserializeOwned>(method: HostMethod, value: Value) -> Result<T, HostError> {
    serde_json::from_value(value)
        .map_err(|e| HostError::new(format!("malformed {} result: {e}", method.as_str())))
}

/// Result of a mutating call. Only an error reply counts as failure; an
/// omitted or unreadable result still means the host applied the change.
fn decode_applied<T: DeserializeOwned>(method: HostMethod, value: Value) -> Option<T> {
    if value.is_null() {
        return None;
    }
    match decode(method, value) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            debug!("{e}");
            None
        }
    }
}

#[async_trait]
impl HostApi for NativeMessagingHost {
    async fn query_tabs(&self, query: TabQuery) -> Vec<Tab> {
        let method = HostMethod::TabsQuery;
        let result = self.call(method, json!(query)).await;
        match result.and_then(|value| decode::<Vec<Tab>>(method, value)) {
            Ok(tabs) => tabs,
            Err(e) => {
                debug!("Tab query for window {} failed: {e}", query.window_id);
                Vec::new()
            }
        }
    }

    async fn update_tab(&self, tab_id: i64, update: TabUpdate) -> Result<Option<Tab>, HostError> {
        let method = HostMethod::TabsUpdate;
        let value = self
            .call(method, json!({ "tabId": tab_id, "updateProperties": update }))
            .await?;
        Ok(decode_applied(method, value))
    }

    async fn update_window(&self, window_id: i64, update: WindowUpdate) -> Result<Option<Window>, HostError> {
        let method = HostMethod::WindowsUpdate;
        let value = self
            .call(method, json!({ "windowId": window_id, "updateInfo": update }))
            .await?;
        Ok(decode_applied(method, value))
    }

    async fn get_last_focused_window(&self) -> Result<Window, HostError> {
        let method = HostMethod::WindowsGetLastFocused;
        let value = self
            .call(method, json!({ "getInfo": { "populate": false } }))
            .await?;
        decode(method, value)
    }
}
