pub mod bridge;
pub mod protocol;

pub use bridge::NativeMessagingHost;
pub use protocol::{IncomingMessage, OutgoingMessage};

use crate::config::ConfigAccessor;
use crate::constants::{HOST_REQUEST_TIMEOUT, MAXIMIZE_GRACE_PERIOD};
use crate::engine::Engine;
use crate::error::{AppError, HostError};
use crate::events::HostEvent;
use crate::host::HostApi;
use log::{debug, info, warn};
use protocol::{read_frame, write_frame};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;

/// Native messaging endpoint for the browser extension.
///
/// Lifecycle events are queued to a single dispatcher task so they are
/// handled in arrival order; responses to our own host requests are routed
/// straight back to the waiting caller.
pub struct NativeHost {
    config: Arc<ConfigAccessor>,
    bridge: Arc<NativeMessagingHost>,
    engine: Arc<Engine>,
    outgoing: mpsc::UnboundedSender<OutgoingMessage>,
    outgoing_rx: Option<mpsc::UnboundedReceiver<OutgoingMessage>>,
}

impl NativeHost {
    pub fn new(config: Arc<ConfigAccessor>) -> Self {
        Self::with_timings(config, HOST_REQUEST_TIMEOUT, MAXIMIZE_GRACE_PERIOD)
    }

    pub fn with_timings(
        config: Arc<ConfigAccessor>,
        request_timeout: Duration,
        maximize_grace: Duration,
    ) -> Self {
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let bridge = Arc::new(NativeMessagingHost::new(outgoing.clone(), request_timeout));
        let host: Arc<dyn HostApi> = Arc::clone(&bridge) as Arc<dyn HostApi>;
        let engine = Arc::new(Engine::new(Arc::clone(&config), host).with_maximize_grace(maximize_grace));

        Self {
            config,
            bridge,
            engine,
            outgoing,
            outgoing_rx: Some(outgoing_rx),
        }
    }

    /// Serve the extension until `reader` reaches end of stream.
    pub async fn run<R, W>(mut self, mut reader: R, mut writer: W) -> Result<(), AppError>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut outgoing_rx = self
            .outgoing_rx
            .take()
            .ok_or_else(|| AppError::Protocol("native host already running".into()))?;

        let writer_task = tokio::spawn(async move {
            while let Some(message) = outgoing_rx.recv().await {
                if let Err(e) = write_frame(&mut writer, &message).await {
                    warn!("Failed to write message to extension: {e}");
                    return;
                }
            }
        });

        let (events, mut event_rx) = mpsc::unbounded_channel::<HostEvent>();
        let dispatcher = {
            let engine = Arc::clone(&self.engine);
            tokio::spawn(async move {
                while let Some(event) = event_rx.recv().await {
                    engine.dispatch(event).await;
                }
            })
        };

        let result = loop {
            let frame = match read_frame(&mut reader).await {
                Ok(Some(frame)) => frame,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            };

            match serde_json::from_slice::<IncomingMessage>(&frame) {
                Ok(message) => self.handle_message(message, &events).await,
                Err(e) => warn!("Ignoring malformed message from extension: {e}"),
            }
        };

        info!("Extension disconnected");
        drop(events);
        self.bridge.close("extension disconnected");
        if let Err(e) = dispatcher.await {
            warn!("Event dispatcher stopped abnormally: {e}");
        }
        writer_task.abort();

        result
    }

    async fn handle_message(&self, message: IncomingMessage, events: &mpsc::UnboundedSender<HostEvent>) {
        match message {
            IncomingMessage::Response { request_id, result, error } => {
                let outcome = match error {
                    Some(message) => Err(HostError::new(message)),
                    None => Ok(result.unwrap_or(Value::Null)),
                };
                if !self.bridge.resolve(request_id, outcome) {
                    debug!("Response for unknown or expired request {request_id}");
                }
            }
            IncomingMessage::LoadSettings => {
                let settings = self.config.get_config().await;
                self.send(OutgoingMessage::Settings { settings });
            }
            IncomingMessage::SaveSettings { settings } => {
                let reply = match self.config.save_submitted(settings).await {
                    Ok(()) => OutgoingMessage::SettingsSaved,
                    Err(e) => {
                        warn!("Failed to save settings: {e}");
                        OutgoingMessage::SettingsError { message: e.into() }
                    }
                };
                self.send(reply);
            }
            message @ (IncomingMessage::Installed
            | IncomingMessage::WindowCreated { .. }
            | IncomingMessage::Command { .. }
            | IncomingMessage::TabActivated { .. }
            | IncomingMessage::WindowRemoved { .. }
            | IncomingMessage::Platform(_)) => match message.into_event() {
                Some(event) => {
                    if events.send(event).is_err() {
                        warn!("Event dispatcher is gone, dropping event");
                    }
                }
                None => debug!("Dropping tab activation without a window id"),
            },
        }
    }

    fn send(&self, message: OutgoingMessage) {
        if self.outgoing.send(message).is_err() {
            warn!("Extension writer is gone, dropping reply");
        }
    }
}
