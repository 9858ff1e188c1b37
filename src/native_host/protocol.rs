//! Chrome native messaging framing and the messages exchanged with the extension.
//!
//! Every message is a 4-byte little-endian length followed by that many bytes
//! of UTF-8 JSON.

use crate::config::Configuration;
use crate::constants::MAX_MESSAGE_SIZE;
use crate::error::AppError;
use crate::events::HostEvent;
use crate::host::Window;
use crate::platform::PlatformSignals;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncomingMessage {
    Installed,
    WindowCreated {
        window: Window,
    },
    Command {
        command: String,
    },
    TabActivated {
        #[serde(rename = "windowId", default)]
        window_id: Option<i64>,
        #[serde(rename = "previousTabId", default)]
        previous_tab_id: Option<i64>,
    },
    WindowRemoved {
        #[serde(rename = "windowId")]
        window_id: i64,
    },
    Platform(PlatformSignals),
    /// Answer to a `Request` previously sent by us.
    Response {
        #[serde(rename = "requestId")]
        request_id: u64,
        #[serde(default)]
        result: Option<Value>,
        #[serde(default)]
        error: Option<String>,
    },
    LoadSettings,
    /// Settings are kept raw so a badly typed record still gets a reply.
    SaveSettings {
        #[serde(default)]
        settings: Value,
    },
}

impl IncomingMessage {
    /// The lifecycle event carried by this message, if it is one.
    pub fn into_event(self) -> Option<HostEvent> {
        match self {
            Self::Installed => Some(HostEvent::Installed),
            Self::WindowCreated { window } => Some(HostEvent::WindowCreated(window)),
            Self::Command { command } => Some(HostEvent::Command(command)),
            Self::TabActivated { window_id, previous_tab_id } => {
                window_id.map(|window_id| HostEvent::TabActivated { window_id, previous_tab_id })
            }
            Self::WindowRemoved { window_id } => Some(HostEvent::WindowRemoved(window_id)),
            Self::Platform(signals) => Some(HostEvent::PlatformReported(signals)),
            Self::Response { .. } | Self::LoadSettings | Self::SaveSettings { .. } => None,
        }
    }
}

/// Host commands the extension executes for us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HostMethod {
    #[serde(rename = "tabs.query")]
    TabsQuery,
    #[serde(rename = "tabs.update")]
    TabsUpdate,
    #[serde(rename = "windows.update")]
    WindowsUpdate,
    #[serde(rename = "windows.getLastFocused")]
    WindowsGetLastFocused,
}

impl HostMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TabsQuery => "tabs.query",
            Self::TabsUpdate => "tabs.update",
            Self::WindowsUpdate => "windows.update",
            Self::WindowsGetLastFocused => "windows.getLastFocused",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingMessage {
    Request {
        #[serde(rename = "requestId")]
        request_id: u64,
        method: HostMethod,
        params: Value,
    },
    Settings {
        settings: Configuration,
    },
    SettingsSaved,
    SettingsError {
        message: String,
    },
}

/// Read one frame. Returns `None` when the stream ends cleanly between frames.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, AppError>
where
    R: AsyncRead + Unpin,
{
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = usize::try_from(u32::from_le_bytes(len_bytes))
        .map_err(|_| AppError::Protocol("message length does not fit in memory".into()))?;
    if len > MAX_MESSAGE_SIZE {
        return Err(AppError::Protocol(format!(
            "Message too large: {len} bytes (max: {MAX_MESSAGE_SIZE} bytes)"
        )));
    }

    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer).await?;
    Ok(Some(buffer))
}

/// Serialize `message` and write it as one frame.
pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<(), AppError>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_vec(message)?;
    if json.len() > MAX_MESSAGE_SIZE {
        return Err(AppError::Protocol(format!(
            "Message too large: {} bytes (max: {MAX_MESSAGE_SIZE} bytes)",
            json.len()
        )));
    }
    let len = u32::try_from(json.len())
        .map_err(|_| AppError::Protocol("message length exceeds u32".into()))?;

    writer.write_all(&len.to_le_bytes()).await?;
    writer.write_all(&json).await?;
    writer.flush().await?;
    Ok(())
}
