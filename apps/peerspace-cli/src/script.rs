use anyhow::{Context, Result};
use peerspace_net::InboundMessage;
use peerspace_session::SessionEvent;
use serde::Deserialize;

/// One line of a session script.
///
/// ```text
/// {"type":"pointer_lock_changed","locked":true}
/// {"type":"key_change","key":"W","pressed":true}
/// {"event":"player","data":{"socketid":"abc","position":{...},"rotation":{...}}}
/// {"frames":30}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScriptLine {
    /// Run this many frames.
    Frames { frames: u32 },
    /// A message as the transport would deliver it.
    Inbound(InboundMessage),
    /// A local input or host event.
    Event(SessionEvent),
}

/// Parse a JSON-lines script. Blank lines and lines starting with `#` are
/// skipped.
pub fn parse(text: &str) -> Result<Vec<ScriptLine>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("script line {}", i + 1))
        })
        .collect()
}
