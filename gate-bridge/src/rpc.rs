//! JSON-RPC 2.0 envelopes and reply decoding for streamable HTTP servers.

use serde_json::{Value, json};

use crate::error::{BridgeError, BridgeResult};

/// Method used to enumerate remote tools.
pub const LIST_TOOLS: &str = "tools/list";
/// Method used to invoke a remote tool.
pub const CALL_TOOL: &str = "tools/call";

/// `Accept` header value advertised on every request.
pub const ACCEPT: &str = "application/json, text/event-stream";

pub(crate) fn envelope(method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": 1,
    })
}

/// Decodes a reply that is either a plain JSON document or an event stream.
pub(crate) fn decode_reply(content_type: Option<&str>, body: &[u8]) -> BridgeResult<Value> {
    let is_stream = content_type
        .is_some_and(|value| value.to_ascii_lowercase().starts_with("text/event-stream"));
    if is_stream {
        let text = std::str::from_utf8(body)
            .map_err(|err| BridgeError::decode(format!("event stream is not utf-8: {err}")))?;
        return decode_event_stream(text);
    }
    serde_json::from_slice(body).map_err(|err| BridgeError::decode(err.to_string()))
}

/// Picks the last event carrying a `result` or `error`, falling back to the
/// last event that parsed at all.
fn decode_event_stream(text: &str) -> BridgeResult<Value> {
    let mut answer: Option<Value> = None;
    let mut fallback: Option<Value> = None;

    for data in events(text) {
        let Ok(message) = serde_json::from_str::<Value>(&data) else {
            continue;
        };
        if message.get("result").is_some() || message.get("error").is_some() {
            answer = Some(message);
        } else {
            fallback = Some(message);
        }
    }

    answer
        .or(fallback)
        .ok_or_else(|| BridgeError::decode("event stream carried no JSON message"))
}

/// Splits an event stream into the joined `data:` payload of each event.
fn events(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n"));
                current.clear();
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            current.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if !current.is_empty() {
        out.push(current.join("\n"));
    }
    out
}
