use serde::{Deserialize, Serialize};

pub(crate) const API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
pub(crate) struct ResponsesRequest {
    pub(crate) model: String,
    pub(crate) instructions: String,
    pub(crate) input: Vec<InputItem>,
    pub(crate) tools: Vec<FunctionTool>,
    pub(crate) conversation: String,
    pub(crate) stream: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum InputItem {
    Message { role: String, content: String },
    FunctionCallOutput { call_id: String, output: String },
}

impl InputItem {
    pub(crate) fn user_message(content: String) -> Self {
        Self::Message {
            role: "user".to_string(),
            content,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FunctionTool {
    #[serde(rename = "type")]
    pub(crate) kind: &'static str,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Conversation {
    pub(crate) id: String,
}

/// One server-sent event from a streamed response. Only the variants the
/// run loop acts on are modeled; everything else collapses into `Other`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum StreamEvent {
    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta { delta: String },
    #[serde(rename = "response.output_item.done")]
    OutputItemDone { item: OutputItem },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum OutputItem {
    FunctionCall {
        call_id: String,
        name: String,
        arguments: String,
    },
    #[serde(other)]
    Other,
}

/// Incremental SSE frame splitter. Raw network bytes land in an internal
/// buffer; complete frames (terminated by a blank line) come back out as
/// their joined `data:` payloads. Buffering bytes rather than text keeps a
/// multi-byte character intact when the network splits it across chunks.
#[derive(Debug, Default)]
pub(crate) struct SseBuffer {
    buffer: Vec<u8>,
}

impl SseBuffer {
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some((end, terminator)) = find_frame_end(&self.buffer) {
            let raw_event = String::from_utf8_lossy(&self.buffer[..end]).into_owned();
            self.buffer.drain(..end + terminator);

            if let Some(data) = extract_sse_data(&raw_event) {
                payloads.push(data);
            }
        }
        payloads
    }
}

/// A frame ends at the first blank line, `\n\n` or `\r\n\r\n`.
fn find_frame_end(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = find_subslice(buffer, b"\n\n");
    let crlf = find_subslice(buffer, b"\r\n\r\n");
    match (lf, crlf) {
        (Some(lf), Some(crlf)) if crlf < lf => Some((crlf, 4)),
        (Some(lf), _) => Some((lf, 2)),
        (None, Some(crlf)) => Some((crlf, 4)),
        (None, None) => None,
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn extract_sse_data(raw: &str) -> Option<String> {
    let mut data_lines = Vec::new();
    for line in raw.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(data) = line.strip_prefix("data:") {
            data_lines.push(data.trim_start().to_string());
        }
    }

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_buffer_handles_frames_split_across_chunks() {
        let mut buffer = SseBuffer::default();
        assert!(
            buffer
                .push(b"event: response.output_text.delta\ndata: {\"a\"")
                .is_empty()
        );
        let payloads = buffer.push(b":1}\n\ndata: {\"b\":2}\n\n");
        assert_eq!(payloads, vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[test]
    fn sse_buffer_handles_crlf_frames() {
        let mut buffer = SseBuffer::default();
        let payloads = buffer.push(b"data: one\r\n\r\ndata: two\r\n\r\n");
        assert_eq!(payloads, vec!["one", "two"]);
    }

    #[test]
    fn sse_buffer_joins_multiline_data() {
        let mut buffer = SseBuffer::default();
        let payloads = buffer.push(b"data: first\ndata: second\n\n");
        assert_eq!(payloads, vec!["first\nsecond"]);
    }

    #[test]
    fn sse_buffer_preserves_multibyte_chars_split_across_chunks() {
        let frame = "data: {\"type\":\"response.output_text.delta\",\"delta\":\"caf\u{e9}\"}\n\n"
            .as_bytes();
        // Cut between the two bytes of the 'é'.
        let split = frame.len() - 5;
        assert_eq!(frame[split - 1], 0xc3);

        let mut buffer = SseBuffer::default();
        assert!(buffer.push(&frame[..split]).is_empty());
        let payloads = buffer.push(&frame[split..]);
        assert_eq!(payloads.len(), 1);

        let event: StreamEvent = serde_json::from_str(&payloads[0]).unwrap();
        match event {
            StreamEvent::OutputTextDelta { delta } => assert_eq!(delta, "caf\u{e9}"),
            other => panic!("expected delta event, got {:?}", other),
        }
    }

    #[test]
    fn decodes_output_text_delta() {
        let event: StreamEvent = serde_json::from_str(
            r#"{"type":"response.output_text.delta","item_id":"msg_1","output_index":0,"delta":"Hel"}"#,
        )
        .unwrap();
        match event {
            StreamEvent::OutputTextDelta { delta } => assert_eq!(delta, "Hel"),
            other => panic!("expected delta event, got {:?}", other),
        }
    }

    #[test]
    fn decodes_function_call_item() {
        let event: StreamEvent = serde_json::from_str(
            r#"{"type":"response.output_item.done","output_index":1,"item":{"type":"function_call","id":"fc_1","status":"completed","call_id":"call_1","name":"Weather","arguments":"{\"latitude\":17.4}"}}"#,
        )
        .unwrap();
        match event {
            StreamEvent::OutputItemDone {
                item:
                    OutputItem::FunctionCall {
                        call_id,
                        name,
                        arguments,
                    },
            } => {
                assert_eq!(call_id, "call_1");
                assert_eq!(name, "Weather");
                assert_eq!(arguments, "{\"latitude\":17.4}");
            }
            other => panic!("expected function call item, got {:?}", other),
        }
    }

    #[test]
    fn unknown_event_types_collapse_to_other() {
        let event: StreamEvent =
            serde_json::from_str(r#"{"type":"response.created","response":{"id":"resp_1"}}"#)
                .unwrap();
        assert!(matches!(event, StreamEvent::Other));

        let event: StreamEvent = serde_json::from_str(
            r#"{"type":"response.completed","response":{"id":"resp_1","status":"completed"}}"#,
        )
        .unwrap();
        assert!(matches!(event, StreamEvent::Other));

        let event: StreamEvent = serde_json::from_str(
            r#"{"type":"response.output_item.done","output_index":0,"item":{"type":"message","id":"msg_1"}}"#,
        )
        .unwrap();
        assert!(matches!(
            event,
            StreamEvent::OutputItemDone {
                item: OutputItem::Other
            }
        ));
    }
}
