use serde::{Deserialize, Serialize};

pub(crate) const EMPTY_MESSAGE_REPLY: &str = "Please provide a valid message.";

#[derive(Debug, Deserialize)]
pub(crate) struct ChatRequest {
    #[serde(default)]
    pub(crate) message: String,
    #[serde(default, rename = "sessionId")]
    pub(crate) session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ValidationReply {
    pub(crate) response: &'static str,
}

/// Events produced by the agent run and relayed into the response body.
/// Exactly one of `Done` or `Error` terminates the stream.
#[derive(Debug, Clone)]
pub(crate) enum ChatEvent {
    Delta(String),
    Done { session_id: String },
    Error { message: String },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum Trailer {
    Done {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Error {
        message: String,
    },
}

impl Trailer {
    pub(crate) fn to_line(&self) -> String {
        format!(
            "data: {}\n\n",
            serde_json::to_string(self).unwrap_or_default()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_defaults_absent_fields() {
        let request: ChatRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.message, "");
        assert!(request.session_id.is_none());

        let request: ChatRequest =
            serde_json::from_str(r#"{"message":"hi","sessionId":"conv_1"}"#).unwrap();
        assert_eq!(request.message, "hi");
        assert_eq!(request.session_id.as_deref(), Some("conv_1"));
    }

    #[test]
    fn chat_request_accepts_null_session() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"message":"hi","sessionId":null}"#).unwrap();
        assert!(request.session_id.is_none());
    }

    #[test]
    fn done_trailer_shape() {
        let line = Trailer::Done {
            session_id: "conv_abc".to_string(),
        }
        .to_line();
        assert_eq!(line, "data: {\"type\":\"done\",\"sessionId\":\"conv_abc\"}\n\n");
    }

    #[test]
    fn error_trailer_shape() {
        let line = Trailer::Error {
            message: "stream failed".to_string(),
        }
        .to_line();
        assert_eq!(
            line,
            "data: {\"type\":\"error\",\"message\":\"stream failed\"}\n\n"
        );
    }
}
