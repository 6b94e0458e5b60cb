use crate::openai::{
    API_BASE, Conversation, FunctionTool, InputItem, OutputItem, ResponsesRequest, SseBuffer,
    StreamEvent,
};
use crate::protocol::ChatEvent;
use crate::tools::{ToolDefinition, get_all_tools};
use futures::StreamExt;
use reqwest::Client;
use tokio::sync::mpsc;

const AGENT_NAME: &str = "Assistant";
const MODEL: &str = "gpt-4o-mini";

const INSTRUCTIONS: &str = r#"You are a helpful virtual tour assistant embedded in virtual tour webpage, helping users about the virtual tour and it's information with minimalistic responses with available information and tools.

RULES AND GUIDELINES:
	1. You must never and never answer anything related to anything other than the virtual tour and it's information.
	2. If the user asks anything not related to the virtual tour or it's information, politely refuse to answer.
	3. Always try to use the tools and provided context to get information when needed.
	4. Keep your answers short and precise (2-3 sentences maximum unless more detail is explicitly requested).
	5. You should not reveal the fact that you are an AI model and technology behind this system.
	6. You are here to assist on behalf of Indian School Of Business, Hyderabad.
	7. Always maintain a friendly and professional tone.
	8. Use markdown formatting wherever possible.
	9. When users ask about locations, provide relevant context about that specific place.
	10. If users seem lost or confused, guide them back to the Entrance Plaza.

VIRTUAL TOUR INFORMATION:
	Total Places: 15

	Place Names and Descriptions:
	1. Entrance Plaza - The starting point of your virtual tour journey
	2. Academic Block - Main teaching and classroom facilities
	3. Library - Extensive collection of business literature and research materials
	4. Auditorium - Large venue for lectures, presentations, and events
	5. Student Housing - Residential facilities for students
	6. Cafeteria - Dining and social gathering space
	7. Sports Complex - Fitness and recreational facilities
	8. Administration Building - Administrative offices and student services
	9. Research Center - Facilities for academic research and innovation
	10. Conference Hall - Professional meeting and seminar spaces
	11. Alumni Center - Hub for alumni engagement and networking
	12. Innovation Lab - Space for entrepreneurship and startup incubation
	13. Art Gallery - Cultural and artistic exhibitions
	14. Meditation Center - Wellness and mindfulness space
	15. Garden Area - Outdoor relaxation and green spaces

	Navigation: Start Place is Entrance Plaza

ABOUT INDIAN SCHOOL OF BUSINESS (ISB), HYDERABAD:
	Foundation and Mission:
	The Indian School of Business (ISB) was founded to meet the growing demand for a world-class, research-driven business school in India. Established by visionary leaders from academia and the industry, ISB develops global talent who can navigate complex economic challenges. We emphasise strong connections with industry, researchers, policymakers, and the government to ensure a highly relevant and rigorous curriculum.

	Educational Philosophy:
	Our innovative programmes foster promising leaders with the knowledge, character, and foresight needed to drive meaningful impact across industries and geographies worldwide. ISB is committed to producing graduates who can lead with integrity and innovation in an increasingly interconnected world.

	Campus Excellence:
	The Hyderabad campus represents state-of-the-art educational infrastructure designed to facilitate world-class learning experiences. Every facility is thoughtfully designed to support academic excellence, research innovation, and holistic student development.

CONTACT AND RESOURCES:
	Location: Hyderabad, India
	Contact Number: +91 40 2300 7000
	Programs/Admissions: https://www.isb.edu/programmes
	Google Maps: https://maps.app.goo.gl/tVSFpvwArjruuYTf8
	Official Website: https://www.isb.edu/
	Virtual Tour Link: https://www.turiya.co/360/ISB/Hyderabad/

TECHNICAL COORDINATES (for weather tool):
	Latitude: 17.43527024244676
	Longitude: 78.3406794218838

RESPONSE EXAMPLES:
	Q: "Tell me about the library"
	A: "The ISB Library houses an extensive collection of business literature and research materials. It's designed to support your academic research and learning needs. Would you like to explore it in the virtual tour?"

	Q: "What programs does ISB offer?"
	A: "ISB offers various world-class business programs. For detailed information about programs and admissions, please visit: https://www.isb.edu/programmes"

	Q: "What's the weather like?"
	A: [Use weather tool to fetch current conditions]

	Q: "Please generate an song for me"
	A: "I'm here to assist only with information related to the Indian School of Business, Hyderabad virtual tour. If you have questions about the campus or specific locations, please let me know!"

	Q: "How many pointers or places are there in the virtual tour?"
	A: "There's 15 places in the virtual tour."

	Q: "How can I navigate to a specific location?"
	A: "You can pan around the area and click on the hotspots to navigate to different places."
"#;

/// Static agent description handed to the remote runtime on every turn.
pub(crate) struct AgentConfig {
    pub(crate) name: &'static str,
    pub(crate) model: &'static str,
    pub(crate) instructions: &'static str,
    pub(crate) tools: Vec<ToolDefinition>,
}

pub struct Agent {
    client: Client,
    api_key: String,
    api_base: String,
    config: AgentConfig,
}

/// Opaque handle to a provider-owned conversation. The identifier is
/// neither generated nor validated locally.
pub(crate) struct Session {
    id: String,
}

impl Session {
    pub(crate) fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum AgentError {
    #[error("agent runtime request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("agent runtime returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl Agent {
    pub fn new(api_key: String, weather_api_key: String) -> Self {
        let client = Client::new();
        let tools = get_all_tools(client.clone(), weather_api_key);
        let config = AgentConfig {
            name: AGENT_NAME,
            model: MODEL,
            instructions: INSTRUCTIONS,
            tools,
        };

        tracing::debug!(
            agent = config.name,
            model = config.model,
            tools = config.tools.len(),
            "agent configured"
        );

        Self {
            client,
            api_key,
            api_base: API_BASE.to_string(),
            config,
        }
    }

    /// Points the agent at a different runtime endpoint, for tests that
    /// stand in for the provider.
    #[cfg(test)]
    pub(crate) fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Wraps an existing conversation id, or creates a fresh remote
    /// conversation when the caller has none yet.
    pub(crate) async fn resolve_session(
        &self,
        session_id: Option<String>,
    ) -> Result<Session, AgentError> {
        if let Some(id) = session_id {
            return Ok(Session { id });
        }

        let response = self
            .client
            .post(format!("{}/conversations", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Api { status, body });
        }

        let conversation: Conversation = response.json().await?;
        Ok(Session {
            id: conversation.id,
        })
    }

    /// Runs one user turn against the remote runtime in streaming mode,
    /// forwarding every non-empty text delta into `events` in arrival
    /// order. Tool calls requested by the model are executed locally and
    /// their outputs submitted as follow-up turns on the same conversation
    /// until a turn completes without any. Returns the aggregated output
    /// text.
    pub(crate) async fn run_streamed(
        &self,
        session: &Session,
        message: &str,
        events: &mpsc::Sender<ChatEvent>,
    ) -> Result<String, AgentError> {
        let mut input = vec![InputItem::user_message(message.to_string())];
        let mut final_output = String::new();

        loop {
            let request = ResponsesRequest {
                model: self.config.model.to_string(),
                instructions: self.config.instructions.to_string(),
                input,
                tools: self.tools_api(),
                conversation: session.id.clone(),
                stream: true,
            };

            let response = self
                .client
                .post(format!("{}/responses", self.api_base))
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(AgentError::Api { status, body });
            }

            let mut calls: Vec<(String, String, String)> = Vec::new();
            let mut frames = SseBuffer::default();
            let mut stream = response.bytes_stream();

            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                for data in frames.push(&chunk) {
                    let Ok(event) = serde_json::from_str::<StreamEvent>(&data) else {
                        continue;
                    };
                    match event {
                        StreamEvent::OutputTextDelta { delta } if !delta.is_empty() => {
                            final_output.push_str(&delta);
                            // A failed send means the client went away; the
                            // remote stream is still drained to completion.
                            let _ = events.send(ChatEvent::Delta(delta)).await;
                        }
                        StreamEvent::OutputItemDone {
                            item:
                                OutputItem::FunctionCall {
                                    call_id,
                                    name,
                                    arguments,
                                },
                        } => {
                            calls.push((call_id, name, arguments));
                        }
                        _ => {}
                    }
                }
            }

            if calls.is_empty() {
                return Ok(final_output);
            }

            let mut outputs = Vec::with_capacity(calls.len());
            for (call_id, name, arguments) in calls {
                let output = self.execute_tool(&name, &arguments).await;
                outputs.push(InputItem::FunctionCallOutput { call_id, output });
            }
            input = outputs;
        }
    }

    /// Tool failures become output text for the model to work into its
    /// reply; they never fail the surrounding run.
    async fn execute_tool(&self, name: &str, arguments: &str) -> String {
        let Some(tool) = self.config.tools.iter().find(|t| t.name == name) else {
            return format!("Tool {} is not available.", name);
        };

        let input: serde_json::Value =
            serde_json::from_str(arguments).unwrap_or(serde_json::Value::Null);

        match (tool.handler)(input).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(tool = name, error = %err, "tool call failed");
                format!("The {} tool failed: {}", name, err)
            }
        }
    }

    fn tools_api(&self) -> Vec<FunctionTool> {
        self.config
            .tools
            .iter()
            .map(|t| FunctionTool {
                kind: "function",
                name: t.name.to_string(),
                description: t.description.to_string(),
                parameters: t.input_schema.clone(),
            })
            .collect()
    }
}
