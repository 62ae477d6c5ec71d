//! Query handling: augment, ask the agent, record the round-trip.

use super::Transcript;
use crate::agent::QueryAgent;
use crate::config::Prompts;
use crate::error::Result;
use tracing::{info, instrument};

/// Runs user queries against an agent and records completed round-trips.
#[derive(Debug, Clone, Default)]
pub struct QueryHandler {
    prompts: Prompts,
}

impl QueryHandler {
    pub fn new(prompts: Prompts) -> Self {
        Self { prompts }
    }

    /// Answer `query`, appending the round-trip to `transcript`.
    ///
    /// Returns `Ok(None)` without contacting the agent when the query is
    /// empty. Errors from the agent propagate and leave the transcript
    /// untouched.
    #[instrument(skip(self, agent, transcript), fields(entries = transcript.len()))]
    pub async fn handle(
        &self,
        agent: &dyn QueryAgent,
        transcript: &mut Transcript,
        query: &str,
    ) -> Result<Option<String>> {
        if query.is_empty() {
            return Ok(None);
        }

        let augmented = self.prompts.augment_query(query);
        let response = agent.run(&augmented).await?;

        info!(
            "Answered query with {} tool call(s) in {} iteration(s)",
            response.tool_calls.len(),
            response.iterations
        );

        transcript.append(query, &response.content);
        Ok(Some(response.content))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::agent::AgentResponse;
    use crate::error::ArxivQaError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Agent returning canned answers and recording the prompts it receives.
    #[derive(Default)]
    pub(crate) struct ScriptedAgent {
        pub answers: Mutex<VecDeque<Result<String>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedAgent {
        pub(crate) fn answering(answers: &[&str]) -> Self {
            Self {
                answers: Mutex::new(answers.iter().map(|a| Ok(a.to_string())).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                answers: Mutex::new(VecDeque::from([Err(ArxivQaError::OpenAI(
                    "invalid api key".to_string(),
                ))])),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl QueryAgent for ScriptedAgent {
        async fn run(&self, prompt: &str) -> Result<AgentResponse> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let content = self
                .answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ArxivQaError::Agent("no scripted answer".to_string())))?;
            Ok(AgentResponse {
                content,
                tool_calls: Vec::new(),
                iterations: 1,
            })
        }
    }

    #[tokio::test]
    async fn test_empty_query_is_noop() {
        let agent = ScriptedAgent::answering(&["unused"]);
        let mut transcript = Transcript::new();
        transcript.append("earlier", "answer");
        let before = transcript.clone();

        let result = QueryHandler::default()
            .handle(&agent, &mut transcript, "")
            .await
            .unwrap();

        assert_eq!(result, None);
        assert_eq!(agent.calls(), 0);
        assert_eq!(transcript, before);
    }

    #[tokio::test]
    async fn test_whitespace_query_is_still_asked() {
        let agent = ScriptedAgent::answering(&["Please ask a question."]);
        let mut transcript = Transcript::new();

        let result = QueryHandler::default()
            .handle(&agent, &mut transcript, "   ")
            .await
            .unwrap();

        assert_eq!(result.as_deref(), Some("Please ask a question."));
        assert_eq!(agent.calls(), 1);
        assert_eq!(
            transcript.as_str(),
            "Query:    \nResponse: Please ask a question.\n\n"
        );
    }

    #[tokio::test]
    async fn test_round_trip_appends_entry() {
        let agent = ScriptedAgent::answering(&["Attention is..."]);
        let mut transcript = Transcript::new();

        let response = QueryHandler::default()
            .handle(&agent, &mut transcript, "What is attention?")
            .await
            .unwrap();

        assert_eq!(response.as_deref(), Some("Attention is..."));
        assert_eq!(
            transcript.as_str(),
            "Query: What is attention?\nResponse: Attention is...\n\n"
        );
    }

    #[tokio::test]
    async fn test_agent_receives_augmented_query() {
        let agent = ScriptedAgent::answering(&["ok"]);
        let mut transcript = Transcript::new();

        QueryHandler::default()
            .handle(&agent, &mut transcript, "diffusion models")
            .await
            .unwrap();

        let prompts = agent.prompts.lock().unwrap();
        assert!(prompts[0].starts_with("diffusion models\n\n"));
        assert!(prompts[0].contains("'References' section"));
        // The transcript keeps the query as typed, not the augmented prompt
        assert!(transcript.as_str().starts_with("Query: diffusion models\n"));
    }

    #[tokio::test]
    async fn test_sequential_queries_keep_order() {
        let agent = ScriptedAgent::answering(&["R1", "R2"]);
        let mut transcript = Transcript::new();
        let handler = QueryHandler::default();

        handler.handle(&agent, &mut transcript, "Q1").await.unwrap();
        handler.handle(&agent, &mut transcript, "Q2").await.unwrap();

        assert_eq!(
            transcript.as_str(),
            "Query: Q1\nResponse: R1\n\nQuery: Q2\nResponse: R2\n\n"
        );
    }

    #[tokio::test]
    async fn test_failed_round_trip_adds_nothing() {
        let agent = ScriptedAgent::failing();
        let mut transcript = Transcript::new();

        let result = QueryHandler::default()
            .handle(&agent, &mut transcript, "Q1")
            .await;

        assert!(matches!(result, Err(ArxivQaError::OpenAI(_))));
        assert!(transcript.is_empty());
    }
}
