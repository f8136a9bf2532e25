//! Core LLM client trait and mock implementation

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{HearthError, Result};
use crate::llm::types::{CompletionRequest, Message};

/// Completion oracle boundary.
///
/// Implementations map a message history (plus an optional tool catalog) to
/// a single assistant message. When no tools are offered the returned
/// message must not carry tool calls.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<Message>;
}

/// Scripted LLM client for tests.
///
/// Replies are returned in order; every request is recorded so tests can
/// assert on what was sent (model, tool catalog, message history).
pub struct MockLlmClient {
    replies: Mutex<VecDeque<Message>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    /// Create a mock client with scripted replies
    pub fn new(replies: Vec<Message>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of completion calls made against this client
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Message> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| HearthError::Llm("mock replies exhausted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_replies_in_order() {
        let mock = MockLlmClient::new(vec![Message::assistant("first"), Message::assistant("second")]);

        let req = CompletionRequest::new("mock-model", vec![Message::user("hi")]);
        let first = mock.complete(req.clone()).await.unwrap();
        let second = mock.complete(req).await.unwrap();

        assert_eq!(first.content.as_deref(), Some("first"));
        assert_eq!(second.content.as_deref(), Some("second"));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_errors_when_exhausted() {
        let mock = MockLlmClient::new(vec![]);
        let req = CompletionRequest::new("mock-model", vec![Message::user("hi")]);
        let result = mock.complete(req).await;
        assert!(matches!(result, Err(HearthError::Llm(_))));
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let mock = MockLlmClient::new(vec![Message::assistant("ok")]);
        let req = CompletionRequest::new("gpt-3.5-turbo", vec![Message::user("create a family")]);
        mock.complete(req).await.unwrap();

        let recorded = mock.requests();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].model, "gpt-3.5-turbo");
        assert_eq!(
            recorded[0].messages[0].content.as_deref(),
            Some("create a family")
        );
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockLlmClient>();
    }
}
