//! Conversation orchestrator - the two-phase tool-calling loop.
//!
//! One turn is: normalize the history, run a first completion with the tool
//! catalog offered, execute any requested tools against the store, then run
//! a second completion that folds the tool results into a prose reply.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient, Message, Role};
use crate::store::FamilyStore;
use crate::tools::{ToolCatalog, ToolDispatcher};

/// Settings the orchestrator needs, resolved once at startup
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model identifier sent with every completion request
    pub model: String,
    /// System prompt prepended to histories that lack one
    pub system_prompt: String,
    /// SQLite database backing the tool dispatcher
    pub db_path: PathBuf,
}

/// Drives one conversation turn against the completion oracle.
///
/// The Agent is stateless between turns: the caller owns the conversation
/// history and persists it between calls.
pub struct Agent<L>
where
    L: LlmClient,
{
    llm: Arc<L>,
    catalog: ToolCatalog,
    config: AgentConfig,
}

impl<L> Agent<L>
where
    L: LlmClient,
{
    /// Create a new Agent with the given client, catalog, and settings
    pub fn new(llm: Arc<L>, catalog: ToolCatalog, config: AgentConfig) -> Self {
        Self {
            llm,
            catalog,
            config,
        }
    }

    /// Run one conversation turn and return the full updated history.
    ///
    /// Issues at most two completion calls. Tool-level business errors are
    /// folded into the history as tool output; only transport and storage
    /// failures propagate as `Err`. If the second completion requests tools
    /// again, those calls are appended verbatim but never executed - the
    /// two-round cap is deliberate and bounds latency per turn.
    pub async fn run_turn(&self, mut history: Vec<Message>) -> Result<Vec<Message>> {
        // An existing leading system message is kept as-is, even if it is
        // not the canonical prompt.
        if history.first().map(|m| m.role) != Some(Role::System) {
            history.insert(0, Message::system(&self.config.system_prompt));
        }

        let request = CompletionRequest::new(&self.config.model, history.clone())
            .with_tools(self.catalog.definitions());
        let assistant = self.llm.complete(request).await?;

        let tool_calls = assistant.tool_calls.clone().unwrap_or_default();
        history.push(assistant);

        if tool_calls.is_empty() {
            return Ok(history);
        }

        log::info!("Assistant requested {} tool call(s)", tool_calls.len());

        // The store is held for the whole dispatch phase and released when
        // this block exits, on every path.
        {
            let store = FamilyStore::open(&self.config.db_path)?;
            let dispatcher = ToolDispatcher::new(&self.catalog);

            for call in &tool_calls {
                let name = &call.function.name;
                let content = match call.parse_arguments() {
                    Ok(args) => dispatcher.dispatch(&store, name, &args)?,
                    Err(_) => {
                        log::warn!("Unparseable arguments for tool call {} ({})", call.id, name);
                        format!("Error: Invalid JSON arguments provided for {}.", name)
                    }
                };
                history.push(Message::tool(&call.id, name, content));
            }
        }

        // Second round: no tools offered, so the model must reply in prose.
        let request = CompletionRequest::new(&self.config.model, history.clone());
        let final_reply = self.llm.complete(request).await?;
        history.push(final_reply);

        Ok(history)
    }

    /// The tool catalog this agent offers to the model
    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockLlmClient, ToolCall};
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> AgentConfig {
        AgentConfig {
            model: "mock-model".to_string(),
            system_prompt: "You are a helpful chef.".to_string(),
            db_path: dir.path().join("hearth.db"),
        }
    }

    fn agent_with(replies: Vec<Message>, dir: &TempDir) -> Agent<MockLlmClient> {
        Agent::new(
            Arc::new(MockLlmClient::new(replies)),
            ToolCatalog::builtin(),
            test_config(dir),
        )
    }

    #[tokio::test]
    async fn test_direct_reply_turn() {
        let dir = TempDir::new().unwrap();
        let agent = agent_with(vec![Message::assistant("Try a simple pasta.")], &dir);

        let history = agent
            .run_turn(vec![Message::user("hi")])
            .await
            .unwrap();

        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, Role::System);
        assert_eq!(history[1].role, Role::User);
        assert_eq!(history[2].role, Role::Assistant);
        assert_eq!(history[2].content.as_deref(), Some("Try a simple pasta."));
    }

    #[tokio::test]
    async fn test_system_prompt_not_duplicated() {
        let dir = TempDir::new().unwrap();
        let agent = agent_with(vec![Message::assistant("ok")], &dir);

        let history = agent
            .run_turn(vec![
                Message::system("You are a helpful chef."),
                Message::user("hi"),
            ])
            .await
            .unwrap();

        let system_count = history.iter().filter(|m| m.role == Role::System).count();
        assert_eq!(system_count, 1);
        assert_eq!(history.len(), 3);
    }

    #[tokio::test]
    async fn test_existing_system_message_kept_verbatim() {
        let dir = TempDir::new().unwrap();
        let agent = agent_with(vec![Message::assistant("ok")], &dir);

        let history = agent
            .run_turn(vec![
                Message::system("You are a pirate."),
                Message::user("hi"),
            ])
            .await
            .unwrap();

        // A non-canonical leading system message is preserved, not replaced
        assert_eq!(history[0].content.as_deref(), Some("You are a pirate."));
    }

    #[tokio::test]
    async fn test_first_request_offers_tools_second_does_not() {
        let dir = TempDir::new().unwrap();
        let llm = Arc::new(MockLlmClient::new(vec![
            Message::assistant_tool_calls(vec![ToolCall::function(
                "call_1",
                "create_family",
                r#"{"name": "The Smiths", "slug": "smiths"}"#,
            )]),
            Message::assistant("Done, the family is set up."),
        ]));
        let agent = Agent::new(llm.clone(), ToolCatalog::builtin(), test_config(&dir));

        agent
            .run_turn(vec![Message::user("create family The Smiths slug smiths")])
            .await
            .unwrap();

        let requests = llm.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].tools.len(), 5);
        assert_eq!(requests[0].tool_choice.as_deref(), Some("auto"));
        assert!(requests[1].tools.is_empty());
        assert!(requests[1].tool_choice.is_none());
    }

    #[tokio::test]
    async fn test_tool_turn_message_shape() {
        let dir = TempDir::new().unwrap();
        let agent = agent_with(
            vec![
                Message::assistant_tool_calls(vec![ToolCall::function(
                    "call_1",
                    "create_family",
                    r#"{"name": "The Smiths", "slug": "smiths"}"#,
                )]),
                Message::assistant("Created The Smiths for you."),
            ],
            &dir,
        );

        let history = agent
            .run_turn(vec![Message::user("create family The Smiths slug smiths")])
            .await
            .unwrap();

        assert_eq!(history.len(), 5);
        assert_eq!(history[2].role, Role::Assistant);
        assert!(history[2].has_tool_calls());
        assert_eq!(history[3].role, Role::Tool);
        assert_eq!(history[3].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(history[3].name.as_deref(), Some("create_family"));
        assert!(history[3].content.as_deref().unwrap().contains("The Smiths"));
        assert_eq!(history[4].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_invalid_json_arguments_skip_dispatch() {
        let dir = TempDir::new().unwrap();
        let agent = agent_with(
            vec![
                Message::assistant_tool_calls(vec![ToolCall::function(
                    "call_err",
                    "create_family",
                    "{bad json",
                )]),
                Message::assistant("Something went wrong with the arguments."),
            ],
            &dir,
        );

        let history = agent
            .run_turn(vec![Message::user("create a family")])
            .await
            .unwrap();

        assert_eq!(history.len(), 5);
        assert_eq!(
            history[3].content.as_deref(),
            Some("Error: Invalid JSON arguments provided for create_family.")
        );

        // Nothing was persisted
        let store = FamilyStore::open(dir.path().join("hearth.db")).unwrap();
        assert!(store.get_family_by_slug("smiths").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tool_results_preserve_call_order() {
        let dir = TempDir::new().unwrap();
        let agent = agent_with(
            vec![
                Message::assistant_tool_calls(vec![
                    ToolCall::function(
                        "call_a",
                        "create_family",
                        r#"{"name": "The Smiths", "slug": "smiths"}"#,
                    ),
                    ToolCall::function(
                        "call_b",
                        "add_family_member",
                        r#"{"family_slug": "smiths", "name": "Lisa"}"#,
                    ),
                    ToolCall::function(
                        "call_c",
                        "get_family_members_summary",
                        r#"{"family_slug": "smiths"}"#,
                    ),
                ]),
                Message::assistant("All done."),
            ],
            &dir,
        );

        let history = agent
            .run_turn(vec![Message::user("set up my family")])
            .await
            .unwrap();

        assert_eq!(history.len(), 7);
        assert_eq!(history[3].tool_call_id.as_deref(), Some("call_a"));
        assert_eq!(history[4].tool_call_id.as_deref(), Some("call_b"));
        assert_eq!(history[5].tool_call_id.as_deref(), Some("call_c"));
        // Later calls see earlier calls' effects within the same phase
        assert!(history[5].content.as_deref().unwrap().contains("Lisa"));
    }

    #[tokio::test]
    async fn test_business_errors_become_tool_output() {
        let dir = TempDir::new().unwrap();
        let agent = agent_with(
            vec![
                Message::assistant_tool_calls(vec![ToolCall::function(
                    "call_1",
                    "add_family_member",
                    r#"{"family_slug": "ghost", "name": "Lisa"}"#,
                )]),
                Message::assistant("That family does not exist."),
            ],
            &dir,
        );

        let history = agent
            .run_turn(vec![Message::user("add Lisa to ghost")])
            .await
            .unwrap();

        assert_eq!(
            history[3].content.as_deref(),
            Some("Error: Family with slug 'ghost' not found.")
        );
        assert_eq!(history[4].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_second_round_tool_calls_not_dispatched() {
        let dir = TempDir::new().unwrap();
        let llm = Arc::new(MockLlmClient::new(vec![
            Message::assistant_tool_calls(vec![ToolCall::function(
                "call_1",
                "create_family",
                r#"{"name": "The Smiths", "slug": "smiths"}"#,
            )]),
            // A misbehaving oracle requesting tools in the second round
            Message::assistant_tool_calls(vec![ToolCall::function(
                "call_2",
                "create_family",
                r#"{"name": "The Does", "slug": "does"}"#,
            )]),
        ]));
        let agent = Agent::new(llm.clone(), ToolCatalog::builtin(), test_config(&dir));

        let history = agent
            .run_turn(vec![Message::user("create families")])
            .await
            .unwrap();

        // Exactly two completion calls; the second tool request is appended
        // verbatim but never executed
        assert_eq!(llm.call_count(), 2);
        assert_eq!(history.len(), 5);
        assert!(history[4].has_tool_calls());

        let store = FamilyStore::open(dir.path().join("hearth.db")).unwrap();
        assert!(store.get_family_by_slug("smiths").unwrap().is_some());
        assert!(store.get_family_by_slug("does").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_bound_is_two_plus_k() {
        let dir = TempDir::new().unwrap();
        let agent = agent_with(
            vec![
                Message::assistant_tool_calls(vec![
                    ToolCall::function("c1", "get_family_members_summary", r#"{"family_slug": "a"}"#),
                    ToolCall::function("c2", "get_family_members_summary", r#"{"family_slug": "b"}"#),
                ]),
                Message::assistant("Neither family exists."),
            ],
            &dir,
        );

        let input = vec![Message::system("prompt"), Message::user("summaries please")];
        let input_len = input.len();
        let history = agent.run_turn(input).await.unwrap();

        // 2 assistant messages + k tool results appended
        assert_eq!(history.len(), input_len + 2 + 2);
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let dir = TempDir::new().unwrap();
        // No scripted replies: the first completion call fails
        let agent = agent_with(vec![], &dir);

        let result = agent.run_turn(vec![Message::user("hi")]).await;
        assert!(result.is_err());
    }
}
