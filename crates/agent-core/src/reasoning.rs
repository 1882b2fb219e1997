//! Reasoning Loop
//!
//! The conversation state machine. The agent waits for user input, asks the
//! model, runs any tools the model requested and feeds the results straight
//! back to the model until it answers with text alone.

use std::io::Write;
use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::input::InputSource;
use crate::message::{ContentBlock, Conversation, ConversationTurn};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::{ToolCall, ToolRegistry, ToolSchema};

/// Printed once when the loop starts
pub const BANNER: &str = "Chat with Claude (use 'ctrl-c' to quit)";

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Generation options
    pub generation: GenerationOptions,

    /// Line printed before the first prompt
    pub banner: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            generation: GenerationOptions::default(),
            banner: Some(BANNER.into()),
        }
    }
}

/// Where the loop is between two steps
#[derive(Debug)]
enum LoopState {
    AwaitingUserInput,
    AwaitingModel,
    DispatchingTools(Vec<ToolCall>),
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    schemas: Vec<ToolSchema>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        let schemas = tools.schemas();
        Self {
            provider,
            tools,
            schemas,
            config,
        }
    }

    /// Run the session until `input` is exhausted.
    ///
    /// Returns the final conversation. Tool failures are fed back to the
    /// model; only provider, input and output errors end the run early.
    pub async fn run<I, W>(&self, input: &mut I, out: &mut W) -> Result<Conversation>
    where
        I: InputSource + ?Sized,
        W: Write,
    {
        let mut conversation = Conversation::new();
        let mut state = LoopState::AwaitingUserInput;

        if let Some(banner) = &self.config.banner {
            writeln!(out, "{banner}")?;
        }

        loop {
            state = match state {
                LoopState::AwaitingUserInput => {
                    write!(out, "You: ")?;
                    out.flush()?;

                    let Some(line) = input.next_line().await? else {
                        tracing::debug!(turns = conversation.len(), "Input closed, ending session");
                        return Ok(conversation);
                    };
                    conversation.push(ConversationTurn::user_text(&line));
                    LoopState::AwaitingModel
                }
                LoopState::AwaitingModel => {
                    let turn = self.query_model(&conversation).await?;
                    for text in turn.texts() {
                        writeln!(out, "Claude: {text}")?;
                    }

                    let calls: Vec<ToolCall> =
                        turn.content.iter().filter_map(ToolCall::from_block).collect();
                    conversation.push(turn);

                    if calls.is_empty() {
                        LoopState::AwaitingUserInput
                    } else {
                        LoopState::DispatchingTools(calls)
                    }
                }
                LoopState::DispatchingTools(calls) => {
                    let results = self.dispatch(&calls, out).await?;
                    conversation.push(ConversationTurn::tool_results(results));
                    LoopState::AwaitingModel
                }
            };
        }
    }

    /// Send the whole conversation to the model and decode its reply.
    ///
    /// Empty text blocks are dropped; block order is otherwise kept.
    pub async fn query_model(&self, conversation: &Conversation) -> Result<ConversationTurn> {
        tracing::debug!(
            provider = self.provider.name(),
            model = %self.config.generation.model,
            turns = conversation.len(),
            "Requesting completion"
        );

        let completion = self.provider
            .complete(conversation.turns(), &self.schemas, &self.config.generation)
            .await?;

        if let Some(usage) = &completion.usage {
            tracing::info!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion received"
            );
        }

        if completion.is_truncated() {
            tracing::warn!(
                max_tokens = self.config.generation.max_tokens,
                "Reply hit max_tokens, tool arguments may be cut off"
            );
        }

        let content = completion
            .content
            .into_iter()
            .filter(|b| !matches!(b, ContentBlock::Text { text } if text.is_empty()))
            .collect();

        Ok(ConversationTurn::assistant(content))
    }

    /// Run one batch of calls in order, one result block per call.
    pub async fn dispatch<W: Write>(&self, calls: &[ToolCall], out: &mut W) -> Result<Vec<ContentBlock>> {
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            writeln!(out, "tool: {}({})", call.name, serde_json::to_string(&call.input)?)?;
            let result = self.tools.dispatch(call).await;
            results.push(result.into_block(call.id.clone()));
        }

        Ok(results)
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: Option<ToolRegistry>,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: None,
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.generation.system_prompt = Some(prompt.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub fn max_tokens(mut self, max: u32) -> Self {
        self.config.generation.max_tokens = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self.provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(
            provider,
            Arc::new(self.tools.unwrap_or_default()),
            self.config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::input::ScriptedInput;
    use crate::message::Role;
    use crate::provider::Completion;
    use crate::schema::ParameterSchema;
    use crate::tool::Tool;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies and records how many turns each request carried
    struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<Vec<ContentBlock>>>>,
        seen: Mutex<Vec<usize>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Result<Vec<ContentBlock>>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<usize> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            turns: &[ConversationTurn],
            tools: &[ToolSchema],
            _options: &GenerationOptions,
        ) -> Result<Completion> {
            assert!(!tools.is_empty(), "tool schemas must accompany every request");
            self.seen.lock().unwrap().push(turns.len());
            let content = self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("provider asked more often than scripted")?;
            Ok(Completion {
                content,
                model: "scripted".into(),
                usage: None,
                finish_reason: None,
            })
        }
    }

    struct FakeListFiles;

    #[async_trait]
    impl Tool for FakeListFiles {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "list_files".into(),
                description: "List files".into(),
                parameters: vec![ParameterSchema::optional("path", "Directory")],
            }
        }

        async fn execute(&self, input: &serde_json::Value) -> std::result::Result<String, ToolError> {
            match input.get("path").and_then(|v| v.as_str()) {
                Some("missing") => Err(ToolError::InvalidInput),
                _ => Ok(r#"["a.txt"]"#.into()),
            }
        }
    }

    fn agent(provider: Arc<ScriptedProvider>) -> Agent {
        let tools = ToolRegistry::from_tools([Arc::new(FakeListFiles) as Arc<dyn Tool>]).unwrap();
        AgentBuilder::new()
            .provider(provider)
            .tools(tools)
            .build()
            .unwrap()
    }

    fn tool_use(id: &str, name: &str, input: serde_json::Value) -> ContentBlock {
        ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    #[tokio::test]
    async fn test_tool_round_trip_requeries_without_prompt() {
        let provider = ScriptedProvider::new(vec![
            Ok(vec![tool_use("call_1", "list_files", json!({}))]),
            Ok(vec![ContentBlock::text("There is one file.")]),
        ]);
        let agent = agent(provider.clone());
        let mut input = ScriptedInput::new(["list files in ."]);
        let mut out = Vec::new();

        let conversation = agent.run(&mut input, &mut out).await.unwrap();
        let out = String::from_utf8(out).unwrap();

        // user, assistant(tool_use), user(tool_result), assistant(text)
        assert_eq!(conversation.len(), 4);
        assert_eq!(provider.requests(), vec![1, 3]);

        let results = &conversation.turns()[2];
        assert_eq!(results.role, Role::User);
        assert_eq!(
            results.content,
            vec![ContentBlock::ToolResult {
                tool_use_id: "call_1".into(),
                content: r#"["a.txt"]"#.into(),
                is_error: false,
            }]
        );

        assert!(out.starts_with(BANNER));
        assert!(out.contains("tool: list_files({})"));
        assert!(out.contains("Claude: There is one file."));
        // one prompt for the question, one after the answer; none between tool rounds
        assert_eq!(out.matches("You: ").count(), 2);
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_flags() {
        let provider = ScriptedProvider::new(vec![
            Ok(vec![
                ContentBlock::text("Checking."),
                tool_use("a", "read_everything", json!({})),
                tool_use("b", "list_files", json!({"path": "."})),
                tool_use("c", "list_files", json!({"path": "missing"})),
            ]),
            Ok(vec![ContentBlock::text("Done.")]),
        ]);
        let agent = agent(provider.clone());
        let mut input = ScriptedInput::new(["go"]);
        let mut out = Vec::new();

        let conversation = agent.run(&mut input, &mut out).await.unwrap();

        let results = &conversation.turns()[2].content;
        assert_eq!(results.len(), 3);
        let flags: Vec<(&str, bool)> = results
            .iter()
            .map(|b| match b {
                ContentBlock::ToolResult { tool_use_id, is_error, .. } => (tool_use_id.as_str(), *is_error),
                other => panic!("unexpected block {other:?}"),
            })
            .collect();
        assert_eq!(flags, vec![("a", true), ("b", false), ("c", true)]);

        match &results[0] {
            ContentBlock::ToolResult { content, .. } => assert_eq!(content, "tool not found"),
            _ => unreachable!(),
        }

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Claude: Checking."));
    }

    #[tokio::test]
    async fn test_end_of_input_before_any_request() {
        let provider = ScriptedProvider::new(vec![]);
        let agent = agent(provider.clone());
        let mut input = ScriptedInput::default();
        let mut out = Vec::new();

        let conversation = agent.run(&mut input, &mut out).await.unwrap();

        assert!(conversation.is_empty());
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_text_only_reply_returns_to_prompt() {
        let provider = ScriptedProvider::new(vec![
            Ok(vec![ContentBlock::text("Hi!"), ContentBlock::text("")]),
            Ok(vec![ContentBlock::text("Bye!")]),
        ]);
        let agent = agent(provider.clone());
        let mut input = ScriptedInput::new(["hello\n", "bye"]);
        let mut out = Vec::new();

        let conversation = agent.run(&mut input, &mut out).await.unwrap();

        assert_eq!(provider.requests(), vec![1, 3]);
        assert_eq!(conversation.turns()[0].content, vec![ContentBlock::text("hello")]);
        assert_eq!(conversation.turns()[1].content, vec![ContentBlock::text("Hi!")]);
        assert_eq!(String::from_utf8(out).unwrap().matches("You: ").count(), 3);
    }

    #[tokio::test]
    async fn test_provider_error_escapes() {
        let provider = ScriptedProvider::new(vec![Err(AgentError::ProviderUnavailable("down".into()))]);
        let agent = agent(provider);
        let mut input = ScriptedInput::new(["hello"]);
        let mut out = Vec::new();

        let result = agent.run(&mut input, &mut out).await;
        assert!(matches!(result, Err(AgentError::ProviderUnavailable(_))));
    }

    #[tokio::test]
    async fn test_empty_reply_keeps_session_going() {
        let provider = ScriptedProvider::new(vec![
            Ok(vec![ContentBlock::text("")]),
            Ok(vec![ContentBlock::text("Still here.")]),
        ]);
        let agent = agent(provider.clone());
        let mut input = ScriptedInput::new(["hi", "again"]);
        let mut out = Vec::new();

        let conversation = agent.run(&mut input, &mut out).await.unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(provider.requests(), vec![1, 3]);
        assert_eq!(conversation.len(), 4);
        assert_eq!(conversation.turns()[1].role, Role::Assistant);
        assert!(conversation.turns()[1].content.is_empty());
        assert_eq!(out.matches("Claude: ").count(), 1);
        assert!(out.contains("Claude: Still here."));
    }

    #[test]
    fn test_builder_sets_generation_options() {
        let tools = ToolRegistry::from_tools([Arc::new(FakeListFiles) as Arc<dyn Tool>]).unwrap();
        let agent = AgentBuilder::new()
            .provider(ScriptedProvider::new(vec![]))
            .tools(tools)
            .model("openai/gpt-4o-mini")
            .max_tokens(256)
            .system_prompt("Be brief.")
            .build()
            .unwrap();

        let config = agent.config();
        assert_eq!(config.generation.model, "openai/gpt-4o-mini");
        assert_eq!(config.generation.max_tokens, 256);
        assert_eq!(config.generation.system_prompt.as_deref(), Some("Be brief."));
        assert_eq!(config.generation.tool_choice, "auto");
        assert_eq!(config.banner.as_deref(), Some(BANNER));
        assert_eq!(agent.tools().names(), vec!["list_files"]);
    }

    #[test]
    fn test_builder_requires_provider() {
        assert!(matches!(AgentBuilder::new().build(), Err(AgentError::Config(_))));
    }
}
