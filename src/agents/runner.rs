//! Agent execution: specialist tool loops and the two pipeline modes.
//!
//! Sequential mode runs the fixed stage sequence directly, feeding
//! each specialist's output into the next. Router mode exposes the
//! specialists as callable tools and lets the model delegate per the
//! router instruction.

use crate::agents::catalog::{self, AgentSpec};
use crate::llm::{ChatMessage, LlmClient};
use crate::models::{AnalysisRequest, PipelineStage};
use crate::tools::{web_tool_definitions, ToolCall, WebToolExecutor};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Options controlling pipeline execution.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Use router mode instead of the fixed sequential chain.
    pub router_mode: bool,
    /// Maximum tool-calling iterations per agent loop.
    pub max_iterations: usize,
    /// Max tool results kept in context (sliding window).
    pub max_context_messages: usize,
    /// Separator the model is instructed to place between posts.
    pub separator: String,
    /// Show per-stage spinners.
    pub show_progress: bool,
}

impl From<&crate::config::Config> for PipelineOptions {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            router_mode: config.model.router_mode,
            max_iterations: config.model.max_iterations,
            max_context_messages: config.model.max_context_messages,
            separator: config.output.separator.clone(),
            show_progress: true,
        }
    }
}

/// The analysis pipeline: one shared model, eight specialists.
pub struct Pipeline {
    llm: LlmClient,
    executor: WebToolExecutor,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(llm: LlmClient, executor: WebToolExecutor, options: PipelineOptions) -> Self {
        Self {
            llm,
            executor,
            options,
        }
    }

    /// Run the full analysis and return the final concatenated text.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<String> {
        if self.options.router_mode {
            self.run_router(request).await
        } else {
            self.run_sequential(request).await
        }
    }

    /// Sequential mode: the fixed stage chain, no routing model.
    async fn run_sequential(&self, request: &AnalysisRequest) -> Result<String> {
        info!("Starting sequential analysis for {}", request.url);

        let mut carry = String::new();

        for stage in PipelineStage::ALL {
            let spec = catalog::find_specialist(stage.agent_name())
                .with_context(|| format!("No specialist for stage {:?}", stage))?;

            let input = self.stage_input(stage, request, &carry);

            let spinner = self.stage_spinner(stage);
            let output = self.run_specialist(&spec, &input).await;
            self.finish_spinner(spinner, stage, output.is_ok());

            carry = output.with_context(|| format!("Stage failed: {}", stage))?;
            debug!("Stage {} produced {} chars", stage, carry.len());
        }

        Ok(carry)
    }

    /// Router mode: the model delegates to specialists exposed as tools.
    async fn run_router(&self, request: &AnalysisRequest) -> Result<String> {
        info!("Starting router analysis for {}", request.url);

        let mut instruction = catalog::ROUTER_INSTRUCTION.to_string();
        if self.options.separator != crate::config::Config::default().output.separator {
            instruction.push_str(&format!(
                "\n\nOVERRIDE: use the separator string \"{}\" instead.",
                self.options.separator
            ));
        }

        let mut messages = vec![
            ChatMessage::system(instruction),
            ChatMessage::user(request.to_prompt()),
        ];

        let tools = specialist_tool_definitions();
        let mut last_content = String::new();

        // The router gets twice the per-agent budget; every delegation
        // is one iteration here plus a full specialist loop inside.
        for iteration in 0..self.options.max_iterations * 2 {
            debug!("Router iteration {}", iteration + 1);

            let response = self.llm.chat(&messages, &tools).await?;

            let Some(tool_calls) = response.tool_calls.clone() else {
                if response.content.trim().is_empty() {
                    warn!("Router returned empty response, stopping");
                    return Ok(last_content);
                }
                return Ok(response.content);
            };

            messages.push(ChatMessage {
                role: "assistant".to_string(),
                content: response.content.clone(),
                tool_calls: Some(tool_calls.clone()),
            });
            last_content = response.content;

            for call in tool_calls {
                let name = call.function.name.clone();
                let input = call
                    .function
                    .arguments
                    .get("input")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();

                let result = match catalog::find_specialist(&name) {
                    Some(spec) => {
                        info!("Router delegating to {}", name);
                        let spinner = self.named_spinner(&name);
                        let output = self.run_specialist(&spec, &input).await;
                        if let Some(pb) = spinner {
                            pb.finish_and_clear();
                        }
                        match output {
                            Ok(text) => text,
                            Err(e) => format!("Error: {}", e),
                        }
                    }
                    None => format!("Error: unknown agent '{}'", name),
                };

                messages.push(ChatMessage::tool(result));
                prune_messages(&mut messages, self.options.max_context_messages);
            }
        }

        warn!("Router hit the iteration limit without a final answer");
        Ok(last_content)
    }

    /// Run one specialist's tool-calling loop and return its final text.
    async fn run_specialist(&self, spec: &AgentSpec, input: &str) -> Result<String> {
        let tool_defs = web_tool_definitions(spec.tools);
        let tools_json: Vec<Value> = tool_defs
            .iter()
            .map(|t| serde_json::to_value(t).expect("tool definition serializes"))
            .collect();

        let mut messages = vec![
            ChatMessage::system(spec.instruction),
            ChatMessage::user(input),
        ];

        // Agents without tools are a single request/response exchange
        if tools_json.is_empty() {
            let response = self.llm.chat(&messages, &[]).await?;
            return Ok(response.content);
        }

        let mut last_content = String::new();

        for iteration in 0..self.options.max_iterations {
            debug!("{}: iteration {}", spec.name, iteration + 1);

            let response = self.llm.chat(&messages, &tools_json).await?;

            let Some(tool_calls) = response.tool_calls.clone() else {
                if !response.content.trim().is_empty() {
                    return Ok(response.content);
                }
                break;
            };

            messages.push(ChatMessage {
                role: "assistant".to_string(),
                content: response.content.clone(),
                tool_calls: Some(tool_calls.clone()),
            });
            last_content = response.content;

            for call in tool_calls {
                let result = self
                    .executor
                    .execute(&ToolCall {
                        name: call.function.name.clone(),
                        arguments: call.function.arguments.clone(),
                    })
                    .await;

                if result.success {
                    info!("{}: tool {} executed", spec.name, call.function.name);
                } else {
                    warn!("{}: tool {} failed", spec.name, call.function.name);
                }

                messages.push(ChatMessage::tool(result.output));
                prune_messages(&mut messages, self.options.max_context_messages);
            }
        }

        // Budget exhausted: ask for the final answer without tools
        warn!("{}: iteration limit reached, requesting final answer", spec.name);
        messages.push(ChatMessage::user(
            "Produce your final answer now using the information gathered so far.",
        ));
        let response = self.llm.chat(&messages, &[]).await?;

        if response.content.trim().is_empty() {
            Ok(last_content)
        } else {
            Ok(response.content)
        }
    }

    /// Input text for each sequential stage.
    fn stage_input(
        &self,
        stage: PipelineStage,
        request: &AnalysisRequest,
        carry: &str,
    ) -> String {
        let separator = &self.options.separator;

        match stage {
            PipelineStage::IdentifyCompetitors => request.to_prompt(),
            PipelineStage::AnalyzeStrategies => {
                let mut input = format!(
                    "Market summary and competitors identified for {}:\n\n{}\n\n\
                     Analyze the marketing strategies these competitors use to build authority.",
                    request.url, carry
                );
                if !request.competitor_urls.is_empty() {
                    input.push_str(&format!(
                        "\n\nAlso include these competitors named by the user: {}",
                        request.competitor_urls.join(", ")
                    ));
                }
                input
            }
            PipelineStage::IdentifyGaps => format!(
                "Competitor marketing strategies collected for {}:\n\n{}\n\n\
                 Identify content gaps worth exploring for this company.",
                request.url, carry
            ),
            PipelineStage::WriteDrafts => {
                let mut input = format!(
                    "Content gaps identified for {}:\n\n{}\n\n\
                     Write three in-depth blog drafts covering these subjects. \
                     Separate each draft with the exact string \"{}\" and do not \
                     put anything before the first draft.",
                    request.url, carry, separator
                );
                if !request.preferred_blogs.is_empty() {
                    input.push_str(&format!(
                        "\n\nTake inspiration from these reference blogs: {}",
                        request.preferred_blogs.join(", ")
                    ));
                }
                input
            }
            PipelineStage::OptimizeAudience
            | PipelineStage::OptimizeSearch
            | PipelineStage::OptimizeGeo => format!(
                "Optimize the following blog drafts. Return ALL drafts in full, \
                 separated by the exact string \"{}\", with nothing before the first one.\n\n{}",
                separator, carry
            ),
            PipelineStage::Consolidate => format!(
                "Consolidate and return the final optimized texts below. Return the \
                 complete content of every article, separated by the exact string \
                 \"{}\", with nothing before the first one.\n\n{}",
                separator, carry
            ),
        }
    }

    fn stage_spinner(&self, stage: PipelineStage) -> Option<ProgressBar> {
        self.make_spinner(stage.to_string())
    }

    fn named_spinner(&self, name: &str) -> Option<ProgressBar> {
        self.make_spinner(format!("Running {}", name))
    }

    fn make_spinner(&self, message: String) -> Option<ProgressBar> {
        if !self.options.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {msg}").expect("static template"),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }

    fn finish_spinner(&self, spinner: Option<ProgressBar>, stage: PipelineStage, ok: bool) {
        if let Some(pb) = spinner {
            if ok {
                pb.finish_with_message(format!("{} ✔", stage));
            } else {
                pb.finish_with_message(format!("{} ✖", stage));
            }
        }
    }
}

/// Keep the system prompt and the initial user message, plus the last
/// `max_keep` messages (sliding window over tool traffic).
fn prune_messages(messages: &mut Vec<ChatMessage>, max_keep: usize) {
    let head = 2;
    let limit = head + max_keep;

    if messages.len() > limit {
        let remove_count = messages.len() - limit;
        messages.drain(head..head + remove_count);
        debug!("Pruned {} old messages to save context", remove_count);
    }
}

/// Tool definitions exposing the specialists to the router model.
fn specialist_tool_definitions() -> Vec<Value> {
    catalog::specialists()
        .iter()
        .map(|spec| {
            json!({
                "type": "function",
                "function": {
                    "name": spec.name,
                    "description": spec.description,
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "input": {
                                "type": "string",
                                "description": "Full input text for the agent"
                            }
                        },
                        "required": ["input"]
                    }
                }
            })
        })
        .collect()
}
