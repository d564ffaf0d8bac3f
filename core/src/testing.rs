//! Scripted doubles for loop, assembly and dispatch tests.

use crate::traits::{
    ChatRequest, ChatResponse, Provider, SideEffect, Tool, ToolCall, ToolResult,
};
use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One canned model turn. Cloneable so factories can replay the same script
/// into independent provider instances.
#[derive(Debug, Clone)]
pub enum Canned {
    Text(String),
    Calls(Vec<(String, serde_json::Value)>),
    Error(String),
}

pub fn text(content: &str) -> Canned {
    Canned::Text(content.to_string())
}

pub fn call(tool: &str, args: serde_json::Value) -> Canned {
    Canned::Calls(vec![(tool.to_string(), args)])
}

pub fn calls(requested: &[(&str, serde_json::Value)]) -> Canned {
    Canned::Calls(
        requested
            .iter()
            .map(|(name, args)| (name.to_string(), args.clone()))
            .collect(),
    )
}

pub fn error(reason: &str) -> Canned {
    Canned::Error(reason.to_string())
}

impl Canned {
    fn into_response(self, turn: usize) -> anyhow::Result<ChatResponse> {
        match self {
            Canned::Text(content) => Ok(ChatResponse {
                text: Some(content),
                tool_calls: vec![],
            }),
            Canned::Calls(requested) => Ok(ChatResponse {
                text: None,
                tool_calls: requested
                    .into_iter()
                    .enumerate()
                    .map(|(i, (name, args))| ToolCall {
                        id: format!("call_{turn}_{i}"),
                        name,
                        arguments: args.to_string(),
                    })
                    .collect(),
            }),
            Canned::Error(reason) => Err(anyhow!(reason)),
        }
    }
}

/// Replays a fixed script of model turns and records every transcript it was
/// sent, so tests can assert on observations the loop appended.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Canned>>,
    requests: Mutex<Vec<Vec<crate::traits::ChatMessage>>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Canned>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(vec![]),
        })
    }

    /// Number of chat calls received.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Transcript snapshot sent on the given chat call.
    pub fn request(&self, index: usize) -> Vec<crate::traits::ChatMessage> {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn chat(&self, request: ChatRequest<'_>) -> anyhow::Result<ChatResponse> {
        let turn = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.messages.to_vec());
            requests.len()
        };
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("scripted provider exhausted"))?;
        step.into_response(turn)
    }
}

/// A tool that always succeeds with a fixed output.
pub struct FixedTool {
    name: String,
    output: String,
}

impl FixedTool {
    pub fn new(name: &str, output: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            output: output.to_string(),
        })
    }
}

#[async_trait]
impl Tool for FixedTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "fixed test tool"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _args: serde_json::Value) -> anyhow::Result<ToolResult> {
        Ok(ToolResult::success(self.output.clone()))
    }
}

/// A tool whose execution transport always fails, exercising the retry path
/// to exhaustion.
pub struct FailingTool {
    name: String,
    attempts: AtomicUsize,
}

impl FailingTool {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "always-failing test tool"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({"type": "object", "properties": {}})
    }

    fn side_effect(&self) -> SideEffect {
        SideEffect::NetworkIo
    }

    async fn execute(&self, _args: serde_json::Value) -> anyhow::Result<ToolResult> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("upstream unavailable"))
    }
}

/// Hangs past any reasonable timeout for the first `slow_calls` invocations,
/// then answers immediately.
pub struct SlowThenFastTool {
    name: String,
    slow_calls: usize,
    delay: Duration,
    output: String,
    attempts: AtomicUsize,
}

impl SlowThenFastTool {
    pub fn new(name: &str, slow_calls: usize, delay: Duration, output: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            slow_calls,
            delay,
            output: output.to_string(),
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for SlowThenFastTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "slow-then-fast test tool"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({"type": "object", "properties": {}})
    }

    fn side_effect(&self) -> SideEffect {
        SideEffect::NetworkIo
    }

    async fn execute(&self, _args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.slow_calls {
            tokio::time::sleep(self.delay).await;
        }
        Ok(ToolResult::success(self.output.clone()))
    }
}

/// Succeeds after a fixed delay; used to check that concurrent dispatch keeps
/// request order regardless of completion order.
pub struct DelayedTool {
    name: String,
    delay: Duration,
    output: String,
}

impl DelayedTool {
    pub fn new(name: &str, delay: Duration, output: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            delay,
            output: output.to_string(),
        })
    }
}

#[async_trait]
impl Tool for DelayedTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "delayed test tool"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _args: serde_json::Value) -> anyhow::Result<ToolResult> {
        tokio::time::sleep(self.delay).await;
        Ok(ToolResult::success(self.output.clone()))
    }
}

pub fn tool_call(name: &str, args: serde_json::Value) -> ToolCall {
    ToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: args.to_string(),
    }
}
