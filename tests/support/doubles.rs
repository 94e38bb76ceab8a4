#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sysops_agent::dispatch::{CommandOutput, CommandRunner, CommandSpec};
use sysops_agent::providers::Provider;
use sysops_agent::security::{Confirmation, ConfirmationBroker, ConfirmationRequest};

/// Replies with queued texts in order and records every user message.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    pub messages: Mutex<Vec<String>>,
    pub systems: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            messages: Mutex::new(Vec::new()),
            systems: Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat_with_system(
        &self,
        system_prompt: Option<&str>,
        message: &str,
        _model: &str,
        _temperature: f64,
    ) -> anyhow::Result<String> {
        self.messages.lock().unwrap().push(message.to_string());
        self.systems
            .lock()
            .unwrap()
            .push(system_prompt.unwrap_or_default().to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted reply left"))
    }
}

/// Never answers within any reasonable deadline.
pub struct StalledProvider;

#[async_trait]
impl Provider for StalledProvider {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn chat_with_system(
        &self,
        _system_prompt: Option<&str>,
        _message: &str,
        _model: &str,
        _temperature: f64,
    ) -> anyhow::Result<String> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(String::new())
    }
}

/// Gives the same answer every time and counts how often it was asked.
pub struct FixedBroker {
    answer: Confirmation,
    asked: AtomicUsize,
}

impl FixedBroker {
    pub fn new(answer: Confirmation) -> Self {
        Self {
            answer,
            asked: AtomicUsize::new(0),
        }
    }

    pub fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfirmationBroker for FixedBroker {
    async fn confirm(&self, _request: &ConfirmationRequest) -> anyhow::Result<Confirmation> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer)
    }
}

/// Answers commands by their rendered command line and records every call.
/// Unknown lines behave like a missing program.
#[derive(Default)]
pub struct ScriptedRunner {
    answers: HashMap<String, CommandOutput>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, command_line: &str, output: CommandOutput) -> Self {
        self.answers.insert(command_line.to_string(), output);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, spec: &CommandSpec) -> CommandOutput {
        let line = spec.to_string();
        self.calls.lock().unwrap().push(line.clone());
        self.answers
            .get(&line)
            .cloned()
            .unwrap_or_else(|| CommandOutput::NotFound {
                program: spec.program.clone(),
            })
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec) -> CommandOutput {
        self.answer(spec)
    }

    async fn launch(&self, spec: &CommandSpec) -> CommandOutput {
        self.answer(spec)
    }
}
