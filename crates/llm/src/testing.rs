//! In-process gateway double for tests

use async_trait::async_trait;
use legalassist_common::{LegalAssistError, Result};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::gateway::ModelGateway;
use crate::types::GenerationOptions;

type Responder = Box<dyn Fn(&str) -> Result<String> + Send + Sync>;
type DelayFn = Box<dyn Fn(&str) -> Duration + Send + Sync>;

enum Step {
    Reply(String),
    Fail(LegalAssistError),
}

/// A model call as the gateway saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt: String,
    pub options: GenerationOptions,
}

/// Replays scripted outputs and records every call
///
/// Scripted steps are consumed in call order. Once the script runs out the
/// responder is used; the default responder answers `generated text #N`
/// where N is the 1-based call number.
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<RecordedCall>>,
    responder: Option<Responder>,
    delay: Option<DelayFn>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            responder: None,
            delay: None,
        }
    }

    /// Queue a successful reply
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Step::Reply(text.into()))
    }

    /// Queue a model failure
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(Step::Fail(LegalAssistError::model(message)))
    }

    /// Queue an arbitrary failure
    pub fn fail_with(self, error: LegalAssistError) -> Self {
        self.push(Step::Fail(error))
    }

    /// Answer unscripted calls from the prompt
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Sleep before answering every call
    pub fn with_delay(self, delay: Duration) -> Self {
        self.with_delay_fn(move |_| delay)
    }

    /// Sleep before answering, per prompt
    pub fn with_delay_fn<F>(mut self, delay: F) -> Self
    where
        F: Fn(&str) -> Duration + Send + Sync + 'static,
    {
        self.delay = Some(Box::new(delay));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.prompt).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    fn push(self, step: Step) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(step);
        }
        self
    }
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let call_number = {
            let mut calls = self
                .calls
                .lock()
                .map_err(|_| poisoned())?;
            calls.push(RecordedCall {
                prompt: prompt.to_string(),
                options: *options,
            });
            calls.len()
        };

        let step = self
            .script
            .lock()
            .map_err(|_| poisoned())?
            .pop_front();

        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(prompt)).await;
        }

        match step {
            Some(Step::Reply(text)) => Ok(text),
            Some(Step::Fail(error)) => Err(error),
            None => match &self.responder {
                Some(responder) => responder(prompt),
                None => Ok(format!("generated text #{}", call_number)),
            },
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn poisoned() -> LegalAssistError {
    anyhow::anyhow!("scripted gateway lock poisoned").into()
}
