//! Test doubles shared across workflow tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use promptweave_client::{ChatModel, ChatRequest, ClientError};

use crate::InputSource;

/// Replays scripted responses in call order and records every request.
pub(crate) struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> ChatRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, request: &ChatRequest) -> Result<String, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(ClientError::EmptyResponse)
    }
}

/// Answers by matching a substring of the system turn; used where concurrent
/// sub-chains make call order nondeterministic.
pub(crate) struct KeyedModel {
    rules: Vec<(String, String)>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl KeyedModel {
    pub fn new(rules: Vec<(&str, &str)>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for KeyedModel {
    async fn chat(&self, request: &ChatRequest) -> Result<String, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        let system = request
            .messages
            .first()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        self.rules
            .iter()
            .find(|(key, _)| system.contains(key))
            .map(|(_, response)| response.clone())
            .ok_or(ClientError::EmptyResponse)
    }
}

/// Queued interactive answers; counts how many were served.
pub(crate) struct QueuedInput {
    lines: Mutex<VecDeque<String>>,
    served: Mutex<usize>,
}

impl QueuedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: Mutex::new(lines.into_iter().map(Into::into).collect()),
            served: Mutex::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::<String>::new())
    }

    pub fn served(&self) -> usize {
        *self.served.lock().unwrap()
    }
}

impl InputSource for QueuedInput {
    fn request_line(&self, _prompt: &str) -> std::io::Result<String> {
        let line = self
            .lines
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| std::io::Error::other("no queued input line"))?;
        *self.served.lock().unwrap() += 1;
        Ok(line)
    }
}
