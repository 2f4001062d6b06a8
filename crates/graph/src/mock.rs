//! Mock Instagram Service
//!
//! Programmable mock for exercising publish workflows without the network:
//! - `MockInstagramService`: deterministic ids, records every call
//! - `MockGraphBehavior`: makes a chosen step fail
//! - `GraphStep`: the three outbound calls

use crate::{
    ContainerRequest, GraphError, InstagramService, MediaContainer, ProductTag, PublishedMedia,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// One of the outbound Graph calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphStep {
    CreateContainer,
    Publish,
    Tag,
}

/// Which step (if any) should fail, and how
#[derive(Debug, Clone, Default)]
pub struct MockGraphBehavior {
    failing_step: Arc<RwLock<Option<GraphStep>>>,
    error_message: Arc<RwLock<Option<String>>>,
}

impl MockGraphBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `step` fail with a provider-style error until reset
    pub fn fail_at(&self, step: GraphStep) {
        *self.failing_step.write().expect("behavior lock poisoned") = Some(step);
    }

    /// Message used in the simulated provider error
    pub fn set_error_message(&self, message: impl Into<String>) {
        *self.error_message.write().expect("behavior lock poisoned") = Some(message.into());
    }

    pub fn failing_step(&self) -> Option<GraphStep> {
        *self.failing_step.read().expect("behavior lock poisoned")
    }

    /// Restore the all-succeed default
    pub fn reset(&self) {
        *self.failing_step.write().expect("behavior lock poisoned") = None;
        *self.error_message.write().expect("behavior lock poisoned") = None;
    }

    fn check(&self, step: GraphStep) -> Result<(), GraphError> {
        if self.failing_step() != Some(step) {
            return Ok(());
        }
        let message = self
            .error_message
            .read()
            .expect("behavior lock poisoned")
            .clone()
            .unwrap_or_else(|| format!("Mock failure at {:?}", step));
        Err(GraphError::Api {
            status: 400,
            code: Some(100),
            message,
        })
    }
}

/// A recorded Graph call for test assertions
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedGraphCall {
    CreateContainer(ContainerRequest),
    Publish { container_id: String },
    Tag { media_id: String, tags: Vec<ProductTag> },
}

/// In-memory stand-in for the Graph API
#[derive(Debug, Clone, Default)]
pub struct MockInstagramService {
    behavior: Arc<MockGraphBehavior>,
    calls: Arc<Mutex<Vec<RecordedGraphCall>>>,
    next_id: Arc<AtomicU64>,
}

impl MockInstagramService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: Arc<MockGraphBehavior>) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    /// Shared behavior handle
    pub fn behavior(&self) -> &Arc<MockGraphBehavior> {
        &self.behavior
    }

    /// Calls made so far, in order
    pub fn recorded_calls(&self) -> Vec<RecordedGraphCall> {
        self.calls
            .lock()
            .expect("calls lock poisoned, a prior test panicked")
            .clone()
    }

    pub fn reset_history(&self) {
        self.calls
            .lock()
            .expect("calls lock poisoned, a prior test panicked")
            .clear();
    }

    fn record(&self, call: RecordedGraphCall) -> Result<(), GraphError> {
        self.calls
            .lock()
            .map_err(|e| GraphError::Request(format!("calls lock poisoned: {e}")))?
            .push(call);
        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}_{}", prefix, n)
    }
}

#[async_trait::async_trait]
impl InstagramService for MockInstagramService {
    async fn create_media_container(
        &self,
        request: ContainerRequest,
    ) -> Result<MediaContainer, GraphError> {
        tracing::info!(image_url = %request.image_url, "Mock graph: create container");
        self.record(RecordedGraphCall::CreateContainer(request))?;
        self.behavior.check(GraphStep::CreateContainer)?;

        Ok(MediaContainer {
            id: self.next_id("mock_container"),
        })
    }

    async fn publish_media(&self, container_id: &str) -> Result<PublishedMedia, GraphError> {
        tracing::info!(container_id = %container_id, "Mock graph: publish");
        self.record(RecordedGraphCall::Publish {
            container_id: container_id.to_string(),
        })?;
        self.behavior.check(GraphStep::Publish)?;

        Ok(PublishedMedia {
            id: self.next_id("mock_media"),
        })
    }

    async fn tag_media(&self, media_id: &str, tags: &[ProductTag]) -> Result<(), GraphError> {
        tracing::info!(media_id = %media_id, count = tags.len(), "Mock graph: tag");
        self.record(RecordedGraphCall::Tag {
            media_id: media_id.to_string(),
            tags: tags.to_vec(),
        })?;
        self.behavior.check(GraphStep::Tag)
    }
}
