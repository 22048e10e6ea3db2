/*!
 * Mock service implementations for testing.
 *
 * `MockService` stands in for any of the processing services. It plays a
 * script of behaviors, one per call, and repeats a final behavior once the
 * script runs out:
 * - `MockService::responding(r)` - Always succeeds with `r`
 * - `MockService::failing(e)` - Always fails with `e`
 * - `MockService::unreachable()` - Always fails with a connection error
 * - `MockService::scripted(steps, then)` - Plays `steps`, then repeats `then`
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{ServiceCallOutcome, ServiceError};
use crate::providers::Provider;

/// Behavior of the mock for one call
#[derive(Debug, Clone)]
pub enum MockBehavior<R> {
    /// Succeed immediately with the response
    Respond(R),
    /// Fail immediately with the error
    Fail(ServiceError),
    /// Succeed after a delay (for deadline testing)
    Slow { delay_ms: u64, response: R },
    /// Never answer
    Hang,
}

/// Scripted mock for any request/response pair
#[derive(Debug)]
pub struct MockService<Req, Resp> {
    /// Behaviors still to play, in call order
    script: Arc<Mutex<VecDeque<MockBehavior<Resp>>>>,
    /// Behavior once the script is exhausted
    then: MockBehavior<Resp>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<Req>>>,
    /// Result of `test_connection`
    healthy: bool,
}

impl<Req, Resp> MockService<Req, Resp>
where
    Req: Clone,
    Resp: Clone,
{
    /// Create a mock that repeats one behavior
    pub fn new(behavior: MockBehavior<Resp>) -> Self {
        Self::scripted(Vec::new(), behavior)
    }

    /// Create a mock that plays `steps` and then repeats `then`
    pub fn scripted(steps: Vec<MockBehavior<Resp>>, then: MockBehavior<Resp>) -> Self {
        let healthy = !matches!(then, MockBehavior::Fail(ServiceError::Network(_)));
        Self {
            script: Arc::new(Mutex::new(steps.into())),
            then,
            requests: Arc::new(Mutex::new(Vec::new())),
            healthy,
        }
    }

    /// Create a mock that always succeeds
    pub fn responding(response: Resp) -> Self {
        Self::new(MockBehavior::Respond(response))
    }

    /// Create a mock that always fails
    pub fn failing(error: ServiceError) -> Self {
        Self::new(MockBehavior::Fail(error))
    }

    /// Create a mock that behaves like a service that is not running
    pub fn unreachable() -> Self {
        Self::failing(ServiceError::Network("Connection refused".to_string()))
    }

    /// Number of calls made so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Copies of every request received so far
    pub fn requests(&self) -> Vec<Req> {
        self.requests.lock().clone()
    }

    fn next_behavior(&self) -> MockBehavior<Resp> {
        self.script.lock().pop_front().unwrap_or_else(|| self.then.clone())
    }
}

impl<Req, Resp: Clone> Clone for MockService<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            script: Arc::clone(&self.script),
            then: self.then.clone(),
            requests: Arc::clone(&self.requests),
            healthy: self.healthy,
        }
    }
}

#[async_trait]
impl<Req, Resp> Provider for MockService<Req, Resp>
where
    Req: Clone + Debug + Send + Sync + 'static,
    Resp: Clone + Debug + Send + Sync + 'static,
{
    type Request = Req;
    type Response = Resp;

    async fn complete(&self, request: Self::Request) -> ServiceCallOutcome<Self::Response> {
        self.requests.lock().push(request);

        match self.next_behavior() {
            MockBehavior::Respond(response) => Ok(response),
            MockBehavior::Fail(error) => Err(error),
            MockBehavior::Slow { delay_ms, response } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(response)
            }
            MockBehavior::Hang => std::future::pending().await,
        }
    }

    async fn test_connection(&self) -> ServiceCallOutcome<()> {
        if self.healthy {
            Ok(())
        } else {
            Err(ServiceError::Network("Connection refused".to_string()))
        }
    }
}
