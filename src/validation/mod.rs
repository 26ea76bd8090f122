//! Debounced, cancelable validation of script expressions.
//!
//! Every change to an expression bumps a generation counter. A run only
//! publishes its result if the counter still holds the generation the run was
//! started with, so a slow completion can never overwrite the status set by a
//! newer change.

use crate::error::ValidationError;
use crate::registry::NodeSpec;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace, warn};

mod context;

pub use context::SampleMessage;

pub const EXPRESSION_REQUIRED: &str = "expression is required.";
pub const EXPRESSION_INVALID: &str = "Invalid expression.";
pub const VALIDATION_UNAVAILABLE: &str = "Unable to validate expression.";

/// Quiescence window before a validation call is issued.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(450);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Idle,
    Validating,
    Valid,
    Error,
}

/// Status of one validated expression. `error` is set only with
/// [`ValidationStatus::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationState {
    pub status: ValidationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationState {
    pub fn idle() -> Self {
        Self {
            status: ValidationStatus::Idle,
            error: None,
        }
    }

    pub fn validating() -> Self {
        Self {
            status: ValidationStatus::Validating,
            error: None,
        }
    }

    pub fn valid() -> Self {
        Self {
            status: ValidationStatus::Valid,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ValidationStatus::Error,
            error: Some(message.into()),
        }
    }
}

impl Default for ValidationState {
    fn default() -> Self {
        Self::idle()
    }
}

/// The kind of value an expression is expected to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedKind {
    Boolean,
    Object,
    Array,
}

/// Payload sent to the remote checker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationRequest {
    pub expression: String,
    pub sample: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<ExpectedKind>,
}

/// The checker's answer about an expression.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidationVerdict {
    pub valid: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl ValidationVerdict {
    pub fn valid() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
        }
    }
}

/// Remote collaborator that evaluates an expression against a sample.
#[async_trait]
pub trait ExpressionCheck: Send + Sync {
    async fn check(&self, request: ValidationRequest) -> Result<ValidationVerdict, ValidationError>;
}

/// Validation session for one expression field.
pub struct ExpressionValidator {
    checker: Arc<dyn ExpressionCheck>,
    debounce: Duration,
    expected: Option<ExpectedKind>,
    generation: Arc<AtomicU64>,
    closed: AtomicBool,
    state: Arc<watch::Sender<ValidationState>>,
}

impl ExpressionValidator {
    pub fn new(checker: Arc<dyn ExpressionCheck>, expected: Option<ExpectedKind>) -> Self {
        let (state, _) = watch::channel(ValidationState::idle());
        Self {
            checker,
            debounce: DEFAULT_DEBOUNCE,
            expected,
            generation: Arc::new(AtomicU64::new(0)),
            closed: AtomicBool::new(false),
            state: Arc::new(state),
        }
    }

    /// Session for the expression slot of a node type.
    pub fn for_node(checker: Arc<dyn ExpressionCheck>, spec: &NodeSpec) -> Self {
        Self::new(checker, spec.expected_kind())
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn expected(&self) -> Option<ExpectedKind> {
        self.expected
    }

    pub fn state(&self) -> ValidationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ValidationState> {
        self.state.subscribe()
    }

    /// Reacts to a changed expression.
    ///
    /// An empty expression fails at once without a remote call. Otherwise the
    /// status moves to `validating` and a run is scheduled after the debounce
    /// window; the returned handle resolves once that run finishes or is
    /// superseded. Must be called from within a tokio runtime.
    pub fn on_change(&self, expression: impl Into<String>, sample: Value) -> Option<JoinHandle<()>> {
        if self.closed.load(Ordering::SeqCst) {
            return None;
        }

        let expression = expression.into();
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if expression.trim().is_empty() {
            self.state.send_replace(ValidationState::error(EXPRESSION_REQUIRED));
            return None;
        }

        self.state.send_replace(ValidationState::validating());

        let run = ValidationRun {
            checker: Arc::clone(&self.checker),
            generation: Arc::clone(&self.generation),
            state: Arc::clone(&self.state),
            ticket,
            debounce: self.debounce,
            request: ValidationRequest {
                expression,
                sample,
                expected: self.expected,
            },
        };
        Some(tokio::spawn(run.execute()))
    }

    /// Ends the session. Pending runs finish silently without publishing.
    pub fn teardown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for ExpressionValidator {
    fn drop(&mut self) {
        self.teardown();
    }
}

struct ValidationRun {
    checker: Arc<dyn ExpressionCheck>,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<ValidationState>>,
    ticket: u64,
    debounce: Duration,
    request: ValidationRequest,
}

impl ValidationRun {
    fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.ticket
    }

    #[instrument(skip(self), fields(ticket = self.ticket))]
    async fn execute(self) {
        tokio::time::sleep(self.debounce).await;
        if !self.is_current() {
            trace!("Superseded before dispatch");
            return;
        }

        let outcome = self.checker.check(self.request.clone()).await;
        let next = match outcome {
            Ok(verdict) if verdict.valid => {
                debug!("Expression is valid");
                ValidationState::valid()
            }
            Ok(verdict) => {
                debug!(error = ?verdict.error, "Expression rejected");
                ValidationState::error(verdict.error.unwrap_or_else(|| EXPRESSION_INVALID.to_string()))
            }
            Err(e) => {
                warn!(error = %e, "Expression check failed");
                ValidationState::error(VALIDATION_UNAVAILABLE)
            }
        };

        let generation = &self.generation;
        let ticket = self.ticket;
        let applied = self.state.send_if_modified(|state| {
            if generation.load(Ordering::SeqCst) != ticket {
                return false;
            }
            *state = next;
            true
        });
        if !applied {
            trace!("Discarded stale validation result");
        }
    }
}
