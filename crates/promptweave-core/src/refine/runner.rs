use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use promptweave_client::{invoke_structured, ChatModel, StepRequest};
use promptweave_logging::{LogEvent, Logger};

use crate::refine::{DraftArtifact, RefinePrompts, Verdict, VerdictKind};
use crate::WorkflowError;

/// Configuration for the refinement loop
#[derive(Debug, Clone)]
pub struct RefineConfig {
    pub generator_model: String,
    pub evaluator_model: String,
    /// Hard bound on generate/evaluate round trips
    pub max_iterations: usize,
    pub generator_temperature: f32,
    pub evaluator_temperature: f32,
}

impl RefineConfig {
    pub fn new(
        generator_model: impl Into<String>,
        evaluator_model: impl Into<String>,
        max_iterations: usize,
    ) -> Self {
        Self {
            generator_model: generator_model.into(),
            evaluator_model: evaluator_model.into(),
            max_iterations,
            generator_temperature: 0.5,
            evaluator_temperature: 0.0,
        }
    }
}

/// Record of one generate/evaluate round trip
#[derive(Debug, Clone, Serialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub draft: String,
    pub verdict: VerdictKind,
    pub feedback: String,
}

/// The final outcome of a refinement loop
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefineOutcome {
    /// The critic returned a pass
    Passed {
        iterations: usize,
        draft: String,
        history: Vec<IterationRecord>,
    },
    /// Hit the iteration bound without a pass
    Exhausted {
        iterations: usize,
        last_draft: String,
        last_feedback: String,
        history: Vec<IterationRecord>,
    },
    /// User requested stop (e.g. Ctrl+C)
    Interrupted {
        iterations: usize,
        history: Vec<IterationRecord>,
    },
}

impl RefineOutcome {
    pub fn iterations(&self) -> usize {
        match self {
            Self::Passed { iterations, .. } => *iterations,
            Self::Exhausted { iterations, .. } => *iterations,
            Self::Interrupted { iterations, .. } => *iterations,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Passed { .. } => 0,
            Self::Exhausted { .. } => 1,
            Self::Interrupted { .. } => 130,
        }
    }
}

/// Alternates the generator and evaluator until a pass, the iteration bound,
/// or an interrupt.
pub struct RefineRunner<'a> {
    generator: &'a dyn ChatModel,
    evaluator: &'a dyn ChatModel,
    config: RefineConfig,
    logger: Arc<Logger>,
    interrupted: Arc<AtomicBool>,
}

impl<'a> RefineRunner<'a> {
    pub fn new(
        generator: &'a dyn ChatModel,
        evaluator: &'a dyn ChatModel,
        config: RefineConfig,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            generator,
            evaluator,
            config,
            logger,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a handle to signal interruption
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    pub async fn run(&self, task: &str) -> Result<RefineOutcome, WorkflowError> {
        self.logger.log(&LogEvent::WorkflowStarted {
            workflow: "refine".to_string(),
            input: task.to_string(),
        });

        let mut history: Vec<IterationRecord> = Vec::new();
        let mut feedback: Option<String> = None;

        for iteration in 0..self.config.max_iterations {
            if self.interrupted.load(Ordering::SeqCst) {
                info!("Refinement loop interrupted by user");
                return Ok(RefineOutcome::Interrupted {
                    iterations: iteration,
                    history,
                });
            }

            debug!(iteration, "Running generator");
            let artifact: DraftArtifact = invoke_structured(
                self.generator,
                StepRequest {
                    model: &self.config.generator_model,
                    system: RefinePrompts::generator(feedback.as_deref()),
                    user: Some(task.to_string()),
                    temperature: self.config.generator_temperature,
                },
            )
            .await?;

            self.logger.log(&LogEvent::DraftGenerated {
                iteration,
                preview: artifact.draft.clone(),
            });

            let verdict: Verdict = invoke_structured(
                self.evaluator,
                StepRequest {
                    model: &self.config.evaluator_model,
                    system: RefinePrompts::evaluator(task, &artifact.draft),
                    user: None,
                    temperature: self.config.evaluator_temperature,
                },
            )
            .await?;

            self.logger.log(&LogEvent::VerdictReturned {
                iteration,
                verdict: verdict.evaluation.as_str().to_string(),
                feedback: verdict.feedback.clone(),
            });

            history.push(IterationRecord {
                iteration,
                draft: artifact.draft.clone(),
                verdict: verdict.evaluation,
                feedback: verdict.feedback.clone(),
            });

            if verdict.evaluation.is_pass() {
                return Ok(RefineOutcome::Passed {
                    iterations: iteration + 1,
                    draft: artifact.draft,
                    history,
                });
            }

            feedback = Some(verdict.feedback);
        }

        self.logger.log(&LogEvent::IterationLimitReached {
            iterations: self.config.max_iterations,
        });

        let (last_draft, last_feedback) = history
            .last()
            .map(|record| (record.draft.clone(), record.feedback.clone()))
            .unwrap_or_default();

        Ok(RefineOutcome::Exhausted {
            iterations: self.config.max_iterations,
            last_draft,
            last_feedback,
            history,
        })
    }
}
