use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use promptweave_client::{invoke_structured, ChatModel, StepRequest};
use promptweave_logging::{LogEvent, Logger};

use crate::fanout::{CampaignPrompts, Plan, Selection, WorkerOutput};
use crate::WorkflowError;

/// Configuration for the fan-out workflow
#[derive(Debug, Clone)]
pub struct FanoutConfig {
    pub model: String,
    pub plan_temperature: f32,
    pub worker_temperature: f32,
    pub select_temperature: f32,
}

impl FanoutConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            plan_temperature: 0.2,
            worker_temperature: 0.5,
            select_temperature: 0.2,
        }
    }
}

/// Everything the fan-out produced: the plan, every worker output in
/// completion order, and the selection.
#[derive(Debug, Serialize)]
pub struct FanoutResult {
    pub plan: Plan,
    pub outputs: Vec<WorkerOutput>,
    pub best: Selection,
}

/// Plan once, run one worker per planned item in order, then select the best.
pub struct FanoutOrchestrator<'a> {
    model: &'a dyn ChatModel,
    config: FanoutConfig,
    logger: Arc<Logger>,
}

impl<'a> FanoutOrchestrator<'a> {
    pub fn new(model: &'a dyn ChatModel, config: FanoutConfig, logger: Arc<Logger>) -> Self {
        Self {
            model,
            config,
            logger,
        }
    }

    pub async fn run(&self, topic: &str, num_ideas: usize) -> Result<FanoutResult, WorkflowError> {
        self.logger.log(&LogEvent::WorkflowStarted {
            workflow: "campaign".to_string(),
            input: topic.to_string(),
        });

        // The returned idea count is not reconciled with the requested one.
        let plan: Plan = invoke_structured(
            self.model,
            StepRequest {
                model: &self.config.model,
                system: CampaignPrompts::plan(topic, num_ideas),
                user: None,
                temperature: self.config.plan_temperature,
            },
        )
        .await?;

        self.logger.log(&LogEvent::PlanCreated {
            topic: plan.topic.clone(),
            items: plan.ideas.len(),
        });

        let mut outputs: Vec<WorkerOutput> = Vec::new();
        for (index, idea) in plan.ideas.iter().enumerate() {
            self.logger.log(&LogEvent::WorkerStarted {
                index,
                title: idea.title.clone(),
            });

            debug!(index, title = %idea.title, completed = outputs.len(), "Running worker");
            let written: WorkerOutput = invoke_structured(
                self.model,
                StepRequest {
                    model: &self.config.model,
                    system: CampaignPrompts::worker(topic, idea, &outputs),
                    user: None,
                    temperature: self.config.worker_temperature,
                },
            )
            .await?;

            self.logger.log(&LogEvent::WorkerCompleted {
                index,
                title: idea.title.clone(),
            });

            // Keyed by the planned title; a duplicate title overwrites the
            // earlier entry while keeping its position.
            upsert_output(
                &mut outputs,
                WorkerOutput {
                    title: idea.title.clone(),
                    content: written.content,
                },
            );
        }

        let best: Selection = invoke_structured(
            self.model,
            StepRequest {
                model: &self.config.model,
                system: CampaignPrompts::selection(topic, &outputs),
                user: None,
                temperature: self.config.select_temperature,
            },
        )
        .await?;

        self.logger.log(&LogEvent::SelectionMade {
            title: best.title.clone(),
            reason: best.reason.clone(),
        });

        Ok(FanoutResult {
            plan,
            outputs,
            best,
        })
    }
}

fn upsert_output(outputs: &mut Vec<WorkerOutput>, output: WorkerOutput) {
    match outputs.iter_mut().find(|o| o.title == output.title) {
        Some(slot) => *slot = output,
        None => outputs.push(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptweave_logging::LogFormat;

    use crate::testing::ScriptedModel;

    const TOPIC: &str = "A new smartphone named z1.0 from the company called Z";

    fn logger() -> Arc<Logger> {
        Arc::new(Logger::new(LogFormat::Compact))
    }

    fn plan_response() -> String {
        r#"{"topic": "Phone launch angles", "ideas": [
            {"title": "Unboxing in zero gravity", "description": "An astronaut unboxes the z1.0."},
            {"title": "Grandma goes viral", "description": "A grandmother masters the camera."},
            {"title": "One day on one charge", "description": "A whole day filmed on one battery."}
        ]}"#
        .to_string()
    }

    fn worker_response(n: usize) -> String {
        format!(r#"{{"title": "retitled {n}", "content": "script body {n}"}}"#)
    }

    const SELECTION: &str =
        r#"{"title": "Unboxing in zero gravity", "reason": "strongest hook"}"#;

    #[tokio::test]
    async fn runs_one_worker_per_planned_item_in_order() {
        let model = ScriptedModel::new([
            plan_response(),
            worker_response(1),
            worker_response(2),
            worker_response(3),
            SELECTION.to_string(),
        ]);

        let orchestrator =
            FanoutOrchestrator::new(&model, FanoutConfig::new("phi4"), logger());
        let result = orchestrator.run(TOPIC, 3).await.unwrap();

        // Plan + 3 workers + selection.
        assert_eq!(model.request_count(), 5);
        assert_eq!(result.outputs.len(), 3);
        assert_eq!(result.best.title, "Unboxing in zero gravity");

        // Workers run in list order over the planned titles.
        assert!(model.request(1).messages[0]
            .content
            .contains("Unboxing in zero gravity"));
        assert!(model.request(2).messages[0]
            .content
            .contains("Grandma goes viral"));
        assert!(model.request(3).messages[0]
            .content
            .contains("One day on one charge"));
    }

    #[tokio::test]
    async fn worker_context_holds_exactly_the_prior_outputs() {
        let model = ScriptedModel::new([
            plan_response(),
            worker_response(1),
            worker_response(2),
            worker_response(3),
            SELECTION.to_string(),
        ]);

        let orchestrator =
            FanoutOrchestrator::new(&model, FanoutConfig::new("phi4"), logger());
        orchestrator.run(TOPIC, 3).await.unwrap();

        let first = &model.request(1).messages[0].content;
        assert!(first.contains("No scripts have been written yet"));

        let second = &model.request(2).messages[0].content;
        assert!(second.contains("script body 1"));
        assert!(!second.contains("script body 2"));

        let third = &model.request(3).messages[0].content;
        assert!(third.contains("script body 1"));
        assert!(third.contains("script body 2"));
        assert!(!third.contains("script body 3"));
    }

    #[tokio::test]
    async fn selection_sees_every_completed_output() {
        let model = ScriptedModel::new([
            plan_response(),
            worker_response(1),
            worker_response(2),
            worker_response(3),
            SELECTION.to_string(),
        ]);

        let orchestrator =
            FanoutOrchestrator::new(&model, FanoutConfig::new("phi4"), logger());
        orchestrator.run(TOPIC, 3).await.unwrap();

        let selection_request = &model.request(4).messages[0].content;
        assert!(selection_request.contains("script body 1"));
        assert!(selection_request.contains("script body 2"));
        assert!(selection_request.contains("script body 3"));
    }

    #[test]
    fn duplicate_title_overwrites_the_earlier_entry() {
        let mut outputs = vec![
            WorkerOutput {
                title: "a".to_string(),
                content: "first".to_string(),
            },
            WorkerOutput {
                title: "b".to_string(),
                content: "second".to_string(),
            },
        ];
        upsert_output(
            &mut outputs,
            WorkerOutput {
                title: "a".to_string(),
                content: "rewritten".to_string(),
            },
        );

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].content, "rewritten");
        assert_eq!(outputs[1].content, "second");
    }
}
