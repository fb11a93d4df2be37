use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One independently describable sub-task from the planning step
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlanItem {
    /// Title of the idea
    pub title: String,
    /// What this idea should cover
    pub description: String,
}

/// The orchestrator's plan for a topic
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Plan {
    /// Analysis of the campaign topic
    pub topic: String,
    /// Ordered list of ideas to write
    pub ideas: Vec<PlanItem>,
}

/// Content written by one worker for one planned item
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerOutput {
    /// Title of the idea
    pub title: String,
    /// Written content for the idea
    pub content: String,
}

/// The selection step's choice of the best worker output
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Selection {
    /// Title of the best idea
    pub title: String,
    /// Reason for selecting it
    pub reason: String,
}
