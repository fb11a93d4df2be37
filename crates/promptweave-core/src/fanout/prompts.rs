use crate::fanout::{PlanItem, WorkerOutput};

/// Prompt templates for the fan-out workflow
pub struct CampaignPrompts;

impl CampaignPrompts {
    /// Instruction-only turn for the planning step
    pub fn plan(topic: &str, num_ideas: usize) -> String {
        format!(
            "You are a distinguished scriptwriter with extensive experience in \
             creating viral social media campaigns and short-form commercials.\n\n\
             Your task is to generate creative ideas for a script based on the \
             following topic.\n\n\
             TOPIC: {topic}\n\n\
             Analyze the topic: consider its key elements, the target audience, \
             current trends that could be incorporated, and which platforms suit \
             the campaign. Then generate engaging, shareable ideas aligned with \
             the topic.\n\n\
             Limit the number of ideas to: {num_ideas}\n\n\
             The output should include:\n\
             topic: 2-3 sentences summarizing your analysis\n\
             ideas: a list where each idea has a title (5-10 word summary) and a \
             description (2-4 sentences on the key elements)\n\n\
             Return the output as JSON."
        )
    }

    /// Instruction-only turn for one worker; a digest of earlier outputs is
    /// included so later scripts avoid repeating them.
    pub fn worker(topic: &str, item: &PlanItem, previous: &[WorkerOutput]) -> String {
        let previous_context = if previous.is_empty() {
            "No scripts have been written yet.".to_string()
        } else {
            format!(
                "Scripts already written (avoid repeating their angles):\n\n{}",
                Self::digest(previous)
            )
        };
        format!(
            "Write a script for a viral short-form video ad based on:\n\
             Topic: {topic}\n\
             Idea for the script: {title}\n\
             Description: {description}\n\n\
             {previous_context}\n\n\
             The script should capture attention within the first few seconds, \
             clearly convey the message and call to action, use innovative and \
             captivating elements, describe the accompanying visuals, build and \
             relieve tension through conflict and resolution, end with a strong \
             conclusion, and target 30-60 seconds.\n\n\
             The output should have two attributes:\n\
             title: 5-10 word summary of the idea\n\
             content: the written script\n\n\
             Return the output as JSON.",
            title = item.title,
            description = item.description,
        )
    }

    /// Instruction-only turn for the selection step over every worker output
    pub fn selection(topic: &str, outputs: &[WorkerOutput]) -> String {
        format!(
            "Review the ideas generated for a viral social media ad \
             (short-film format) on the following topic:\n\n\
             Topic: {topic}\n\n\
             {digest}\n\n\
             ===========================================================\n\n\
             Review every idea, identify the best one based on creativity, \
             engagement, and viral potential, and state the reason for your \
             choice.\n\n\
             Return the output as JSON.",
            digest = Self::digest(outputs),
        )
    }

    fn digest(outputs: &[WorkerOutput]) -> String {
        outputs
            .iter()
            .map(|output| format!("=== Idea: {} ===\n{}\n", output.title, output.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
