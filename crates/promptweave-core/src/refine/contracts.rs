use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Candidate artifact produced by the generator step
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DraftArtifact {
    /// Thought process followed while producing the draft
    pub thoughts: String,
    /// The candidate text itself
    pub draft: String,
}

/// The critic's judgment of a draft
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    /// Whether the draft passed, failed, or needs improvement
    pub evaluation: VerdictKind,
    /// What needs improvement and why
    pub feedback: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictKind {
    Pass,
    NeedsImprovement,
    Fail,
}

impl VerdictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictKind::Pass => "PASS",
            VerdictKind::NeedsImprovement => "NEEDS_IMPROVEMENT",
            VerdictKind::Fail => "FAIL",
        }
    }

    /// Only a pass terminates the loop; both other verdicts continue it.
    pub fn is_pass(&self) -> bool {
        matches!(self, VerdictKind::Pass)
    }
}
