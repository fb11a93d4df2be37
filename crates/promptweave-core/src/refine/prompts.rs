/// Prompt templates for the refinement loop
pub struct RefinePrompts;

impl RefinePrompts {
    /// System turn for the generator. Prior critic feedback, when present, is
    /// threaded in so the next draft can improve on it.
    pub fn generator(feedback: Option<&str>) -> String {
        let feedback_context = match feedback {
            Some(text) => format!(
                "There is feedback from your previous generation. Reflect on it \
                 to improve your next draft:\n\n{text}"
            ),
            None => "This is your first attempt; there is no prior feedback.".to_string(),
        };
        format!(
            "Your goal is to write a short piece of text based on the user's \
             task. {feedback_context}\n\n\
             Output your answer concisely with the following attributes:\n\
             thoughts: your understanding of the task and feedback, and how you \
             plan to improve\n\
             draft: the text you have generated\n\n\
             Return as JSON."
        )
    }

    /// Instruction-only turn for the evaluator; the draft is embedded, so no
    /// user turn is sent.
    pub fn evaluator(task: &str, draft: &str) -> String {
        format!(
            "Evaluate the following draft for:\n\
             1. Structure: a clear setup that prepares the reader, and an ending \
             that is both surprising and logically connected to it.\n\
             2. Clarity: understandable to a broad audience without niche \
             references.\n\
             3. Relevance: the draft must address the given task directly.\n\
             4. Engagement: it should make the reader laugh, think, or both.\n\n\
             You are evaluating only, not rewriting the draft.\n\
             Only output PASS if all criteria are met and you have no further \
             suggestions for improvement.\n\n\
             Output your evaluation concisely in the following format:\n\
             evaluation: PASS, NEEDS_IMPROVEMENT, or FAIL\n\
             feedback: what needs improvement and why\n\n\
             task: {task}\n\
             draft: {draft}\n\n\
             Return the output as JSON."
        )
    }
}
