/// Source of single-line answers solicited mid-workflow (e.g. a missing
/// departure date). The CLI backs this with an interactive prompt; tests
/// queue canned lines.
pub trait InputSource: Send + Sync {
    fn request_line(&self, prompt: &str) -> std::io::Result<String>;
}
