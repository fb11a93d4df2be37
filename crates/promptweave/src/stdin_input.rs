use promptweave_core::InputSource;

/// Interactive input source backed by the terminal
pub struct StdinSource;

impl InputSource for StdinSource {
    fn request_line(&self, prompt: &str) -> std::io::Result<String> {
        let prompt = prompt.trim_end().trim_end_matches(':').to_string();
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .map_err(|e| match e {
                dialoguer::Error::IO(io_err) => io_err,
            })
    }
}
