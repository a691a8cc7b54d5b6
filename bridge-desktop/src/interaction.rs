//! Terminal interaction using dialoguer

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    interaction::{is_affirmative, InteractionProvider},
};
use dialoguer::{Input, Password};
use std::io::Write;
use tokio::task::spawn_blocking;

/// Stdin/stdout interaction for desktop terminals
///
/// Prompts block on the terminal, so each one runs on the blocking pool.
#[derive(Debug, Default, Clone)]
pub struct TerminalInteraction;

impl TerminalInteraction {
    pub fn new() -> Self {
        Self
    }

    async fn blocking<T, F>(f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> std::result::Result<T, dialoguer::Error> + Send + 'static,
    {
        spawn_blocking(f)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Prompt task failed: {}", e)))?
            .map_err(map_dialoguer_error)
    }
}

fn map_dialoguer_error(e: dialoguer::Error) -> BridgeError {
    match e {
        dialoguer::Error::IO(io) if io.kind() == std::io::ErrorKind::Interrupted => {
            BridgeError::InteractionCancelled(io.to_string())
        }
        dialoguer::Error::IO(io) => BridgeError::Io(io),
    }
}

#[async_trait]
impl InteractionProvider for TerminalInteraction {
    async fn confirm(&self, prompt: &str) -> Result<bool> {
        let prompt = format!("{} (y/n)", prompt);
        let answer: String = Self::blocking(move || {
            Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
        })
        .await?;

        Ok(is_affirmative(&answer))
    }

    async fn prompt_secret(&self, prompt: &str) -> Result<String> {
        let prompt = prompt.to_string();
        let value = Self::blocking(move || Password::new().with_prompt(prompt).interact()).await?;
        Ok(value.trim().to_string())
    }

    async fn show_authorization_url(&self, url: &str) -> Result<()> {
        println!();
        println!("{}", url);
        println!();
        Ok(())
    }

    async fn prompt_authorization_code(&self, prompt: &str) -> Result<String> {
        let prompt = prompt.to_string();
        let code: String = Self::blocking(move || {
            Input::<String>::new().with_prompt(prompt).interact_text()
        })
        .await?;

        Ok(code.trim().to_string())
    }

    fn notify(&self, message: &str) {
        println!("{}", message);
    }

    fn begin_progress(&self, label: &str) {
        print!("{}", label);
        let _ = std::io::stdout().flush();
    }

    fn progress_tick(&self) {
        print!(".");
        let _ = std::io::stdout().flush();
    }

    fn end_progress(&self, summary: &str) {
        println!("{}", summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupted_prompt_is_cancellation() {
        let err = map_dialoguer_error(dialoguer::Error::IO(std::io::Error::new(
            std::io::ErrorKind::Interrupted,
            "ctrl-c",
        )));
        assert!(matches!(err, BridgeError::InteractionCancelled(_)));

        let err = map_dialoguer_error(dialoguer::Error::IO(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "closed",
        )));
        assert!(matches!(err, BridgeError::Io(_)));
    }
}
