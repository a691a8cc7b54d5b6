//! User Interaction Abstraction
//!
//! Everything the core needs from a human goes through [`InteractionProvider`]:
//! consent, one-time secret entry, the out-of-band authorization step, and
//! status output. Terminal hosts prompt on stdin; headless hosts and tests
//! supply canned answers.

use async_trait::async_trait;

use crate::error::Result;

/// Pluggable interaction provider
///
/// # Example
///
/// ```ignore
/// use bridge_traits::interaction::InteractionProvider;
///
/// async fn ask(ui: &dyn InteractionProvider) -> Result<bool> {
///     ui.confirm("Do you want to proceed?").await
/// }
/// ```
#[async_trait]
pub trait InteractionProvider: Send + Sync {
    /// Ask a yes/no question
    async fn confirm(&self, prompt: &str) -> Result<bool>;

    /// Ask for a secret; input must not be echoed
    async fn prompt_secret(&self, prompt: &str) -> Result<String>;

    /// Show the URL the user must visit to grant access
    async fn show_authorization_url(&self, url: &str) -> Result<()>;

    /// Ask for the authorization code (or the full redirect URL)
    async fn prompt_authorization_code(&self, prompt: &str) -> Result<String>;

    /// Print a status line
    fn notify(&self, message: &str);

    /// Start a progress line labelled `label`
    fn begin_progress(&self, label: &str);

    /// Advance the current progress line by one item
    fn progress_tick(&self);

    /// Close the current progress line with `summary`
    fn end_progress(&self, summary: &str);
}

/// Answers accepted as consent when a host reads a free-form reply
pub const AFFIRMATIVE_ANSWERS: [&str; 4] = ["y", "yes", "Yes", "YES"];

/// Whether a free-form reply counts as consent
pub fn is_affirmative(answer: &str) -> bool {
    AFFIRMATIVE_ANSWERS.contains(&answer.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        for answer in ["y", "yes", "Yes", "YES", " yes "] {
            assert!(is_affirmative(answer), "{answer:?} should be accepted");
        }
        for answer in ["", "n", "no", "Y", "yEs", "sure"] {
            assert!(!is_affirmative(answer), "{answer:?} should be rejected");
        }
    }
}
