// Interactive confirmation for pending fixes

use dialoguer::{Confirm, Select};

use crate::error::Result;

/// Answer to "apply fix?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixChoice {
    /// Apply this one
    Apply,
    /// Leave this one alone
    Skip,
    /// Apply this one and every remaining fix without asking again
    ApplyAll,
    /// Stop now, nothing more is applied
    Abort,
}

pub trait FixPrompt {
    fn ask(&mut self, path: &str, description: &str) -> Result<FixChoice>;
}

const CHOICES: [(&str, FixChoice); 4] = [
    ("y - apply", FixChoice::Apply),
    ("n - skip", FixChoice::Skip),
    ("a - apply all remaining", FixChoice::ApplyAll),
    ("x - abort", FixChoice::Abort),
];

/// Terminal prompt, defaults to applying.
#[derive(Debug, Default)]
pub struct DialoguerPrompt;

impl FixPrompt for DialoguerPrompt {
    fn ask(&mut self, _path: &str, _description: &str) -> Result<FixChoice> {
        let labels: Vec<&str> = CHOICES.iter().map(|(label, _)| *label).collect();
        let idx = Select::new()
            .with_prompt("   apply fix?")
            .items(&labels)
            .default(0)
            .interact()?;
        Ok(CHOICES[idx].1)
    }
}

/// Non-interactive runs (`--yes`): apply everything.
#[derive(Debug, Default)]
pub struct AutoApprove;

impl FixPrompt for AutoApprove {
    fn ask(&mut self, _path: &str, _description: &str) -> Result<FixChoice> {
        Ok(FixChoice::ApplyAll)
    }
}

/// Yes/no question, used before writing to the cache.
pub fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}
