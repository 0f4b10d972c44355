//! Resolution of destination files that already exist with other content.
//!
//! ```text
//! Asking ──skip──────────────▶ Skip
//!   │   ──overwrite─────────▶ Overwrite
//!   └──diff──▶ show diff ──▶ Reviewed ──skip──────▶ Skip
//!                                     ──overwrite─▶ Overwrite
//! ```
//!
//! The diff is offered once; after reviewing only skip and overwrite remain.

use crate::error::{Result, StencilError};
use crate::ui::{Prompt, PromptOption, PromptType, UserInterface};
use std::path::Path;

/// Prompt key used for conflict questions.
pub const CONFLICT_PROMPT_KEY: &str = "conflict";

/// An answer to a conflict question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Leave the existing file untouched.
    Skip,
    /// Replace the existing file.
    Overwrite,
    /// Show the differences, then ask again.
    ViewDiff,
}

impl Choice {
    /// Value used in prompts and `STENCIL_PROMPT_CONFLICT`.
    pub fn value(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Overwrite => "overwrite",
            Self::ViewDiff => "diff",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Skip => "Skip",
            Self::Overwrite => "Overwrite",
            Self::ViewDiff => "Diff",
        }
    }

    /// Parse a prompt value.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "skip" => Some(Self::Skip),
            "overwrite" => Some(Self::Overwrite),
            "diff" => Some(Self::ViewDiff),
            _ => None,
        }
    }
}

/// Final decision for a conflicting file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Skip,
    Overwrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Asking,
    Reviewed,
}

impl State {
    fn choices(self) -> &'static [Choice] {
        match self {
            Self::Asking => &[Choice::Skip, Choice::Overwrite, Choice::ViewDiff],
            Self::Reviewed => &[Choice::Skip, Choice::Overwrite],
        }
    }
}

/// Ask the user what to do with `dst`, whose current content is `existing`.
///
/// # Errors
///
/// Returns `DestinationExists` if the answer is not one of the offered
/// choices, and propagates prompt failures.
pub fn resolve_conflict(
    ui: &mut dyn UserInterface,
    dst: &Path,
    existing: &[u8],
    incoming: &[u8],
) -> Result<Resolution> {
    let mut state = State::Asking;

    loop {
        let options = state
            .choices()
            .iter()
            .map(|choice| PromptOption::new(choice.label(), choice.value()))
            .collect();
        let prompt = Prompt::new(
            CONFLICT_PROMPT_KEY,
            format!("File already exists: {}", dst.display()),
            PromptType::Select { options },
        )
        .with_default(Choice::Skip.value());

        let answer = ui.prompt(&prompt)?.as_string();
        let choice = Choice::from_value(&answer).filter(|c| state.choices().contains(c));

        match (state, choice) {
            (_, Some(Choice::Skip)) => return Ok(Resolution::Skip),
            (_, Some(Choice::Overwrite)) => return Ok(Resolution::Overwrite),
            (State::Asking, Some(Choice::ViewDiff)) => {
                ui.show_diff(
                    &String::from_utf8_lossy(existing),
                    &String::from_utf8_lossy(incoming),
                );
                state = State::Reviewed;
            }
            _ => {
                return Err(StencilError::DestinationExists {
                    path: dst.to_path_buf(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    fn resolve(ui: &mut MockUI) -> Result<Resolution> {
        resolve_conflict(ui, Path::new("src/Button.tsx"), b"old\n", b"new\n")
    }

    #[test]
    fn skip_is_the_default() {
        let mut ui = MockUI::new();
        assert_eq!(resolve(&mut ui).unwrap(), Resolution::Skip);
        assert!(ui.diffs().is_empty());
    }

    #[test]
    fn overwrite_on_first_prompt() {
        let mut ui = MockUI::new();
        ui.set_prompt_response(CONFLICT_PROMPT_KEY, "overwrite");
        assert_eq!(resolve(&mut ui).unwrap(), Resolution::Overwrite);
        assert_eq!(ui.prompts_shown().len(), 1);
    }

    #[test]
    fn diff_then_overwrite() {
        let mut ui = MockUI::new();
        ui.queue_prompt_responses(CONFLICT_PROMPT_KEY, vec!["diff", "overwrite"]);
        assert_eq!(resolve(&mut ui).unwrap(), Resolution::Overwrite);
        assert_eq!(ui.diffs(), [("old\n".to_string(), "new\n".to_string())]);
        assert_eq!(ui.prompts_shown().len(), 2);
    }

    #[test]
    fn diff_is_not_offered_twice() {
        let mut ui = MockUI::new();
        ui.queue_prompt_responses(CONFLICT_PROMPT_KEY, vec!["diff", "diff"]);
        let err = resolve(&mut ui).unwrap_err();
        assert!(matches!(err, StencilError::DestinationExists { .. }));
        assert_eq!(ui.diffs().len(), 1);
    }

    #[test]
    fn unknown_answer_is_an_error() {
        let mut ui = MockUI::new();
        ui.set_prompt_response(CONFLICT_PROMPT_KEY, "merge");
        assert!(resolve(&mut ui).is_err());
    }

    #[test]
    fn choice_values_round_trip() {
        for choice in [Choice::Skip, Choice::Overwrite, Choice::ViewDiff] {
            assert_eq!(Choice::from_value(choice.value()), Some(choice));
        }
    }
}
