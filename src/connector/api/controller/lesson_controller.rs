use anyhow::{anyhow, bail, Result};

use crate::application::{TextToolKind, ToolState};
use crate::domain::{LearningGoal, WritingCorrectionResult};

use super::super::Container;
use super::start_spinner;

/// One-shot tools: the five markdown tools plus writing correction.
pub struct LessonController<'a> {
    container: &'a Container,
}

impl<'a> LessonController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn lesson(&self, kind: TextToolKind, input: String) -> Result<String> {
        let mut shell = self.container.shell();
        let tool = shell
            .select_goal(kind.goal())?
            .as_text_mut()
            .ok_or_else(|| anyhow!("{} has no text tool", kind.goal()))?;

        tool.edit_input(input);
        let Some(request) = tool.begin() else {
            bail!("Nothing to send. {}", kind.input_hint(tool.language()));
        };

        let spinner = start_spinner(format!("{}...", kind.title()));
        let outcome = request.text().await;
        spinner.finish_and_clear();
        tool.finish(&request, outcome);

        match tool.state() {
            ToolState::ResultShown(text) => Ok(self.format_lesson(kind, text)),
            ToolState::ErrorShown(message) => Err(anyhow!(message.clone())),
            other => bail!("{} ended in state {}", kind.title(), other.name()),
        }
    }

    pub async fn write(&self, text: String) -> Result<String> {
        let mut shell = self.container.shell();
        let tool = shell
            .select_goal(LearningGoal::Writing)?
            .as_writing_mut()
            .ok_or_else(|| anyhow!("writing has no correction tool"))?;

        tool.edit_input(text);
        let Some(request) = tool.begin() else {
            bail!("Nothing to send. Write a few sentences to correct.");
        };

        let spinner = start_spinner("Analyzing your writing...");
        let outcome = request.structured::<WritingCorrectionResult>().await;
        spinner.finish_and_clear();
        tool.finish(&request, outcome);

        match tool.state() {
            ToolState::ResultShown(result) => Ok(self.format_correction(result)),
            ToolState::ErrorShown(message) => Err(anyhow!(message.clone())),
            other => bail!("writing correction ended in state {}", other.name()),
        }
    }

    fn format_lesson(&self, kind: TextToolKind, text: &str) -> String {
        format!(
            "{} ({})\n\n{}",
            kind.title(),
            self.container.language().name(),
            text
        )
    }

    fn format_correction(&self, result: &WritingCorrectionResult) -> String {
        let mut output = format!("Corrected text:\n  {}\n\n", result.corrected_text);
        output.push_str(&format!("Explanation:\n  {}\n", result.explanation));

        if !result.tips.is_empty() {
            output.push_str("\nTips:\n");
            for tip in &result.tips {
                output.push_str(&format!("  - {}\n", tip));
            }
        }

        output.push_str("\nRating:\n");
        for (name, score) in result.rating.entries() {
            output.push_str(&format!("  {:<8} {:.1}/10\n", name, score));
        }
        output
    }
}
