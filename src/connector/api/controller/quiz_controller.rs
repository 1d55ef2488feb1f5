use std::io::Write;

use anyhow::{anyhow, bail, Result};
use tokio::io::{AsyncBufRead, Lines};

use crate::application::{QuizTool, ToolState};
use crate::domain::{option_letter, parse_option, LearningGoal, ProficiencyLevel, QuizData, QuizQuestion};

use super::super::Container;
use super::start_spinner;

/// Generates a quiz, collects one answer per question, then grades.
pub struct QuizController<'a> {
    container: &'a Container,
}

impl<'a> QuizController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn quiz<R, W>(
        &self,
        topic: String,
        difficulty: String,
        input: &mut Lines<R>,
        out: &mut W,
    ) -> Result<String>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let difficulty = ProficiencyLevel::parse(&difficulty)
            .ok_or_else(|| anyhow!("Unknown difficulty '{}'. Use Beginner, Intermediate or Advanced", difficulty))?;

        let mut shell = self.container.shell();
        let tool = shell
            .select_goal(LearningGoal::Quiz)?
            .as_quiz_mut()
            .ok_or_else(|| anyhow!("quiz goal has no quiz tool"))?;
        tool.set_difficulty(difficulty);
        tool.edit_topic(topic);

        let Some(request) = tool.begin() else {
            bail!("Nothing to send. Enter a topic (e.g., Food, Travel, Verbs...)");
        };
        let spinner = start_spinner("Generating quiz...");
        let outcome = request.structured::<QuizData>().await;
        spinner.finish_and_clear();
        tool.finish(&request, outcome);

        let questions = match tool.state() {
            ToolState::ResultShown(quiz) => quiz.questions.clone(),
            ToolState::ErrorShown(message) => bail!("{}", message),
            other => bail!("quiz ended in state {}", other.name()),
        };

        writeln!(out, "Quiz: {} ({})\n", tool.topic(), tool.difficulty())?;
        for (i, question) in questions.iter().enumerate() {
            self.write_question(out, i, question)?;
            let choice = self.read_choice(input, out, question.options.len()).await?;
            tool.select(i, choice);
        }

        if !tool.submit_answers() {
            bail!("some questions are still unanswered");
        }
        self.format_results(tool, &questions)
    }

    fn write_question<W: Write>(&self, out: &mut W, index: usize, question: &QuizQuestion) -> Result<()> {
        writeln!(out, "{}. {}", index + 1, question.question)?;
        for (j, option) in question.options.iter().enumerate() {
            writeln!(out, "   {}) {}", option_letter(j), option)?;
        }
        Ok(())
    }

    async fn read_choice<R, W>(&self, input: &mut Lines<R>, out: &mut W, option_count: usize) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let last = option_letter(option_count - 1);
        loop {
            write!(out, "Your answer (A-{}): ", last)?;
            out.flush()?;
            let Some(line) = input.next_line().await? else {
                bail!("input closed before the quiz was finished");
            };
            match parse_option(&line, option_count) {
                Some(choice) => return Ok(choice),
                None => writeln!(out, "Please choose one of A-{}.", last)?,
            }
        }
    }

    fn format_results(&self, tool: &QuizTool, questions: &[QuizQuestion]) -> Result<String> {
        let mut output = "Results:\n\n".to_string();
        for (i, question) in questions.iter().enumerate() {
            let outcome = tool
                .outcome(i)
                .ok_or_else(|| anyhow!("question {} was not graded", i + 1))?;
            if outcome.is_correct() {
                output.push_str(&format!("{}. Correct\n", i + 1));
            } else {
                output.push_str(&format!(
                    "{}. Incorrect: you chose {}, the answer is {}) {}\n",
                    i + 1,
                    option_letter(outcome.selected),
                    option_letter(outcome.correct),
                    question.correct_option().unwrap_or_default()
                ));
            }
            output.push_str(&format!("   {}\n", question.explanation));
        }

        let score = tool.score().ok_or_else(|| anyhow!("quiz was not graded"))?;
        output.push_str(&format!("\nScore: {}", score));
        Ok(output)
    }
}
