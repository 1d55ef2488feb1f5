use std::io::Write;

use anyhow::{anyhow, bail, Result};
use tokio::io::{AsyncBufRead, Lines};

use crate::domain::LearningGoal;

use super::super::Container;
use super::start_spinner;

pub const QUIT_COMMAND: &str = "/quit";

/// Turn-by-turn conversation with the tutor until `/quit` or end of input.
pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn chat<R, W>(&self, topic: String, input: &mut Lines<R>, out: &mut W) -> Result<String>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut shell = self.container.shell();
        let conversation = shell
            .select_goal(LearningGoal::Conversation)?
            .as_conversation_mut()
            .ok_or_else(|| anyhow!("conversation goal has no chat tool"))?;

        conversation.edit_topic(topic);
        if !conversation.start() {
            bail!("Nothing to talk about. Pick a topic (e.g., Travel, Restaurants, Hobbies...)");
        }
        if let Some(greeting) = conversation.messages().first() {
            writeln!(out, "Tutor: {}", greeting.text())?;
        }
        writeln!(out, "(type {} to end)", QUIT_COMMAND)?;

        loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = input.next_line().await? else {
                break;
            };
            let text = line.trim();
            if text == QUIT_COMMAND {
                break;
            }
            if text.is_empty() {
                continue;
            }

            let spinner = start_spinner("Tutor is typing...");
            let reply = conversation.send(text).await;
            spinner.finish_and_clear();
            writeln!(out, "Tutor: {}", reply?.text())?;
        }

        let turns = conversation.messages().len();
        conversation.end();
        Ok(format!("Conversation ended after {} messages.", turns))
    }
}
