use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::TextToolKind;
use crate::Commands;

use super::container::Container;
use super::controller::{CatalogController, ChatController, LessonController, QuizController};

pub struct Router<'a> {
    catalog_controller: CatalogController<'a>,
    lesson_controller: LessonController<'a>,
    quiz_controller: QuizController<'a>,
    chat_controller: ChatController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            catalog_controller: CatalogController::new(container),
            lesson_controller: LessonController::new(container),
            quiz_controller: QuizController::new(container),
            chat_controller: ChatController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Languages => self.catalog_controller.languages().await,
            Commands::Goals => self.catalog_controller.goals().await,
            Commands::Grammar { topic } => {
                self.lesson_controller.lesson(TextToolKind::Grammar, topic).await
            }
            Commands::Vocab { theme } => {
                self.lesson_controller.lesson(TextToolKind::Vocabulary, theme).await
            }
            Commands::Translate { text } => {
                self.lesson_controller.lesson(TextToolKind::Translation, text).await
            }
            Commands::Pronounce { text } => {
                self.lesson_controller.lesson(TextToolKind::Pronunciation, text).await
            }
            Commands::Plan { level } => self.lesson_controller.lesson(TextToolKind::Plan, level).await,
            Commands::Write { text } => self.lesson_controller.write(text).await,
            Commands::Quiz { topic, difficulty } => {
                let mut input = BufReader::new(tokio::io::stdin()).lines();
                self.quiz_controller
                    .quiz(topic, difficulty, &mut input, &mut std::io::stdout())
                    .await
            }
            Commands::Chat { topic } => {
                let mut input = BufReader::new(tokio::io::stdin()).lines();
                self.chat_controller
                    .chat(topic, &mut input, &mut std::io::stdout())
                    .await
            }
        }
    }
}
