pub mod catalog_controller;
pub mod chat_controller;
pub mod lesson_controller;
pub mod quiz_controller;

pub use catalog_controller::CatalogController;
pub use chat_controller::ChatController;
pub use lesson_controller::LessonController;
pub use quiz_controller::QuizController;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown on stderr while a request is loading.
pub(crate) fn start_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
