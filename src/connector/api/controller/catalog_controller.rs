use anyhow::Result;

use crate::domain::{Language, LearningGoal};

use super::super::Container;

pub struct CatalogController<'a> {
    container: &'a Container,
}

impl<'a> CatalogController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn languages(&self) -> Result<String> {
        Ok(self.format_languages(Language::all()))
    }

    pub async fn goals(&self) -> Result<String> {
        Ok(self.format_goals(&LearningGoal::ALL))
    }

    fn format_languages(&self, languages: &[Language]) -> String {
        let selected = self.container.language();
        let mut output = "Supported languages:\n\n".to_string();
        for language in languages {
            let marker = if *language == selected { "*" } else { " " };
            output.push_str(&format!(
                "{} {} {:<3} {}\n",
                marker,
                language.flag(),
                language.code(),
                language.name()
            ));
        }
        output
    }

    fn format_goals(&self, goals: &[LearningGoal]) -> String {
        let mut output = format!("Learning goals ({}):\n\n", self.container.language().name());
        for goal in goals {
            output.push_str(&format!("  {:<14} {}\n", goal.as_str(), goal.title()));
        }
        output
    }
}
