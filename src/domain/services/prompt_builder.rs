//! Prompt text for every tool.
//!
//! All functions are pure: identical inputs always produce byte-identical
//! prompts. Callers are responsible for rejecting empty input beforehand.

use crate::domain::ProficiencyLevel;

pub const QUIZ_QUESTION_COUNT: usize = 5;
pub const PLAN_DAYS: usize = 5;

pub fn grammar(language: &str, topic: &str) -> String {
    format!(
        "You are an expert {language} teacher. Explain the grammar topic \"{topic}\" to a student.\n\
         Include:\n\
         1. A clear explanation.\n\
         2. Examples in {language} with translations.\n\
         3. Common mistakes to avoid.\n\
         Format the output in clean Markdown."
    )
}

pub fn vocabulary(language: &str, theme: &str) -> String {
    format!(
        "Create a vocabulary list for the theme \"{theme}\" in {language}.\n\
         Provide a table with columns: Word/Phrase, Pronunciation (if applicable), Meaning, and Example Sentence.\n\
         Format as a Markdown table. Add a brief usage note at the end."
    )
}

pub fn writing_correction(language: &str, text: &str) -> String {
    format!(
        "Act as a strict but helpful language editor for {language}. Correct the following text:\n\
         \"{text}\"\n\
         \n\
         Return a JSON object with:\n\
         - correctedText: The rewritten version.\n\
         - explanation: Why changes were made.\n\
         - tips: A list of 3 tips for improvement.\n\
         - rating: Object with scores (1-10) for grammar, clarity, and tone."
    )
}

pub fn translation(target_language: &str, text: &str) -> String {
    format!(
        "Translate the following text into {target_language}:\n\
         \"{text}\"\n\
         \n\
         After the translation, provide a bulleted list explaining 2-3 key grammar points or vocabulary choices used in the translation.\n\
         Format in Markdown."
    )
}

pub fn pronunciation(language: &str, text: &str) -> String {
    format!(
        "Provide a pronunciation guide for this {language} sentence:\n\
         \"{text}\"\n\
         \n\
         Include:\n\
         1. Phonetic breakdown (IPA or simple phonetic spelling).\n\
         2. Syllable stress indication.\n\
         3. Tone explanation (if applicable for {language}).\n\
         4. Notes on difficult sounds for learners.\n\
         Format in Markdown."
    )
}

pub fn learning_plan(language: &str, level: ProficiencyLevel) -> String {
    format!(
        "Create a {PLAN_DAYS}-day mini learning plan for a {level} student learning {language}.\n\
         For each day, suggest:\n\
         - A grammar topic.\n\
         - A vocabulary theme.\n\
         - A quick practice exercise.\n\
         Format in clear Markdown."
    )
}

pub fn quiz(language: &str, topic: &str, difficulty: ProficiencyLevel) -> String {
    format!(
        "Generate a {QUIZ_QUESTION_COUNT}-question multiple choice quiz for {language} regarding \"{topic}\" at a {difficulty} level.\n\
         Return JSON."
    )
}

/// System instruction that sets up the conversation partner persona.
pub fn tutor_instruction(language: &str, topic: &str) -> String {
    format!(
        "You are a friendly and patient language tutor conversation partner.\n\
         The language being learned is {language}. The topic is \"{topic}\".\n\
         Correct the user gently if they make major mistakes, but prioritize keeping the conversation flowing.\n\
         Speak mostly in {language}, but you can use English for complex explanations if the user is struggling.\n\
         Keep responses concise (under 50 words) to encourage back-and-forth."
    )
}

/// First message shown when a conversation starts.
pub fn chat_greeting(language: &str, topic: &str) -> String {
    format!("Hello! Let's talk about \"{topic}\" in {language}. How are you?")
}
