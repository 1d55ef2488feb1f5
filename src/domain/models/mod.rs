mod chat_message;
mod language;
mod learning_goal;
mod proficiency;
mod quiz;
mod structured;
mod writing_correction;

pub use chat_message::*;
pub use language::*;
pub use learning_goal::*;
pub use proficiency::*;
pub use quiz::*;
pub use structured::*;
pub use writing_correction::*;
