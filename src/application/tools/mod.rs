//! Tool controllers: one state machine per learning tool.

mod conversation_tool;
mod quiz_tool;
mod text_tool;
mod tool_state;
mod writing_tool;

pub use conversation_tool::*;
pub use quiz_tool::*;
pub use text_tool::*;
pub use tool_state::*;
pub use writing_tool::*;
