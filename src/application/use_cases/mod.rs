mod request_dispatcher;
mod tutor_chat;

pub use request_dispatcher::*;
pub use tutor_chat::*;
