mod gemini_client;
mod mock_model_client;

pub use gemini_client::*;
pub use mock_model_client::*;
