pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    ChatSession, ChatTransport, ConversationTool, GenerateRequest, ModelClient, NavigationShell,
    QuizTool, RequestDispatcher, RetryPolicy, TextTool, TextToolKind, ToolPanel, ToolServices,
    ToolState, TutorChatService, WritingTool,
};

pub use cli::{log_directive, Commands};

pub use connector::{GeminiClient, GeminiConfig, MockModelClient};

pub use domain::{
    ChatMessage, DomainError, Language, LearningGoal, ProficiencyLevel, QuizData, QuizQuestion,
    Role, WritingCorrectionResult, WritingRating,
};
