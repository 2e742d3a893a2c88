pub mod analyzer;
pub mod gemini_api;
pub mod mock_responses;
pub mod mode_selector;
pub mod settings;
