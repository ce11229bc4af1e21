pub mod batch_controller;
pub mod insight_extractor;
pub mod openai_client;
pub mod outreach;
pub mod pitch_generator;
pub mod pitch_templates;
pub mod text_extractor;

pub use openai_client::*;
pub use outreach::*;
pub use text_extractor::*;
