pub mod batch;
pub mod insights;
pub mod pitch;
pub mod spam_words;
