pub mod notifications;
pub mod prompts;
pub mod reporting;
pub mod storage;
