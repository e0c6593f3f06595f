pub mod notifier;
pub mod push;
