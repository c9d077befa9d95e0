pub mod commit_picker;
pub mod message_prompt;
pub mod squash;
pub mod terminal;
pub mod validate;
