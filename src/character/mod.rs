pub mod record;

// Re-exports for internal module use
pub use record::{Character, ConstantReminder, ExampleDialogue, Story, WelcomeMessage};
