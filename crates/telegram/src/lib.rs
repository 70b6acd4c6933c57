pub mod notifier;
pub mod source;

pub use notifier::{NullNotifier, TelegramNotifier};
pub use source::TelegramSignalSource;
