pub mod parser;
pub mod validator;

pub use parser::{ParseRejection, SignalParser};
pub use validator::{RejectReason, SignalValidator, ValidatedOpen, ValidationContext};
