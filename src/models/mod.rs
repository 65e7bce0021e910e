mod account_statement;
mod card_statement;
mod validation;

pub use account_statement::{AccountStatement, EventGroup, EventKind, UnknownEventKind};
pub use card_statement::CardStatement;
pub use validation::ValidationError;
