// Completion engine and record derivations
pub mod completion;
pub mod derived;

// Production data
pub mod comments;
pub mod plans;
pub mod records;
pub mod statistics;

// Reference data
pub mod catalog;
pub mod employees;
