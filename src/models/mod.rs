//! Data models for Librarium

pub mod book;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookQuery};
pub use loan::{Loan, LoanDetails};
pub use user::{Role, User, UserClaims};
