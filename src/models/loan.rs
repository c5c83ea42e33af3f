//! Loan (borrow record) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrowed_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned: bool,
    pub returned_date: Option<DateTime<Utc>>,
    pub renewed_date: Option<DateTime<Utc>>,
    pub renewals: i32,
}

/// Loan joined with book (and, for admin listings, borrower) display fields
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrowed_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned: bool,
    pub returned_date: Option<DateTime<Utc>>,
    pub renewed_date: Option<DateTime<Utc>>,
    pub renewals: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub borrower_name: Option<String>,
    pub borrower_email: Option<String>,
}

/// Borrow request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub book_id: i32,
}
