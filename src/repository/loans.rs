//! Loans repository for database operations.
//!
//! Borrow and return each perform a compound write (loan row + book
//! availability flag). Both run inside a transaction with the book row
//! locked, so two concurrent borrows of the same book cannot both observe
//! it as available.

use chrono::{DateTime, Duration, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::loan::{Loan, LoanDetails},
};

/// Loan period applied at borrow time and again on each renewal
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Loans due within this window count as "due soon"
pub const DUE_SOON_WINDOW_DAYS: i64 = 7;

/// Due date for a loan created or renewed at `from`
pub fn due_date_from(from: DateTime<Utc>) -> DateTime<Utc> {
    from + Duration::days(LOAN_PERIOD_DAYS)
}

/// Latest due date that still counts as due soon, seen from `from`
pub fn due_soon_cutoff(from: DateTime<Utc>) -> DateTime<Utc> {
    from + Duration::days(DUE_SOON_WINDOW_DAYS)
}

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Borrow a book for a user.
    ///
    /// Fails with NotFound if the book does not exist, Unavailable if its
    /// availability flag is down, Conflict if the user already holds an
    /// open loan on it.
    pub async fn borrow(&self, user_id: i32, book_id: i32) -> AppResult<Loan> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Lock the book row for the duration of the compound write
        let book_row = sqlx::query("SELECT id, available FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(
                    ErrorCode::NoSuchBook,
                    format!("Book with id {} not found", book_id),
                )
            })?;

        let available: bool = book_row.get("available");
        if !available {
            return Err(AppError::Unavailable("Book not available".to_string()));
        }

        let already_borrowed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE user_id = $1 AND book_id = $2 AND returned = FALSE)",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_borrowed {
            return Err(AppError::Conflict(
                ErrorCode::AlreadyBorrowed,
                "Book already borrowed".to_string(),
            ));
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (user_id, book_id, borrowed_date, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(now)
        .bind(due_date_from(now))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET available = FALSE WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Return a loan owned by the given user.
    ///
    /// An already-returned or nonexistent loan id fails with NotFound and
    /// produces no state change.
    pub async fn return_loan(&self, user_id: i32, loan_id: i32) -> AppResult<Loan> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET returned = TRUE, returned_date = $1
            WHERE id = $2 AND user_id = $3 AND returned = FALSE
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(loan_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(ErrorCode::NoSuchLoan, "Borrow record not found".to_string())
        })?;

        sqlx::query("UPDATE books SET available = TRUE WHERE id = $1")
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Renew a loan owned by the given user, pushing the due date out by a
    /// fresh loan period from now
    pub async fn renew(&self, user_id: i32, loan_id: i32) -> AppResult<Loan> {
        let now = Utc::now();

        sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET due_date = $1, renewed_date = $2, renewals = renewals + 1
            WHERE id = $3 AND user_id = $4 AND returned = FALSE
            RETURNING *
            "#,
        )
        .bind(due_date_from(now))
        .bind(now)
        .bind(loan_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(ErrorCode::NoSuchLoan, "Borrow record not found".to_string())
        })
    }

    /// Get loans for a user, joined with book display fields
    pub async fn get_user_loans(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, LoanDetails>(
            r#"
            SELECT l.*, b.title, b.author, b.isbn,
                   NULL::text as borrower_name, NULL::text as borrower_email
            FROM loans l
            JOIN books b ON l.book_id = b.id
            WHERE l.user_id = $1
            ORDER BY l.due_date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Get a user's open loans due within the due-soon window
    pub async fn get_due_soon(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        let cutoff = due_soon_cutoff(Utc::now());

        let loans = sqlx::query_as::<_, LoanDetails>(
            r#"
            SELECT l.*, b.title, b.author, b.isbn,
                   NULL::text as borrower_name, NULL::text as borrower_email
            FROM loans l
            JOIN books b ON l.book_id = b.id
            WHERE l.user_id = $1 AND l.returned = FALSE AND l.due_date <= $2
            ORDER BY l.due_date
            "#,
        )
        .bind(user_id)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Get all loans with borrower and book display fields
    pub async fn get_all(&self) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, LoanDetails>(
            r#"
            SELECT l.*, b.title, b.author, b.isbn,
                   u.full_name as borrower_name, u.email as borrower_email
            FROM loans l
            JOIN books b ON l.book_id = b.id
            JOIN users u ON l.user_id = u.id
            ORDER BY l.due_date
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }
}
