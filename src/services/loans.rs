//! Loan management service

use crate::{
    error::AppResult,
    models::loan::{Loan, LoanDetails},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book for the requesting user
    pub async fn borrow_book(&self, user_id: i32, book_id: i32) -> AppResult<Loan> {
        let loan = self.repository.loans.borrow(user_id, book_id).await?;
        tracing::info!(
            "Loan {} created: user={} book={} due={}",
            loan.id,
            user_id,
            book_id,
            loan.due_date
        );
        Ok(loan)
    }

    /// Return a borrowed book
    pub async fn return_book(&self, user_id: i32, loan_id: i32) -> AppResult<Loan> {
        let loan = self.repository.loans.return_loan(user_id, loan_id).await?;
        tracing::info!("Loan {} returned: user={} book={}", loan.id, user_id, loan.book_id);
        Ok(loan)
    }

    /// Renew an open loan
    pub async fn renew_book(&self, user_id: i32, loan_id: i32) -> AppResult<Loan> {
        let loan = self.repository.loans.renew(user_id, loan_id).await?;
        tracing::info!("Loan {} renewed: new due date {}", loan.id, loan.due_date);
        Ok(loan)
    }

    /// Get the requesting user's loans, joined with book fields
    pub async fn get_user_loans(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.get_user_loans(user_id).await
    }

    /// Get the requesting user's open loans due within the next week
    pub async fn get_due_soon(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.get_due_soon(user_id).await
    }

    /// Get every loan with borrower and book fields (admin listing)
    pub async fn get_all_loans(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.get_all().await
    }
}
