use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{
    account::{Account, AccountId, AccountUpdate, NewAccount},
    command::OperationRequest,
    error::LedgerResult,
    loan::{Loan, LoanId, NewLoan},
    movement::{Movement, NewMovement},
    transfer::{NewTransfer, Transfer},
};

pub mod in_memory_processor;
mod unit_of_work;

/// Operations exposed to callers of the ledger.
///
/// Every call is one atomic unit of work: when it returns an error nothing
/// it did is kept. Batch calls share a single unit of work, so one failing
/// element discards the whole batch.
pub trait LedgerProcessor {
    fn create_accounts(&self, accounts: Vec<NewAccount>) -> LedgerResult<Vec<Account>>;

    fn update_account(&self, id: AccountId, update: AccountUpdate) -> LedgerResult<Account>;

    /// Deposits and withdrawals, applied in input order.
    fn record_movements(&self, movements: Vec<NewMovement>) -> LedgerResult<Vec<Movement>>;

    fn submit_operation(&self, request: OperationRequest) -> LedgerResult<Movement>;

    /// Each transfer completes before the next one starts.
    fn create_transfers(&self, transfers: Vec<NewTransfer>) -> LedgerResult<Vec<Transfer>>;

    fn request_loan(&self, loan: NewLoan) -> LedgerResult<Loan>;

    fn approve_loan(&self, id: LoanId) -> LedgerResult<Loan>;

    fn reject_loan(&self, id: LoanId) -> LedgerResult<Loan>;

    fn disburse_loan(&self, id: LoanId) -> LedgerResult<(Loan, Movement)>;

    fn repay_loan(
        &self,
        id: LoanId,
        amount: Decimal,
        timestamp: Option<DateTime<Utc>>,
    ) -> LedgerResult<(Loan, Movement)>;

    fn mark_loan_paid(&self, id: LoanId) -> LedgerResult<Loan>;

    fn create_account(&self, account: NewAccount) -> LedgerResult<Account> {
        let mut created = self.create_accounts(vec![account])?;
        Ok(created.remove(0))
    }

    fn create_transfer(&self, transfer: NewTransfer) -> LedgerResult<Transfer> {
        let mut created = self.create_transfers(vec![transfer])?;
        Ok(created.remove(0))
    }
}
