use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::{AccountId, MemberId},
    loan::{LoanAction, LoanId, LoanStatus},
    movement::MovementKind,
    transfer::TransferId,
};

/// The single failure kind of the ledger.
///
/// Any operation returning it has discarded its whole unit of work, so
/// nothing it staged before failing was persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{subject} amount must be positive")]
    NonPositiveAmount { subject: &'static str },
    #[error("{subject} must not be negative")]
    NegativeAmount { subject: &'static str },
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("balance would exceed the largest representable amount")]
    BalanceOverflow,
    #[error("account number cannot be modified once assigned")]
    AccountNumberImmutable,
    #[error("account number `{0}` is already in use")]
    DuplicateAccountNumber(String),
    #[error("transfer code `{0}` is already in use")]
    DuplicateTransferCode(String),
    #[error("source and destination accounts must be different")]
    SameAccountTransfer,
    #[error("{action:?} is not allowed for a loan in {status:?} status")]
    IllegalLoanTransition {
        action: LoanAction,
        status: LoanStatus,
    },
    #[error("loan must have a positive approved amount to be disbursed")]
    NothingToDisburse,
    #[error("loan still has a pending balance of {pending}")]
    LoanBalanceOutstanding { pending: Decimal },
    #[error("repayment of {amount} exceeds the pending balance of {pending}")]
    RepaymentExceedsBalance { amount: Decimal, pending: Decimal },
    #[error("due date is out of the supported calendar range")]
    DueDateOutOfRange,
    #[error("{0:?} movements are recorded by the transfer engine only")]
    RecordOnlyMovement(MovementKind),
    #[error("unknown account {0}")]
    UnknownAccount(AccountId),
    #[error("unknown account number `{0}`")]
    UnknownAccountNumber(String),
    #[error("unknown member {0}")]
    UnknownMember(MemberId),
    #[error("unknown transfer {0}")]
    UnknownTransfer(TransferId),
    #[error("unknown loan {0}")]
    UnknownLoan(LoanId),
    #[error("unknown loan number `{0}`")]
    UnknownLoanNumber(String),
}

pub type LedgerResult<T> = Result<T, ValidationError>;

/// Fails with [`ValidationError::NonPositiveAmount`] unless `amount > 0`.
pub fn ensure_positive(amount: Decimal, subject: &'static str) -> LedgerResult<()> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveAmount { subject })
    }
}
