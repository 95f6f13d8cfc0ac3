use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    account::{Account, AccountId},
    error::{LedgerResult, ValidationError, ensure_positive},
    movement::{Movement, MovementId, MovementKind, apply_and_record},
};

pub type LoanId = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    #[default]
    Requested,
    Approved,
    Rejected,
    Disbursed,
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanAction {
    Approve,
    Reject,
    Disburse,
    Repay,
    MarkPaid,
}

impl LoanStatus {
    /// Status reached by performing `action` in this status, `None` when the
    /// action is not allowed. Statuses only move forward.
    pub fn next(self, action: LoanAction) -> Option<LoanStatus> {
        match (self, action) {
            (LoanStatus::Requested, LoanAction::Approve) => Some(LoanStatus::Approved),
            (LoanStatus::Requested, LoanAction::Reject) => Some(LoanStatus::Rejected),
            (LoanStatus::Approved, LoanAction::Disburse) => Some(LoanStatus::Disbursed),
            (LoanStatus::Disbursed, LoanAction::Repay) => Some(LoanStatus::Disbursed),
            (LoanStatus::Disbursed, LoanAction::MarkPaid) => Some(LoanStatus::Paid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    pub account: AccountId,
    pub requested_amount: Decimal,
    /// Percentage.
    pub interest_rate: Decimal,
    pub installments: u32,
    pub description: Option<String>,
    /// Defaults to the current date.
    pub requested_on: Option<NaiveDate>,
}

impl NewLoan {
    pub fn new(account: AccountId, requested_amount: Decimal, installments: u32) -> Self {
        Self {
            account,
            requested_amount,
            interest_rate: Decimal::ZERO,
            installments,
            description: None,
            requested_on: None,
        }
    }

    pub fn validate(&self) -> LedgerResult<()> {
        ensure_positive(self.requested_amount, "requested loan")?;
        if self.interest_rate < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount {
                subject: "interest rate",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    id: LoanId,
    number: String,
    account: AccountId,
    requested_amount: Decimal,
    requested_on: NaiveDate,
    status: LoanStatus,
    approved_amount: Decimal,
    approved_on: Option<NaiveDate>,
    due_on: Option<NaiveDate>,
    interest_rate: Decimal,
    installments: u32,
    pending_balance: Decimal,
    description: Option<String>,
}

impl Loan {
    pub(crate) fn request(id: LoanId, number: String, new: NewLoan, today: NaiveDate) -> Self {
        Self {
            id,
            number,
            account: new.account,
            requested_amount: new.requested_amount,
            requested_on: new.requested_on.unwrap_or(today),
            status: LoanStatus::Requested,
            approved_amount: Decimal::ZERO,
            approved_on: None,
            due_on: None,
            interest_rate: new.interest_rate,
            installments: new.installments,
            pending_balance: Decimal::ZERO,
            description: new.description,
        }
    }

    pub fn id(&self) -> LoanId {
        self.id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn requested_amount(&self) -> Decimal {
        self.requested_amount
    }

    pub fn requested_on(&self) -> NaiveDate {
        self.requested_on
    }

    pub fn status(&self) -> LoanStatus {
        self.status
    }

    pub fn approved_amount(&self) -> Decimal {
        self.approved_amount
    }

    pub fn approved_on(&self) -> Option<NaiveDate> {
        self.approved_on
    }

    pub fn due_on(&self) -> Option<NaiveDate> {
        self.due_on
    }

    pub fn interest_rate(&self) -> Decimal {
        self.interest_rate
    }

    pub fn installments(&self) -> u32 {
        self.installments
    }

    /// Approved amount still owed, reduced by repayments.
    pub fn pending_balance(&self) -> Decimal {
        self.pending_balance
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn transition(&self, action: LoanAction) -> LedgerResult<LoanStatus> {
        self.status
            .next(action)
            .ok_or(ValidationError::IllegalLoanTransition {
                action,
                status: self.status,
            })
    }

    pub fn approve(&mut self, today: NaiveDate) -> LedgerResult<()> {
        let next = self.transition(LoanAction::Approve)?;
        let due_on = today
            .checked_add_months(Months::new(self.installments))
            .ok_or(ValidationError::DueDateOutOfRange)?;

        self.status = next;
        self.approved_amount = self.requested_amount;
        self.pending_balance = self.approved_amount;
        self.approved_on = Some(today);
        self.due_on = Some(due_on);
        Ok(())
    }

    pub fn reject(&mut self) -> LedgerResult<()> {
        self.status = self.transition(LoanAction::Reject)?;
        Ok(())
    }

    /// Deposits the approved amount into the loan's account.
    pub(crate) fn disburse(
        &mut self,
        account: &mut Account,
        movement_id: MovementId,
        timestamp: DateTime<Utc>,
    ) -> LedgerResult<Movement> {
        debug_assert_eq!(account.id(), self.account);
        let next = self.transition(LoanAction::Disburse)?;
        if self.approved_amount <= Decimal::ZERO {
            return Err(ValidationError::NothingToDisburse);
        }

        let movement = apply_and_record(
            account,
            movement_id,
            MovementKind::Deposit,
            self.approved_amount,
            format!("Loan disbursement {}", self.number),
            timestamp,
        )?;
        self.status = next;
        Ok(movement)
    }

    /// Withdraws `amount` from the loan's account and deducts it from the
    /// pending balance.
    pub(crate) fn repay(
        &mut self,
        account: &mut Account,
        movement_id: MovementId,
        amount: Decimal,
        timestamp: DateTime<Utc>,
    ) -> LedgerResult<Movement> {
        debug_assert_eq!(account.id(), self.account);
        self.transition(LoanAction::Repay)?;
        ensure_positive(amount, "repayment")?;
        if amount > self.pending_balance {
            return Err(ValidationError::RepaymentExceedsBalance {
                amount,
                pending: self.pending_balance,
            });
        }

        let movement = apply_and_record(
            account,
            movement_id,
            MovementKind::Withdrawal,
            amount,
            format!("Loan repayment {}", self.number),
            timestamp,
        )?;
        self.pending_balance -= amount;
        Ok(movement)
    }

    pub fn mark_paid(&mut self) -> LedgerResult<()> {
        let next = self.transition(LoanAction::MarkPaid)?;
        if self.pending_balance > Decimal::ZERO {
            return Err(ValidationError::LoanBalanceOutstanding {
                pending: self.pending_balance,
            });
        }
        self.status = next;
        Ok(())
    }
}
