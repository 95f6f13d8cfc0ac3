use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{
    account::{Account, AccountId},
    error::{LedgerResult, ValidationError, ensure_positive},
    movement::{MovementKind, NewMovement},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Deposit,
    Withdrawal,
}

impl From<OperationKind> for MovementKind {
    fn from(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Deposit => MovementKind::Deposit,
            OperationKind::Withdrawal => MovementKind::Withdrawal,
        }
    }
}

/// Teller request for a deposit or withdrawal. Lives only until it has
/// been turned into a movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    pub account: AccountId,
    pub kind: OperationKind,
    pub amount: Decimal,
    pub description: Option<String>,
    /// Defaults to the current time.
    pub timestamp: Option<DateTime<Utc>>,
}

impl OperationRequest {
    pub fn new(account: AccountId, kind: OperationKind, amount: Decimal) -> Self {
        Self {
            account,
            kind,
            amount,
            description: None,
            timestamp: None,
        }
    }

    pub fn deposit(account: AccountId, amount: Decimal) -> Self {
        Self::new(account, OperationKind::Deposit, amount)
    }

    pub fn withdrawal(account: AccountId, amount: Decimal) -> Self {
        Self::new(account, OperationKind::Withdrawal, amount)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validates the request against the current state of its account and
    /// turns it into the movement the ledger has to record.
    ///
    /// The ledger repeats the balance check when recording.
    pub fn parse_command(self, account: &Account) -> LedgerResult<NewMovement> {
        debug_assert_eq!(account.id(), self.account);
        ensure_positive(self.amount, "operation")?;
        if self.kind == OperationKind::Withdrawal && account.balance() < self.amount {
            return Err(ValidationError::InsufficientBalance);
        }
        Ok(NewMovement {
            account: self.account,
            kind: self.kind.into(),
            amount: self.amount,
            description: self.description.unwrap_or_default(),
            timestamp: self.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::account::NewAccount;

    use super::*;

    fn account_with(balance: i64) -> Account {
        let mut acc = Account::open(
            3,
            "ACC-00003".to_string(),
            &NewAccount::new(1),
            None,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        acc.apply(&acc.handle_credit(Decimal::from(balance)).unwrap());
        acc
    }

    #[test]
    fn maps_to_movement() {
        let acc = account_with(20);
        let mv = OperationRequest::deposit(3, Decimal::from(5))
            .with_description("cash")
            .parse_command(&acc)
            .unwrap();
        assert_eq!(mv.kind, MovementKind::Deposit);
        assert_eq!(mv.amount, Decimal::from(5));
        assert_eq!(mv.description, "cash");

        let mv = OperationRequest::withdrawal(3, Decimal::from(20))
            .parse_command(&acc)
            .unwrap();
        assert_eq!(mv.kind, MovementKind::Withdrawal);
        assert_eq!(mv.description, "");
    }

    #[test]
    fn rejects_bad_requests() {
        let acc = account_with(20);
        let err = OperationRequest::deposit(3, Decimal::ZERO)
            .parse_command(&acc)
            .unwrap_err();
        assert_eq!(err.to_string(), "operation amount must be positive");

        let err = OperationRequest::withdrawal(3, Decimal::from(21))
            .parse_command(&acc)
            .unwrap_err();
        assert!(matches!(err, ValidationError::InsufficientBalance));
    }
}
