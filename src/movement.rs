use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    account::{Account, AccountId},
    error::{LedgerResult, ValidationError, ensure_positive},
};

pub type MovementId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovementKind {
    Deposit,
    Withdrawal,
    TransferIn,
    TransferOut,
}

impl MovementKind {
    /// `amount` with the sign it contributes to the account balance.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            MovementKind::Deposit | MovementKind::TransferIn => amount,
            MovementKind::Withdrawal | MovementKind::TransferOut => -amount,
        }
    }
}

/// Immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    id: MovementId,
    account: AccountId,
    kind: MovementKind,
    amount: Decimal,
    timestamp: DateTime<Utc>,
    description: String,
    balance_after: Decimal,
}

impl Movement {
    pub fn id(&self) -> MovementId {
        self.id
    }

    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn kind(&self) -> MovementKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Account balance right after this movement took effect.
    pub fn balance_after(&self) -> Decimal {
        self.balance_after
    }
}

/// Input for an externally requested movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    pub account: AccountId,
    pub kind: MovementKind,
    pub amount: Decimal,
    pub description: String,
    /// Defaults to the current time.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Applies a deposit or withdrawal to `account`, then records it.
///
/// Transfer kinds are rejected: their balance effect belongs to the
/// transfer engine, which uses [`record_only`].
pub fn apply_and_record(
    account: &mut Account,
    id: MovementId,
    kind: MovementKind,
    amount: Decimal,
    description: String,
    timestamp: DateTime<Utc>,
) -> LedgerResult<Movement> {
    let change = match kind {
        MovementKind::Deposit => account.handle_credit(amount)?,
        MovementKind::Withdrawal => account.handle_debit(amount)?,
        MovementKind::TransferIn | MovementKind::TransferOut => {
            return Err(ValidationError::RecordOnlyMovement(kind));
        }
    };
    account.apply(&change);
    record_only(account, id, kind, amount, description, timestamp)
}

/// Records a movement whose effect was already applied to `account`,
/// snapshotting the current balance.
pub fn record_only(
    account: &Account,
    id: MovementId,
    kind: MovementKind,
    amount: Decimal,
    description: String,
    timestamp: DateTime<Utc>,
) -> LedgerResult<Movement> {
    ensure_positive(amount, "movement")?;
    Ok(Movement {
        id,
        account: account.id(),
        kind,
        amount,
        timestamp,
        description,
        balance_after: account.balance(),
    })
}

/// Newest first, ties broken by the higher id.
pub fn sort_for_display(movements: &mut [Movement]) {
    movements.sort_by_key(|m| Reverse((m.timestamp, m.id)));
}
