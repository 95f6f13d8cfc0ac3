use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    account::{Account, AccountId},
    error::{LedgerResult, ValidationError, ensure_positive},
    movement::{Movement, MovementId, MovementKind, record_only},
};

pub type TransferId = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransfer {
    pub source: AccountId,
    pub destination: AccountId,
    pub amount: Decimal,
    /// Assigned from the `transfers` sequence when absent or the placeholder.
    pub code: Option<String>,
    pub reference: Option<String>,
    /// Defaults to the current time.
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewTransfer {
    pub fn new(source: AccountId, destination: AccountId, amount: Decimal) -> Self {
        Self {
            source,
            destination,
            amount,
            code: None,
            reference: None,
            timestamp: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Checks that hold before any account is looked at.
    pub fn validate(&self) -> LedgerResult<()> {
        ensure_positive(self.amount, "transfer")?;
        if self.source == self.destination {
            return Err(ValidationError::SameAccountTransfer);
        }
        Ok(())
    }
}

/// Paired debit and credit between two accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    id: TransferId,
    code: String,
    source: AccountId,
    destination: AccountId,
    amount: Decimal,
    timestamp: DateTime<Utc>,
    status: TransferStatus,
    reference: Option<String>,
}

impl Transfer {
    pub(crate) fn pending(
        id: TransferId,
        code: String,
        new: NewTransfer,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            code,
            source: new.source,
            destination: new.destination,
            amount: new.amount,
            timestamp: new.timestamp.unwrap_or(timestamp),
            status: TransferStatus::Pending,
            reference: new.reference,
        }
    }

    pub fn id(&self) -> TransferId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn source(&self) -> AccountId {
        self.source
    }

    pub fn destination(&self) -> AccountId {
        self.destination
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Text quoted in both movement descriptions.
    fn label(&self) -> &str {
        self.reference
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.code)
    }

    /// Moves the funds and records both sides. On error neither account
    /// has been touched.
    ///
    /// Returns the transfer-out movement on `source` followed by the
    /// transfer-in movement on `destination`.
    pub(crate) fn settle(
        &mut self,
        source: &mut Account,
        destination: &mut Account,
        movement_ids: (MovementId, MovementId),
    ) -> LedgerResult<[Movement; 2]> {
        debug_assert_eq!(source.id(), self.source);
        debug_assert_eq!(destination.id(), self.destination);

        let debit = source.handle_debit(self.amount)?;
        let credit = destination.handle_credit(self.amount)?;
        source.apply(&debit);
        destination.apply(&credit);

        let outgoing = record_only(
            source,
            movement_ids.0,
            MovementKind::TransferOut,
            self.amount,
            format!("Transfer to {} (Ref: {})", destination.number(), self.label()),
            self.timestamp,
        )?;
        let incoming = record_only(
            destination,
            movement_ids.1,
            MovementKind::TransferIn,
            self.amount,
            format!("Transfer from {} (Ref: {})", source.number(), self.label()),
            self.timestamp,
        )?;
        self.status = TransferStatus::Completed;
        Ok([outgoing, incoming])
    }
}
