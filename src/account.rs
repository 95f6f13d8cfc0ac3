use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerResult, ValidationError, ensure_positive};

pub type AccountId = u64;
pub type MemberId = u64;
pub type UserId = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Closed,
    Suspended,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Savings,
    Checking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceChangeKind {
    Credited,
    Debited,
}

/// A validated change to an account balance, produced by one of the
/// `handle_*` methods and made effective by [`Account::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceChange {
    amount: Decimal,
    kind: BalanceChangeKind,
}

impl BalanceChange {
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn kind(&self) -> BalanceChangeKind {
        self.kind
    }
}

/// Member account with its cached current balance.
///
/// The balance is a projection of the movement ledger: it only changes
/// through [`Account::apply`], which the ledger, the transfer engine and
/// loan disbursement call right before recording the matching movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    number: String,
    member: MemberId,
    linked_user: Option<UserId>,
    opened_on: NaiveDate,
    balance: Decimal,
    status: AccountStatus,
    account_type: AccountType,
    version: u64,
}

/// Input for account creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Assigned from the `accounts` sequence when absent or the placeholder.
    pub number: Option<String>,
    pub member: MemberId,
    /// Defaults to the current date.
    pub opened_on: Option<NaiveDate>,
    pub status: AccountStatus,
    pub account_type: AccountType,
}

impl NewAccount {
    pub fn new(member: MemberId) -> Self {
        Self {
            number: None,
            member,
            opened_on: None,
            status: AccountStatus::default(),
            account_type: AccountType::default(),
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    pub fn with_type(mut self, account_type: AccountType) -> Self {
        self.account_type = account_type;
        self
    }
}

/// Fields of an existing account that may be written. `None` keeps the
/// current value. The balance is not writable here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub number: Option<String>,
    pub member: Option<MemberId>,
    pub status: Option<AccountStatus>,
    pub account_type: Option<AccountType>,
}

impl Account {
    pub(crate) fn open(
        id: AccountId,
        number: String,
        new: &NewAccount,
        linked_user: Option<UserId>,
        opened_on: NaiveDate,
    ) -> Self {
        Self {
            id,
            number,
            member: new.member,
            linked_user,
            opened_on: new.opened_on.unwrap_or(opened_on),
            balance: Decimal::ZERO,
            status: new.status,
            account_type: new.account_type,
            version: 0,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn member(&self) -> MemberId {
        self.member
    }

    pub fn linked_user(&self) -> Option<UserId> {
        self.linked_user
    }

    pub fn opened_on(&self) -> NaiveDate {
        self.opened_on
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    /// Bumped on every applied balance change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn apply(&mut self, change: &BalanceChange) {
        match change.kind {
            BalanceChangeKind::Credited => self.balance += change.amount,
            BalanceChangeKind::Debited => self.balance -= change.amount,
        }
        self.version += 1;
    }

    pub fn handle_credit(&self, amount: Decimal) -> LedgerResult<BalanceChange> {
        ensure_positive(amount, "movement")?;
        if self.balance.checked_add(amount).is_none() {
            return Err(ValidationError::BalanceOverflow);
        }
        Ok(BalanceChange {
            amount,
            kind: BalanceChangeKind::Credited,
        })
    }

    pub fn handle_debit(&self, amount: Decimal) -> LedgerResult<BalanceChange> {
        ensure_positive(amount, "movement")?;
        if self.balance < amount {
            return Err(ValidationError::InsufficientBalance);
        }
        Ok(BalanceChange {
            amount,
            kind: BalanceChangeKind::Debited,
        })
    }

    /// Checks an update without applying it.
    pub fn handle_update(&self, update: &AccountUpdate) -> LedgerResult<()> {
        match &update.number {
            Some(number) if *number != self.number => Err(ValidationError::AccountNumberImmutable),
            _ => Ok(()),
        }
    }

    /// Applies a checked update. `linked_user` is the registry lookup for
    /// the member the account ends up with.
    pub(crate) fn apply_update(&mut self, update: AccountUpdate, linked_user: Option<UserId>) {
        if let Some(member) = update.member {
            self.member = member;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(account_type) = update.account_type {
            self.account_type = account_type;
        }
        self.linked_user = linked_user;
    }
}
