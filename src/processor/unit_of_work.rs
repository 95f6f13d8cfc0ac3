use std::collections::{BTreeMap, HashMap};

use crate::{
    account::{Account, AccountId},
    error::{LedgerResult, ValidationError},
    loan::{Loan, LoanId},
    movement::{Movement, MovementId},
    transfer::{Transfer, TransferId},
};

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct IdCounters {
    account: AccountId,
    movement: MovementId,
    transfer: TransferId,
    loan: LoanId,
}

/// Committed ledger records.
#[derive(Debug, Default)]
pub(crate) struct LedgerState {
    pub accounts: BTreeMap<AccountId, Account>,
    pub account_numbers: HashMap<String, AccountId>,
    /// Append-only, in id order.
    pub movements: Vec<Movement>,
    pub transfers: BTreeMap<TransferId, Transfer>,
    pub transfer_codes: HashMap<String, TransferId>,
    pub loans: BTreeMap<LoanId, Loan>,
    pub loan_numbers: HashMap<String, LoanId>,
    ids: IdCounters,
}

impl LedgerState {
    pub fn commit(&mut self, staged: Staged) {
        self.accounts.extend(staged.accounts);
        self.account_numbers.extend(staged.account_numbers);
        self.movements.extend(staged.movements);
        self.transfers.extend(staged.transfers);
        self.transfer_codes.extend(staged.transfer_codes);
        self.loans.extend(staged.loans);
        self.loan_numbers.extend(staged.loan_numbers);
        self.ids = staged.ids;
    }
}

/// Records created or changed by a unit of work that has not committed.
#[derive(Debug, Default)]
pub(crate) struct Staged {
    accounts: BTreeMap<AccountId, Account>,
    account_numbers: HashMap<String, AccountId>,
    movements: Vec<Movement>,
    transfers: BTreeMap<TransferId, Transfer>,
    transfer_codes: HashMap<String, TransferId>,
    loans: BTreeMap<LoanId, Loan>,
    loan_numbers: HashMap<String, LoanId>,
    ids: IdCounters,
}

/// Copy-on-write view over [`LedgerState`].
///
/// Records are cloned into the overlay the first time they are changed.
/// Dropping the unit of work discards everything; [`UnitOfWork::finish`]
/// hands the overlay over for [`LedgerState::commit`].
pub(crate) struct UnitOfWork<'s> {
    base: &'s LedgerState,
    staged: Staged,
}

impl<'s> UnitOfWork<'s> {
    pub fn new(base: &'s LedgerState) -> Self {
        Self {
            base,
            staged: Staged {
                ids: base.ids,
                ..Default::default()
            },
        }
    }

    pub fn finish(self) -> Staged {
        self.staged
    }

    pub fn next_account_id(&mut self) -> AccountId {
        self.staged.ids.account += 1;
        self.staged.ids.account
    }

    pub fn next_movement_id(&mut self) -> MovementId {
        self.staged.ids.movement += 1;
        self.staged.ids.movement
    }

    pub fn next_transfer_id(&mut self) -> TransferId {
        self.staged.ids.transfer += 1;
        self.staged.ids.transfer
    }

    pub fn next_loan_id(&mut self) -> LoanId {
        self.staged.ids.loan += 1;
        self.staged.ids.loan
    }

    pub fn account(&self, id: AccountId) -> LedgerResult<&Account> {
        self.staged
            .accounts
            .get(&id)
            .or_else(|| self.base.accounts.get(&id))
            .ok_or(ValidationError::UnknownAccount(id))
    }

    pub fn account_mut(&mut self, id: AccountId) -> LedgerResult<&mut Account> {
        self.stage_account(id)?;
        self.staged
            .accounts
            .get_mut(&id)
            .ok_or(ValidationError::UnknownAccount(id))
    }

    /// Removes the account from the overlay so it can be borrowed alongside
    /// another one. Hand it back with [`UnitOfWork::put_account`].
    pub fn take_account(&mut self, id: AccountId) -> LedgerResult<Account> {
        self.stage_account(id)?;
        self.staged
            .accounts
            .remove(&id)
            .ok_or(ValidationError::UnknownAccount(id))
    }

    pub fn put_account(&mut self, account: Account) {
        self.staged.accounts.insert(account.id(), account);
    }

    fn stage_account(&mut self, id: AccountId) -> LedgerResult<()> {
        if !self.staged.accounts.contains_key(&id) {
            let account = self
                .base
                .accounts
                .get(&id)
                .ok_or(ValidationError::UnknownAccount(id))?;
            self.staged.accounts.insert(id, account.clone());
        }
        Ok(())
    }

    pub fn insert_account(&mut self, account: Account) -> LedgerResult<()> {
        let number = account.number();
        if self.base.account_numbers.contains_key(number)
            || self.staged.account_numbers.contains_key(number)
        {
            return Err(ValidationError::DuplicateAccountNumber(number.to_string()));
        }
        self.staged
            .account_numbers
            .insert(number.to_string(), account.id());
        self.staged.accounts.insert(account.id(), account);
        Ok(())
    }

    pub fn push_movement(&mut self, movement: Movement) {
        self.staged.movements.push(movement);
    }

    pub fn insert_transfer(&mut self, transfer: Transfer) -> LedgerResult<()> {
        let code = transfer.code();
        if self.base.transfer_codes.contains_key(code)
            || self.staged.transfer_codes.contains_key(code)
        {
            return Err(ValidationError::DuplicateTransferCode(code.to_string()));
        }
        self.staged
            .transfer_codes
            .insert(code.to_string(), transfer.id());
        self.staged.transfers.insert(transfer.id(), transfer);
        Ok(())
    }

    pub fn insert_loan(&mut self, loan: Loan) {
        self.staged
            .loan_numbers
            .insert(loan.number().to_string(), loan.id());
        self.staged.loans.insert(loan.id(), loan);
    }

    pub fn loan_mut(&mut self, id: LoanId) -> LedgerResult<&mut Loan> {
        self.stage_loan(id)?;
        self.staged
            .loans
            .get_mut(&id)
            .ok_or(ValidationError::UnknownLoan(id))
    }

    /// The loan together with the account it pays into.
    pub fn loan_and_account_mut(&mut self, id: LoanId) -> LedgerResult<(&mut Loan, &mut Account)> {
        self.stage_loan(id)?;
        let account_id = self
            .staged
            .loans
            .get(&id)
            .map(Loan::account)
            .ok_or(ValidationError::UnknownLoan(id))?;
        self.stage_account(account_id)?;

        let loan = self
            .staged
            .loans
            .get_mut(&id)
            .ok_or(ValidationError::UnknownLoan(id))?;
        let account = self
            .staged
            .accounts
            .get_mut(&account_id)
            .ok_or(ValidationError::UnknownAccount(account_id))?;
        Ok((loan, account))
    }

    fn stage_loan(&mut self, id: LoanId) -> LedgerResult<()> {
        if !self.staged.loans.contains_key(&id) {
            let loan = self
                .base
                .loans
                .get(&id)
                .ok_or(ValidationError::UnknownLoan(id))?;
            self.staged.loans.insert(id, loan.clone());
        }
        Ok(())
    }
}
