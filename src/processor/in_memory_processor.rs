use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::{
    account::{Account, AccountId, AccountUpdate, MemberId, NewAccount},
    calendar::{Calendar, SystemCalendar},
    command::OperationRequest,
    config::{ACCOUNTS_SCOPE, LOANS_SCOPE, LedgerConfig, TRANSFERS_SCOPE},
    error::{LedgerResult, ValidationError},
    loan::{Loan, LoanId, NewLoan},
    member::MemberRegistry,
    movement::{Movement, NewMovement, apply_and_record, sort_for_display},
    sequence::{InMemorySequence, SequenceGenerator},
    transfer::{NewTransfer, Transfer, TransferId},
};

use super::{
    LedgerProcessor,
    unit_of_work::{LedgerState, UnitOfWork},
};

/// Collaborators of an [`InMemoryLedger`].
pub struct NewLedger {
    pub config: LedgerConfig,
    pub sequence: Arc<dyn SequenceGenerator>,
    pub members: Arc<dyn MemberRegistry>,
    pub calendar: Arc<dyn Calendar>,
}

/// Ledger keeping every record in memory.
///
/// Units of work hold the write lock from their first read to their commit,
/// so balance checks and the mutations depending on them never interleave
/// with another writer.
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
    config: LedgerConfig,
    sequence: Arc<dyn SequenceGenerator>,
    members: Arc<dyn MemberRegistry>,
    calendar: Arc<dyn Calendar>,
}

impl InMemoryLedger {
    pub fn new(v: NewLedger) -> Self {
        Self {
            state: RwLock::default(),
            config: v.config,
            sequence: v.sequence,
            members: v.members,
            calendar: v.calendar,
        }
    }

    /// Default numbering, in-memory sequences and the system clock.
    pub fn with_members(members: Arc<dyn MemberRegistry>) -> Self {
        let config = LedgerConfig::default();
        Self::new(NewLedger {
            sequence: Arc::new(InMemorySequence::new(config.clone())),
            config,
            members,
            calendar: Arc::new(SystemCalendar),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        // commits never panic halfway, so a poisoned state is still consistent
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn unit_of_work<T>(
        &self,
        operation: &'static str,
        work: impl FnOnce(&mut UnitOfWork<'_>) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut uow = UnitOfWork::new(&state);
        match work(&mut uow) {
            Ok(value) => {
                let staged = uow.finish();
                state.commit(staged);
                Ok(value)
            }
            Err(err) => {
                warn!(operation, %err, "unit of work rolled back");
                Err(err)
            }
        }
    }

    fn assign_number(&self, supplied: Option<String>, scope: &str) -> String {
        match supplied {
            Some(number) if !self.config.needs_number(Some(&number)) => number,
            _ => self.sequence.next_value(scope),
        }
    }

    fn record(&self, uow: &mut UnitOfWork<'_>, new: NewMovement) -> LedgerResult<Movement> {
        let id = uow.next_movement_id();
        let timestamp = new.timestamp.unwrap_or_else(|| self.calendar.now());
        let account = uow.account_mut(new.account)?;
        let movement = apply_and_record(
            account,
            id,
            new.kind,
            new.amount,
            new.description,
            timestamp,
        )?;
        debug!(
            movement = movement.id(),
            account = movement.account(),
            kind = ?movement.kind(),
            amount = %movement.amount(),
            balance = %movement.balance_after(),
            "movement recorded"
        );
        uow.push_movement(movement.clone());
        Ok(movement)
    }

    fn process_transfer(
        &self,
        uow: &mut UnitOfWork<'_>,
        new: NewTransfer,
    ) -> LedgerResult<Transfer> {
        new.validate()?;
        let code = self.assign_number(new.code.clone(), TRANSFERS_SCOPE);
        let id = uow.next_transfer_id();
        let mut transfer = Transfer::pending(id, code, new, self.calendar.now());

        let mut source = uow.take_account(transfer.source())?;
        let mut destination = uow.take_account(transfer.destination())?;
        let movement_ids = (uow.next_movement_id(), uow.next_movement_id());
        let movements = transfer.settle(&mut source, &mut destination, movement_ids)?;
        uow.put_account(source);
        uow.put_account(destination);
        for movement in movements {
            uow.push_movement(movement);
        }

        debug!(
            transfer = transfer.id(),
            code = transfer.code(),
            source = transfer.source(),
            destination = transfer.destination(),
            amount = %transfer.amount(),
            "transfer completed"
        );
        uow.insert_transfer(transfer.clone())?;
        Ok(transfer)
    }

    fn with_loan(
        &self,
        operation: &'static str,
        id: LoanId,
        change: impl FnOnce(&mut Loan) -> LedgerResult<()>,
    ) -> LedgerResult<Loan> {
        self.unit_of_work(operation, |uow| {
            let loan = uow.loan_mut(id)?;
            change(loan)?;
            debug!(loan = loan.number(), status = ?loan.status(), "loan updated");
            Ok(loan.clone())
        })
    }

    pub fn account(&self, id: AccountId) -> Option<Account> {
        self.read().accounts.get(&id).cloned()
    }

    pub fn account_by_number(&self, number: &str) -> Option<Account> {
        let state = self.read();
        state
            .account_numbers
            .get(number)
            .and_then(|id| state.accounts.get(id))
            .cloned()
    }

    /// All accounts in creation order.
    pub fn accounts(&self) -> Vec<Account> {
        self.read().accounts.values().cloned().collect()
    }

    /// Movements of one account, newest first.
    pub fn movements_for(&self, account: AccountId) -> Vec<Movement> {
        let mut movements: Vec<Movement> = self
            .read()
            .movements
            .iter()
            .filter(|m| m.account() == account)
            .cloned()
            .collect();
        sort_for_display(&mut movements);
        movements
    }

    /// Movements of every account currently owned by `member`, newest first.
    pub fn movements_for_member(&self, member: MemberId) -> Vec<Movement> {
        let state = self.read();
        let mut movements: Vec<Movement> = state
            .movements
            .iter()
            .filter(|m| {
                state
                    .accounts
                    .get(&m.account())
                    .is_some_and(|a| a.member() == member)
            })
            .cloned()
            .collect();
        sort_for_display(&mut movements);
        movements
    }

    /// Balance rebuilt from the movement ledger. Always equals the cached
    /// [`Account::balance`].
    pub fn replayed_balance(&self, account: AccountId) -> Decimal {
        self.read()
            .movements
            .iter()
            .filter(|m| m.account() == account)
            .map(Movement::signed_amount)
            .sum()
    }

    pub fn transfer(&self, id: TransferId) -> Option<Transfer> {
        self.read().transfers.get(&id).cloned()
    }

    pub fn transfer_by_code(&self, code: &str) -> Option<Transfer> {
        let state = self.read();
        state
            .transfer_codes
            .get(code)
            .and_then(|id| state.transfers.get(id))
            .cloned()
    }

    pub fn transfers(&self) -> Vec<Transfer> {
        self.read().transfers.values().cloned().collect()
    }

    pub fn loan(&self, id: LoanId) -> Option<Loan> {
        self.read().loans.get(&id).cloned()
    }

    pub fn loan_by_number(&self, number: &str) -> Option<Loan> {
        let state = self.read();
        state
            .loan_numbers
            .get(number)
            .and_then(|id| state.loans.get(id))
            .cloned()
    }

    pub fn movement_count(&self) -> usize {
        self.read().movements.len()
    }
}

impl LedgerProcessor for InMemoryLedger {
    fn create_accounts(&self, accounts: Vec<NewAccount>) -> LedgerResult<Vec<Account>> {
        self.unit_of_work("create_accounts", |uow| {
            accounts
                .into_iter()
                .map(|new| {
                    if !self.members.contains(new.member) {
                        return Err(ValidationError::UnknownMember(new.member));
                    }
                    let number = self.assign_number(new.number.clone(), ACCOUNTS_SCOPE);
                    let account = Account::open(
                        uow.next_account_id(),
                        number,
                        &new,
                        self.members.linked_user(new.member),
                        self.calendar.today(),
                    );
                    uow.insert_account(account.clone())?;
                    debug!(
                        account = account.id(),
                        number = account.number(),
                        member = account.member(),
                        "account opened"
                    );
                    Ok(account)
                })
                .collect()
        })
    }

    fn update_account(&self, id: AccountId, update: AccountUpdate) -> LedgerResult<Account> {
        self.unit_of_work("update_account", |uow| {
            let account = uow.account_mut(id)?;
            account.handle_update(&update)?;
            let linked_user = match update.member {
                Some(member) if !self.members.contains(member) => {
                    return Err(ValidationError::UnknownMember(member));
                }
                Some(member) => self.members.linked_user(member),
                None => account.linked_user(),
            };
            account.apply_update(update, linked_user);
            Ok(account.clone())
        })
    }

    fn record_movements(&self, movements: Vec<NewMovement>) -> LedgerResult<Vec<Movement>> {
        self.unit_of_work("record_movements", |uow| {
            movements
                .into_iter()
                .map(|new| self.record(uow, new))
                .collect()
        })
    }

    fn submit_operation(&self, request: OperationRequest) -> LedgerResult<Movement> {
        self.unit_of_work("submit_operation", |uow| {
            let account = uow.account(request.account)?;
            let new = request.parse_command(account)?;
            self.record(uow, new)
        })
    }

    fn create_transfers(&self, transfers: Vec<NewTransfer>) -> LedgerResult<Vec<Transfer>> {
        self.unit_of_work("create_transfers", |uow| {
            transfers
                .into_iter()
                .map(|new| self.process_transfer(uow, new))
                .collect()
        })
    }

    fn request_loan(&self, loan: NewLoan) -> LedgerResult<Loan> {
        self.unit_of_work("request_loan", |uow| {
            loan.validate()?;
            uow.account(loan.account)?;
            let number = self.sequence.next_value(LOANS_SCOPE);
            let loan = Loan::request(uow.next_loan_id(), number, loan, self.calendar.today());
            debug!(loan = loan.number(), account = loan.account(), "loan requested");
            uow.insert_loan(loan.clone());
            Ok(loan)
        })
    }

    fn approve_loan(&self, id: LoanId) -> LedgerResult<Loan> {
        let today = self.calendar.today();
        self.with_loan("approve_loan", id, |loan| loan.approve(today))
    }

    fn reject_loan(&self, id: LoanId) -> LedgerResult<Loan> {
        self.with_loan("reject_loan", id, Loan::reject)
    }

    fn disburse_loan(&self, id: LoanId) -> LedgerResult<(Loan, Movement)> {
        self.unit_of_work("disburse_loan", |uow| {
            let movement_id = uow.next_movement_id();
            let (loan, account) = uow.loan_and_account_mut(id)?;
            let movement = loan.disburse(account, movement_id, self.calendar.now())?;
            let loan = loan.clone();
            debug!(loan = loan.number(), amount = %movement.amount(), "loan disbursed");
            uow.push_movement(movement.clone());
            Ok((loan, movement))
        })
    }

    fn repay_loan(
        &self,
        id: LoanId,
        amount: Decimal,
        timestamp: Option<DateTime<Utc>>,
    ) -> LedgerResult<(Loan, Movement)> {
        self.unit_of_work("repay_loan", |uow| {
            let movement_id = uow.next_movement_id();
            let timestamp = timestamp.unwrap_or_else(|| self.calendar.now());
            let (loan, account) = uow.loan_and_account_mut(id)?;
            let movement = loan.repay(account, movement_id, amount, timestamp)?;
            let loan = loan.clone();
            debug!(
                loan = loan.number(),
                amount = %amount,
                pending = %loan.pending_balance(),
                "loan repayment recorded"
            );
            uow.push_movement(movement.clone());
            Ok((loan, movement))
        })
    }

    fn mark_loan_paid(&self, id: LoanId) -> LedgerResult<Loan> {
        self.with_loan("mark_loan_paid", id, Loan::mark_paid)
    }
}
