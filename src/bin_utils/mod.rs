//! Drives an [`InMemoryLedger`] from a CSV file of teller operations and
//! reports the resulting accounts as CSV.

use std::{
    io::{Read, Write},
    sync::Arc,
};

use anyhow::Result;
use csv_parser::{CsvOperationParser, OperationRow, OperationType};
use csv_printer::print_accounts;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::{Account, NewAccount},
    calendar::SystemCalendar,
    command::{OperationKind, OperationRequest},
    config::LedgerConfig,
    error::ValidationError,
    loan::{Loan, NewLoan},
    member::{InMemoryMemberRegistry, Member, MemberRegistry},
    processor::{
        LedgerProcessor,
        in_memory_processor::{InMemoryLedger, NewLedger},
    },
    sequence::InMemorySequence,
    transfer::NewTransfer,
};

pub mod csv_parser;
pub mod csv_printer;

#[derive(Debug, Error)]
pub enum RowError {
    #[error("malformed row: {0}")]
    Malformed(#[from] csv::Error),
    #[error("`{field}` is required for {kind:?}")]
    MissingField {
        field: &'static str,
        kind: OperationType,
    },
    #[error(transparent)]
    Rejected(#[from] ValidationError),
}

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub config: LedgerConfig,
    pub error_printer: Box<dyn FnMut(u64, RowError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvOperationParser::new(self.input);

        let members = Arc::new(InMemoryMemberRegistry::default());
        let ledger = InMemoryLedger::new(NewLedger {
            sequence: Arc::new(InMemorySequence::new(self.config.clone())),
            config: self.config,
            members: members.clone(),
            calendar: Arc::new(SystemCalendar),
        });

        for (line, row) in parser {
            let outcome = row
                .map_err(RowError::from)
                .and_then(|row| apply_row(&ledger, &members, row));
            if let Err(err) = outcome {
                (self.error_printer)(line, err);
            }
        }

        print_accounts(self.output, &ledger.accounts())
    }
}

fn required<T>(value: Option<T>, field: &'static str, kind: OperationType) -> Result<T, RowError> {
    value.ok_or(RowError::MissingField { field, kind })
}

fn account_by_number(ledger: &InMemoryLedger, number: &str) -> Result<Account, RowError> {
    ledger
        .account_by_number(number)
        .ok_or_else(|| ValidationError::UnknownAccountNumber(number.to_string()).into())
}

fn loan_by_number(ledger: &InMemoryLedger, number: &str) -> Result<Loan, RowError> {
    ledger
        .loan_by_number(number)
        .ok_or_else(|| ValidationError::UnknownLoanNumber(number.to_string()).into())
}

fn apply_row(
    ledger: &InMemoryLedger,
    members: &InMemoryMemberRegistry,
    row: OperationRow,
) -> Result<(), RowError> {
    let kind = row.kind;
    match kind {
        OperationType::Open => {
            let member = required(row.member, "member", kind)?;
            if !members.contains(member) {
                members.register(Member::new(member, format!("Member {member}")));
            }
            ledger.create_account(NewAccount {
                number: row.account,
                account_type: row.account_type.unwrap_or_default(),
                ..NewAccount::new(member)
            })?;
        }
        OperationType::Deposit | OperationType::Withdrawal => {
            let number = required(row.account, "account", kind)?;
            let account = account_by_number(ledger, &number)?;
            let operation = if kind == OperationType::Deposit {
                OperationKind::Deposit
            } else {
                OperationKind::Withdrawal
            };
            ledger.submit_operation(OperationRequest {
                description: row.reference,
                ..OperationRequest::new(
                    account.id(),
                    operation,
                    required(row.amount, "amount", kind)?,
                )
            })?;
        }
        OperationType::Transfer => {
            let source = account_by_number(ledger, &required(row.account, "account", kind)?)?;
            let destination =
                account_by_number(ledger, &required(row.counterparty, "counterparty", kind)?)?;
            ledger.create_transfer(NewTransfer {
                reference: row.reference,
                ..NewTransfer::new(
                    source.id(),
                    destination.id(),
                    required(row.amount, "amount", kind)?,
                )
            })?;
        }
        OperationType::Loan => {
            let account = account_by_number(ledger, &required(row.account, "account", kind)?)?;
            ledger.request_loan(NewLoan {
                interest_rate: row.rate.unwrap_or(Decimal::ZERO),
                description: row.reference,
                ..NewLoan::new(
                    account.id(),
                    required(row.amount, "amount", kind)?,
                    required(row.installments, "installments", kind)?,
                )
            })?;
        }
        OperationType::Approve
        | OperationType::Reject
        | OperationType::Disburse
        | OperationType::Repay
        | OperationType::Paid => {
            let loan = loan_by_number(ledger, &required(row.account, "account", kind)?)?;
            match kind {
                OperationType::Approve => {
                    ledger.approve_loan(loan.id())?;
                }
                OperationType::Reject => {
                    ledger.reject_loan(loan.id())?;
                }
                OperationType::Disburse => {
                    ledger.disburse_loan(loan.id())?;
                }
                OperationType::Repay => {
                    ledger.repay_loan(loan.id(), required(row.amount, "amount", kind)?, None)?;
                }
                _ => {
                    ledger.mark_loan_paid(loan.id())?;
                }
            }
        }
    }
    Ok(())
}
