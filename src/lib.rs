/// Member accounts and their cached balance.
/// Balance changes are validated by `handle_*` methods and made effective by `apply`.
pub mod account;

/// Deposit and withdrawal requests coming from the teller desk.
pub mod command;

/// Append-only movement ledger.
pub mod movement;

/// Paired debit and credit between two accounts.
pub mod transfer;

/// Loan state machine, disbursing and collecting through the ledger.
pub mod loan;

/// Validation failures shared by every ledger operation.
pub mod error;

/// Record numbering settings, read from the environment by the binary.
pub mod config;

/// Clock used for default dates and timestamps.
pub mod calendar;

/// Registry of account holders and their platform users.
pub mod member;

/// Unique record numbers per scope.
pub mod sequence;

/// Ledger operations interface, plus "in memory" implementation.
/// Every operation runs as one atomic unit of work.
pub mod processor;

/// CSV driven bootstrap of the ledger, used by the binary and the
/// integration tests.
pub mod bin_utils;
