use std::{cell::RefCell, rc::Rc, str::from_utf8};

use member_ledger::{
    bin_utils::{RowError, Service},
    config::LedgerConfig,
    error::ValidationError,
};

const TEST_FILE: &str = include_str!("operations.csv");

#[test]
fn process_operations() {
    let mut output = Vec::new();
    let errors: Rc<RefCell<Vec<RowError>>> = Rc::default();
    let collected = errors.clone();
    let service = Service {
        input: TEST_FILE.as_bytes(),
        output: &mut output,
        config: LedgerConfig::default(),
        error_printer: Box::new(move |_, err| collected.borrow_mut().push(err)),
    };
    service.run().unwrap();

    let lines: Vec<&str> = from_utf8(&output).unwrap().lines().collect();
    assert_eq!(
        lines,
        vec![
            "account,member,status,type,balance",
            "A-1,1,active,savings,20",
            "A-2,2,active,checking,650",
            "ACC-00001,3,active,savings,0",
        ]
    );

    let errors = errors.borrow();
    assert_eq!(errors.len(), 6);
    let rejected: Vec<&ValidationError> = errors
        .iter()
        .filter_map(|err| match err {
            RowError::Rejected(err) => Some(err),
            _ => None,
        })
        .collect();
    assert!(matches!(rejected[0], ValidationError::InsufficientBalance));
    assert!(matches!(rejected[1], ValidationError::SameAccountTransfer));
    assert!(matches!(
        rejected[2],
        ValidationError::LoanBalanceOutstanding { .. }
    ));
    assert!(matches!(
        rejected[3],
        ValidationError::UnknownAccountNumber(number) if number == "Z-9"
    ));
    assert!(matches!(errors[4], RowError::Malformed(_)));
    assert!(matches!(
        errors[5],
        RowError::MissingField { field: "amount", .. }
    ));
}
