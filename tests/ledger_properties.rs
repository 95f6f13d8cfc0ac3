use std::sync::Arc;

use member_ledger::{
    account::NewAccount,
    command::OperationRequest,
    member::{InMemoryMemberRegistry, Member},
    processor::{LedgerProcessor, in_memory_processor::InMemoryLedger},
    transfer::NewTransfer,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
enum Op {
    Deposit(usize, i64),
    Withdraw(usize, i64),
    Transfer(usize, usize, i64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize, 1..500i64).prop_map(|(acc, amount)| Op::Deposit(acc, amount)),
        (0..3usize, 1..500i64).prop_map(|(acc, amount)| Op::Withdraw(acc, amount)),
        (0..3usize, 0..3usize, -5..500i64)
            .prop_map(|(from, to, amount)| Op::Transfer(from, to, amount)),
    ]
}

fn balances(ledger: &InMemoryLedger, ids: &[u64]) -> Vec<Decimal> {
    ids.iter()
        .map(|id| ledger.account(*id).map(|a| a.balance()).unwrap_or_default())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    /// Property: whatever sequence of operations is attempted, every cached
    /// balance equals the signed sum of its movements, never goes negative,
    /// and transfers neither create nor destroy money.
    #[test]
    fn cached_balance_matches_ledger(ops in prop::collection::vec(op(), 1..60)) {
        let members = Arc::new(InMemoryMemberRegistry::default());
        members.register(Member::new(1, "Ana"));
        let ledger = InMemoryLedger::with_members(members);
        let ids: Vec<u64> = ledger
            .create_accounts(vec![NewAccount::new(1); 3])
            .unwrap()
            .iter()
            .map(|a| a.id())
            .collect();

        let mut external = Decimal::ZERO;
        for op in ops {
            match op {
                Op::Deposit(acc, amount) => {
                    let amount = Decimal::from(amount);
                    if ledger.submit_operation(OperationRequest::deposit(ids[acc], amount)).is_ok() {
                        external += amount;
                    }
                }
                Op::Withdraw(acc, amount) => {
                    let amount = Decimal::from(amount);
                    if ledger.submit_operation(OperationRequest::withdrawal(ids[acc], amount)).is_ok() {
                        external -= amount;
                    }
                }
                Op::Transfer(from, to, amount) => {
                    let amount = Decimal::from(amount);
                    let before = balances(&ledger, &ids);
                    let result = ledger.create_transfer(
                        NewTransfer::new(ids[from], ids[to], amount),
                    );
                    let after = balances(&ledger, &ids);

                    let expected_ok = from != to && amount > Decimal::ZERO && before[from] >= amount;
                    prop_assert_eq!(result.is_ok(), expected_ok);
                    prop_assert_eq!(
                        before.iter().copied().sum::<Decimal>(),
                        after.iter().copied().sum::<Decimal>()
                    );
                    if !expected_ok {
                        prop_assert_eq!(before, after);
                    }
                }
            }
        }

        let mut total = Decimal::ZERO;
        for id in &ids {
            let account = ledger.account(*id).unwrap();
            prop_assert_eq!(account.balance(), ledger.replayed_balance(*id));
            prop_assert!(account.balance() >= Decimal::ZERO);
            total += account.balance();
        }
        prop_assert_eq!(total, external);
    }
}
