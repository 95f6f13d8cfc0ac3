use std::io::Read;

use csv::{DeserializeRecordsIntoIter, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::account::{AccountType, MemberId};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Open,
    Deposit,
    Withdrawal,
    Transfer,
    Loan,
    Approve,
    Reject,
    Disburse,
    Repay,
    Paid,
}

/// One line of the operations file.
///
/// `account` holds an account number, except for loan transitions
/// (`approve`, `reject`, `disburse`, `repay`, `paid`) where it holds the
/// loan number. `counterparty` is the destination of a transfer.
#[derive(Debug, Deserialize)]
pub struct OperationRow {
    #[serde(rename = "type")]
    pub kind: OperationType,
    pub account: Option<String>,
    pub counterparty: Option<String>,
    pub member: Option<MemberId>,
    pub account_type: Option<AccountType>,
    pub amount: Option<Decimal>,
    pub installments: Option<u32>,
    pub rate: Option<Decimal>,
    pub reference: Option<String>,
}

/// Parses operation list in CSV format, yielding each row with the line
/// it was read from.
pub struct CsvOperationParser<R> {
    iter: DeserializeRecordsIntoIter<R, OperationRow>,
}

impl<R> CsvOperationParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        Self {
            iter: reader.into_deserialize(),
        }
    }
}

impl<R> Iterator for CsvOperationParser<R>
where
    R: Read,
{
    type Item = (u64, csv::Result<OperationRow>);

    fn next(&mut self) -> Option<Self::Item> {
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| (curr_line, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_columns_are_absent() {
        let input = "type,account,counterparty,member,account_type,amount,installments,rate,reference\n\
                     open,,,7,checking,,,,\n\
                     transfer, A-1 , A-2 ,,,12.50,,,rent\n";
        let rows: Vec<_> = CsvOperationParser::new(input.as_bytes())
            .map(|(_, row)| row.unwrap())
            .collect();

        assert_eq!(rows[0].kind, OperationType::Open);
        assert_eq!(rows[0].account, None);
        assert_eq!(rows[0].member, Some(7));
        assert_eq!(rows[0].account_type, Some(AccountType::Checking));

        assert_eq!(rows[1].kind, OperationType::Transfer);
        assert_eq!(rows[1].account.as_deref(), Some("A-1"));
        assert_eq!(rows[1].counterparty.as_deref(), Some("A-2"));
        assert_eq!(rows[1].amount, Some(Decimal::new(1250, 2)));
        assert_eq!(rows[1].reference.as_deref(), Some("rent"));
    }

    #[test]
    fn bad_rows_are_reported() {
        let input = "type,account,counterparty,member,account_type,amount,installments,rate,reference\n\
                     refund,A-1,,,,1,,,\n";
        let mut parser = CsvOperationParser::new(input.as_bytes());
        assert!(parser.next().unwrap().1.is_err());
        assert!(parser.next().is_none());
    }
}
