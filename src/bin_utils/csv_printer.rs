use std::io::Write;

use anyhow::Context;
use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::account::{Account, AccountStatus, AccountType, MemberId};

#[derive(Debug, Serialize)]
pub struct AccountRow<'a> {
    pub account: &'a str,
    pub member: MemberId,
    pub status: AccountStatus,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub balance: Decimal,
}

impl<'a> From<&'a Account> for AccountRow<'a> {
    fn from(acc: &'a Account) -> Self {
        Self {
            account: acc.number(),
            member: acc.member(),
            status: acc.status(),
            account_type: acc.account_type(),
            balance: acc.balance(),
        }
    }
}

/// Writes one row per account, ordered by account number.
pub fn print_accounts<W>(output: &mut W, accounts: &[Account]) -> anyhow::Result<()>
where
    W: Write,
{
    let mut rows: Vec<AccountRow<'_>> = accounts.iter().map(AccountRow::from).collect();
    rows.sort_by(|a, b| a.account.cmp(b.account));

    let mut writer = Writer::from_writer(output);
    for row in rows {
        writer
            .serialize(&row)
            .with_context(|| format!("Failed to write account `{}`", row.account))?;
    }
    // Ensure all data is flushed to the output
    writer.flush().context("Failed to flush CSV writer")?;
    Ok(())
}
