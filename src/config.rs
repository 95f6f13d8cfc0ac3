use anyhow::Context;

pub const ACCOUNTS_SCOPE: &str = "accounts";
pub const TRANSFERS_SCOPE: &str = "transfers";
pub const LOANS_SCOPE: &str = "loans";

/// Numbering settings for the records the ledger creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub account_prefix: String,
    pub transfer_prefix: String,
    pub loan_prefix: String,
    /// Minimum number of digits of a sequence value, zero-padded.
    pub sequence_padding: usize,
    /// A supplied number equal to this is treated as absent and replaced
    /// by the next sequence value.
    pub placeholder: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            account_prefix: "ACC-".to_string(),
            transfer_prefix: "TRF-".to_string(),
            loan_prefix: "LN-".to_string(),
            sequence_padding: 5,
            placeholder: "New".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Defaults overridden by `LEDGER_ACCOUNT_PREFIX`, `LEDGER_TRANSFER_PREFIX`,
    /// `LEDGER_LOAN_PREFIX` and `LEDGER_SEQUENCE_PADDING` when set.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Ok(prefix) = std::env::var("LEDGER_ACCOUNT_PREFIX") {
            config.account_prefix = prefix;
        }
        if let Ok(prefix) = std::env::var("LEDGER_TRANSFER_PREFIX") {
            config.transfer_prefix = prefix;
        }
        if let Ok(prefix) = std::env::var("LEDGER_LOAN_PREFIX") {
            config.loan_prefix = prefix;
        }
        if let Ok(padding) = std::env::var("LEDGER_SEQUENCE_PADDING") {
            config.sequence_padding = padding
                .parse()
                .with_context(|| format!("Invalid LEDGER_SEQUENCE_PADDING `{padding}`"))?;
        }
        Ok(config)
    }

    pub fn prefix_for(&self, scope: &str) -> &str {
        match scope {
            ACCOUNTS_SCOPE => &self.account_prefix,
            TRANSFERS_SCOPE => &self.transfer_prefix,
            LOANS_SCOPE => &self.loan_prefix,
            _ => "",
        }
    }

    /// True when `number` should be replaced by a generated one.
    pub fn needs_number(&self, number: Option<&str>) -> bool {
        match number {
            None => true,
            Some(number) => number.trim().is_empty() || number == self.placeholder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_counts_as_absent() {
        let config = LedgerConfig::default();
        assert!(config.needs_number(None));
        assert!(config.needs_number(Some("New")));
        assert!(config.needs_number(Some("  ")));
        assert!(!config.needs_number(Some("ACC-00001")));
    }

    #[test]
    fn prefixes_per_scope() {
        let config = LedgerConfig::default();
        assert_eq!(config.prefix_for(ACCOUNTS_SCOPE), "ACC-");
        assert_eq!(config.prefix_for(TRANSFERS_SCOPE), "TRF-");
        assert_eq!(config.prefix_for(LOANS_SCOPE), "LN-");
        assert_eq!(config.prefix_for("other"), "");
    }
}
