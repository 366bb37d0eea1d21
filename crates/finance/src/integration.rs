//! Accounting-software integrations offered in the dashboard.
//!
//! None of them are wired up yet; the catalogue is static and connecting
//! answers "not implemented".

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountingIntegration {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub connected: bool,
}

pub const INTEGRATIONS: &[AccountingIntegration] = &[
    AccountingIntegration {
        id: "quickbooks",
        name: "QuickBooks",
        description: "Sync sales, fees and expenses to QuickBooks Online",
        connected: false,
    },
    AccountingIntegration {
        id: "xero",
        name: "Xero",
        description: "Push daily sales summaries and expenses to Xero",
        connected: false,
    },
    AccountingIntegration {
        id: "wave",
        name: "Wave",
        description: "Export transactions to Wave Accounting",
        connected: false,
    },
];

pub fn find_integration(id: &str) -> Option<&'static AccountingIntegration> {
    INTEGRATIONS.iter().find(|i| i.id.eq_ignore_ascii_case(id.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(find_integration("Xero").map(|i| i.name), Some("Xero"));
        assert!(find_integration("sage").is_none());
    }
}
