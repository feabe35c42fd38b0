//! Filing labels: the fixed set of bankruptcy filing categories that
//! questionnaire nodes are tagged with for coverage tracking.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Filing category a node contributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingLabel {
    /// Debtor, spouse, dependents, residence
    IdentityHousehold,
    /// Recurring income sources
    Income,
    /// Household expenses
    Expenses,
    /// Real and personal property
    Assets,
    /// Debts tied to collateral
    DebtsSecured,
    /// Debts without collateral
    DebtsUnsecured,
    /// Schedule A/B
    #[serde(rename = "schedule_a_b")]
    ScheduleAB,
    /// Schedule C
    ScheduleC,
    /// Schedule D
    ScheduleD,
    /// Schedule E/F
    #[serde(rename = "schedule_e_f")]
    ScheduleEF,
    /// Schedule I/J
    #[serde(rename = "schedule_i_j")]
    ScheduleIJ,
    /// Statement of Financial Affairs
    Sofa,
    /// Exemption strategy
    Exemptions,
    /// Garnishments, foreclosures, suits
    LegalActions,
    /// Uploaded evidence
    Documents,
    /// Anything outside the standard schedules
    Other,
}

impl FilingLabel {
    /// Every label, in declaration order
    pub const ALL: [FilingLabel; 16] = [
        Self::IdentityHousehold,
        Self::Income,
        Self::Expenses,
        Self::Assets,
        Self::DebtsSecured,
        Self::DebtsUnsecured,
        Self::ScheduleAB,
        Self::ScheduleC,
        Self::ScheduleD,
        Self::ScheduleEF,
        Self::ScheduleIJ,
        Self::Sofa,
        Self::Exemptions,
        Self::LegalActions,
        Self::Documents,
        Self::Other,
    ];

    /// Wire identifier (`schedule_a_b`, ...)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IdentityHousehold => "identity_household",
            Self::Income => "income",
            Self::Expenses => "expenses",
            Self::Assets => "assets",
            Self::DebtsSecured => "debts_secured",
            Self::DebtsUnsecured => "debts_unsecured",
            Self::ScheduleAB => "schedule_a_b",
            Self::ScheduleC => "schedule_c",
            Self::ScheduleD => "schedule_d",
            Self::ScheduleEF => "schedule_e_f",
            Self::ScheduleIJ => "schedule_i_j",
            Self::Sofa => "sofa",
            Self::Exemptions => "exemptions",
            Self::LegalActions => "legal_actions",
            Self::Documents => "documents",
            Self::Other => "other",
        }
    }

    /// Human-readable name
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::IdentityHousehold => "Identity / Household",
            Self::Income => "Income",
            Self::Expenses => "Expenses",
            Self::Assets => "Assets",
            Self::DebtsSecured => "Secured Debts",
            Self::DebtsUnsecured => "Unsecured Debts",
            Self::ScheduleAB => "Schedule A/B",
            Self::ScheduleC => "Schedule C",
            Self::ScheduleD => "Schedule D",
            Self::ScheduleEF => "Schedule E/F",
            Self::ScheduleIJ => "Schedule I/J",
            Self::Sofa => "SOFA",
            Self::Exemptions => "Exemptions",
            Self::LegalActions => "Legal Actions",
            Self::Documents => "Documents",
            Self::Other => "Other",
        }
    }

    /// One-line description shown next to the label
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::IdentityHousehold => "Debtor, spouse, dependents, and residence facts.",
            Self::Income => "Wages, self-employment, and recurring income sources.",
            Self::Expenses => "Monthly household expenses and budget drivers.",
            Self::Assets => "Real estate, vehicles, accounts, and personal property.",
            Self::DebtsSecured => "Mortgages, car loans, and liens tied to collateral.",
            Self::DebtsUnsecured => "Credit cards, medical debt, and unsecured obligations.",
            Self::ScheduleAB => "Property schedules for real and personal assets.",
            Self::ScheduleC => "Exemption elections and claimed protected property.",
            Self::ScheduleD => "Secured creditors and collateral details.",
            Self::ScheduleEF => "Priority and unsecured creditor reporting.",
            Self::ScheduleIJ => "Income and expense schedules.",
            Self::Sofa => "Statement of Financial Affairs questions.",
            Self::Exemptions => "Exemption strategy and supporting facts.",
            Self::LegalActions => "Urgent legal events, garnishments, foreclosures, suits.",
            Self::Documents => "Upload requests and sufficiency of documentary evidence.",
            Self::Other => "Additional context outside standard filing schedules.",
        }
    }

    /// A filing-critical label with nothing tracking it counts as a gap
    #[inline]
    #[must_use]
    pub const fn is_filing_critical(self) -> bool {
        !matches!(self, Self::Other)
    }

    /// Filing-critical labels, in declaration order
    pub fn critical() -> impl Iterator<Item = FilingLabel> {
        Self::ALL.into_iter().filter(|label| label.is_filing_critical())
    }
}

impl fmt::Display for FilingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_as_str() {
        for label in FilingLabel::ALL {
            let json = serde_json::to_string(&label).unwrap();
            assert_eq!(json, format!("\"{}\"", label.as_str()));
            let back: FilingLabel = serde_json::from_str(&json).unwrap();
            assert_eq!(back, label);
        }
    }

    #[test]
    fn test_only_other_is_not_critical() {
        assert_eq!(FilingLabel::critical().count(), 15);
        assert!(!FilingLabel::Other.is_filing_critical());
        assert_eq!(FilingLabel::ScheduleAB.display_name(), "Schedule A/B");
    }
}
