use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of actions a ledger event can record.
///
/// The four artifact seals certify a single document's content hash,
/// `SEAL_INTENT` certifies a group of documents through their hash map, and
/// `APPROVE` signs off on a previously sealed MRP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerAction {
    SealReq,
    SealSpecs,
    SealPlan,
    SealMrp,
    SealIntent,
    Approve,
}

impl LedgerAction {
    pub const ALL: [LedgerAction; 6] = [
        LedgerAction::SealReq,
        LedgerAction::SealSpecs,
        LedgerAction::SealPlan,
        LedgerAction::SealMrp,
        LedgerAction::SealIntent,
        LedgerAction::Approve,
    ];

    /// Wire tag, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerAction::SealReq => "SEAL_REQ",
            LedgerAction::SealSpecs => "SEAL_SPECS",
            LedgerAction::SealPlan => "SEAL_PLAN",
            LedgerAction::SealMrp => "SEAL_MRP",
            LedgerAction::SealIntent => "SEAL_INTENT",
            LedgerAction::Approve => "APPROVE",
        }
    }

    /// True for the four single-document "seal artifact" actions.
    pub fn is_artifact_seal(&self) -> bool {
        matches!(
            self,
            LedgerAction::SealReq
                | LedgerAction::SealSpecs
                | LedgerAction::SealPlan
                | LedgerAction::SealMrp
        )
    }
}

impl fmt::Display for LedgerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ledger action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for LedgerAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LedgerAction::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}
