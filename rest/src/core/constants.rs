// =============================================================================
// Query Defaults
// =============================================================================

/// Default number of rows returned per page
pub const DEFAULT_LIMIT: u32 = 25;

/// Maximum number of rows returned per page
pub const MAX_LIMIT: u32 = 100;

/// Default bound on repeated values for one query parameter
pub const DEFAULT_MAX_REPEATED_QUERY_PARAMETERS: usize = 100;

/// Default bound on a consolidated timestamp range width (7 days in
/// nanoseconds)
pub const DEFAULT_MAX_TIMESTAMP_RANGE_NS: i128 = 604_800_000_000_000;

// =============================================================================
// Filter Keys
// =============================================================================

use std::fmt;

/// Recognized query-string parameter keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    AccountBalance,
    AccountId,
    AccountPublicKey,
    BlockNumber,
    ContractId,
    Limit,
    NodeId,
    Order,
    ScheduleId,
    SerialNumber,
    Slot,
    SpenderId,
    Timestamp,
    TokenId,
}

impl FilterKey {
    /// The key as it appears in the query string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccountBalance => "account.balance",
            Self::AccountId => "account.id",
            Self::AccountPublicKey => "account.publickey",
            Self::BlockNumber => "block.number",
            Self::ContractId => "contract.id",
            Self::Limit => "limit",
            Self::NodeId => "node.id",
            Self::Order => "order",
            Self::ScheduleId => "schedule.id",
            Self::SerialNumber => "serialnumber",
            Self::Slot => "slot",
            Self::SpenderId => "spender.id",
            Self::Timestamp => "timestamp",
            Self::TokenId => "token.id",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "account.balance" => Some(Self::AccountBalance),
            "account.id" => Some(Self::AccountId),
            "account.publickey" => Some(Self::AccountPublicKey),
            "block.number" => Some(Self::BlockNumber),
            "contract.id" => Some(Self::ContractId),
            "limit" => Some(Self::Limit),
            "node.id" => Some(Self::NodeId),
            "order" => Some(Self::Order),
            "schedule.id" => Some(Self::ScheduleId),
            "serialnumber" => Some(Self::SerialNumber),
            "slot" => Some(Self::Slot),
            "spender.id" => Some(Self::SpenderId),
            "timestamp" => Some(Self::Timestamp),
            "token.id" => Some(Self::TokenId),
            _ => None,
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
