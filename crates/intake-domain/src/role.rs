//! Agent role selected on the first step of the intake form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which side(s) of the transaction the submitting agent represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    #[serde(rename = "listingAgent", alias = "listing-agent")]
    ListingAgent,
    #[serde(rename = "buyersAgent", alias = "buyers-agent")]
    BuyersAgent,
    #[serde(rename = "dualAgent", alias = "dual-agent")]
    DualAgent,
}

impl AgentRole {
    pub const ALL: [AgentRole; 3] = [
        AgentRole::ListingAgent,
        AgentRole::BuyersAgent,
        AgentRole::DualAgent,
    ];

    /// Internal slug used in persisted drafts and cover-sheet requests.
    pub fn slug(self) -> &'static str {
        match self {
            AgentRole::ListingAgent => "listingAgent",
            AgentRole::BuyersAgent => "buyersAgent",
            AgentRole::DualAgent => "dualAgent",
        }
    }

    /// Human-readable label expected by the external select fields.
    pub fn display_label(self) -> &'static str {
        match self {
            AgentRole::ListingAgent => "Listing Agent",
            AgentRole::BuyersAgent => "Buyer's Agent",
            AgentRole::DualAgent => "Dual Agent",
        }
    }

    /// Returns `true` when the agent represents the seller.
    pub fn represents_seller(self) -> bool {
        matches!(self, AgentRole::ListingAgent | AgentRole::DualAgent)
    }

    /// Returns `true` when the agent represents the buyer.
    pub fn represents_buyer(self) -> bool {
        matches!(self, AgentRole::BuyersAgent | AgentRole::DualAgent)
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

impl FromStr for AgentRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "listingagent" | "listing" | "seller" => Ok(AgentRole::ListingAgent),
            "buyersagent" | "buyeragent" | "buyers" | "buyer" => Ok(AgentRole::BuyersAgent),
            "dualagent" | "dual" => Ok(AgentRole::DualAgent),
            _ => Err(format!("unknown agent role `{}`", value.trim())),
        }
    }
}
