//! External systems the tools reach: the ICP statistics REST API and the
//! proposal-store canister.

pub mod canister;
pub mod statistics;

pub use canister::{IcCanisterClient, Preferences, ProposalStore};
pub use statistics::{IcApiClient, StatisticsApi, StatsRequest};

#[cfg(test)]
pub use canister::MockProposalStore;
