//! Voting client for realms whose voting power is supplied by a voter weight plugin.
//!
//! The client builds ordered [`plan::OperationPlan`]s: refresh a voter's weight
//! record, cast a vote, relinquish a vote. Plans are handed to a caller owned
//! submitter which signs and sends them.

pub mod action;
pub mod addresses;
pub mod chunk;
pub mod client;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod instruction;
pub mod plan;
pub mod plugin;
pub mod power;
pub mod records;
pub mod state;
pub mod voting_client;

pub use solana_sdk;
pub use spl_governance;
