//! Error types

use {
    crate::client::ProgramClientError,
    solana_sdk::pubkey::Pubkey,
    std::fmt,
    thiserror::Error,
};

/// Voter credential a plugin requires before it can compute a weight
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialKind {
    /// Gateway token (identity pass) issued to the voter
    GatewayToken,
    /// Main stake account of the voter in the oracle staking program
    StakeAccount,
    /// Oracle registered with the voter weight queue
    QueueOracle,
    /// Pre-built voter weight instruction of the queue oracle
    OracleWeightInstruction,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GatewayToken => "gateway token",
            Self::StakeAccount => "stake account",
            Self::QueueOracle => "queue oracle",
            Self::OracleWeightInstruction => "oracle voter weight instruction",
        };
        f.write_str(name)
    }
}

/// Errors returned while building operation plans
#[derive(Error, Debug)]
pub enum VotingClientError {
    #[error("missing voter credential: no {0} found")]
    MissingCredential(CredentialKind),
    #[error("client error: {0}")]
    Client(ProgramClientError),
    #[error("account not found: {0}")]
    AccountNotFound(Pubkey),
    #[error("invalid account data: {0}")]
    InvalidAccountData(Pubkey),
}

impl VotingClientError {
    /// The voter must acquire a credential before retrying
    pub fn is_user_actionable(&self) -> bool {
        matches!(self, Self::MissingCredential(_))
    }

    /// A lookup failed, building the whole plan again is safe
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Client(_))
    }
}

impl PartialEq for VotingClientError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MissingCredential(a), Self::MissingCredential(b)) => a == b,
            (Self::Client(ref a), Self::Client(ref b)) => a.to_string() == b.to_string(),
            (Self::AccountNotFound(a), Self::AccountNotFound(b)) => a == b,
            (Self::InvalidAccountData(a), Self::InvalidAccountData(b)) => a == b,
            _ => false,
        }
    }
}

pub type VotingClientResult<T> = Result<T, VotingClientError>;
