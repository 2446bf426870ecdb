//! Mapping of voter weight addin program ids to plugin adapters

use {
    crate::plugin::{
        GatewayIdentityPlugin, NftCollectionPlugin, OracleStakePlugin, QueueOraclePlugin,
        StakeConnection, StakeRegistryPlugin, WeightPlugin, WeightPluginKind,
    },
    serde_derive::{Deserialize, Serialize},
    serde_with::{serde_as, DisplayFromStr},
    solana_sdk::pubkey::Pubkey,
    std::{fs::File, io, path::Path, sync::Arc},
    thiserror::Error,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("no plugin configured for voter weight addin {0}")]
    UnknownAddin(Pubkey),
    #[error("oracle stake plugin {0} requires a stake connection")]
    MissingStakeConnection(Pubkey),
}

/// Known plugin program
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PluginConfig {
    TokenDeposit {
        #[serde_as(as = "DisplayFromStr")]
        program_id: Pubkey,
    },
    NftCollection {
        #[serde_as(as = "DisplayFromStr")]
        program_id: Pubkey,
    },
    StakeRegistry {
        #[serde_as(as = "DisplayFromStr")]
        program_id: Pubkey,
    },
    GatewayIdentity {
        #[serde_as(as = "DisplayFromStr")]
        program_id: Pubkey,
        #[serde_as(as = "Option<DisplayFromStr>")]
        previous_voter_weight_program_id: Option<Pubkey>,
    },
    OracleStake {
        #[serde_as(as = "DisplayFromStr")]
        program_id: Pubkey,
    },
    QueueOracle {
        #[serde_as(as = "DisplayFromStr")]
        program_id: Pubkey,
    },
}

impl PluginConfig {
    pub fn kind(&self) -> WeightPluginKind {
        match self {
            Self::TokenDeposit { .. } => WeightPluginKind::TokenDeposit,
            Self::NftCollection { .. } => WeightPluginKind::NftCollection,
            Self::StakeRegistry { .. } => WeightPluginKind::StakeRegistry,
            Self::GatewayIdentity { .. } => WeightPluginKind::GatewayIdentity,
            Self::OracleStake { .. } => WeightPluginKind::OracleStake,
            Self::QueueOracle { .. } => WeightPluginKind::QueueOracle,
        }
    }

    pub fn program_id(&self) -> Pubkey {
        match self {
            Self::TokenDeposit { program_id }
            | Self::NftCollection { program_id }
            | Self::StakeRegistry { program_id }
            | Self::GatewayIdentity { program_id, .. }
            | Self::OracleStake { program_id }
            | Self::QueueOracle { program_id } => *program_id,
        }
    }

    /// Builds the adapter, the oracle stake plugin needs `stake_connection`
    pub fn weight_plugin(
        &self,
        stake_connection: Option<Arc<dyn StakeConnection>>,
    ) -> Result<WeightPlugin, ConfigError> {
        let plugin = match self {
            Self::TokenDeposit { .. } => WeightPlugin::TokenDeposit,
            Self::NftCollection { program_id } => WeightPlugin::NftCollection(NftCollectionPlugin {
                program_id: *program_id,
            }),
            Self::StakeRegistry { program_id } => WeightPlugin::StakeRegistry(StakeRegistryPlugin {
                program_id: *program_id,
            }),
            Self::GatewayIdentity {
                program_id,
                previous_voter_weight_program_id,
            } => WeightPlugin::GatewayIdentity(GatewayIdentityPlugin {
                program_id: *program_id,
                previous_voter_weight_program_id: *previous_voter_weight_program_id,
            }),
            Self::OracleStake { program_id } => WeightPlugin::OracleStake(OracleStakePlugin {
                program_id: *program_id,
                stake_connection: stake_connection
                    .ok_or(ConfigError::MissingStakeConnection(*program_id))?,
            }),
            Self::QueueOracle { program_id } => WeightPlugin::QueueOracle(QueueOraclePlugin {
                program_id: *program_id,
            }),
        };
        Ok(plugin)
    }
}

/// Plugin programs the client knows about
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingClientConfig {
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
}

impl VotingClientConfig {
    /// Loads the config from a YAML file
    pub fn load(config_file: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(config_file)?;
        Ok(serde_yaml::from_reader(file)?)
    }

    /// Saves the config to a YAML file
    pub fn save(&self, config_file: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = File::create(config_file)?;
        serde_yaml::to_writer(file, self)?;
        Ok(())
    }

    /// Plugin configured for the realm's voter weight addin, None when the realm has no addin
    pub fn resolve(
        &self,
        voter_weight_addin: Option<Pubkey>,
    ) -> Result<Option<&PluginConfig>, ConfigError> {
        let addin = match voter_weight_addin {
            Some(addin) => addin,
            None => return Ok(None),
        };

        self.plugins
            .iter()
            .find(|plugin| plugin.program_id() == addin)
            .map(Some)
            .ok_or(ConfigError::UnknownAddin(addin))
    }

    /// Adapter for the realm's voter weight addin, [`WeightPlugin::None`] without one
    pub fn weight_plugin(
        &self,
        voter_weight_addin: Option<Pubkey>,
        stake_connection: Option<Arc<dyn StakeConnection>>,
    ) -> Result<WeightPlugin, ConfigError> {
        match self.resolve(voter_weight_addin)? {
            Some(plugin) => plugin.weight_plugin(stake_connection),
            None => Ok(WeightPlugin::None),
        }
    }
}
