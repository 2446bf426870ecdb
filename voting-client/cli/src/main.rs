use {
    clap::{
        crate_description, crate_name, crate_version, value_t_or_exit, App, AppSettings, Arg,
        ArgMatches, SubCommand,
    },
    serde_derive::Deserialize,
    serde_with::{serde_as, DisplayFromStr},
    solana_clap_utils::{
        input_parsers::pubkey_of,
        input_validators::{is_keypair, is_url, is_valid_pubkey},
    },
    solana_client::nonblocking::rpc_client::RpcClient,
    solana_sdk::{
        borsh0_10::try_from_slice_unchecked,
        commitment_config::CommitmentConfig,
        pubkey::Pubkey,
        signature::{read_keypair_file, Signer},
    },
    spl_governance::state::{
        governance::GovernanceV2,
        proposal::ProposalV2,
        realm::RealmV2,
        realm_config::{get_realm_config_address, RealmConfigAccount},
        token_owner_record::{get_token_owner_record_address, TokenOwnerRecordV2},
        vote_record::{get_vote_record_address, Vote, VoteChoice},
    },
    spl_governance_voting_client::{
        action::{cast_vote_plan, relinquish_vote_plan},
        client::{ProgramClient, ProgramRpcClient},
        config::VotingClientConfig,
        plan::OperationPlan,
        state::{ProposalInfo, RealmInfo, StakePosition, TokenOwnerRecordInfo, VotingNft, WeightAction},
        voting_client::VotingClient,
    },
    std::{error::Error, fs::File, sync::Arc},
};

mod output;
use output::{CliInstruction, CliNftVoteRecord, CliOperationPlan};

/// Voter credentials known to the caller, read from a JSON file
#[serde_as]
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct VoterContext {
    #[serde(default)]
    voting_nfts: Vec<VotingNft>,
    #[serde(default)]
    stake_positions: Vec<StakePosition>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    gateway_token: Option<Pubkey>,
    #[serde_as(as = "Vec<DisplayFromStr>")]
    #[serde(default)]
    oracles: Vec<Pubkey>,
    #[serde(default)]
    weight_instructions: Vec<CliInstruction>,
}

struct Config {
    json_rpc_url: String,
    voter: Pubkey,
    governance_program_id: Pubkey,
    plugins: VotingClientConfig,
    voter_context: VoterContext,
    verbose: bool,
}

fn pubkey_arg<'a, 'b>(name: &'a str, value_name: &'a str, help: &'a str) -> Arg<'a, 'b> {
    Arg::with_name(name)
        .value_name(value_name)
        .validator(is_valid_pubkey)
        .index(1)
        .required(true)
        .help(help)
}

fn load_voter_context(path: Option<&str>) -> Result<VoterContext, Box<dyn Error>> {
    match path {
        Some(path) => Ok(serde_json::from_reader(File::open(path)?)?),
        None => Ok(VoterContext::default()),
    }
}

async fn get_governance_account<T: borsh::BorshDeserialize>(
    rpc_client: &RpcClient,
    address: &Pubkey,
) -> Result<T, Box<dyn Error>> {
    let account = rpc_client.get_account(address).await?;
    Ok(try_from_slice_unchecked::<T>(&account.data)?)
}

/// Realm, its voter weight addin and the voter's token owner record
struct VotingSession {
    realm: RealmInfo,
    voter_weight_addin: Option<Pubkey>,
    token_owner_record: TokenOwnerRecordInfo,
}

impl VotingSession {
    async fn load(
        rpc_client: &RpcClient,
        config: &Config,
        realm_address: &Pubkey,
        governing_token_mint: Option<Pubkey>,
    ) -> Result<Self, Box<dyn Error>> {
        let realm_data: RealmV2 = get_governance_account(rpc_client, realm_address).await?;

        let realm_config_address =
            get_realm_config_address(&config.governance_program_id, realm_address);
        let voter_weight_addin = match rpc_client
            .get_account_with_commitment(&realm_config_address, rpc_client.commitment())
            .await?
            .value
        {
            Some(account) => try_from_slice_unchecked::<RealmConfigAccount>(&account.data)?
                .community_token_config
                .voter_weight_addin,
            None => None,
        };

        let governing_token_mint = governing_token_mint.unwrap_or(realm_data.community_mint);
        let token_owner_record_address = get_token_owner_record_address(
            &config.governance_program_id,
            realm_address,
            &governing_token_mint,
            &config.voter,
        );
        let token_owner_record_data: TokenOwnerRecordV2 =
            get_governance_account(rpc_client, &token_owner_record_address).await?;

        Ok(Self {
            realm: RealmInfo {
                address: *realm_address,
                community_mint: realm_data.community_mint,
                council_mint: realm_data.config.council_mint,
                governance_program_id: config.governance_program_id,
            },
            voter_weight_addin,
            token_owner_record: TokenOwnerRecordInfo {
                address: token_owner_record_address,
                governing_token_mint: token_owner_record_data.governing_token_mint,
                governing_token_owner: token_owner_record_data.governing_token_owner,
                governing_token_deposit_amount: token_owner_record_data
                    .governing_token_deposit_amount,
            },
        })
    }

    fn voting_client(
        &self,
        config: &Config,
        program_client: Arc<dyn ProgramClient>,
    ) -> Result<VotingClient, Box<dyn Error>> {
        let plugin = config
            .plugins
            .weight_plugin(self.voter_weight_addin, None)?;
        if config.verbose {
            println!("Voter weight plugin: {}", plugin.kind());
        }

        let mut voting_client =
            VotingClient::new(program_client, plugin, self.realm.clone(), config.voter);

        let context = &config.voter_context;
        voting_client.set_voting_nfts(context.voting_nfts.clone());
        voting_client.set_stake_positions(context.stake_positions.clone());
        voting_client.set_gateway_token(context.gateway_token);
        voting_client.set_oracles(context.oracles.clone());
        voting_client.set_weight_instructions(
            context
                .weight_instructions
                .iter()
                .map(CliInstruction::to_instruction)
                .collect::<Result<Vec<_>, _>>()?,
        );

        Ok(voting_client)
    }
}

async fn get_proposal(
    rpc_client: &RpcClient,
    proposal_address: &Pubkey,
) -> Result<(Pubkey, ProposalInfo), Box<dyn Error>> {
    let proposal_data: ProposalV2 = get_governance_account(rpc_client, proposal_address).await?;
    let governance_data: GovernanceV2 =
        get_governance_account(rpc_client, &proposal_data.governance).await?;

    Ok((
        governance_data.realm,
        ProposalInfo {
            address: *proposal_address,
            governance: proposal_data.governance,
            governing_token_mint: proposal_data.governing_token_mint,
            token_owner_record: proposal_data.token_owner_record,
        },
    ))
}

fn print_plan(plan: &OperationPlan) -> Result<(), Box<dyn Error>> {
    println!(
        "{}",
        serde_json::to_string_pretty(&CliOperationPlan::from(plan))?
    );
    Ok(())
}

fn vote_of(matches: &ArgMatches<'_>) -> Vote {
    if matches.is_present("deny") {
        Vote::Deny
    } else {
        Vote::Approve(vec![VoteChoice {
            rank: 0,
            weight_percentage: 100,
        }])
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let app_matches = App::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg({
            let arg = Arg::with_name("config_file")
                .short("C")
                .long("config")
                .value_name("PATH")
                .takes_value(true)
                .global(true)
                .help("Configuration file to use");
            if let Some(ref config_file) = *solana_cli_config::CONFIG_FILE {
                arg.default_value(config_file)
            } else {
                arg
            }
        })
        .arg(
            Arg::with_name("keypair")
                .long("keypair")
                .value_name("KEYPAIR")
                .validator(is_keypair)
                .takes_value(true)
                .global(true)
                .help("Filepath or URL to a keypair [default: client keypair]"),
        )
        .arg(
            Arg::with_name("voter")
                .long("voter")
                .value_name("VOTER_ADDRESS")
                .validator(is_valid_pubkey)
                .takes_value(true)
                .global(true)
                .help("Build plans for this voter [default: keypair address]"),
        )
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .short("v")
                .takes_value(false)
                .global(true)
                .help("Show additional information"),
        )
        .arg(
            Arg::with_name("json_rpc_url")
                .long("url")
                .value_name("URL")
                .takes_value(true)
                .global(true)
                .validator(is_url)
                .help("JSON RPC URL for the cluster [default: value from configuration file]"),
        )
        .arg(
            Arg::with_name("program_id")
                .long("program")
                .value_name("PROGRAM_ID")
                .takes_value(true)
                .global(true)
                .validator(is_valid_pubkey)
                .default_value("GovER5Lthms3bLBqWub97yVrMmEogzX7xNjdXpPPCVZw")
                .help("SPL Governance Program ID"),
        )
        .arg(
            Arg::with_name("plugins_file")
                .long("plugins")
                .value_name("PATH")
                .takes_value(true)
                .global(true)
                .help("YAML file mapping voter weight addins to plugins"),
        )
        .arg(
            Arg::with_name("voter_context")
                .long("voter-context")
                .value_name("PATH")
                .takes_value(true)
                .global(true)
                .help("JSON file with the nfts, positions, gateway token and oracles of the voter"),
        )
        .subcommand(
            SubCommand::with_name("refresh-weight")
                .about("Build the voter weight refresh ahead of a governance action")
                .arg(pubkey_arg(
                    "realm",
                    "REALM_ADDRESS",
                    "The address of the realm",
                ))
                .arg(
                    Arg::with_name("action")
                        .long("action")
                        .value_name("ACTION")
                        .takes_value(true)
                        .possible_values(&[
                            "cast-vote",
                            "comment-proposal",
                            "create-governance",
                            "create-proposal",
                            "sign-off-proposal",
                        ])
                        .default_value("create-proposal")
                        .help("The governance action the weight is refreshed for"),
                )
                .arg(
                    Arg::with_name("target")
                        .long("target")
                        .value_name("TARGET_ADDRESS")
                        .validator(is_valid_pubkey)
                        .takes_value(true)
                        .help("The proposal, governance or realm the action targets"),
                ),
        )
        .subcommand(
            SubCommand::with_name("cast-vote")
                .about("Build the plan casting a vote on a proposal")
                .arg(pubkey_arg(
                    "proposal",
                    "PROPOSAL_ADDRESS",
                    "The address of the proposal",
                ))
                .arg(
                    Arg::with_name("deny")
                        .long("deny")
                        .takes_value(false)
                        .help("Vote against the proposal"),
                ),
        )
        .subcommand(
            SubCommand::with_name("relinquish-vote")
                .about("Build the plan relinquishing a vote on a proposal")
                .arg(pubkey_arg(
                    "proposal",
                    "PROPOSAL_ADDRESS",
                    "The address of the proposal",
                )),
        )
        .subcommand(
            SubCommand::with_name("vote-records")
                .about("List the plugin vote records of a proposal")
                .arg(pubkey_arg(
                    "proposal",
                    "PROPOSAL_ADDRESS",
                    "The address of the proposal",
                )),
        )
        .subcommand(
            SubCommand::with_name("voting-power")
                .about("Display the voting power of the voter's nfts")
                .arg(pubkey_arg(
                    "realm",
                    "REALM_ADDRESS",
                    "The address of the realm",
                )),
        )
        .get_matches();

    let (sub_command, sub_matches) = app_matches.subcommand();
    let matches = sub_matches.unwrap();

    let config = {
        let cli_config = if let Some(config_file) = matches.value_of("config_file") {
            solana_cli_config::Config::load(config_file).unwrap_or_default()
        } else {
            solana_cli_config::Config::default()
        };

        let voter = match pubkey_of(matches, "voter") {
            Some(voter) => voter,
            None => read_keypair_file(
                matches
                    .value_of("keypair")
                    .unwrap_or(&cli_config.keypair_path),
            )?
            .pubkey(),
        };

        let plugins = match matches.value_of("plugins_file") {
            Some(plugins_file) => VotingClientConfig::load(plugins_file)?,
            None => VotingClientConfig::default(),
        };

        Config {
            json_rpc_url: matches
                .value_of("json_rpc_url")
                .unwrap_or(&cli_config.json_rpc_url)
                .to_string(),
            voter,
            governance_program_id: pubkey_of(matches, "program_id").unwrap(),
            plugins,
            voter_context: load_voter_context(matches.value_of("voter_context"))?,
            verbose: matches.is_present("verbose"),
        }
    };
    solana_logger::setup_with_default("solana=info");

    let rpc_client = Arc::new(RpcClient::new_with_commitment(
        config.json_rpc_url.clone(),
        CommitmentConfig::confirmed(),
    ));
    let program_client: Arc<dyn ProgramClient> =
        Arc::new(ProgramRpcClient::new(rpc_client.clone()));

    match (sub_command, sub_matches) {
        ("refresh-weight", Some(arg_matches)) => {
            let realm_address = pubkey_of(arg_matches, "realm").unwrap();
            let action = value_t_or_exit!(arg_matches, "action", WeightAction);
            let target = pubkey_of(arg_matches, "target");

            let session = VotingSession::load(&rpc_client, &config, &realm_address, None).await?;
            let voting_client = session.voting_client(&config, program_client)?;

            let plan = voting_client
                .refresh_voter_weight(&session.token_owner_record, action, target)
                .await?;
            print_plan(&plan)
        }
        ("cast-vote", Some(arg_matches)) => {
            let proposal_address = pubkey_of(arg_matches, "proposal").unwrap();
            let (realm_address, proposal) = get_proposal(&rpc_client, &proposal_address).await?;

            let session = VotingSession::load(
                &rpc_client,
                &config,
                &realm_address,
                Some(proposal.governing_token_mint),
            )
            .await?;
            let voting_client = session.voting_client(&config, program_client)?;

            let plugin_plan = voting_client
                .cast_vote(&proposal, &session.token_owner_record)
                .await?;
            let plan = cast_vote_plan(
                &session.realm,
                &proposal,
                &session.token_owner_record,
                &config.voter,
                vote_of(arg_matches),
                plugin_plan,
            );
            print_plan(&plan)
        }
        ("relinquish-vote", Some(arg_matches)) => {
            let proposal_address = pubkey_of(arg_matches, "proposal").unwrap();
            let (realm_address, proposal) = get_proposal(&rpc_client, &proposal_address).await?;

            let session = VotingSession::load(
                &rpc_client,
                &config,
                &realm_address,
                Some(proposal.governing_token_mint),
            )
            .await?;
            let voting_client = session.voting_client(&config, program_client)?;

            let vote_record = get_vote_record_address(
                &config.governance_program_id,
                &proposal_address,
                &session.token_owner_record.address,
            );
            if config.verbose {
                println!("Vote record: {}", vote_record);
            }

            let plugin_plan = voting_client
                .relinquish_vote(&proposal, &vote_record, &session.token_owner_record)
                .await?;
            let plan = relinquish_vote_plan(
                &session.realm,
                &proposal,
                &session.token_owner_record,
                &config.voter,
                plugin_plan,
            );
            print_plan(&plan)
        }
        ("vote-records", Some(arg_matches)) => {
            let proposal_address = pubkey_of(arg_matches, "proposal").unwrap();
            let (realm_address, proposal) = get_proposal(&rpc_client, &proposal_address).await?;

            let session = VotingSession::load(
                &rpc_client,
                &config,
                &realm_address,
                Some(proposal.governing_token_mint),
            )
            .await?;
            let voting_client = session.voting_client(&config, program_client)?;

            let records: Vec<CliNftVoteRecord> = voting_client
                .list_vote_records_for_proposal(&proposal_address)
                .await?
                .iter()
                .map(Into::into)
                .collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(())
        }
        ("voting-power", Some(arg_matches)) => {
            let realm_address = pubkey_of(arg_matches, "realm").unwrap();

            let session = VotingSession::load(&rpc_client, &config, &realm_address, None).await?;
            let voting_client = session.voting_client(&config, program_client)?;

            match voting_client.voting_power().await? {
                Some(voting_power) => println!("Voting power: {}", voting_power),
                None => println!(
                    "Voting power: {} (deposited)",
                    session.token_owner_record.governing_token_deposit_amount
                ),
            }
            Ok(())
        }
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voter_context_uses_camel_case_keys() {
        let mint = Pubkey::new_unique();
        let collection = Pubkey::new_unique();
        let tree = Pubkey::new_unique();
        let position = Pubkey::new_unique();
        let json = format!(
            r#"{{
                "votingNfts": [{{
                    "mint": "{mint}",
                    "grouping": [{{"groupKey": "collection", "groupValue": "{collection}", "verified": true}}],
                    "compression": {{
                        "tree": "{tree}",
                        "leafId": 3,
                        "dataHash": {hash:?},
                        "creatorHash": {hash:?}
                    }}
                }}],
                "stakePositions": [{{"address": "{position}", "mint": "{mint}"}}]
            }}"#,
            hash = [1u8; 32],
        );

        let context: VoterContext = serde_json::from_str(&json).unwrap();

        let nft = &context.voting_nfts[0];
        assert_eq!(nft.collection().unwrap().group_value, collection);
        assert_eq!(nft.compression.as_ref().unwrap().leaf_id, 3);
        assert_eq!(context.stake_positions[0].address, position);
        assert_eq!(context.gateway_token, None);
        assert!(context.weight_instructions.is_empty());
    }
}
