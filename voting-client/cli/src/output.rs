use {
    base64::{engine::general_purpose::STANDARD, Engine},
    serde_derive::{Deserialize, Serialize},
    serde_with::{serde_as, DisplayFromStr},
    solana_sdk::{
        instruction::{AccountMeta, Instruction},
        pubkey::Pubkey,
    },
    spl_governance_voting_client::{
        chunk::SequenceType,
        plan::{OperationBatch, OperationPlan},
        records::NftVoteRecord,
    },
};

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CliAccountMeta {
    #[serde_as(as = "DisplayFromStr")]
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// Instruction with base64 encoded data
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CliInstruction {
    #[serde_as(as = "DisplayFromStr")]
    pub program_id: Pubkey,
    pub accounts: Vec<CliAccountMeta>,
    pub data: String,
}

impl From<&Instruction> for CliInstruction {
    fn from(instruction: &Instruction) -> Self {
        Self {
            program_id: instruction.program_id,
            accounts: instruction
                .accounts
                .iter()
                .map(|meta| CliAccountMeta {
                    pubkey: meta.pubkey,
                    is_signer: meta.is_signer,
                    is_writable: meta.is_writable,
                })
                .collect(),
            data: STANDARD.encode(&instruction.data),
        }
    }
}

impl CliInstruction {
    pub fn to_instruction(&self) -> Result<Instruction, base64::DecodeError> {
        Ok(Instruction {
            program_id: self.program_id,
            accounts: self
                .accounts
                .iter()
                .map(|meta| AccountMeta {
                    pubkey: meta.pubkey,
                    is_signer: meta.is_signer,
                    is_writable: meta.is_writable,
                })
                .collect(),
            data: STANDARD.decode(&self.data)?,
        })
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliOperationBatch {
    pub sequence_type: SequenceType,
    pub instructions: Vec<CliInstruction>,
}

impl From<&OperationBatch> for CliOperationBatch {
    fn from(batch: &OperationBatch) -> Self {
        Self {
            sequence_type: batch.sequence_type,
            instructions: batch.instructions.iter().map(Into::into).collect(),
        }
    }
}

#[serde_as]
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliOperationPlan {
    pub batches: Vec<CliOperationBatch>,
    #[serde_as(as = "Vec<DisplayFromStr>")]
    pub signers: Vec<Pubkey>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub voter_weight: Option<Pubkey>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub max_voter_weight: Option<Pubkey>,
}

impl From<&OperationPlan> for CliOperationPlan {
    fn from(plan: &OperationPlan) -> Self {
        Self {
            batches: plan.batches.iter().map(Into::into).collect(),
            signers: plan.signers.clone(),
            voter_weight: plan.voter_weight(),
            max_voter_weight: plan.max_voter_weight(),
        }
    }
}

#[serde_as]
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliNftVoteRecord {
    #[serde_as(as = "DisplayFromStr")]
    pub address: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub nft_mint: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub governing_token_owner: Pubkey,
}

impl From<&NftVoteRecord> for CliNftVoteRecord {
    fn from(record: &NftVoteRecord) -> Self {
        Self {
            address: record.address,
            nft_mint: record.nft_mint,
            governing_token_owner: record.governing_token_owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_json() {
        let instruction = Instruction {
            program_id: Pubkey::new_unique(),
            accounts: vec![AccountMeta::new(Pubkey::new_unique(), true)],
            data: vec![1, 2, 3],
        };

        let json = serde_json::to_string(&CliInstruction::from(&instruction)).unwrap();
        let parsed: CliInstruction = serde_json::from_str(&json).unwrap();

        assert!(json.contains("\"data\":\"AQID\""));
        assert_eq!(parsed.to_instruction().unwrap(), instruction);
    }

    #[test]
    fn test_plan_json() {
        let signer = Pubkey::new_unique();
        let plan = OperationPlan {
            batches: vec![OperationBatch::parallel(vec![])],
            signers: vec![signer],
            addresses: None,
        };

        let json = serde_json::to_value(CliOperationPlan::from(&plan)).unwrap();

        assert_eq!(json["batches"][0]["sequenceType"], "Parallel");
        assert_eq!(json["signers"][0], signer.to_string());
        assert!(json["voterWeight"].is_null());
    }
}
