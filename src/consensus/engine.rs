// Proof-of-Data voting: a registry of validators and a single-pass quorum
// vote over candidate blocks. Approval verdicts come from an injectable
// policy so outcomes are reproducible under test.

use crate::consensus::{ApprovalPolicy, Attestation, TrustThresholdPolicy, Validator};
use crate::core::{Block, ChainStore, Transaction};
use crate::error::{LedgerError, Result};
use log::{info, warn};
use std::sync::RwLock;

/// Units credited to each approving validator when a block commits.
pub const APPROVAL_REWARD: u64 = 10;

/// Outcome of a registration attempt. Duplicate registration is an
/// idempotent no-op, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    AlreadyRegistered,
}

/// Outcome of admitting an uploaded transaction against the committed
/// chain. Duplicate content is reported, not raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxAdmission {
    Admitted,
    DuplicateContent,
}

/// A successful quorum vote: who approved, and their signed attestations.
#[derive(Debug)]
pub struct BlockApproval {
    pub approvers: Vec<String>,
    pub attestations: Vec<Attestation>,
}

pub struct PodConsensus {
    validators: RwLock<Vec<Validator>>,
    policy: Box<dyn ApprovalPolicy>,
}

impl PodConsensus {
    pub fn new() -> PodConsensus {
        Self::with_policy(Box::new(TrustThresholdPolicy))
    }

    pub fn with_policy(policy: Box<dyn ApprovalPolicy>) -> PodConsensus {
        PodConsensus {
            validators: RwLock::new(vec![]),
            policy,
        }
    }

    /// Register a validator, rejecting duplicates by id.
    pub fn register(&self, validator: Validator) -> RegisterOutcome {
        let mut validators = self
            .validators
            .write()
            .expect("Failed to acquire write lock on validators - this should never happen");
        if validators
            .iter()
            .any(|v| v.get_id() == validator.get_id())
        {
            warn!("Validator already registered: {}", validator.get_id());
            return RegisterOutcome::AlreadyRegistered;
        }

        info!("Validator registered: {}", validator.get_id());
        validators.push(validator);
        RegisterOutcome::Registered
    }

    pub fn validator_count(&self) -> usize {
        self.validators
            .read()
            .expect("Failed to acquire read lock on validators - this should never happen")
            .len()
    }

    /// Reward balances in registration order.
    pub fn balances(&self) -> Vec<(String, u64)> {
        self.validators
            .read()
            .expect("Failed to acquire read lock on validators - this should never happen")
            .iter()
            .map(|v| (v.get_id().to_string(), v.get_balance()))
            .collect()
    }

    pub fn get_balance(&self, id: &str) -> Option<u64> {
        self.validators
            .read()
            .expect("Failed to acquire read lock on validators - this should never happen")
            .iter()
            .find(|v| v.get_id() == id)
            .map(|v| v.get_balance())
    }

    pub fn public_key_for(&self, id: &str) -> Option<String> {
        self.validators
            .read()
            .expect("Failed to acquire read lock on validators - this should never happen")
            .iter()
            .find(|v| v.get_id() == id)
            .map(|v| v.public_key_hex())
    }

    /// Approvals required for a registry of `validator_count` members:
    /// 75% rounded up, so a single validator must be unanimous.
    pub fn required_approvals(validator_count: usize) -> usize {
        (3 * validator_count).div_ceil(4)
    }

    /// Put a candidate block to the vote.
    ///
    /// One deterministic pass over the registry in registration order; no
    /// registry mutation happens mid-vote. On acceptance every approving
    /// validator is rewarded and returns a signed attestation. On
    /// rejection the caller is responsible for restoring the drained
    /// transactions to the mempool.
    pub fn validate_block(&self, block: &Block) -> Result<BlockApproval> {
        let mut validators = self
            .validators
            .write()
            .expect("Failed to acquire write lock on validators - this should never happen");

        if validators.is_empty() {
            return Err(LedgerError::NoValidators);
        }

        let approving: Vec<usize> = validators
            .iter()
            .enumerate()
            .filter(|(_, validator)| self.policy.approves(validator, block))
            .map(|(i, _)| i)
            .collect();

        let required = Self::required_approvals(validators.len());
        info!(
            "Block #{} approval: {}/{} validators approved ({} required)",
            block.get_index(),
            approving.len(),
            validators.len(),
            required
        );

        if approving.len() < required {
            return Err(LedgerError::QuorumNotReached {
                approvals: approving.len(),
                required,
            });
        }

        let mut approvers = Vec::with_capacity(approving.len());
        let mut attestations = Vec::with_capacity(approving.len());
        for &i in &approving {
            attestations.push(validators[i].attest(block)?);
            approvers.push(validators[i].get_id().to_string());
        }
        for &i in &approving {
            validators[i].reward(APPROVAL_REWARD);
        }

        Ok(BlockApproval {
            approvers,
            attestations,
        })
    }

    /// Admit an uploaded transaction: reject content already committed to
    /// the chain, otherwise stamp the endorsements of every validator
    /// whose trust threshold the upload meets.
    pub fn admit_transaction(&self, tx: &mut Transaction, chain: &ChainStore) -> TxAdmission {
        if chain.contains_file_hash(tx.get_file_hash()) {
            warn!(
                "Duplicate content rejected: {} already committed",
                tx.get_file_hash()
            );
            return TxAdmission::DuplicateContent;
        }

        let validators = self
            .validators
            .read()
            .expect("Failed to acquire read lock on validators - this should never happen");
        for validator in validators.iter() {
            if tx.get_trust_score() >= validator.get_trust_threshold() {
                tx.add_endorsement(validator.get_id().to_string());
            }
        }
        TxAdmission::Admitted
    }
}

impl Default for PodConsensus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::Wallet;

    /// Approves on behalf of a fixed set of validator ids.
    struct FixedApprovers(Vec<&'static str>);

    impl ApprovalPolicy for FixedApprovers {
        fn approves(&self, validator: &Validator, _block: &Block) -> bool {
            self.0.contains(&validator.get_id())
        }
    }

    fn sample_block() -> Block {
        let wallet = Wallet::new().unwrap();
        let tx = Transaction::new(
            "file".to_string(),
            "uploader".to_string(),
            256,
            0.9,
            "sig".to_string(),
        );
        Block::new_block(1, vec![tx], "prev".to_string(), &wallet).unwrap()
    }

    fn engine_with_validators(policy: Box<dyn ApprovalPolicy>, count: usize) -> PodConsensus {
        let engine = PodConsensus::with_policy(policy);
        for i in 1..=count {
            engine.register(Validator::new(&format!("validator-{i}")).unwrap());
        }
        engine
    }

    #[test]
    fn test_quorum_thresholds() {
        assert_eq!(PodConsensus::required_approvals(1), 1);
        assert_eq!(PodConsensus::required_approvals(3), 3);
        assert_eq!(PodConsensus::required_approvals(4), 3);
        assert_eq!(PodConsensus::required_approvals(8), 6);
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let engine = PodConsensus::new();
        assert_eq!(
            engine.register(Validator::new("validator-1").unwrap()),
            RegisterOutcome::Registered
        );
        assert_eq!(
            engine.register(Validator::new("validator-1").unwrap()),
            RegisterOutcome::AlreadyRegistered
        );
        assert_eq!(engine.validator_count(), 1);
    }

    #[test]
    fn test_empty_registry_cannot_vote() {
        let engine = PodConsensus::new();
        let result = engine.validate_block(&sample_block());
        assert_eq!(result.unwrap_err(), LedgerError::NoValidators);
    }

    #[test]
    fn test_three_of_four_reaches_quorum() {
        let engine = engine_with_validators(
            Box::new(FixedApprovers(vec![
                "validator-1",
                "validator-2",
                "validator-3",
            ])),
            4,
        );

        let approval = engine.validate_block(&sample_block()).unwrap();
        assert_eq!(approval.approvers.len(), 3);
        assert_eq!(approval.attestations.len(), 3);
        assert_eq!(engine.get_balance("validator-1"), Some(APPROVAL_REWARD));
        assert_eq!(engine.get_balance("validator-4"), Some(0));
    }

    #[test]
    fn test_two_of_four_misses_quorum() {
        let engine = engine_with_validators(
            Box::new(FixedApprovers(vec!["validator-1", "validator-2"])),
            4,
        );

        let result = engine.validate_block(&sample_block());
        assert_eq!(
            result.unwrap_err(),
            LedgerError::QuorumNotReached {
                approvals: 2,
                required: 3,
            }
        );
        // No rewards on a rejected vote.
        assert!(engine.balances().iter().all(|(_, balance)| *balance == 0));
    }

    #[test]
    fn test_two_of_three_misses_quorum() {
        let engine = engine_with_validators(
            Box::new(FixedApprovers(vec!["validator-1", "validator-2"])),
            3,
        );

        let result = engine.validate_block(&sample_block());
        assert_eq!(
            result.unwrap_err(),
            LedgerError::QuorumNotReached {
                approvals: 2,
                required: 3,
            }
        );
    }

    #[test]
    fn test_single_validator_must_be_unanimous() {
        let engine = engine_with_validators(Box::new(FixedApprovers(vec![])), 1);
        assert!(engine.validate_block(&sample_block()).is_err());

        let engine = engine_with_validators(Box::new(FixedApprovers(vec!["validator-1"])), 1);
        assert!(engine.validate_block(&sample_block()).is_ok());
    }

    #[test]
    fn test_attestations_verify_against_registry_keys() {
        let engine = engine_with_validators(Box::new(FixedApprovers(vec!["validator-1"])), 1);
        let block = sample_block();
        let approval = engine.validate_block(&block).unwrap();

        let attestation = &approval.attestations[0];
        let public_key = engine.public_key_for("validator-1").unwrap();
        assert_eq!(attestation.get_block_hash(), block.get_hash());
        assert!(attestation.verify(&public_key));
    }

    #[test]
    fn test_admission_stamps_endorsements() {
        let chain = ChainStore::new().unwrap();
        let engine = PodConsensus::new();
        engine.register(Validator::with_trust_threshold("strict", 0.95).unwrap());
        engine.register(Validator::with_trust_threshold("lenient", 0.1).unwrap());

        let mut tx = Transaction::new(
            "fresh-file".to_string(),
            "uploader".to_string(),
            64,
            0.5,
            "sig".to_string(),
        );
        assert_eq!(
            engine.admit_transaction(&mut tx, &chain),
            TxAdmission::Admitted
        );
        assert_eq!(tx.get_validators(), ["lenient".to_string()]);
    }

    #[test]
    fn test_admission_rejects_committed_content() {
        let chain = ChainStore::new().unwrap();
        let wallet = Wallet::new().unwrap();
        let committed = Transaction::new(
            "known-file".to_string(),
            "uploader".to_string(),
            64,
            0.9,
            "sig".to_string(),
        );
        let head = chain.head();
        let block = Block::new_block(
            1,
            vec![committed],
            head.get_hash().to_string(),
            &wallet,
        )
        .unwrap();
        chain.append(block, vec![]).unwrap();

        let engine = PodConsensus::new();
        let mut tx = Transaction::new(
            "known-file".to_string(),
            "another-uploader".to_string(),
            64,
            0.9,
            "sig".to_string(),
        );
        assert_eq!(
            engine.admit_transaction(&mut tx, &chain),
            TxAdmission::DuplicateContent
        );
    }
}
