use crate::consensus::Validator;
use crate::core::Block;

/// How a single validator decides whether to approve a candidate block.
///
/// Implementations must be pure functions of the block's content and the
/// validator's own declared state — no wall-clock reads, no randomness —
/// so voting outcomes are reproducible.
pub trait ApprovalPolicy: Send + Sync {
    fn approves(&self, validator: &Validator, block: &Block) -> bool;
}

/// The base policy: approve a block iff it is well-formed (its hash
/// recomputes from content and it carries transactions) and every
/// transaction's trust score meets the voting validator's threshold.
pub struct TrustThresholdPolicy;

impl ApprovalPolicy for TrustThresholdPolicy {
    fn approves(&self, validator: &Validator, block: &Block) -> bool {
        if block.get_transactions().is_empty() || !block.verify_hash() {
            return false;
        }
        block
            .get_transactions()
            .iter()
            .all(|tx| tx.get_trust_score() >= validator.get_trust_threshold())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Transaction;
    use crate::wallet::Wallet;

    fn block_with_score(trust_score: f64) -> Block {
        let wallet = Wallet::new().unwrap();
        let tx = Transaction::new(
            "file".to_string(),
            "uploader".to_string(),
            128,
            trust_score,
            "sig".to_string(),
        );
        Block::new_block(1, vec![tx], "prev".to_string(), &wallet).unwrap()
    }

    #[test]
    fn test_approves_when_scores_meet_threshold() {
        let validator = Validator::with_trust_threshold("v", 0.5).unwrap();
        assert!(TrustThresholdPolicy.approves(&validator, &block_with_score(0.5)));
        assert!(TrustThresholdPolicy.approves(&validator, &block_with_score(0.9)));
    }

    #[test]
    fn test_rejects_below_threshold() {
        let validator = Validator::with_trust_threshold("v", 0.5).unwrap();
        assert!(!TrustThresholdPolicy.approves(&validator, &block_with_score(0.2)));
    }

    #[test]
    fn test_rejects_empty_block() {
        let validator = Validator::new("v").unwrap();
        let wallet = Wallet::new().unwrap();
        let empty = Block::new_block(1, vec![], "prev".to_string(), &wallet).unwrap();
        assert!(!TrustThresholdPolicy.approves(&validator, &empty));
    }

    #[test]
    fn test_verdict_is_deterministic() {
        let validator = Validator::new("v").unwrap();
        let block = block_with_score(0.7);
        let first = TrustThresholdPolicy.approves(&validator, &block);
        for _ in 0..10 {
            assert_eq!(TrustThresholdPolicy.approves(&validator, &block), first);
        }
    }
}
