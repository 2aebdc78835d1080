//! Ledger integration tests
//!
//! End-to-end scenarios across mempool, consensus, chain store, and the
//! peer replication protocol.

use pod_ledger::{
    encode_chain_update, process_frame, ApprovalPolicy, Block, ChainStore, LedgerError,
    MemoryPool, MiningCoordinator, MiningOutcome, P2pNetwork, PodConsensus, SubmitOutcome,
    Transaction, Validator, APPROVAL_REWARD,
};
use std::sync::Arc;

/// Deterministic approval stub granting votes to a fixed set of ids.
struct FixedApprovers(Vec<&'static str>);

impl ApprovalPolicy for FixedApprovers {
    fn approves(&self, validator: &Validator, _block: &Block) -> bool {
        self.0.contains(&validator.get_id())
    }
}

fn upload_tx(seed: &str) -> Transaction {
    Transaction::new(
        format!("filehash-{seed}"),
        "uploader-key".to_string(),
        4096,
        0.9,
        "uploader-sig".to_string(),
    )
}

fn node(policy: Box<dyn ApprovalPolicy>, validators: usize) -> MiningCoordinator {
    let consensus = PodConsensus::with_policy(policy);
    for i in 1..=validators {
        consensus.register(Validator::new(&format!("validator-{i}")).unwrap());
    }
    MiningCoordinator::new(
        Arc::new(ChainStore::new().unwrap()),
        Arc::new(MemoryPool::new()),
        Arc::new(consensus),
        pod_ledger::Wallet::new().unwrap(),
        None,
    )
}

/// Scenario A: mining an empty mempool changes nothing.
#[test]
fn test_mining_empty_mempool_is_a_no_op() {
    let consensus = Arc::new(PodConsensus::new());
    consensus.register(Validator::new("validator-1").unwrap());
    let chain = Arc::new(ChainStore::new().unwrap());
    let coordinator = MiningCoordinator::new(
        Arc::clone(&chain),
        Arc::new(MemoryPool::new()),
        consensus,
        pod_ledger::Wallet::new().unwrap(),
        None,
    );

    let outcome = coordinator.mine().unwrap();
    assert!(matches!(outcome, MiningOutcome::NothingToMine));
    assert_eq!(chain.len(), 1);
    assert!(chain.head().is_genesis());
}

/// Scenario B: 4 validators, 3 deterministic approvals, one transaction.
#[test]
fn test_quorum_commit_rewards_approvers() {
    let consensus = Arc::new(PodConsensus::with_policy(Box::new(FixedApprovers(vec![
        "validator-1",
        "validator-2",
        "validator-3",
    ]))));
    for i in 1..=4 {
        consensus.register(Validator::new(&format!("validator-{i}")).unwrap());
    }
    let chain = Arc::new(ChainStore::new().unwrap());
    let mempool = Arc::new(MemoryPool::new());
    let coordinator = MiningCoordinator::new(
        Arc::clone(&chain),
        Arc::clone(&mempool),
        Arc::clone(&consensus),
        pod_ledger::Wallet::new().unwrap(),
        None,
    );

    assert_eq!(coordinator.submit(upload_tx("b")), SubmitOutcome::Accepted);
    let outcome = coordinator.mine().unwrap();

    let block = match outcome {
        MiningOutcome::Mined(block) => block,
        MiningOutcome::NothingToMine => panic!("expected a mined block"),
    };
    assert_eq!(block.get_index(), 1);
    assert_eq!(chain.len(), 2);
    assert!(mempool.is_empty());

    // Approvers earn the fixed reward; the abstainer earns nothing.
    for approver in ["validator-1", "validator-2", "validator-3"] {
        assert_eq!(consensus.get_balance(approver), Some(APPROVAL_REWARD));
    }
    assert_eq!(consensus.get_balance("validator-4"), Some(0));

    // Approval is recorded as attestations alongside the chain.
    let attestations = chain.attestations_for(block.get_hash());
    assert_eq!(attestations.len(), 3);
    for attestation in &attestations {
        let key = consensus
            .public_key_for(attestation.get_validator_id())
            .unwrap();
        assert!(attestation.verify(&key));
    }
}

/// Scenario C over the frame codec: node B adopts node A's longer chain.
#[test]
fn test_chain_update_frame_synchronizes_peer() {
    // Node A mines one block on top of its genesis.
    let consensus = PodConsensus::with_policy(Box::new(FixedApprovers(vec!["validator-1"])));
    consensus.register(Validator::new("validator-1").unwrap());
    let node_a_chain = Arc::new(ChainStore::new().unwrap());
    let coordinator_a = MiningCoordinator::new(
        Arc::clone(&node_a_chain),
        Arc::new(MemoryPool::new()),
        Arc::new(consensus),
        pod_ledger::Wallet::new().unwrap(),
        None,
    );
    coordinator_a.submit(upload_tx("c"));
    coordinator_a.mine().unwrap();
    assert_eq!(node_a_chain.len(), 2);

    let chain_b = ChainStore::new().unwrap();
    assert_eq!(chain_b.len(), 1);

    // A's commit, as it would leave A's broadcast path.
    let frame = encode_chain_update(&node_a_chain.all()).unwrap();
    process_frame(&chain_b, frame.trim_end()).unwrap();

    assert_eq!(chain_b.len(), 2);
    assert_eq!(chain_b.head().get_hash(), node_a_chain.head().get_hash());
}

/// Scenario C over real sockets: node A dials node B and greets it with
/// its chain; B's server adopts it.
#[test]
fn test_peer_connection_synchronizes_over_tcp() {
    use std::thread;
    use std::time::{Duration, Instant};

    let chain_b = Arc::new(ChainStore::new().unwrap());
    let network_b = P2pNetwork::new("127.0.0.1:0".to_string(), Arc::clone(&chain_b));
    let addr_b = network_b.start_server().unwrap();

    // Node A mines one block, then connects to B.
    let consensus = PodConsensus::with_policy(Box::new(FixedApprovers(vec!["validator-1"])));
    consensus.register(Validator::new("validator-1").unwrap());
    let chain_a = Arc::new(ChainStore::new().unwrap());
    let network_a = Arc::new(P2pNetwork::new(
        "127.0.0.1:0".to_string(),
        Arc::clone(&chain_a),
    ));
    let coordinator_a = MiningCoordinator::new(
        Arc::clone(&chain_a),
        Arc::new(MemoryPool::new()),
        Arc::new(consensus),
        pod_ledger::Wallet::new().unwrap(),
        Some(Arc::clone(&network_a)),
    );
    coordinator_a.submit(upload_tx("tcp"));
    coordinator_a.mine().unwrap();
    assert_eq!(chain_a.len(), 2);

    network_a.connect_to_peer(&addr_b.to_string()).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while chain_b.len() < 2 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(chain_b.len(), 2);
    assert_eq!(chain_b.head().get_hash(), chain_a.head().get_hash());

    network_b.shutdown();
}

/// Scenario D: the same upload twice derives the same id; the second
/// submission is a no-op.
#[test]
fn test_duplicate_upload_is_idempotent() {
    let coordinator = node(Box::new(FixedApprovers(vec!["validator-1"])), 1);

    assert_eq!(coordinator.submit(upload_tx("d")), SubmitOutcome::Accepted);
    assert_eq!(
        coordinator.submit(upload_tx("d")),
        SubmitOutcome::DuplicatePending
    );
}

/// A rejected cycle leaves the pending set exactly as it was.
#[test]
fn test_rejection_preserves_pending_set() {
    struct RejectAll;
    impl ApprovalPolicy for RejectAll {
        fn approves(&self, _validator: &Validator, _block: &Block) -> bool {
            false
        }
    }

    let mempool = Arc::new(MemoryPool::new());
    let consensus = Arc::new(PodConsensus::with_policy(Box::new(RejectAll)));
    consensus.register(Validator::new("validator-1").unwrap());
    let coordinator = MiningCoordinator::new(
        Arc::new(ChainStore::new().unwrap()),
        Arc::clone(&mempool),
        consensus,
        pod_ledger::Wallet::new().unwrap(),
        None,
    );

    coordinator.submit(upload_tx("x"));
    coordinator.submit(upload_tx("y"));
    let mut before: Vec<String> = mempool
        .snapshot()
        .iter()
        .map(|tx| tx.get_id().to_string())
        .collect();
    before.sort();

    assert!(matches!(
        coordinator.mine(),
        Err(LedgerError::QuorumNotReached { .. })
    ));

    let mut after: Vec<String> = mempool
        .snapshot()
        .iter()
        .map(|tx| tx.get_id().to_string())
        .collect();
    after.sort();
    assert_eq!(before, after);
}
