use clap::Parser;
use log::{error, info, warn, LevelFilter};
use pod_ledger::{
    hash_file, ChainStore, Command, LedgerError, MemoryPool, MiningCoordinator, MiningOutcome,
    Opt, P2pNetwork, PodConsensus, Validator, Wallet, GLOBAL_CONFIG,
};
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How often an idle node checks the mempool for work.
const MINE_INTERVAL_SECS: u64 = 10;

fn main() {
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Createwallet => {
            let wallet = Wallet::new()?;
            println!("Your new public key: {}", wallet.public_key_hex());
        }
        Command::HashFile { path } => {
            let fingerprint = hash_file(&path)?;
            println!("{fingerprint}");
        }
        Command::StartNode { peers, validators } => {
            let addr = GLOBAL_CONFIG.get_node_addr();

            let chain = Arc::new(ChainStore::new()?);
            let mempool = Arc::new(MemoryPool::new());
            let consensus = Arc::new(PodConsensus::new());
            for i in 1..=validators {
                consensus.register(Validator::new(&format!("validator-{i}"))?);
            }

            let network = Arc::new(P2pNetwork::new(addr, Arc::clone(&chain)));
            let bound = network.start_server().map_err(|e| format!("{e}"))?;
            println!("Node listening on {bound}");

            for peer in &peers {
                if let Err(e) = network.connect_to_peer(peer) {
                    // A dead bootstrap peer is not fatal; the node serves on.
                    error!("Failed to connect to peer {peer}: {e}");
                }
            }

            let coordinator = Arc::new(MiningCoordinator::new(
                chain,
                mempool,
                consensus,
                Wallet::new()?,
                Some(Arc::clone(&network)),
            ));

            run_mining_loop(coordinator);
        }
    }
    Ok(())
}

/// Periodically drain the mempool into a candidate block. Rejections and
/// empty cycles are routine; nothing here stops the node.
fn run_mining_loop(coordinator: Arc<MiningCoordinator>) -> ! {
    loop {
        thread::sleep(Duration::from_secs(MINE_INTERVAL_SECS));

        match coordinator.mine() {
            Ok(MiningOutcome::Mined(block)) => {
                info!("Mined block #{} {}", block.get_index(), block.get_hash());
            }
            Ok(MiningOutcome::NothingToMine) => {}
            Err(LedgerError::NoValidators) => {
                warn!("Mining skipped: no validators registered");
            }
            Err(e) => {
                warn!("Mining cycle failed: {e}");
            }
        }
    }
}
