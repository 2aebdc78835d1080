use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "pod-ledger")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "startnode", about = "Start a ledger node")]
    StartNode {
        #[arg(
            long = "peer",
            help = "Peer address to connect to on startup (repeatable)"
        )]
        peers: Vec<String>,
        #[arg(
            long = "validators",
            default_value_t = 4,
            help = "Number of local validators to register"
        )]
        validators: usize,
    },
    #[command(
        name = "createwallet",
        about = "Generate a new keypair and print the public key"
    )]
    Createwallet,
    #[command(name = "hashfile", about = "Print the content fingerprint of a file")]
    HashFile {
        #[arg(help = "Path to the file")]
        path: String,
    },
}
