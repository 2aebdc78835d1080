use crate::core::{Block, ChainStore};
use crate::error::{LedgerError, Result};
use crate::network::Peers;
use log::{error, info, warn};
use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

/// Type tag of the one defined message. The frame is the tag, a single
/// space, the JSON-encoded block list, and a trailing newline; each
/// connection carries exactly one frame.
pub const CHAIN_UPDATE: &str = "CHAIN_UPDATE";

const TCP_DIAL_TIMEOUT_MS: u64 = 5000;
const TCP_WRITE_TIMEOUT_MS: u64 = 5000;
const TCP_READ_TIMEOUT_MS: u64 = 10_000;

/// Best-effort gossip between nodes: every commit is broadcast as a full
/// chain snapshot, and receivers adopt strictly longer valid chains.
/// Failures are isolated per peer and never affect local state.
pub struct P2pNetwork {
    chain: Arc<ChainStore>,
    peers: Arc<Peers>,
    addr: String,
    bound_addr: RwLock<Option<SocketAddr>>,
    shutdown: Arc<AtomicBool>,
}

impl P2pNetwork {
    pub fn new(addr: String, chain: Arc<ChainStore>) -> P2pNetwork {
        P2pNetwork {
            chain,
            peers: Arc::new(Peers::new()),
            addr,
            bound_addr: RwLock::new(None),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn get_addr(&self) -> &str {
        self.addr.as_str()
    }

    pub fn get_peers(&self) -> Arc<Peers> {
        Arc::clone(&self.peers)
    }

    /// Bind the listening socket and spawn the accept loop. Failure to
    /// bind is the caller's problem to report; everything past the bind
    /// is logged and isolated.
    ///
    /// Returns the bound address (useful when binding port 0).
    pub fn start_server(&self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(&self.addr).map_err(|e| {
            LedgerError::Network(format!("Failed to bind to {}: {e}", self.addr))
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| LedgerError::Network(format!("Failed to read bound address: {e}")))?;

        info!("P2P server listening on {local_addr}");
        *self
            .bound_addr
            .write()
            .expect("Failed to acquire write lock on bound address - this should never happen") =
            Some(local_addr);

        let chain = Arc::clone(&self.chain);
        let shutdown = Arc::clone(&self.shutdown);
        thread::spawn(move || Self::accept_loop(listener, chain, shutdown));

        Ok(local_addr)
    }

    fn accept_loop(listener: TcpListener, chain: Arc<ChainStore>, shutdown: Arc<AtomicBool>) {
        for stream in listener.incoming() {
            if shutdown.load(Ordering::SeqCst) {
                info!("P2P server shutting down");
                break;
            }

            match stream {
                Ok(stream) => {
                    let peer_addr = match stream.peer_addr() {
                        Ok(addr) => addr,
                        Err(e) => {
                            error!("Failed to get peer address: {e}");
                            continue;
                        }
                    };

                    let chain = Arc::clone(&chain);
                    thread::spawn(move || {
                        if let Err(e) = Self::handle_connection(&chain, stream, peer_addr) {
                            error!("Error handling connection from {peer_addr}: {e}");
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {e}");
                }
            }
        }
    }

    /// Read the single frame this connection is allowed to carry and
    /// apply it. Malformed frames are dropped without touching local
    /// state; the error is surfaced to the accept loop for logging.
    fn handle_connection(
        chain: &ChainStore,
        stream: TcpStream,
        peer_addr: SocketAddr,
    ) -> Result<()> {
        stream
            .set_read_timeout(Some(Duration::from_millis(TCP_READ_TIMEOUT_MS)))
            .map_err(|e| LedgerError::Network(format!("Failed to set read timeout: {e}")))?;

        let mut reader = BufReader::new(&stream);
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| LedgerError::Network(format!("Failed to read frame: {e}")))?;

        info!("Received frame from {peer_addr}");
        let result = process_frame(chain, line.trim_end());

        let _ = stream.shutdown(Shutdown::Both);
        result
    }

    /// Open an outbound connection, remember the peer, and greet it with
    /// our chain so a fresh node can catch up immediately.
    pub fn connect_to_peer(&self, addr: &str) -> Result<()> {
        let socket_addr = addr
            .parse::<SocketAddr>()
            .map_err(|e| LedgerError::Network(format!("Invalid address {addr}: {e}")))?;

        let frame = encode_chain_update(&self.chain.all())?;
        let mut stream =
            TcpStream::connect_timeout(&socket_addr, Duration::from_millis(TCP_DIAL_TIMEOUT_MS))
                .map_err(|e| LedgerError::Network(format!("Failed to connect to {addr}: {e}")))?;

        self.peers.add_peer(addr.to_string());
        info!("Connected to peer: {addr}");

        stream
            .set_write_timeout(Some(Duration::from_millis(TCP_WRITE_TIMEOUT_MS)))
            .map_err(|e| LedgerError::Network(format!("Failed to set write timeout: {e}")))?;
        stream
            .write_all(frame.as_bytes())
            .map_err(|e| LedgerError::Network(format!("Failed to greet {addr}: {e}")))?;
        let _ = stream.flush();

        Ok(())
    }

    /// Serialize the chain once and deliver it to every known peer, each
    /// on its own time-bounded attempt so one slow peer cannot stall the
    /// rest. Per-peer failures are logged, not retried.
    pub fn broadcast(&self) {
        let frame = match encode_chain_update(&self.chain.all()) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to encode chain update: {e}");
                return;
            }
        };

        for peer in self.peers.get_peers() {
            let frame = frame.clone();
            thread::spawn(move || {
                let addr = peer.get_addr();
                if let Err(e) = send_frame(&addr, &frame) {
                    error!("Failed to send chain update to {addr}: {e}");
                } else {
                    info!("Sent chain update to {addr}");
                }
            });
        }
    }

    /// Stop the accept loop. In-flight handlers finish under their read
    /// timeouts; nothing is killed.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Wake the blocked accept so the loop observes the flag.
        let bound = *self
            .bound_addr
            .read()
            .expect("Failed to acquire read lock on bound address - this should never happen");
        if let Some(addr) = bound {
            let _ = TcpStream::connect_timeout(&addr, Duration::from_millis(TCP_DIAL_TIMEOUT_MS));
        }
    }
}

/// Apply one received frame to the local chain. Only `CHAIN_UPDATE` is
/// defined; unknown tags are ignored.
pub fn process_frame(chain: &ChainStore, frame: &str) -> Result<()> {
    let (tag, payload) = frame.split_once(' ').ok_or_else(|| {
        LedgerError::Serialization("Frame is missing a message tag".to_string())
    })?;

    match tag {
        CHAIN_UPDATE => {
            let blocks: Vec<Block> = serde_json::from_str(payload)?;
            if chain.replace_if_longer(blocks)? {
                info!("Synchronized chain from peer");
            }
            Ok(())
        }
        other => {
            warn!("Ignoring unknown message tag: {other}");
            Ok(())
        }
    }
}

/// Render the one defined message: tag, space, JSON block list, newline.
pub fn encode_chain_update(blocks: &[Block]) -> Result<String> {
    Ok(format!(
        "{CHAIN_UPDATE} {}\n",
        serde_json::to_string(blocks)?
    ))
}

fn send_frame(addr: &str, frame: &str) -> Result<()> {
    let socket_addr = addr
        .parse::<SocketAddr>()
        .map_err(|e| LedgerError::Network(format!("Invalid address {addr}: {e}")))?;

    let mut stream =
        TcpStream::connect_timeout(&socket_addr, Duration::from_millis(TCP_DIAL_TIMEOUT_MS))
            .map_err(|e| LedgerError::Network(format!("Failed to connect to {addr}: {e}")))?;

    stream
        .set_write_timeout(Some(Duration::from_millis(TCP_WRITE_TIMEOUT_MS)))
        .map_err(|e| LedgerError::Network(format!("Failed to set write timeout: {e}")))?;
    stream
        .write_all(frame.as_bytes())
        .map_err(|e| LedgerError::Network(format!("Failed to write frame: {e}")))?;
    let _ = stream.flush();

    Ok(())
}
