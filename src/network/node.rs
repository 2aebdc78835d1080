use std::net::SocketAddr;
use std::sync::RwLock;

#[derive(Clone)]
pub struct Peer {
    addr: String,
}

impl Peer {
    fn new(addr: String) -> Peer {
        Peer { addr }
    }

    pub fn get_addr(&self) -> String {
        self.addr.clone()
    }

    pub fn parse_socket_addr(&self) -> Option<SocketAddr> {
        self.addr.parse().ok()
    }
}

/// Known peer addresses. Append-only and deduplicated; read by the
/// broadcast path while written by the connect path.
pub struct Peers {
    inner: RwLock<Vec<Peer>>,
}

impl Default for Peers {
    fn default() -> Self {
        Self::new()
    }
}

impl Peers {
    pub fn new() -> Peers {
        Peers {
            inner: RwLock::new(vec![]),
        }
    }

    pub fn add_peer(&self, addr: String) {
        let mut inner = self
            .inner
            .write()
            .expect("Failed to acquire write lock on peers - this should never happen");
        if !inner.iter().any(|x| x.get_addr().eq(addr.as_str())) {
            inner.push(Peer::new(addr));
        }
    }

    pub fn get_peers(&self) -> Vec<Peer> {
        self.inner
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen")
            .to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen")
            .is_empty()
    }

    pub fn peer_is_known(&self, addr: &str) -> bool {
        let inner = self
            .inner
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen");
        inner.iter().any(|x| x.get_addr().eq(addr))
    }
}
