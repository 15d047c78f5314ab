//! Shared fixtures for the end-to-end scenarios.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dcrl_01_trust::NodeIdentity;
use dcrl_02_peer_protocol::codec;
use node_runtime::{NodeConfig, NodeRuntime, Role, RunningNode};
use parking_lot::Mutex;
use shared_types::{
    wire, Certificate, DcrlMessage, NetworkIdentity, RendezvousRequest, RendezvousResponse,
    ServerAddress,
};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// How long any scenario waits for the network to settle.
pub const SETTLE: Duration = Duration::from_secs(5);

/// Poll `check` until it holds, failing the test after [`SETTLE`].
pub async fn eventually<F: Fn() -> bool>(what: &str, check: F) {
    let deadline = Instant::now() + SETTLE;
    while !check() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Scratch directory with a trust store and key files.
pub struct Harness {
    dir: TempDir,
    trust: PathBuf,
}

impl Harness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let trust = dir.path().join("trust");
        std::fs::create_dir(&trust).unwrap();
        Self { dir, trust }
    }

    /// Add `cert` to the trust store directory.
    pub fn trust(&self, name: &str, cert: &Certificate) {
        std::fs::write(self.trust.join(name), wire::encode(cert).unwrap()).unwrap();
    }

    /// Write the key files of `identity` and return their base path.
    pub fn identity_files(&self, identity: &NodeIdentity) -> PathBuf {
        let base = self.dir.path().join(identity.subject());
        identity.save(&base).unwrap();
        base
    }

    pub fn config(&self, role: Role, identity: Option<&NodeIdentity>) -> NodeConfig {
        NodeConfig {
            role,
            listen_addr: "127.0.0.1:0".into(),
            trust_store: self.trust.clone(),
            identity: identity.map(|id| self.identity_files(id)),
            ..NodeConfig::default()
        }
    }
}

pub async fn start(config: NodeConfig) -> RunningNode {
    NodeRuntime::new(config).start().await.unwrap()
}

/// Address string other nodes use to reach `node`.
pub fn addr_of(node: &RunningNode) -> String {
    node.local_addr().to_string()
}

/// A framed TCP client that speaks the peer protocol by hand.
pub struct RawPeer {
    stream: TcpStream,
}

impl RawPeer {
    pub async fn connect(node: &RunningNode) -> Self {
        let stream = TcpStream::connect(node.local_addr()).await.unwrap();
        Self { stream }
    }

    /// The identity the node sees for this client.
    pub fn identity(&self) -> NetworkIdentity {
        NetworkIdentity::from(self.stream.local_addr().unwrap())
    }

    pub async fn send(&mut self, message: &DcrlMessage) {
        codec::write_message(&mut self.stream, message).await.unwrap();
    }

    pub async fn send_frame(&mut self, bytes: &[u8]) {
        codec::write_frame(&mut self.stream, bytes).await.unwrap();
    }

    /// Bytes with no framing at all.
    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).await.unwrap();
        self.stream.flush().await.unwrap();
    }

    /// Next message, `None` when the node closed the connection.
    pub async fn recv(&mut self) -> Option<DcrlMessage> {
        tokio::time::timeout(SETTLE, codec::read_message(&mut self.stream))
            .await
            .expect("reply within timeout")
            .unwrap()
    }
}

/// Minimal rendezvous service: registers on `Hello{Some(port)}` (listing
/// the registrant too), removes on `Goodbye`.
pub struct MiniRendezvous {
    addr: SocketAddr,
    servers: Arc<Mutex<Vec<ServerAddress>>>,
    task: JoinHandle<()>,
}

impl MiniRendezvous {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let servers = Arc::new(Mutex::new(Vec::new()));
        let task = tokio::spawn(serve(listener, Arc::clone(&servers)));
        Self {
            addr,
            servers,
            task,
        }
    }

    pub fn addr(&self) -> String {
        self.addr.to_string()
    }

    pub fn servers(&self) -> Vec<ServerAddress> {
        self.servers.lock().clone()
    }
}

impl Drop for MiniRendezvous {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(listener: TcpListener, servers: Arc<Mutex<Vec<ServerAddress>>>) {
    while let Ok((mut stream, remote)) = listener.accept().await {
        let ip_address = remote.ip().to_string();
        let request: Option<RendezvousRequest> =
            codec::read_message(&mut stream).await.ok().flatten();
        match request {
            Some(RendezvousRequest::Hello(hello)) => {
                if let Some(port) = hello.port {
                    let entry = ServerAddress {
                        ip_address,
                        port_number: port,
                    };
                    let mut list = servers.lock();
                    if !list.contains(&entry) {
                        list.push(entry);
                    }
                }
                let response = RendezvousResponse {
                    servers: servers.lock().clone(),
                };
                let _ = codec::write_message(&mut stream, &response).await;
            }
            Some(RendezvousRequest::Goodbye(goodbye)) => servers
                .lock()
                .retain(|s| !(s.ip_address == ip_address && s.port_number == goodbye.port)),
            None => {}
        }
    }
}
