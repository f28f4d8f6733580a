//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use crossbeam_channel::{unbounded, Receiver, Sender};
use ofwd_agent::{DeliveryClient, DeliveryPayload};
use ofwd_packet::{FrameBuilder, InboundPacket, PacketContext};
use ofwd_topology::{HostStore, TopologyStore};
use ofwd_types::{ether_types, DeviceId, HostLocation, Link, MacAddress};
use parking_lot::Mutex;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::Level;

/// Delivery double that records every payload it is handed.
#[derive(Default)]
pub struct RecordingDelivery {
    payloads: Mutex<Vec<DeliveryPayload>>,
}

impl RecordingDelivery {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn payloads(&self) -> Vec<DeliveryPayload> {
        self.payloads.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.payloads.lock().len()
    }
}

impl DeliveryClient for RecordingDelivery {
    fn deliver(&self, payload: &DeliveryPayload) {
        self.payloads.lock().push(payload.clone());
    }
}

pub fn mac(last: u8) -> MacAddress {
    MacAddress::new([0, 0, 0, 0, 0, last])
}

pub fn device(id: &str) -> DeviceId {
    DeviceId::new(id).unwrap()
}

/// Three switches in a line, D1 -> D2 -> D3, with host ...:03 behind D3.
pub fn three_switches() -> (Arc<HostStore>, Arc<TopologyStore>) {
    let topology = Arc::new(TopologyStore::new());
    for id in ["D1", "D2", "D3"] {
        topology.add_device(device(id));
    }
    topology.add_link(Link::new("D1/2".parse().unwrap(), "D2/1".parse().unwrap()));
    topology.add_link(Link::new("D2/2".parse().unwrap(), "D3/1".parse().unwrap()));

    let hosts = Arc::new(HostStore::new());
    hosts.add_host(
        "00:00:00:00:00:03/None".parse().unwrap(),
        HostLocation::new("D3/3".parse().unwrap()),
    );
    (hosts, topology)
}

pub fn ipv4_from_d1(dst: u8) -> InboundPacket {
    let frame = FrameBuilder::new(mac(1), mac(dst))
        .ether_type(ether_types::IPV4)
        .build();
    InboundPacket::new("D1/1".parse().unwrap(), frame)
}

pub fn context(packet: InboundPacket) -> PacketContext {
    PacketContext::new(packet)
}

/// A request as seen by [`FakeEndpoint`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    /// Header names lowercased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Status(u16),
    /// Read the request, then never answer.
    Stall,
}

/// Minimal HTTP/1.1 server on 127.0.0.1 running on its own tokio runtime.
///
/// The runtime lives on a background thread so blocking clients can be
/// used from the test thread.
pub struct FakeEndpoint {
    addr: SocketAddr,
    requests: Receiver<CapturedRequest>,
}

impl FakeEndpoint {
    pub fn start(reply: Reply) -> Self {
        let (addr_tx, addr_rx) = unbounded();
        let (req_tx, req_rx) = unbounded();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
                addr_tx.send(listener.local_addr().unwrap()).unwrap();
                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        break;
                    };
                    tokio::spawn(serve(stream, reply, req_tx.clone()));
                }
            });
        });

        let addr = addr_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        Self {
            addr,
            requests: req_rx,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/topology", self.addr)
    }

    pub fn next_request(&self, timeout: Duration) -> Option<CapturedRequest> {
        self.requests.recv_timeout(timeout).ok()
    }

    pub fn pending(&self) -> usize {
        self.requests.len()
    }
}

async fn serve(mut stream: TcpStream, reply: Reply, requests: Sender<CapturedRequest>) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    let _ = requests.send(request);

    match reply {
        Reply::Status(code) => {
            let response =
                format!("HTTP/1.1 {code} Test\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
        Reply::Stall => {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }
    let end = buffer.len().min(header_end + length);
    let body = String::from_utf8_lossy(&buffer[header_end..end]).into_owned();

    Some(CapturedRequest {
        method,
        path,
        headers,
        body,
    })
}

/// An address nothing listens on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/")
}

/// In-memory log sink for asserting on emitted events.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Runs `f` with a debug-level subscriber writing into this sink.
    /// Only events on the calling thread are captured.
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Lines containing `needle`.
    pub fn lines_with(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
