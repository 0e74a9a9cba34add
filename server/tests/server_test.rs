use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use natpoker_srv::server::{Server, ServerConfig};
use natpoker_stun::constants::*;
use natpoker_stun::header::Header;
use natpoker_stun::packet::Packet;
use natpoker_stun::util;

const WAIT: Duration = Duration::from_secs(2);

struct TestServer {
    udp_addr: SocketAddr,
    tcp_addr: SocketAddr,
    signal_tx: watch::Sender<u8>,
    handle: JoinHandle<std::io::Result<()>>,
}

async fn start_server() -> TestServer {
    let config = ServerConfig {
        ips: vec![IpAddr::V4(Ipv4Addr::LOCALHOST)],
        port: 0,
        udp: true,
        tcp: true,
    };
    let (signal_tx, signal_rx) = watch::channel(0_u8);
    let server = Server::bind(&config, signal_rx).await.unwrap();

    let udp_addr = server.udp_addrs().unwrap()[0];
    let tcp_addr = server.tcp_addrs().unwrap()[0];
    let handle = tokio::spawn(server.run());

    TestServer {
        udp_addr,
        tcp_addr,
        signal_tx,
        handle,
    }
}

fn new_request(trans_id: [u8; 12]) -> Vec<u8> {
    Header::new(MESSAGE_TYPE_BIND_REQ, 0, trans_id).pack().to_vec()
}

async fn read_response(stream: &mut TcpStream) -> Packet {
    let mut header = [0u8; HEADER_LEN];
    timeout(WAIT, stream.read_exact(&mut header))
        .await
        .unwrap()
        .unwrap();
    let frame_len = Header::unpack(&header).unwrap().frame_len();

    let mut buf = header.to_vec();
    buf.resize(frame_len, 0);
    timeout(WAIT, stream.read_exact(&mut buf[HEADER_LEN..]))
        .await
        .unwrap()
        .unwrap();
    Packet::unpack(&buf).unwrap()
}

#[tokio::test]
async fn test_udp_binding() {
    let server = start_server().await;
    let sock = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let trans_id = util::new_trans_id();

    sock.send_to(&new_request(trans_id), server.udp_addr).await.unwrap();

    let mut buf = vec![0u8; BUFFER_SIZE];
    let (len, from) = timeout(WAIT, sock.recv_from(&mut buf)).await.unwrap().unwrap();
    assert_eq!(from, server.udp_addr);

    let res = Packet::unpack(&buf[..len]).unwrap();
    assert_eq!(res.header.msg_type, MESSAGE_TYPE_BIND_RES);
    assert_eq!(res.header.trans_id, trans_id);
    assert_eq!(res.xor_mapped_address().unwrap(), sock.local_addr().unwrap());
    assert_eq!(res.mapped_address().unwrap(), sock.local_addr().unwrap());

    server.signal_tx.send(1).unwrap();
    assert!(server.handle.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_udp_bad_cookie_no_reply() {
    let server = start_server().await;
    let sock = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    let mut req = new_request(util::new_trans_id());
    req[4..8].copy_from_slice(&[1, 2, 3, 4]);
    sock.send_to(&req, server.udp_addr).await.unwrap();

    let mut buf = vec![0u8; BUFFER_SIZE];
    let res = timeout(Duration::from_millis(300), sock.recv_from(&mut buf)).await;
    assert!(res.is_err());

    // still serving afterwards
    sock.send_to(&new_request(util::new_trans_id()), server.udp_addr)
        .await
        .unwrap();
    assert!(timeout(WAIT, sock.recv_from(&mut buf)).await.is_ok());

    server.signal_tx.send(1).unwrap();
}

#[tokio::test]
async fn test_tcp_back_to_back() {
    let server = start_server().await;
    let mut stream = TcpStream::connect(server.tcp_addr).await.unwrap();
    let first = util::new_trans_id();
    let second = util::new_trans_id();

    stream.write_all(&new_request(first)).await.unwrap();
    stream.write_all(&new_request(second)).await.unwrap();

    let res = read_response(&mut stream).await;
    assert_eq!(res.header.trans_id, first);
    assert_eq!(
        res.xor_mapped_address().unwrap(),
        stream.local_addr().unwrap()
    );

    let res = read_response(&mut stream).await;
    assert_eq!(res.header.trans_id, second);

    server.signal_tx.send(1).unwrap();
}

#[tokio::test]
async fn test_tcp_split_write() {
    let server = start_server().await;
    let mut stream = TcpStream::connect(server.tcp_addr).await.unwrap();
    stream.set_nodelay(true).unwrap();
    let trans_id = util::new_trans_id();
    let req = new_request(trans_id);

    stream.write_all(&req[..10]).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut probe = [0u8; 1];
    let early = timeout(Duration::from_millis(200), stream.peek(&mut probe)).await;
    assert!(early.is_err());

    stream.write_all(&req[10..]).await.unwrap();
    let res = read_response(&mut stream).await;
    assert_eq!(res.header.trans_id, trans_id);

    server.signal_tx.send(1).unwrap();
}

#[tokio::test]
async fn test_tcp_bad_type_closes() {
    let server = start_server().await;
    let mut stream = TcpStream::connect(server.tcp_addr).await.unwrap();

    let req = Header::new(MESSAGE_TYPE_BIND_RES, 0, util::new_trans_id()).pack();
    stream.write_all(&req).await.unwrap();

    let mut buf = [0u8; 64];
    let n = timeout(WAIT, stream.read(&mut buf)).await.unwrap().unwrap_or(0);
    assert_eq!(n, 0);

    server.signal_tx.send(1).unwrap();
}
