use log::debug;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;

use natpoker_stun::constants::{BUFFER_SIZE, HEADER_LEN, MESSAGE_TYPE_BIND_REQ, MESSAGE_TYPE_BIND_RES};
use natpoker_stun::error::{Error, ParsePacketErr, ValidateErr};
use natpoker_stun::header::{Header, TransId};
use natpoker_stun::packet::Packet;
use natpoker_stun::util::{new_trans_id, print_bytes};

const RECV_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug)]
pub struct ProbeError(pub String);

impl From<io::Error> for ProbeError {
    fn from(e: io::Error) -> Self {
        ProbeError(format!("{}", e))
    }
}

impl From<ParsePacketErr> for ProbeError {
    fn from(e: ParsePacketErr) -> Self {
        ProbeError(format!("{:?}", e))
    }
}

impl From<ValidateErr> for ProbeError {
    fn from(e: ValidateErr) -> Self {
        ProbeError(e.0)
    }
}

impl From<Error> for ProbeError {
    fn from(e: Error) -> Self {
        ProbeError(format!("{}", e))
    }
}

impl From<tokio::time::error::Elapsed> for ProbeError {
    fn from(_e: tokio::time::error::Elapsed) -> Self {
        ProbeError("no response".to_string())
    }
}

//--------------------------------------
#[derive(Debug)]
pub struct ProbeResult {
    pub mapped_address: SocketAddr,
    pub xor_mapped_address: SocketAddr,
    pub software: Option<String>,
}

fn new_request(trans_id: TransId) -> Packet {
    let header = Header::new(MESSAGE_TYPE_BIND_REQ, 0, trans_id);
    Packet::new(header, vec![])
}

pub async fn probe_udp(server: SocketAddr) -> Result<ProbeResult, ProbeError> {
    let local = match server {
        SocketAddr::V4(_) => "0.0.0.0:0",
        SocketAddr::V6(_) => "[::]:0",
    };
    let sock = UdpSocket::bind(local).await?;

    let trans_id = new_trans_id();
    let buf = new_request(trans_id).pack();
    debug!("{:?} --> {}\n{}", sock.local_addr(), server, print_bytes(&buf, " ", 8));
    sock.send_to(&buf, server).await?;

    let mut recv_buf = vec![0u8; BUFFER_SIZE];
    let (len, remote_addr) = timeout(RECV_TIMEOUT, sock.recv_from(&mut recv_buf)).await??;
    debug!(
        "{:?} <-- {}\n{}",
        sock.local_addr(),
        remote_addr,
        print_bytes(&recv_buf[..len], " ", 8)
    );

    read_result(&recv_buf[..len], &trans_id)
}

pub async fn probe_tcp(server: SocketAddr) -> Result<ProbeResult, ProbeError> {
    let mut stream = timeout(RECV_TIMEOUT, TcpStream::connect(server)).await??;

    let trans_id = new_trans_id();
    let buf = new_request(trans_id).pack();
    debug!("{:?} --> {} (tcp)\n{}", stream.local_addr(), server, print_bytes(&buf, " ", 8));
    stream.write_all(&buf).await?;

    let mut recv_buf = vec![0u8; HEADER_LEN];
    timeout(RECV_TIMEOUT, stream.read_exact(&mut recv_buf)).await??;
    let frame_len = Header::unpack(&recv_buf)?.frame_len();
    if frame_len > BUFFER_SIZE {
        return Err(ProbeError(format!("response too large: {}", frame_len)));
    }

    recv_buf.resize(frame_len, 0);
    timeout(RECV_TIMEOUT, stream.read_exact(&mut recv_buf[HEADER_LEN..])).await??;
    debug!("<-- {} (tcp)\n{}", server, print_bytes(&recv_buf, " ", 8));

    read_result(&recv_buf, &trans_id)
}

fn read_result(buf: &[u8], trans_id: &TransId) -> Result<ProbeResult, ProbeError> {
    let response = Packet::unpack(buf)?;
    if let Some(e) = response.header.validate(MESSAGE_TYPE_BIND_RES) {
        return Err(e.into());
    }
    if &response.header.trans_id != trans_id {
        return Err(ProbeError("transaction id mismatch".to_string()));
    }

    Ok(ProbeResult {
        mapped_address: response.mapped_address()?,
        xor_mapped_address: response.xor_mapped_address()?,
        software: response.software().ok(),
    })
}
