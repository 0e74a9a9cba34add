//! Per-transport request handling, free of any socket or runtime types.
//!
//! UDP is stateless: one datagram in, at most one datagram out.
//! TCP keeps a per-connection buffer and recovers message boundaries from
//! the byte stream using the length field of each STUN header.

use bytes::{Bytes, BytesMut};
use log::{debug, error, info};
use std::net::SocketAddr;

use natpoker_stun::constants::{BUFFER_SIZE, HEADER_LEN};
use natpoker_stun::error::ValidateErr;
use natpoker_stun::header::Header;
use natpoker_stun::util::print_bytes;

use crate::stun::{handle_request, validate_req};

pub struct UdpSession;

impl UdpSession {
    /// Returns the reply for one datagram, or None when it is dropped.
    pub fn on_datagram(buf: &[u8], remote_addr: SocketAddr) -> Option<Bytes> {
        debug!("<--- {}\n{}", remote_addr, print_bytes(buf, " ", 8));

        match handle_request(buf, remote_addr) {
            Ok(v) => {
                info!("Received STUN binding request from {}", remote_addr);
                Some(v)
            }
            Err(e) => {
                error!("drop datagram from {}, {}", remote_addr, e);
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Accumulating,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    BadHeader(ValidateErr),
    // declared frame can never fit the connection buffer
    Oversized(usize),
}

/// Outcome of one `feed` call: replies to write in order, then an optional
/// close. Replies produced before a bad frame are still sent.
#[derive(Debug, Default)]
pub struct Feed {
    pub replies: Vec<Bytes>,
    pub close: Option<CloseReason>,
}

pub struct TcpConnection {
    remote_addr: SocketAddr,
    buf: BytesMut,
    state: ConnState,
}

impl TcpConnection {
    pub fn new(remote_addr: SocketAddr) -> Self {
        Self {
            remote_addr,
            buf: BytesMut::with_capacity(BUFFER_SIZE),
            state: ConnState::Accumulating,
        }
    }

    pub fn state(&self) -> ConnState {
        self.state
    }

    // bytes received but not yet part of a complete message
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    pub fn feed(&mut self, data: &[u8]) -> Feed {
        let mut feed = Feed::default();
        if self.state == ConnState::Closed {
            return feed;
        }

        self.buf.extend_from_slice(data);

        loop {
            // not enough for a header yet
            let header = match Header::unpack(&self.buf) {
                Ok(v) => v,
                Err(_) => break,
            };

            if let Some(e) = validate_req(&header) {
                self.close(CloseReason::BadHeader(e), &mut feed);
                break;
            }

            let frame_len = header.frame_len();
            if frame_len > BUFFER_SIZE {
                self.close(CloseReason::Oversized(frame_len), &mut feed);
                break;
            }

            if self.buf.len() < frame_len {
                break;
            }

            let frame = self.buf.split_to(frame_len);
            debug!(
                "<--- {} (tcp)\n{}",
                self.remote_addr,
                print_bytes(&frame[..HEADER_LEN], " ", 8)
            );

            match handle_request(&frame, self.remote_addr) {
                Ok(v) => {
                    info!(
                        "Received STUN binding request from {} (tcp)",
                        self.remote_addr
                    );
                    feed.replies.push(v);
                }
                Err(e) => {
                    // header already checked above
                    error!("tcp request from {}, {}", self.remote_addr, e);
                }
            }
        }

        feed
    }

    fn close(&mut self, reason: CloseReason, feed: &mut Feed) {
        error!("closing tcp connection {}, {:?}", self.remote_addr, reason);
        self.state = ConnState::Closed;
        self.buf = BytesMut::new();
        feed.close = Some(reason);
    }
}
