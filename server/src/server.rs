/*
one udp socket and/or one tcp listener per configured ip, all on the same port
udp: one task per socket, each datagram answered in place
tcp: one accept task per listener, one task per connection owning its buffer
a udp receive error stops everything, any other error only drops the packet or connection
*/

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use log::{debug, error, info};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::mpsc::{self, Sender};
use tokio::sync::watch::{self, Receiver as WatchReceiver};
use tokio::task::JoinHandle;

use natpoker_stun::constants::{BUFFER_SIZE, DEFAULT_PORT};
use natpoker_stun::util::print_bytes;

use crate::session::{TcpConnection, UdpSession};

const LISTEN_BACKLOG: i32 = 128;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub ips: Vec<IpAddr>,
    pub port: u16,
    pub udp: bool,
    pub tcp: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ips: vec![
                IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            ],
            port: DEFAULT_PORT,
            udp: true,
            tcp: true,
        }
    }
}

pub struct Server {
    signal_rx: WatchReceiver<u8>,
    udp_sockets: Vec<Arc<UdpSocket>>,
    tcp_listeners: Vec<TcpListener>,
}

impl Server {
    pub async fn bind(config: &ServerConfig, signal_rx: WatchReceiver<u8>) -> io::Result<Self> {
        let mut udp_sockets = vec![];
        let mut tcp_listeners = vec![];

        for ip in config.ips.iter() {
            let addr = SocketAddr::new(*ip, config.port);

            if config.udp {
                let socket = bind_udp(addr)?;
                info!("listening udp: {:?}", socket.local_addr());
                udp_sockets.push(Arc::new(socket));
            }
            if config.tcp {
                let listener = bind_tcp(addr)?;
                info!("listening tcp: {:?}", listener.local_addr());
                tcp_listeners.push(listener);
            }
        }

        Ok(Self {
            signal_rx,
            udp_sockets,
            tcp_listeners,
        })
    }

    pub fn udp_addrs(&self) -> io::Result<Vec<SocketAddr>> {
        self.udp_sockets.iter().map(|v| v.local_addr()).collect()
    }

    pub fn tcp_addrs(&self) -> io::Result<Vec<SocketAddr>> {
        self.tcp_listeners.iter().map(|v| v.local_addr()).collect()
    }

    /// Serves until the shutdown signal fires (Ok) or a udp socket fails (Err).
    pub async fn run(mut self) -> io::Result<()> {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (fatal_tx, mut fatal_rx) = mpsc::channel::<io::Error>(1);

        let mut handles: Vec<JoinHandle<()>> = vec![];

        for socket in self.udp_sockets {
            let stop_rx = stop_rx.clone();
            let fatal_tx = fatal_tx.clone();
            handles.push(tokio::spawn(async move {
                serve_udp(socket, stop_rx, fatal_tx).await;
            }));
        }

        for listener in self.tcp_listeners {
            let stop_rx = stop_rx.clone();
            handles.push(tokio::spawn(async move {
                serve_tcp(listener, stop_rx).await;
            }));
        }

        drop(fatal_tx);

        let result = tokio::select! {
            _ = self.signal_rx.changed() => {
                debug!("recv signal, server will exit.");
                Ok(())
            },
            Some(e) = fatal_rx.recv() => {
                error!("fatal udp error, server will exit, {}", e);
                Err(e)
            }
        };

        let _ = stop_tx.send(true);
        for v in handles {
            let _ = v.await;
        }

        result
    }
}

//--------------------------------------------------

fn new_socket(addr: SocketAddr, ty: Type, protocol: Protocol) -> io::Result<Socket> {
    let socket = Socket::new(Domain::for_address(addr), ty, Some(protocol))?;
    // ipv4 and ipv6 get separate sockets on the same port
    if addr.is_ipv6() {
        socket.set_only_v6(true)?;
    }
    socket.set_nonblocking(true)?;
    Ok(socket)
}

fn bind_udp(addr: SocketAddr) -> io::Result<UdpSocket> {
    let socket = new_socket(addr, Type::DGRAM, Protocol::UDP)?;
    socket.bind(&addr.into())?;
    UdpSocket::from_std(socket.into())
}

fn bind_tcp(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = new_socket(addr, Type::STREAM, Protocol::TCP)?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;
    TcpListener::from_std(socket.into())
}

async fn serve_udp(
    socket: Arc<UdpSocket>,
    mut stop_rx: WatchReceiver<bool>,
    fatal_tx: Sender<io::Error>,
) {
    let local_addr = socket.local_addr();
    let mut buf = vec![0u8; BUFFER_SIZE];

    loop {
        tokio::select! {
            res = socket.recv_from(&mut buf) => {
                let (len, remote_addr) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        // the only udp socket for this family, nothing to fall back to
                        error!("error on recv_from, {:?}, {}", local_addr, e);
                        let _ = fatal_tx.try_send(e);
                        break;
                    }
                };

                let response = match UdpSession::on_datagram(&buf[..len], remote_addr) {
                    Some(v) => v,
                    None => continue,
                };

                match socket.send_to(&response, remote_addr).await {
                    Ok(v) => {
                        debug!(
                            "{:?} ---> {}\n{}",
                            local_addr,
                            remote_addr,
                            print_bytes(&response, " ", 8)
                        );
                        debug!("sent: {}", v);
                    }
                    Err(e) => {
                        error!("error sending, {:?} ---> {}, {}", local_addr, remote_addr, e);
                    }
                };
            },
            _ = stop_rx.changed() => {
                debug!("recv stop, serve_udp, {:?} will exit.", local_addr);
                break;
            }
        }
    }
}

async fn serve_tcp(listener: TcpListener, mut stop_rx: WatchReceiver<bool>) {
    let local_addr = listener.local_addr();

    loop {
        tokio::select! {
            res = listener.accept() => {
                let (stream, remote_addr) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("error on accept, {:?}, {}", local_addr, e);
                        continue;
                    }
                };

                debug!("accepted tcp connection from {}", remote_addr);
                let stop_rx = stop_rx.clone();
                tokio::spawn(async move {
                    serve_conn(stream, remote_addr, stop_rx).await;
                });
            },
            _ = stop_rx.changed() => {
                debug!("recv stop, serve_tcp, {:?} will exit.", local_addr);
                break;
            }
        }
    }
}

// the stream and the connection buffer are dropped together when this returns
async fn serve_conn(
    mut stream: TcpStream,
    remote_addr: SocketAddr,
    mut stop_rx: WatchReceiver<bool>,
) {
    let mut conn = TcpConnection::new(remote_addr);
    let mut buf = vec![0u8; BUFFER_SIZE];

    loop {
        let len = tokio::select! {
            res = stream.read(&mut buf) => match res {
                Ok(0) => {
                    debug!("tcp connection {} closed by peer", remote_addr);
                    break;
                }
                Ok(v) => v,
                Err(e) => {
                    error!("error on recv, {}, {}", remote_addr, e);
                    break;
                }
            },
            _ = stop_rx.changed() => {
                break;
            }
        };

        let feed = conn.feed(&buf[..len]);

        for response in feed.replies.iter() {
            if let Err(e) = stream.write_all(response).await {
                error!("error sending, ---> {}, {}", remote_addr, e);
                return;
            }
            debug!("---> {} (tcp)\n{}", remote_addr, print_bytes(response, " ", 8));
        }

        if feed.close.is_some() {
            break;
        }
    }

    let _ = stream.shutdown().await;
}
