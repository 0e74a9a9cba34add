use std::net::{IpAddr, Ipv4Addr};

use tokio::sync::watch;

use natpoker_probe::client::{probe_tcp, probe_udp};
use natpoker_srv::server::{Server, ServerConfig};

#[tokio::test]
async fn test_probe_udp_and_tcp() {
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

    let res = probe_udp(udp_addr).await.unwrap();
    assert_eq!(res.mapped_address, res.xor_mapped_address);
    assert_eq!(res.mapped_address.ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert_eq!(
        res.software.as_deref(),
        Some("NatPoker 0.1, https://github.com/sdstrowes/natpoker-srv")
    );

    let res = probe_tcp(tcp_addr).await.unwrap();
    assert_eq!(res.mapped_address, res.xor_mapped_address);
    assert_eq!(res.mapped_address.ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));

    signal_tx.send(1).unwrap();
    assert!(handle.await.unwrap().is_ok());
}
