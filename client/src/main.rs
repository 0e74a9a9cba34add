use std::net::{SocketAddr, ToSocketAddrs};
use std::process;

use clap::builder::ValueParser;
use clap::{Arg, Command};
use log::{error, info};

use natpoker_probe::client::{probe_tcp, probe_udp};
use natpoker_stun::constants::DEFAULT_PORT;

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// host or host:port, port defaults to 3478
fn parse_addr(s: &str) -> Result<SocketAddr, String> {
    if let Ok(v) = s.parse::<SocketAddr>() {
        return Ok(v);
    }

    let with_port = match s.parse::<std::net::IpAddr>() {
        Ok(ip) => return Ok(SocketAddr::new(ip, DEFAULT_PORT)),
        Err(_) if s.contains(':') => s.to_string(),
        Err(_) => format!("{}:{}", s, DEFAULT_PORT),
    };

    match with_port.to_socket_addrs() {
        Ok(mut v) => v.next().ok_or_else(|| format!("no address for {}", s)),
        Err(e) => Err(format!("{}", e)),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let app = Command::new(APP_NAME)
        .version(APP_VERSION)
        .about("a stun client printing the address a server sees")
        .arg(
            Arg::new("server")
                .long("server")
                .takes_value(true)
                .required(true)
                .help("server address, port 3478 if omitted")
                .value_parser(ValueParser::new(parse_addr)),
        )
        .arg(Arg::new("tcp").long("tcp").help("probe over tcp instead of udp"))
        .get_matches();

    let server: SocketAddr = match app.get_one::<SocketAddr>("server") {
        Some(v) => *v,
        None => process::exit(2),
    };

    let result = match app.contains_id("tcp") {
        true => probe_tcp(server).await,
        false => probe_udp(server).await,
    };

    match result {
        Ok(v) => {
            info!("probe {} done", server);
            println!("mapped_address: {}", v.mapped_address);
            println!("xor_mapped_address: {}", v.xor_mapped_address);
            if let Some(software) = v.software {
                println!("software: {}", software);
            }
        }
        Err(e) => {
            error!("error, probe {}, {:?}", server, e);
            process::exit(1);
        }
    }
}
