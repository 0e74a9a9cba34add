// ./natpoker-srv --port 3478 --debug

use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::process;

use clap::{Arg, ArgMatches, Command};
use log::{error, info, LevelFilter};

use natpoker_srv::server::{Server, ServerConfig};
use natpoker_srv::signal::shutdown_channel;
use natpoker_stun::constants::DEFAULT_PORT;

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// [file: line] message, RUST_LOG still wins over --debug
fn init_logger(debug: bool) {
    let level = match debug {
        true => LevelFilter::Info,
        false => LevelFilter::Error,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            let file = record.file().unwrap_or("?");
            let file = file.rsplit('/').next().unwrap_or(file);
            writeln!(
                buf,
                "{} {:<5} {}[{}: {:04}] {}",
                buf.timestamp(),
                record.level(),
                APP_NAME,
                file,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

fn parse_config(app: &ArgMatches) -> Result<ServerConfig, String> {
    let port: u16 = *app.get_one("port").unwrap_or(&DEFAULT_PORT);

    let ipv4 = app.contains_id("ipv4");
    let ipv6 = app.contains_id("ipv6");
    let mut ips = vec![];
    if ipv4 || !ipv6 {
        ips.push(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }
    if ipv6 || !ipv4 {
        ips.push(IpAddr::V6(Ipv6Addr::UNSPECIFIED));
    }

    let udp = !app.contains_id("no-udp");
    let tcp = !app.contains_id("no-tcp");
    if !udp && !tcp {
        return Err("--no-udp and --no-tcp leave nothing to serve".to_string());
    }

    Ok(ServerConfig { ips, port, udp, tcp })
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let app = Command::new(APP_NAME)
        .version(APP_VERSION)
        .about("a stun binding server")
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .takes_value(true)
                .help("udp and tcp port")
                .default_value("3478")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(Arg::new("ipv4").long("ipv4").short('4').help("listen on ipv4"))
        .arg(Arg::new("ipv6").long("ipv6").short('6').help("listen on ipv6"))
        .arg(Arg::new("no-udp").long("no-udp").help("do not serve udp"))
        .arg(Arg::new("no-tcp").long("no-tcp").help("do not serve tcp"))
        .arg(
            Arg::new("debug")
                .long("debug")
                .short('d')
                .help("log requests, not only errors"),
        )
        .get_matches();

    init_logger(app.contains_id("debug"));

    let config = match parse_config(&app) {
        Ok(v) => v,
        Err(e) => {
            error!("error, {}", e);
            process::exit(2);
        }
    };

    let signal_rx = shutdown_channel();

    let server = match Server::bind(&config, signal_rx).await {
        Ok(v) => v,
        Err(e) => {
            error!("error, bind {:?}, {}", config, e);
            process::exit(1);
        }
    };

    info!("start server ...");

    if let Err(e) = server.run().await {
        error!("error, {}", e);
        process::exit(1);
    }

    info!("end.");
}
