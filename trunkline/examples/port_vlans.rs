//! Port VLAN membership example
//!
//! Connects to a Dell PowerConnect 55xx switch over telnet and prints the
//! VLAN trunk membership of one or more ports, in the order the switch
//! reports it.
//!
//! # Prerequisites
//!
//! - PowerConnect 55xx switch with its telnet console enabled
//! - Valid credentials for the switch CLI
//!
//! # Usage
//!
//! ```bash
//! cargo run --example port_vlans -- --host switch1 --user admin --password secret g1 g2
//! ```

use std::env;
use std::time::Duration;

use trunkline::{ConsoleConfig, PowerConnect55xx, SwitchCredentials, SwitchDriver, SwitchSession};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.password.is_empty() {
        eprintln!("Error: must provide --password");
        std::process::exit(1);
    }
    if args.ports.is_empty() {
        eprintln!("Error: name at least one port, e.g. g1");
        std::process::exit(1);
    }

    println!("Connecting to {}:{}...", args.host, args.port);

    let credentials = SwitchCredentials::new(&args.host, &args.user, &args.password)?;
    let config = ConsoleConfig {
        port: args.port,
        connect_timeout: Duration::from_secs(args.timeout),
        read_timeout: Duration::from_secs(args.timeout),
    };

    let mut session = PowerConnect55xx::with_config(credentials, config)
        .connect()
        .await?;
    println!("Logged in!\n");

    let ports: Vec<&str> = args.ports.iter().map(String::as_str).collect();
    let networks = session.get_port_networks(&ports).await?;

    for (port, rows) in &networks {
        println!("{port}:");
        if rows.is_empty() {
            println!("    (no VLANs trunked)");
        }
        for row in rows {
            println!("    {:<14} VLAN {}", row.name, row.vlan);
        }
        println!();
    }

    println!("Logging out...");
    session.disconnect().await?;
    println!("Done!");

    Ok(())
}

/// Simple argument parser
struct Args {
    host: String,
    port: u16,
    user: String,
    password: String,
    timeout: u64,
    ports: Vec<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut host = "localhost".to_string();
        let mut port = 23u16;
        let mut user = "admin".to_string();
        let mut password = String::new();
        let mut timeout = 30u64;
        let mut ports = Vec::new();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    i += 1;
                    if i < args.len() {
                        host = args[i].clone();
                    }
                }
                "--port" | "-p" => {
                    i += 1;
                    if i < args.len() {
                        port = args[i].parse().unwrap_or(23);
                    }
                }
                "--user" | "-u" => {
                    i += 1;
                    if i < args.len() {
                        user = args[i].clone();
                    }
                }
                "--password" | "-P" => {
                    i += 1;
                    if i < args.len() {
                        password = args[i].clone();
                    }
                }
                "--timeout" | "-t" => {
                    i += 1;
                    if i < args.len() {
                        timeout = args[i].parse().unwrap_or(30);
                    }
                }
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                other => ports.push(other.to_string()),
            }
            i += 1;
        }

        Self {
            host,
            port,
            user,
            password,
            timeout,
            ports,
        }
    }

    fn print_help() {
        println!(
            r#"trunkline port VLAN membership example

Prints the VLAN trunk membership of one or more switch ports.

USAGE:
    cargo run --example port_vlans -- [OPTIONS] <PORT>...

OPTIONS:
    -h, --host <HOST>        Switch hostname or address [default: localhost]
    -p, --port <PORT>        Telnet port [default: 23]
    -u, --user <USER>        Username [default: admin]
    -P, --password <PASS>    Password for the switch CLI
    -t, --timeout <SECS>     Connect and read timeout [default: 30]
    --help                   Print this help message

EXAMPLES:
    # One port
    cargo run --example port_vlans -- --host switch1 --user admin --password secret g1

    # Several ports, reported in the order given
    cargo run --example port_vlans -- --host switch1 --user admin --password secret g1 g2 g24

    # Debug logging
    RUST_LOG=debug cargo run --example port_vlans -- --host switch1 --user admin --password secret g1
"#
        );
    }
}
