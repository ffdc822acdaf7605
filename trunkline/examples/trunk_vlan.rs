//! Trunk VLAN management example
//!
//! Applies one VLAN trunk operation to a port on a Dell PowerConnect 55xx
//! switch, then reads the port's membership back so the effect is visible.
//!
//! The commands themselves are fire-and-forget; the read-back afterwards is
//! what confirms the switch accepted them.
//!
//! # Usage
//!
//! ```bash
//! # Add VLAN 10 to port g1's trunk
//! cargo run --example trunk_vlan -- --host switch1 --user admin --password secret add g1 10
//!
//! # Make VLAN 10 the native VLAN on g1, dropping old native 5 first
//! cargo run --example trunk_vlan -- --host switch1 --user admin --password secret --old 5 native g1 10
//! ```

use std::env;
use std::time::Duration;

use trunkline::{
    ConsoleConfig, PowerConnect55xx, SwitchCredentials, SwitchDriver, SwitchSession, VlanId,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.password.is_empty() {
        eprintln!("Error: must provide --password");
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

    println!(
        "Applying: {} VLAN {} on port {}",
        args.action, args.vlan, args.port_name
    );
    match args.action.as_str() {
        "add" => session.enable_port_vlan(&args.port_name, args.vlan).await?,
        "remove" => session.disable_port_vlan(&args.port_name, args.vlan).await?,
        "native" => {
            session
                .set_port_native(&args.port_name, args.old, args.vlan)
                .await?
        }
        "clear" => session.clear_port_native(&args.port_name, args.vlan).await?,
        other => {
            eprintln!("Error: unknown action {other:?} (use add, remove, native or clear)");
            std::process::exit(1);
        }
    }

    println!("Reading membership back...\n");
    let networks = session.get_port_networks(&[args.port_name.as_str()]).await?;
    for (port, rows) in &networks {
        println!("{port}:");
        if rows.is_empty() {
            println!("    (no VLANs trunked)");
        }
        for row in rows {
            println!("    {:<14} VLAN {}", row.name, row.vlan);
        }
    }

    println!("\nLogging out...");
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
    old: Option<VlanId>,
    action: String,
    port_name: String,
    vlan: VlanId,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut host = "localhost".to_string();
        let mut port = 23u16;
        let mut user = "admin".to_string();
        let mut password = String::new();
        let mut timeout = 30u64;
        let mut old = None;
        let mut positional = Vec::new();

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
                "--old" | "-o" => {
                    i += 1;
                    if i < args.len() {
                        old = args[i].parse().ok();
                    }
                }
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                other => positional.push(other.to_string()),
            }
            i += 1;
        }

        if positional.len() != 3 {
            eprintln!("Error: expected <ACTION> <PORT> <VLAN>");
            Self::print_help();
            std::process::exit(1);
        }
        let vlan = match positional[2].parse() {
            Ok(vlan) => vlan,
            Err(_) => {
                eprintln!("Error: VLAN must be a number, got {:?}", positional[2]);
                std::process::exit(1);
            }
        };

        Self {
            host,
            port,
            user,
            password,
            timeout,
            old,
            action: positional[0].clone(),
            port_name: positional[1].clone(),
            vlan,
        }
    }

    fn print_help() {
        println!(
            r#"trunkline trunk VLAN management example

Applies one VLAN trunk operation to a switch port, then reads the port's
membership back.

USAGE:
    cargo run --example trunk_vlan -- [OPTIONS] <ACTION> <PORT> <VLAN>

ACTIONS:
    add        Add the VLAN to the port's trunk (enables trunk mode)
    remove     Remove the VLAN from the port's trunk
    native     Make the VLAN the port's native VLAN (see --old)
    clear      Drop the native VLAN and reset it to none

OPTIONS:
    -h, --host <HOST>        Switch hostname or address [default: localhost]
    -p, --port <PORT>        Telnet port [default: 23]
    -u, --user <USER>        Username [default: admin]
    -P, --password <PASS>    Password for the switch CLI
    -t, --timeout <SECS>     Connect and read timeout [default: 30]
    -o, --old <VLAN>         Previous native VLAN to drop before `native`
    --help                   Print this help message

EXAMPLES:
    # Add VLAN 10 to g1's trunk
    cargo run --example trunk_vlan -- --host switch1 --user admin --password secret add g1 10

    # Replace native VLAN 5 with 10 on g1
    cargo run --example trunk_vlan -- --host switch1 --user admin --password secret --old 5 native g1 10
"#
        );
    }
}
