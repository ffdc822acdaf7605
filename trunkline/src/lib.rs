//! # trunkline
//!
//! Async telnet console driver for Dell PowerConnect 55xx switches,
//! managing VLAN trunk membership on switch ports.
//!
//! The driver logs in over telnet, derives the switch's shell prompts from
//! its first announcement, then issues fire-and-forget trunk configuration
//! commands and parses the paginated `show interfaces switchport` output
//! into an ordered port-to-VLAN membership mapping.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use trunkline::{PowerConnect55xx, SwitchCredentials, SwitchDriver, SwitchSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), trunkline::Error> {
//!     let credentials = SwitchCredentials::new("switch1.example.net", "admin", "secret")?;
//!     let mut session = PowerConnect55xx::new(credentials).connect().await?;
//!
//!     session.enable_port_vlan("g1", 10).await?;
//!
//!     let networks = session.get_port_networks(&["g1", "g2"]).await?;
//!     for (port, rows) in &networks {
//!         println!("{port}: {rows:?}");
//!     }
//!
//!     session.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Layering
//!
//! - [`transport`]: the byte channel, a minimal telnet client over TCP.
//! - [`channel`]: the accumulating buffer and the expect pattern race.
//! - [`console`]: the session engine with login, prompt derivation, expect
//!   and fire-and-forget sends.
//! - [`powerconnect`]: the 55xx command driver, status collection and VLAN
//!   extraction.
//! - [`switch`]: validated credentials and the capability traits a backend
//!   implements.
//!
//! ## Failure model
//!
//! Every wait on switch output is bounded by the configured read timeout.
//! Errors are fatal to their session: a timed-out expect marks the session
//! desynchronized and everything but [`ConsoleSession::disconnect`] then
//! fails fast. Callers retry by connecting a fresh session.

pub mod channel;
pub mod console;
pub mod error;
pub mod powerconnect;
pub mod switch;
pub mod transport;

pub use console::{ConsoleSession, ExpectMatch, PromptSet};
pub use error::{ChannelError, ConnectionError, Error, ProtocolError, Result, ValidationError};
pub use powerconnect::{PowerConnect55xx, PowerConnectSession};
pub use switch::{PortNetwork, SwitchCredentials, SwitchDriver, SwitchSession, VlanId};
pub use transport::{ConsoleConfig, TelnetTransport, Transport};
