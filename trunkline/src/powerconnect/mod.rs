//! Dell PowerConnect 55xx backend.
//!
//! Speaks the 55xx CLI over a telnet console session: fire-and-forget trunk
//! configuration commands, and the paginated `show interfaces switchport`
//! query behind the membership lookup. Commands use the firmware's
//! abbreviated forms (`sw` for `switchport`, `int` for `interface`).

mod show;
mod vlans;

use indexmap::IndexMap;
use log::debug;
use tokio::net::TcpStream;

use crate::console::ConsoleSession;
use crate::error::Result;
use crate::switch::{PortNetwork, SwitchCredentials, SwitchDriver, SwitchSession, VlanId};
use crate::transport::{ConsoleConfig, TelnetTransport, Transport};

use show::{ShowInterfaceParser, ShowStep};

/// Backend for Dell PowerConnect 55xx-series switches, reached over telnet.
pub struct PowerConnect55xx {
    credentials: SwitchCredentials,
    config: ConsoleConfig,
}

impl PowerConnect55xx {
    /// Build a backend with the default console configuration.
    pub fn new(credentials: SwitchCredentials) -> Self {
        Self::with_config(credentials, ConsoleConfig::default())
    }

    /// Build a backend with an explicit port and timeouts.
    pub fn with_config(credentials: SwitchCredentials, config: ConsoleConfig) -> Self {
        Self {
            credentials,
            config,
        }
    }
}

impl SwitchDriver for PowerConnect55xx {
    type Session = PowerConnectSession<TelnetTransport<TcpStream>>;

    async fn connect(&self) -> Result<Self::Session> {
        let transport = TelnetTransport::dial(
            self.credentials.hostname(),
            self.config.port,
            self.config.connect_timeout,
        )
        .await?;
        let console =
            ConsoleSession::login(transport, &self.credentials, self.config.read_timeout).await?;
        Ok(PowerConnectSession::new(console))
    }
}

/// A live session with one 55xx switch.
///
/// The port-scoped [`SwitchSession`] operations wrap the context-scoped
/// methods here in an enter/exit pair. The context-scoped methods assume
/// the console already sits at the interface configuration prompt.
pub struct PowerConnectSession<T: Transport> {
    console: ConsoleSession<T>,
}

impl<T: Transport> PowerConnectSession<T> {
    /// Wrap a logged-in console session.
    pub fn new(console: ConsoleSession<T>) -> Self {
        Self { console }
    }

    /// The underlying console session.
    pub fn console(&self) -> &ConsoleSession<T> {
        &self.console
    }

    /// Enter the configuration context for `interface`.
    pub async fn enter_interface_context(&mut self, interface: &str) -> Result<()> {
        self.console.send_line("config").await?;
        self.console.send_line(&format!("int {interface}")).await
    }

    /// Leave the interface configuration context, back to the main prompt.
    pub async fn exit_interface_context(&mut self) -> Result<()> {
        self.console.send_line("exit").await?;
        self.console.send_line("exit").await
    }

    /// Put the current interface in trunk mode and add `vlan` to its trunk.
    /// Idempotent on the firmware side.
    pub async fn enable_vlan(&mut self, vlan: VlanId) -> Result<()> {
        self.console.send_line("sw mode trunk").await?;
        self.console
            .send_line(&format!("sw trunk allowed vlan add {vlan}"))
            .await
    }

    /// Remove `vlan` from the current interface's trunk.
    pub async fn disable_vlan(&mut self, vlan: VlanId) -> Result<()> {
        self.console
            .send_line(&format!("sw trunk allowed vlan remove {vlan}"))
            .await
    }

    /// Make `new` the current interface's native VLAN. The old native VLAN,
    /// when one was set, is dropped from the trunk before the switch-over;
    /// the new one is enabled after it.
    pub async fn set_native(&mut self, old: Option<VlanId>, new: VlanId) -> Result<()> {
        if let Some(old) = old {
            self.disable_vlan(old).await?;
        }
        self.console
            .send_line(&format!("sw trunk native vlan {new}"))
            .await?;
        self.enable_vlan(new).await
    }

    /// Drop native VLAN `vlan` from the current interface's trunk and reset
    /// the native VLAN to none.
    pub async fn clear_native(&mut self, vlan: VlanId) -> Result<()> {
        self.disable_vlan(vlan).await?;
        self.console.send_line("sw trunk native vlan none").await
    }

    /// Run `show int sw` for `interface` and collect its status fields.
    async fn interface_fields(&mut self, interface: &str) -> Result<IndexMap<String, String>> {
        self.console
            .send_line(&format!("show int sw {interface}"))
            .await?;

        let mut parser = ShowInterfaceParser::new();
        loop {
            let patterns = parser.patterns();
            let matched = self.console.expect(&patterns).await?;
            match parser.apply(matched.index, &matched.text) {
                ShowStep::PageForward => self.console.send(" ").await?,
                ShowStep::Collected => {}
                ShowStep::Finished => break,
            }
        }

        // Consume the trailing prompt so the next command starts in step.
        self.console.expect_prompt().await?;

        let fields = parser.into_fields();
        debug!(
            "collected {} status fields for {interface} on switch {}",
            fields.len(),
            self.console.switch()
        );
        Ok(fields)
    }
}

impl<T: Transport> SwitchSession for PowerConnectSession<T> {
    async fn enable_port_vlan(&mut self, port: &str, vlan: VlanId) -> Result<()> {
        self.enter_interface_context(port).await?;
        self.enable_vlan(vlan).await?;
        self.exit_interface_context().await
    }

    async fn disable_port_vlan(&mut self, port: &str, vlan: VlanId) -> Result<()> {
        self.enter_interface_context(port).await?;
        self.disable_vlan(vlan).await?;
        self.exit_interface_context().await
    }

    async fn set_port_native(
        &mut self,
        port: &str,
        old: Option<VlanId>,
        new: VlanId,
    ) -> Result<()> {
        self.enter_interface_context(port).await?;
        self.set_native(old, new).await?;
        self.exit_interface_context().await
    }

    async fn clear_port_native(&mut self, port: &str, vlan: VlanId) -> Result<()> {
        self.enter_interface_context(port).await?;
        self.clear_native(vlan).await?;
        self.exit_interface_context().await
    }

    async fn get_port_networks(
        &mut self,
        ports: &[&str],
    ) -> Result<IndexMap<String, Vec<PortNetwork>>> {
        let mut networks = IndexMap::new();
        for &port in ports {
            let fields = self.interface_fields(port).await?;
            let rows = vlans::networks_from_fields(self.console.switch(), port, &fields)?;
            networks.insert(port.to_string(), rows);
        }
        Ok(networks)
    }

    async fn disconnect(self) -> Result<()> {
        self.console.disconnect().await
    }
}
