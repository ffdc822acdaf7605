//! The switch abstraction: validated credentials, the port membership data
//! model, and the capability traits a switch backend implements.
//!
//! The traits are the seam the surrounding system programs against. A
//! [`SwitchDriver`] knows how to reach one switch; the [`SwitchSession`] it
//! produces carries the per-port trunk operations and the membership query.

use std::future::Future;

use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// A VLAN identifier as the switch firmware reports it.
pub type VlanId = u32;

/// Validated connection parameters for one switch.
///
/// All three fields must be non-empty; a record that fails validation is
/// rejected before any connection is attempted, and deserializing one is a
/// schema error. The password is held as a [`SecretString`], so `Debug`
/// output redacts it.
#[derive(Debug, Deserialize)]
#[serde(try_from = "RawSwitchCredentials")]
pub struct SwitchCredentials {
    hostname: String,
    username: String,
    password: SecretString,
}

impl SwitchCredentials {
    /// Build a validated credentials record.
    pub fn new(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> std::result::Result<Self, ValidationError> {
        let hostname = hostname.into();
        let username = username.into();
        let password = password.into();

        if hostname.is_empty() {
            return Err(ValidationError::EmptyField { field: "hostname" });
        }
        if username.is_empty() {
            return Err(ValidationError::EmptyField { field: "username" });
        }
        if password.is_empty() {
            return Err(ValidationError::EmptyField { field: "password" });
        }

        Ok(Self {
            hostname,
            username,
            password: SecretString::from(password),
        })
    }

    /// Hostname or address the switch is reached at. Doubles as the switch
    /// identity in logs and errors.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Login account name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Login password. Exposing it is the caller's responsibility.
    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

/// Wire shape of a credentials record; converted through validation so a
/// deserialized record is as trustworthy as a constructed one.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSwitchCredentials {
    hostname: String,
    username: String,
    password: SecretString,
}

impl TryFrom<RawSwitchCredentials> for SwitchCredentials {
    type Error = ValidationError;

    fn try_from(raw: RawSwitchCredentials) -> std::result::Result<Self, Self::Error> {
        Self::new(raw.hostname, raw.username, raw.password.expose_secret())
    }
}

/// One row of a port's VLAN membership: a network name and the VLAN id
/// behind it.
///
/// Trunked VLANs are named `vlan/<id>`; the native VLAN, when one is set,
/// appears as a final `vlan/native` row. Rows keep the order the switch
/// reported and are not deduplicated, so the native VLAN's id can also
/// appear among the trunked rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortNetwork {
    /// Network name: `vlan/<id>`, or `vlan/native`.
    pub name: String,
    /// The VLAN id.
    pub vlan: VlanId,
}

impl PortNetwork {
    /// A trunked VLAN row, named `vlan/<id>`.
    pub fn trunked(vlan: VlanId) -> Self {
        Self {
            name: format!("vlan/{vlan}"),
            vlan,
        }
    }

    /// The native VLAN row, named `vlan/native`.
    pub fn native(vlan: VlanId) -> Self {
        Self {
            name: "vlan/native".to_string(),
            vlan,
        }
    }

    /// Whether this is the native VLAN row.
    pub fn is_native(&self) -> bool {
        self.name == "vlan/native"
    }
}

/// A switch-family backend: knows how to reach one switch and produce a
/// live session.
pub trait SwitchDriver: Send + Sync {
    /// The session type this backend produces.
    type Session: SwitchSession;

    /// Connect and log in.
    fn connect(&self) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// Operations a live switch session supports.
///
/// Port-scoped operations enter the port's interface configuration context,
/// apply their commands, and leave it again. Methods take `&mut self`: one
/// operation is in flight per session at a time.
pub trait SwitchSession: Send {
    /// Add `vlan` to the port's trunk, putting the port in trunk mode.
    fn enable_port_vlan(
        &mut self,
        port: &str,
        vlan: VlanId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove `vlan` from the port's trunk.
    fn disable_port_vlan(
        &mut self,
        port: &str,
        vlan: VlanId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Make `new` the port's native VLAN. When the port already had a
    /// native VLAN, pass it as `old` so it is dropped from the trunk first.
    fn set_port_native(
        &mut self,
        port: &str,
        old: Option<VlanId>,
        new: VlanId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Drop native VLAN `vlan` from the port's trunk and reset the port to
    /// having no native VLAN.
    fn clear_port_native(
        &mut self,
        port: &str,
        vlan: VlanId,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Query VLAN membership for each of `ports`, in input order.
    fn get_port_networks(
        &mut self,
        ports: &[&str],
    ) -> impl Future<Output = Result<IndexMap<String, Vec<PortNetwork>>>> + Send;

    /// Log out and tear the session down.
    fn disconnect(self) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_fields() {
        assert!(matches!(
            SwitchCredentials::new("", "admin", "pw"),
            Err(ValidationError::EmptyField { field: "hostname" })
        ));
        assert!(matches!(
            SwitchCredentials::new("sw1", "", "pw"),
            Err(ValidationError::EmptyField { field: "username" })
        ));
        assert!(matches!(
            SwitchCredentials::new("sw1", "admin", ""),
            Err(ValidationError::EmptyField { field: "password" })
        ));
    }

    #[test]
    fn debug_redacts_the_password() {
        let credentials = SwitchCredentials::new("sw1", "admin", "hunter2").unwrap();
        let rendered = format!("{credentials:?}");

        assert!(rendered.contains("sw1"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn deserializes_a_valid_record() {
        let credentials: SwitchCredentials = serde_json::from_str(
            r#"{"hostname": "sw1", "username": "admin", "password": "hunter2"}"#,
        )
        .unwrap();

        assert_eq!(credentials.hostname(), "sw1");
        assert_eq!(credentials.username(), "admin");
        assert_eq!(credentials.password().expose_secret(), "hunter2");
    }

    #[test]
    fn deserialization_runs_validation() {
        let result: std::result::Result<SwitchCredentials, _> = serde_json::from_str(
            r#"{"hostname": "sw1", "username": "admin", "password": ""}"#,
        );

        let message = result.unwrap_err().to_string();
        assert!(message.contains("password"));
    }

    #[test]
    fn deserialization_rejects_unknown_fields() {
        let result: std::result::Result<SwitchCredentials, _> = serde_json::from_str(
            r#"{"hostname": "sw1", "username": "admin", "password": "pw", "port": 23}"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn network_rows_carry_their_names() {
        assert_eq!(
            PortNetwork::trunked(10),
            PortNetwork {
                name: "vlan/10".to_string(),
                vlan: 10
            }
        );

        let native = PortNetwork::native(100);
        assert_eq!(native.name, "vlan/native");
        assert_eq!(native.vlan, 100);
        assert!(native.is_native());
        assert!(!PortNetwork::trunked(100).is_native());
    }
}
