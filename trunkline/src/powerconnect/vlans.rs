//! VLAN membership extraction from collected interface status fields.

use indexmap::IndexMap;

use crate::error::ProtocolError;
use crate::switch::{PortNetwork, VlanId};

/// Field naming the native VLAN, as the firmware prints it.
pub(crate) const NATIVE_VLAN_FIELD: &str = "Trunking Native Mode VLAN";
/// Field listing the trunked VLANs.
pub(crate) const TRUNK_VLANS_FIELD: &str = "Trunking VLANs Enabled";

/// Extract the ordered network rows for one interface from its status
/// fields.
///
/// Trunked ids come from the `Trunking VLANs Enabled` value: split on
/// commas, then on `-`, each piece parsed by its leading digits. A `lo-hi`
/// token therefore contributes its two endpoints, never the ids between
/// them. Pieces without leading digits are skipped. The native id, when the
/// `Trunking Native Mode VLAN` value starts with digits, is appended last
/// as `vlan/native`. Nothing is deduplicated.
pub(crate) fn networks_from_fields(
    switch: &str,
    interface: &str,
    fields: &IndexMap<String, String>,
) -> Result<Vec<PortNetwork>, ProtocolError> {
    let native_value = require_field(switch, interface, fields, NATIVE_VLAN_FIELD)?;
    let native = leading_number(native_value.trim());

    let enabled = require_field(switch, interface, fields, TRUNK_VLANS_FIELD)?;

    let mut networks = Vec::new();
    for range_token in enabled.split(',') {
        for endpoint in range_token.split('-') {
            if let Some(vlan) = leading_number(endpoint.trim()) {
                networks.push(PortNetwork::trunked(vlan));
            }
        }
    }

    if let Some(vlan) = native {
        networks.push(PortNetwork::native(vlan));
    }

    Ok(networks)
}

fn require_field<'a>(
    switch: &str,
    interface: &str,
    fields: &'a IndexMap<String, String>,
    field: &'static str,
) -> Result<&'a str, ProtocolError> {
    fields
        .get(field)
        .map(String::as_str)
        .ok_or_else(|| ProtocolError::MissingField {
            switch: switch.to_string(),
            interface: interface.to_string(),
            field,
        })
}

/// Parse the leading decimal digits of `text`, tolerating a tail such as
/// ` (Inactive)`. No leading digits, or a run too large for [`VlanId`],
/// is `None`.
fn leading_number(text: &str) -> Option<VlanId> {
    let end = text
        .bytes()
        .position(|byte| !byte.is_ascii_digit())
        .unwrap_or(text.len());
    if end == 0 {
        return None;
    }
    text[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(native: &str, enabled: &str) -> IndexMap<String, String> {
        let mut map = IndexMap::new();
        map.insert(NATIVE_VLAN_FIELD.to_string(), native.to_string());
        map.insert(TRUNK_VLANS_FIELD.to_string(), enabled.to_string());
        map
    }

    #[test]
    fn range_tokens_yield_their_endpoints_only() {
        let rows =
            networks_from_fields("sw1", "g1", &fields("Disabled\r\n", " 1,5-7, 20\r\n")).unwrap();

        assert_eq!(
            rows,
            vec![
                PortNetwork::trunked(1),
                PortNetwork::trunked(5),
                PortNetwork::trunked(7),
                PortNetwork::trunked(20),
            ]
        );
    }

    #[test]
    fn native_id_survives_a_trailing_annotation() {
        let rows =
            networks_from_fields("sw1", "g1", &fields(" 100 (Inactive)\r\n", "\r\n")).unwrap();

        assert_eq!(rows, vec![PortNetwork::native(100)]);
    }

    #[test]
    fn disabled_native_yields_no_native_row() {
        let rows = networks_from_fields("sw1", "g1", &fields("Disabled\r\n", " 10\r\n")).unwrap();

        assert_eq!(rows, vec![PortNetwork::trunked(10)]);
    }

    #[test]
    fn native_row_is_last_and_not_deduplicated() {
        let rows = networks_from_fields("sw1", "g1", &fields(" 1\r\n", " 1,10\r\n")).unwrap();

        assert_eq!(
            rows,
            vec![
                PortNetwork::trunked(1),
                PortNetwork::trunked(10),
                PortNetwork::native(1),
            ]
        );
    }

    #[test]
    fn values_reassembled_across_pages_parse_whole() {
        // A wrapped list carries its continuation newlines inside the value.
        let rows = networks_from_fields(
            "sw1",
            "g1",
            &fields(" 1\r\n", " 1,5-7,\r\n 20-25,\r\n 30\r\n"),
        )
        .unwrap();

        assert_eq!(
            rows,
            vec![
                PortNetwork::trunked(1),
                PortNetwork::trunked(5),
                PortNetwork::trunked(7),
                PortNetwork::trunked(20),
                PortNetwork::trunked(25),
                PortNetwork::trunked(30),
                PortNetwork::native(1),
            ]
        );
    }

    #[test]
    fn digitless_pieces_are_skipped() {
        let rows =
            networks_from_fields("sw1", "g1", &fields("Disabled\r\n", " 1,(none),x-7,,20\r\n"))
                .unwrap();

        assert_eq!(
            rows,
            vec![
                PortNetwork::trunked(1),
                PortNetwork::trunked(7),
                PortNetwork::trunked(20),
            ]
        );
    }

    #[test]
    fn missing_native_field_is_a_protocol_error() {
        let mut map = IndexMap::new();
        map.insert(TRUNK_VLANS_FIELD.to_string(), " 1\r\n".to_string());

        let err = networks_from_fields("sw1", "g1", &map).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MissingField {
                field: NATIVE_VLAN_FIELD,
                ..
            }
        ));
    }

    #[test]
    fn missing_trunk_field_is_a_protocol_error() {
        let mut map = IndexMap::new();
        map.insert(NATIVE_VLAN_FIELD.to_string(), "Disabled\r\n".to_string());

        let err = networks_from_fields("sw1", "g1", &map).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MissingField {
                field: TRUNK_VLANS_FIELD,
                ..
            }
        ));
    }

    #[test]
    fn leading_number_parses_digits_and_rejects_the_rest() {
        assert_eq!(leading_number("100 (Inactive)"), Some(100));
        assert_eq!(leading_number("42"), Some(42));
        assert_eq!(leading_number("Disabled"), None);
        assert_eq!(leading_number(""), None);
        assert_eq!(leading_number("99999999999999999999"), None);
    }
}
