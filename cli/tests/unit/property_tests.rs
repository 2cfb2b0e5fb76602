//! Property-based tests for validation and the rename/discover round trip.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;

use adirf_cli::application::services::{reconciler, resolver};
use adirf_cli::domain::agent::{BinaryName, Port};
use adirf_cli::domain::command::PrivilegedOp;
use adirf_cli::domain::config::{VALID_CONFIG_KEYS, validate_config_key, validate_config_value};

use crate::helpers::{FakeDevice, RecordingReporter, block_on, path, session, test_config};

// ============================================================================
// Port and BinaryName validation
// ============================================================================

proptest! {
    /// Every port in range parses and keeps its canonical spelling.
    #[test]
    fn prop_valid_ports_round_trip(n in 1u16..=u16::MAX) {
        let text = n.to_string();
        let port = Port::parse(&text).expect("valid port");
        prop_assert_eq!(port.as_str(), text.as_str());
    }

    /// Leading zeros are never canonical.
    #[test]
    fn prop_leading_zero_ports_rejected(n in 0u16..=u16::MAX) {
        let padded = format!("0{n}");
        prop_assert!(Port::parse(&padded).is_err(), "accepted {}", padded);
    }

    /// A binary name containing `/` could escape its directory.
    #[test]
    fn prop_names_with_slash_rejected(a in "[a-z]{0,8}", b in "[a-z]{0,8}") {
        let candidate = format!("{a}/{b}");
        prop_assert!(BinaryName::parse(&candidate).is_err());
    }
}

// ============================================================================
// Config key and value validation
// ============================================================================

proptest! {
    /// Keys outside the whitelist are rejected.
    #[test]
    fn prop_arbitrary_keys_rejected(key in "[a-z]{1,12}\\.[a-z_]{1,20}") {
        if !VALID_CONFIG_KEYS.contains(&key.as_str()) {
            prop_assert!(validate_config_key(&key).is_err(), "accepted invalid key: {}", key);
        }
    }

    /// Non-numeric timeouts are rejected.
    #[test]
    fn prop_non_numeric_timeouts_rejected(value in "[a-z]{1,10}") {
        prop_assert!(validate_config_value("executor.command_timeout_secs", &value).is_err());
    }
}

#[test]
fn test_every_whitelisted_key_validates() {
    for key in VALID_CONFIG_KEYS {
        assert!(validate_config_key(key).is_ok(), "{key}");
    }
}

// ============================================================================
// Shell rendering
// ============================================================================

proptest! {
    /// Arbitrary printable names survive rendering as exactly one word each.
    #[test]
    fn prop_move_arguments_stay_single_words(from in "[ -~]{1,24}", to in "[ -~]{1,24}") {
        let line = PrivilegedOp::Move { from: from.clone(), to: to.clone() }
            .render()
            .expect("printable input renders");
        let words = shlex::split(&line).expect("rendered line parses");
        prop_assert_eq!(words, vec!["mv".to_string(), "-f".to_string(), from, to]);
    }
}

// ============================================================================
// Rename then discover
// ============================================================================

fn name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("frida-server".to_string()),
        "[a-z][a-z0-9_-]{0,15}",
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever port and name are applied, a fresh discovery reports them.
    #[test]
    fn prop_apply_then_discover_agrees(
        from_port in 1u16..=u16::MAX,
        to_port in 1u16..=u16::MAX,
        from_name in name_strategy(),
        to_name in name_strategy(),
    ) {
        let from_port = Port::parse(&from_port.to_string()).unwrap();
        let to_port = Port::parse(&to_port.to_string()).unwrap();
        let to_name = BinaryName::parse(&to_name).unwrap();

        let device = FakeDevice::new().with_install(&format!("adirf{from_port}"), &from_name);
        let mut first = session();
        block_on(resolver::discover(&device, &mut first, &BinaryName::standard())).unwrap();
        block_on(reconciler::apply(
            &device,
            &RecordingReporter::default(),
            &mut first,
            &test_config(),
            Some(&to_port),
            Some(&to_name),
        ))
        .unwrap();

        let mut fresh = session();
        let dir = block_on(resolver::discover(&device, &mut fresh, &BinaryName::standard()))
            .unwrap()
            .expect("directory survives");
        prop_assert_eq!(dir.port(), &to_port);
        prop_assert_eq!(fresh.binary_name(), Some(&to_name));
        let landed = path(&format!("adirf{to_port}/{to_name}"));
        prop_assert!(device.is_executable(&landed), "{} is not executable", landed);
    }
}
