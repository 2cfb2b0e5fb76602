//! Working-directory discovery, creation and renaming.

#![allow(clippy::unwrap_used)]

use adirf_cli::application::services::resolver;
use adirf_cli::domain::agent::{BinaryName, Port};
use adirf_cli::domain::error::AgentError;

use crate::helpers::{FakeDevice, block_on, path, session, test_config};

fn port(s: &str) -> Port {
    Port::parse(s).unwrap()
}

#[test]
fn discover_on_empty_base_finds_nothing_and_changes_nothing() {
    let device = FakeDevice::new();
    let mut session = session();

    let found = block_on(resolver::discover(&device, &mut session, &BinaryName::standard())).unwrap();

    assert!(found.is_none());
    assert!(session.working_dir().is_none());
    assert_eq!(device.mutation_count(), 0);
}

#[test]
fn discover_picks_lexicographically_smallest_directory() {
    let device = FakeDevice::new();
    device.add_dir(&path("adirf9"));
    device.add_dir(&path("adirf27042"));
    device.add_dir(&path("adirf-notaport"));
    device.add_dir(&path("unrelated"));
    let mut session = session();

    let found = block_on(resolver::discover(&device, &mut session, &BinaryName::standard()))
        .unwrap()
        .unwrap();

    assert_eq!(found.path(), path("adirf27042"));
    assert_eq!(found.port(), &port("27042"));
    assert!(device.has_dir(&path("adirf9")), "extra directories are left alone");
}

#[test]
fn discover_takes_binary_name_from_directory_contents() {
    let device = FakeDevice::new().with_install("adirf27042", "custom-agent");
    let mut session = session();

    block_on(resolver::discover(&device, &mut session, &BinaryName::standard())).unwrap();

    assert_eq!(session.binary_name().map(BinaryName::as_str), Some("custom-agent"));
}

#[test]
fn discover_falls_back_to_default_name_for_empty_directory() {
    let device = FakeDevice::new();
    device.add_dir(&path("adirf27042"));
    let mut session = session();
    let default_name = BinaryName::parse("agent2").unwrap();

    block_on(resolver::discover(&device, &mut session, &default_name)).unwrap();

    assert_eq!(session.binary_name(), Some(&default_name));
}

#[test]
fn listing_failure_is_a_probe_failure() {
    let device = FakeDevice::new();
    device.fail("list_dir");

    let err = block_on(resolver::discover(&device, &mut session(), &BinaryName::standard()))
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<AgentError>(),
        Some(AgentError::ProbeFailure(_))
    ));
}

#[test]
fn resolve_or_create_creates_default_directory_once() {
    let device = FakeDevice::new();
    let config = test_config();

    let first = block_on(resolver::resolve_or_create(&device, &mut session(), &config)).unwrap();
    device.clear_log();
    let second = block_on(resolver::resolve_or_create(&device, &mut session(), &config)).unwrap();

    assert_eq!(first, second);
    assert_eq!(device.tree(), ["adirf27042"]);
    assert_eq!(device.mutation_count(), 0);
}

#[test]
fn rename_moves_directory_with_contents() {
    let device = FakeDevice::new().with_install("adirf27042", "frida-server");
    let mut session = session();
    block_on(resolver::discover(&device, &mut session, &BinaryName::standard())).unwrap();

    let dir = block_on(resolver::rename(&device, &mut session, &port("27043"), &BinaryName::standard()))
        .unwrap();

    assert_eq!(dir.path(), path("adirf27043"));
    assert_eq!(device.tree(), ["adirf27043", "adirf27043/frida-server"]);
    assert_eq!(session.working_dir().map(|d| d.path().to_string()), Some(path("adirf27043")));
}

#[test]
fn rename_to_same_port_is_a_no_op() {
    let device = FakeDevice::new().with_install("adirf27042", "frida-server");
    let mut session = session();
    block_on(resolver::discover(&device, &mut session, &BinaryName::standard())).unwrap();
    device.clear_log();

    block_on(resolver::rename(&device, &mut session, &port("27042"), &BinaryName::standard()))
        .unwrap();

    assert_eq!(device.mutation_count(), 0);
}

#[test]
fn rename_onto_existing_directory_fails_and_keeps_session() {
    let device = FakeDevice::new().with_install("adirf27042", "frida-server");
    device.add_file(&path("adirf27043/frida-server"), 10, true);
    let mut session = session();
    block_on(resolver::discover(&device, &mut session, &BinaryName::standard())).unwrap();

    let err = block_on(resolver::rename(&device, &mut session, &port("27043"), &BinaryName::standard()))
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<AgentError>(),
        Some(AgentError::RenameFailure { .. })
    ));
    assert_eq!(session.working_dir().map(|d| d.path().to_string()), Some(path("adirf27042")));
    assert!(device.has_file(&path("adirf27042/frida-server")));
}
