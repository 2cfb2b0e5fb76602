//! Reconciling the on-device layout with a desired port and name.

#![allow(clippy::unwrap_used)]

use adirf_cli::application::services::reconciler::{self, ApplyChange};
use adirf_cli::application::services::resolver;
use adirf_cli::domain::agent::{BinaryName, Port};
use adirf_cli::domain::error::AgentError;
use adirf_cli::domain::session::Session;

use crate::helpers::{FakeDevice, RecordingReporter, block_on, path, session, test_config};

fn discovered(device: &FakeDevice) -> Session {
    let mut session = session();
    block_on(resolver::discover(device, &mut session, &BinaryName::standard())).unwrap();
    session
}

fn port(s: &str) -> Port {
    Port::parse(s).unwrap()
}

fn name(s: &str) -> BinaryName {
    BinaryName::parse(s).unwrap()
}

#[test]
fn renames_custom_binary() {
    let device = FakeDevice::new().with_install("adirf27042", "custom-agent");
    let mut session = discovered(&device);

    let outcome = block_on(reconciler::apply(
        &device,
        &RecordingReporter::default(),
        &mut session,
        &test_config(),
        None,
        Some(&name("agent2")),
    ))
    .unwrap();

    assert_eq!(
        outcome.changes,
        [ApplyChange::BinaryRenamed {
            from: path("adirf27042/custom-agent"),
            to: path("adirf27042/agent2"),
        }]
    );
    assert_eq!(device.tree(), ["adirf27042", "adirf27042/agent2"]);
    assert!(device.is_executable(&path("adirf27042/agent2")));
    assert_eq!(session.binary_name(), Some(&name("agent2")));
}

#[test]
fn port_change_moves_directory() {
    let device = FakeDevice::new().with_install("adirf27042", "frida-server");
    let mut session = discovered(&device);

    let outcome = block_on(reconciler::apply(
        &device,
        &RecordingReporter::default(),
        &mut session,
        &test_config(),
        Some(&port("27043")),
        None,
    ))
    .unwrap();

    assert_eq!(
        outcome.changes,
        [ApplyChange::DirectoryRenamed {
            from: path("adirf27042"),
            to: path("adirf27043"),
        }]
    );
    assert_eq!(device.tree(), ["adirf27043", "adirf27043/frida-server"]);
}

#[test]
fn reapplying_same_configuration_changes_nothing() {
    let device = FakeDevice::new().with_install("adirf27042", "agent2");
    let mut session = discovered(&device);
    device.clear_log();

    let outcome = block_on(reconciler::apply(
        &device,
        &RecordingReporter::default(),
        &mut session,
        &test_config(),
        Some(&port("27042")),
        Some(&name("agent2")),
    ))
    .unwrap();

    assert!(outcome.is_noop());
    assert_eq!(device.mutation_count(), 0);
}

#[test]
fn refuses_while_agent_runs() {
    let device = FakeDevice::new()
        .with_install("adirf27042", "frida-server")
        .with_running(&path("adirf27042/frida-server"), "27042");
    let mut session = discovered(&device);
    let before = device.tree();
    device.clear_log();

    let err = block_on(reconciler::apply(
        &device,
        &RecordingReporter::default(),
        &mut session,
        &test_config(),
        Some(&port("27043")),
        Some(&name("agent2")),
    ))
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<AgentError>(),
        Some(AgentError::PreconditionFailure(_))
    ));
    assert_eq!(device.mutation_count(), 0);
    assert_eq!(device.tree(), before);
}

#[test]
fn missing_binary_is_reported_and_name_kept() {
    let device = FakeDevice::new();
    device.add_dir(&path("adirf27042"));
    let mut session = discovered(&device);
    let reporter = RecordingReporter::default();

    let outcome = block_on(reconciler::apply(
        &device,
        &reporter,
        &mut session,
        &test_config(),
        None,
        Some(&name("agent2")),
    ))
    .unwrap();

    assert_eq!(
        outcome.changes,
        [ApplyChange::BinaryMissing {
            path: path("adirf27042/frida-server"),
        }]
    );
    assert_eq!(reporter.warnings.borrow().len(), 1);
    assert_eq!(session.binary_name(), Some(&BinaryName::standard()));
}

#[test]
fn creates_directory_when_none_exists() {
    let device = FakeDevice::new();
    let mut session = session();

    let outcome = block_on(reconciler::apply(
        &device,
        &RecordingReporter::default(),
        &mut session,
        &test_config(),
        Some(&port("27050")),
        None,
    ))
    .unwrap();

    assert_eq!(
        outcome.changes,
        [ApplyChange::DirectoryCreated {
            path: path("adirf27050"),
        }]
    );
    assert_eq!(device.tree(), ["adirf27050"]);
}

#[test]
fn failed_binary_move_is_a_rename_failure() {
    let device = FakeDevice::new().with_install("adirf27042", "frida-server");
    let mut session = discovered(&device);
    device.fail("move");

    let err = block_on(reconciler::apply(
        &device,
        &RecordingReporter::default(),
        &mut session,
        &test_config(),
        None,
        Some(&name("agent2")),
    ))
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<AgentError>(),
        Some(AgentError::RenameFailure { .. })
    ));
    assert!(device.has_file(&path("adirf27042/frida-server")));
    assert_eq!(session.binary_name(), Some(&BinaryName::standard()));
}

#[test]
fn name_only_request_keeps_current_directory() {
    let device = FakeDevice::new().with_install("adirf27043", "custom-agent");
    let mut session = discovered(&device);
    let config = test_config();

    let (desired_port, desired_name) =
        reconciler::requested(&config, None, Some(&name("agent2"))).unwrap();
    assert_eq!(desired_port, None);

    let outcome = block_on(reconciler::apply(
        &device,
        &RecordingReporter::default(),
        &mut session,
        &config,
        desired_port.as_ref(),
        desired_name.as_ref(),
    ))
    .unwrap();

    assert_eq!(
        outcome.changes,
        [ApplyChange::BinaryRenamed {
            from: path("adirf27043/custom-agent"),
            to: path("adirf27043/agent2"),
        }]
    );
    assert_eq!(device.tree(), ["adirf27043", "adirf27043/agent2"]);
}

#[test]
fn empty_request_falls_back_to_configured_defaults() {
    let config = test_config();
    let (desired_port, desired_name) = reconciler::requested(&config, None, None).unwrap();
    assert_eq!(desired_port, Some(config.default_port().unwrap()));
    assert_eq!(desired_name, Some(config.default_name().unwrap()));

    let (desired_port, desired_name) =
        reconciler::requested(&config, Some(&port("27050")), None).unwrap();
    assert_eq!(desired_port, Some(port("27050")));
    assert_eq!(desired_name, None);
}
