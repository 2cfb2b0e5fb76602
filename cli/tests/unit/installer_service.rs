//! Install and update against the in-memory device.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use adirf_cli::application::services::installer::{self, InstallOutcome};
use adirf_cli::domain::agent::BinaryName;
use adirf_cli::domain::error::AgentError;

use crate::helpers::{
    BASE, FakeDevice, FakeFeed, RecordingReporter, STAGING, TAG, block_on, path, session,
    test_config,
};

fn agent_error(err: &anyhow::Error) -> &AgentError {
    err.downcast_ref::<AgentError>()
        .unwrap_or_else(|| panic!("not an AgentError: {err:#}"))
}

#[test]
fn fresh_install_creates_directory_and_downloads_latest() {
    let device = FakeDevice::new();
    let reporter = RecordingReporter::default();
    let mut session = session();

    let (binary, outcome) = block_on(installer::ensure_installed(
        &device,
        &FakeFeed::Tag(TAG),
        &reporter,
        &mut session,
        &test_config(),
        None,
    ))
    .unwrap();

    assert_eq!(outcome, InstallOutcome::Downloaded { version: TAG.to_string() });
    assert_eq!(binary.path(), path("adirf27042/frida-server"));
    assert_eq!(device.tree(), ["adirf27042", "adirf27042/frida-server"]);
    assert!(device.is_executable(&binary.path()));
    assert!(!device.has_file(&format!("{STAGING}/frida-server-{TAG}")));
    assert!(!device.has_file(&format!("{STAGING}/frida-server-{TAG}.xz")));
    assert!(reporter.steps.borrow().iter().any(|s| s.contains("Downloading")));
}

#[test]
fn second_install_is_a_no_op() {
    let device = FakeDevice::new();
    let config = test_config();
    let feed = FakeFeed::Tag(TAG);
    let reporter = RecordingReporter::default();

    block_on(installer::ensure_installed(&device, &feed, &reporter, &mut session(), &config, None))
        .unwrap();
    let tree = device.tree();
    device.clear_log();

    let (_, outcome) = block_on(installer::ensure_installed(
        &device,
        &feed,
        &reporter,
        &mut session(),
        &config,
        None,
    ))
    .unwrap();

    assert_eq!(outcome, InstallOutcome::AlreadyInstalled);
    assert_eq!(device.mutation_count(), 0, "ops: {:?}", device.kinds());
    assert_eq!(device.tree(), tree);
}

#[test]
fn manually_staged_binary_is_promoted_without_download() {
    let device = FakeDevice::new();
    device.add_file(&format!("{STAGING}/frida-server"), 2048, false);

    let (binary, outcome) = block_on(installer::ensure_installed(
        &device,
        &FakeFeed::Unreachable,
        &RecordingReporter::default(),
        &mut session(),
        &test_config(),
        None,
    ))
    .unwrap();

    assert_eq!(outcome, InstallOutcome::PromotedFromStaging);
    assert!(device.is_executable(&binary.path()));
    assert!(!device.has_file(&format!("{STAGING}/frida-server")));
    assert!(!device.kinds().contains(&"download"));
}

#[test]
fn install_under_custom_name_renames_after_landing() {
    let device = FakeDevice::new();
    let name = BinaryName::parse("agent2").unwrap();
    let mut session = session();

    let (binary, _) = block_on(installer::ensure_installed(
        &device,
        &FakeFeed::Tag(TAG),
        &RecordingReporter::default(),
        &mut session,
        &test_config(),
        Some(&name),
    ))
    .unwrap();

    assert_eq!(binary.path(), path("adirf27042/agent2"));
    assert_eq!(device.tree(), ["adirf27042", "adirf27042/agent2"]);
    assert_eq!(session.binary_name(), Some(&name));
}

#[test]
fn missing_release_fails_without_touching_working_directory() {
    let device = FakeDevice::new();
    device.add_dir(&path("adirf27042"));
    let before = device.tree();

    for feed in [FakeFeed::NoRelease, FakeFeed::Unreachable, FakeFeed::Tag("../evil")] {
        let err = block_on(installer::ensure_installed(
            &device,
            &feed,
            &RecordingReporter::default(),
            &mut session(),
            &test_config(),
            None,
        ))
        .unwrap_err();

        assert!(matches!(agent_error(&err), AgentError::MetadataFetchFailure));
        assert_eq!(device.tree(), before);
    }
}

#[test]
fn empty_download_is_rejected() {
    let device = FakeDevice::new();
    device.set_download_size(0);

    let err = block_on(installer::ensure_installed(
        &device,
        &FakeFeed::Tag(TAG),
        &RecordingReporter::default(),
        &mut session(),
        &test_config(),
        None,
    ))
    .unwrap_err();

    assert!(matches!(agent_error(&err), AgentError::DownloadFailure { .. }));
    assert!(!device.has_file(&path("adirf27042/frida-server")));
    assert!(!device.kinds().contains(&"decompress"));
}

#[test]
fn failing_download_command_maps_to_download_failure() {
    let device = FakeDevice::new();
    device.fail("download");

    let err = block_on(installer::ensure_installed(
        &device,
        &FakeFeed::Tag(TAG),
        &RecordingReporter::default(),
        &mut session(),
        &test_config(),
        None,
    ))
    .unwrap_err();

    assert!(matches!(agent_error(&err), AgentError::DownloadFailure { .. }));
}

#[test]
fn cached_archive_is_reused_on_install() {
    let device = FakeDevice::new();
    device.add_file(&format!("{STAGING}/frida-server-{TAG}.xz"), 1024, false);

    block_on(installer::ensure_installed(
        &device,
        &FakeFeed::Tag(TAG),
        &RecordingReporter::default(),
        &mut session(),
        &test_config(),
        None,
    ))
    .unwrap();

    assert!(!device.kinds().contains(&"download"));
    assert!(device.has_file(&path("adirf27042/frida-server")));
}

#[test]
fn update_refuses_while_running() {
    let device = FakeDevice::new()
        .with_install("adirf27042", "frida-server")
        .with_running(&path("adirf27042/frida-server"), "27042");

    let err = block_on(installer::update(
        &device,
        &FakeFeed::Tag(TAG),
        &RecordingReporter::default(),
        &mut session(),
        &test_config(),
    ))
    .unwrap_err();

    assert!(matches!(agent_error(&err), AgentError::PreconditionFailure(_)));
    assert_eq!(device.mutation_count(), 0);
}

#[test]
fn update_forces_download_and_keeps_custom_name() {
    let device = FakeDevice::new().with_install("adirf27042", "agent2");
    device.add_file(&format!("{STAGING}/frida-server-{TAG}.xz"), 1024, false);

    let (binary, version) = block_on(installer::update(
        &device,
        &FakeFeed::Tag(TAG),
        &RecordingReporter::default(),
        &mut session(),
        &test_config(),
    ))
    .unwrap();

    assert_eq!(version, TAG);
    assert_eq!(binary.path(), path("adirf27042/agent2"));
    assert!(device.kinds().contains(&"download"));
    assert_eq!(device.tree(), ["adirf27042", "adirf27042/agent2"]);
}

#[test]
fn failed_update_keeps_installed_binary() {
    let device = FakeDevice::new().with_install("adirf27042", "frida-server");
    device.fail("download");

    let err = block_on(installer::update(
        &device,
        &FakeFeed::Tag(TAG),
        &RecordingReporter::default(),
        &mut session(),
        &test_config(),
    ))
    .unwrap_err();

    assert!(matches!(agent_error(&err), AgentError::DownloadFailure { .. }));
    assert!(device.is_executable(&path("adirf27042/frida-server")));
    assert_eq!(device.tree(), ["adirf27042", "adirf27042/frida-server"]);
}

#[test]
fn installed_version_reads_binary_output() {
    let device = FakeDevice::new().with_install("adirf27042", "frida-server");
    let binary = adirf_cli::domain::agent::WorkingDirectory::for_port(
        BASE,
        &"27042".parse().unwrap(),
    )
    .binary(&BinaryName::standard());

    let version = block_on(installer::installed_version(&device, &binary));
    assert_eq!(version.as_deref(), Some(crate::helpers::VERSION_OUTPUT));
}

#[test]
fn install_under_new_name_renames_existing_binary() {
    let device = FakeDevice::new().with_install("adirf27042", "custom-agent");
    let reporter = RecordingReporter::default();
    let mut session = session();
    let name = BinaryName::parse("agent2").unwrap();

    let (binary, outcome) = block_on(installer::ensure_installed(
        &device,
        &FakeFeed::Unreachable,
        &reporter,
        &mut session,
        &test_config(),
        Some(&name),
    ))
    .unwrap();

    assert_eq!(
        outcome,
        InstallOutcome::Renamed {
            from: BinaryName::parse("custom-agent").unwrap()
        }
    );
    assert_eq!(binary.path(), path("adirf27042/agent2"));
    assert_eq!(device.tree(), ["adirf27042", "adirf27042/agent2"]);
    assert!(device.is_executable(&binary.path()));
    assert!(!device.kinds().contains(&"download"));
    assert_eq!(session.binary_name(), Some(&name));
}

#[test]
fn install_under_new_name_refuses_while_running() {
    let device = FakeDevice::new()
        .with_install("adirf27042", "custom-agent")
        .with_running(&path("adirf27042/custom-agent"), "27042");
    let name = BinaryName::parse("agent2").unwrap();

    let err = block_on(installer::ensure_installed(
        &device,
        &FakeFeed::Tag(TAG),
        &RecordingReporter::default(),
        &mut session(),
        &test_config(),
        Some(&name),
    ))
    .unwrap_err();

    assert!(matches!(agent_error(&err), AgentError::PreconditionFailure(_)));
    assert_eq!(device.tree(), ["adirf27042", "adirf27042/custom-agent"]);
}

#[test]
fn truncated_cached_archive_is_downloaded_again() {
    let device = FakeDevice::new();
    device.add_truncated_archive(&format!("{STAGING}/frida-server-{TAG}.xz"), 17);
    let reporter = RecordingReporter::default();

    let (binary, outcome) = block_on(installer::ensure_installed(
        &device,
        &FakeFeed::Tag(TAG),
        &reporter,
        &mut session(),
        &test_config(),
        None,
    ))
    .unwrap();

    assert_eq!(outcome, InstallOutcome::Downloaded { version: TAG.to_string() });
    assert!(device.is_executable(&binary.path()));
    assert_eq!(device.kinds().iter().filter(|k| **k == "download").count(), 1);
    assert!(reporter.warnings.borrow().iter().any(|w| w.contains("unusable")));
}

#[test]
fn extraction_failure_names_the_cause() {
    let device = FakeDevice::new();
    device.fail("decompress");

    let err = block_on(installer::ensure_installed(
        &device,
        &FakeFeed::Tag(TAG),
        &RecordingReporter::default(),
        &mut session(),
        &test_config(),
        None,
    ))
    .unwrap_err();

    match agent_error(&err) {
        AgentError::DownloadFailure { reason, .. } => {
            assert!(reason.contains("extraction failed"), "reason: {reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(device.kinds().iter().filter(|k| **k == "download").count(), 1);
    assert!(!device.has_file(&path("adirf27042/frida-server")));
}
