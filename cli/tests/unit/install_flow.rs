//! End-to-end tests for the install and uninstall flows, wired with
//! recording doubles and a scratch host root.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use otelcol_installer::application::services::install_flow::{
    InstallDeps, InstallSummary, run_install, run_uninstall,
};
use otelcol_installer::application::services::installer::InstallOutcome;
use otelcol_installer::domain::{
    ConfigSource, FetchError, PackageManager, PlatformError, PlatformFacts, RunOptions, Step,
};
use otelcol_installer::infra::archive::TarGzUnpacker;
use otelcol_installer::infra::fs::LocalFs;

use crate::helpers::{
    ARCH_OS_RELEASE, FirstBackupFailsFs, FixedClock, FixedPlatform, RecordingReporter, RecordingRunner, Reply,
    Sandbox, StubTransport, TEST_CONFIG, TestAssets, UBUNTU_OS_RELEASE, bare_host, mode_of,
    release_archive,
};

const BASE: &str = "https://mirror.test/releases";
const DEB_URL: &str =
    "https://mirror.test/releases/v0.126.0/otelcol-contrib_0.126.0_linux_amd64.deb";
const TAR_URL: &str =
    "https://mirror.test/releases/v0.126.0/otelcol-contrib_0.126.0_linux_amd64.tar.gz";
const MANIFEST_URL: &str =
    "https://mirror.test/releases/v0.126.0/opentelemetry-collector-releases_otelcol-contrib_checksums.txt";
const CONFIG_URL: &str = "https://cfg.test/collector.yaml";

fn options() -> RunOptions {
    RunOptions {
        download_base_url: BASE.to_string(),
        ..RunOptions::default()
    }
}

/// Default configuration the collector package ships.
const PACKAGED_CONFIG: &[u8] = b"# otelcol-contrib package default\n";

/// A Debian host where systemd answers but nothing is registered. `dpkg -i`
/// lays down the unit and the packaged default configuration.
fn debian_runner(sb: &Sandbox) -> RecordingRunner {
    let package_files = vec![
        (sb.layout.unit_paths[0].clone(), b"[Unit]\n".as_slice()),
        (sb.layout.config_path.clone(), PACKAGED_CONFIG),
    ];
    RecordingRunner::new()
        .on("dpkg -i", Reply::Lay(package_files))
        .on("systemctl list-unit-files", Reply::Ok(b""))
        .on("systemctl", Reply::Ok(b""))
        .on("rpm", Reply::NotFound)
}

async fn install_with(
    sb: &Sandbox,
    runner: &RecordingRunner,
    http: &StubTransport,
    platform: &FixedPlatform,
    options: &RunOptions,
    reporter: &RecordingReporter,
) -> anyhow::Result<InstallSummary> {
    let deps = InstallDeps {
        runner,
        http,
        fs: &LocalFs,
        unpacker: &TarGzUnpacker,
        platform,
        clock: &FixedClock::default(),
        assets: &TestAssets,
    };
    run_install(&deps, &sb.layout, options, &sb.work, reporter).await
}

#[tokio::test]
async fn test_debian_host_installs_deb_with_dpkg() {
    let sb = Sandbox::new();
    let runner = debian_runner(&sb);
    let http = StubTransport::new().serve(DEB_URL, 200, b"deb-bytes");
    let platform = FixedPlatform::linux("x86_64", Some(UBUNTU_OS_RELEASE));

    let summary = install_with(&sb, &runner, &http, &platform, &options(), &RecordingReporter::new())
        .await
        .unwrap();

    let deb = sb.work.join("otelcol-contrib_0.126.0_linux_amd64.deb");
    assert!(runner.calls().contains(&format!("dpkg -i {}", deb.display())));
    assert_eq!(http.requests(), vec![DEB_URL.to_string()]);
    assert_eq!(summary.outcome, InstallOutcome::Package { manager: PackageManager::Dpkg });
    assert_eq!(summary.bytes_downloaded, 9);
    assert!(summary.config.is_none(), "packaged config left alone by default");
    assert_eq!(std::fs::read(&sb.layout.config_path).unwrap(), PACKAGED_CONFIG);
    assert!(summary.warnings.is_empty(), "{:?}", summary.warnings);
}

#[tokio::test]
async fn test_unsupported_platform_touches_nothing() {
    let sb = Sandbox::new();
    let runner = bare_host();
    let http = StubTransport::new();
    let platform = FixedPlatform(PlatformFacts {
        kernel: "Darwin".to_string(),
        machine: "arm64".to_string(),
        os_release: None,
    });

    let err = install_with(&sb, &runner, &http, &platform, &options(), &RecordingReporter::new())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("platform detection failed"));
    assert!(matches!(
        err.downcast_ref::<PlatformError>(),
        Some(PlatformError::UnsupportedOs { .. })
    ));
    assert!(runner.calls().is_empty());
    assert!(http.requests().is_empty());
    assert!(sb.snapshot().is_empty());
}

#[tokio::test]
async fn test_unsupported_architecture_touches_nothing() {
    let sb = Sandbox::new();
    let runner = bare_host();
    let http = StubTransport::new();
    let platform = FixedPlatform::linux("riscv64", Some(UBUNTU_OS_RELEASE));

    let err = install_with(&sb, &runner, &http, &platform, &options(), &RecordingReporter::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PlatformError>(),
        Some(PlatformError::UnsupportedArchitecture { .. })
    ));
    assert!(runner.calls().is_empty());
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_download_failure_aborts_before_install() {
    let sb = Sandbox::new();
    let runner = debian_runner(&sb);
    let http = StubTransport::new().serve(DEB_URL, 404, b"Not Found");
    let platform = FixedPlatform::linux("x86_64", Some(UBUNTU_OS_RELEASE));

    let err = install_with(&sb, &runner, &http, &platform, &options(), &RecordingReporter::new())
        .await
        .unwrap_err();

    let rendered = format!("{err:#}");
    assert!(rendered.contains("download failed"), "{rendered}");
    assert!(rendered.contains("strategy=native-deb"), "{rendered}");
    assert!(matches!(
        err.downcast_ref::<FetchError>(),
        Some(FetchError::Status { status: 404, .. })
    ));
    assert!(!runner.called("dpkg -i"));
}

#[tokio::test]
async fn test_transport_failure_names_the_url_once() {
    let sb = Sandbox::new();
    let runner = debian_runner(&sb);
    let http = StubTransport::new();
    let platform = FixedPlatform::linux("x86_64", Some(UBUNTU_OS_RELEASE));

    let err = install_with(&sb, &runner, &http, &platform, &options(), &RecordingReporter::new())
        .await
        .unwrap_err();

    let rendered = format!("{err:#}");
    assert_eq!(rendered.matches(DEB_URL).count(), 1, "{rendered}");
    assert!(rendered.contains("connection refused"), "{rendered}");
}

#[tokio::test]
async fn test_unknown_distro_places_archive_binary() {
    let sb = Sandbox::new();
    let runner = bare_host();
    let http = StubTransport::new().serve(TAR_URL, 200, &release_archive());
    let platform = FixedPlatform::linux("x86_64", Some(ARCH_OS_RELEASE));
    let reporter = RecordingReporter::new();

    let summary = install_with(&sb, &runner, &http, &platform, &options(), &reporter)
        .await
        .unwrap();

    assert_eq!(
        summary.outcome,
        InstallOutcome::Archive { binary_path: sb.layout.binary_path.clone() }
    );
    assert_eq!(mode_of(&sb.layout.binary_path), 0o755);
    assert!(sb.layout.unit_paths.iter().all(|p| !p.exists()));
    assert!(summary.warnings.iter().any(|w| w.contains("no service unit")));
}

#[tokio::test]
async fn test_repeated_install_converges_to_same_state() {
    let sb = Sandbox::new();
    let http = StubTransport::new().serve(TAR_URL, 200, &release_archive());
    let platform = FixedPlatform::linux("x86_64", Some(ARCH_OS_RELEASE));

    install_with(&sb, &bare_host(), &http, &platform, &options(), &RecordingReporter::new())
        .await
        .unwrap();
    let first = sb.snapshot();
    let summary = install_with(&sb, &bare_host(), &http, &platform, &options(), &RecordingReporter::new())
        .await
        .unwrap();

    assert_eq!(sb.snapshot(), first);
    assert_eq!(summary.removal.paths_removed, vec![sb.layout.binary_path.clone()]);
}

#[tokio::test]
async fn test_replace_config_backs_up_exactly_once() {
    let sb = Sandbox::new();
    sb.put(&sb.layout.config_path, b"old: config\n");
    let runner = debian_runner(&sb);
    let http = StubTransport::new()
        .serve(DEB_URL, 200, b"deb-bytes")
        .serve(CONFIG_URL, 200, TEST_CONFIG);
    let platform = FixedPlatform::linux("x86_64", Some(UBUNTU_OS_RELEASE));
    let opts = RunOptions {
        replace_config: true,
        config_source: ConfigSource::Url(CONFIG_URL.to_string()),
        ..options()
    };

    let summary = install_with(&sb, &runner, &http, &platform, &opts, &RecordingReporter::new())
        .await
        .unwrap();

    assert_eq!(sb.backups(), vec!["config_20250601_123045.yaml"]);
    assert_eq!(
        std::fs::read(sb.layout.config_dir.join("config_20250601_123045.yaml")).unwrap(),
        b"old: config\n"
    );
    assert_eq!(std::fs::read(&sb.layout.config_path).unwrap(), TEST_CONFIG);
    let applied = summary.config.unwrap();
    assert!(applied.backup.is_none(), "remover already took the backup");
    assert!(applied.replaced_packaged_default);
    assert_eq!(
        summary.removal.config_backup,
        Some(sb.layout.config_dir.join("config_20250601_123045.yaml"))
    );
}

#[tokio::test]
async fn test_config_kept_by_remover_is_backed_up_before_replacement() {
    let sb = Sandbox::new();
    sb.put(&sb.layout.config_path, b"operator: true\n");
    let runner = debian_runner(&sb);
    let http = StubTransport::new()
        .serve(DEB_URL, 200, b"deb-bytes")
        .serve(CONFIG_URL, 200, TEST_CONFIG);
    let platform = FixedPlatform::linux("x86_64", Some(UBUNTU_OS_RELEASE));
    let fs = FirstBackupFailsFs::default();
    let deps = InstallDeps {
        runner: &runner,
        http: &http,
        fs: &fs,
        unpacker: &TarGzUnpacker,
        platform: &platform,
        clock: &FixedClock::default(),
        assets: &TestAssets,
    };
    let opts = RunOptions {
        replace_config: true,
        config_source: ConfigSource::Url(CONFIG_URL.to_string()),
        ..options()
    };

    let summary = run_install(&deps, &sb.layout, &opts, &sb.work, &RecordingReporter::new())
        .await
        .unwrap();

    assert!(summary.removal.config_kept);
    let applied = summary.config.unwrap();
    assert!(!applied.replaced_packaged_default);
    assert_eq!(
        applied.backup,
        Some(sb.layout.config_dir.join("config_20250601_123045.yaml"))
    );
    assert_eq!(
        std::fs::read(applied.backup.unwrap()).unwrap(),
        b"operator: true\n"
    );
    assert_eq!(std::fs::read(&sb.layout.config_path).unwrap(), TEST_CONFIG);
    assert!(summary.warnings.iter().any(|w| w.contains("no space left")));
}

#[tokio::test]
async fn test_bundled_config_is_installed_on_archive_host() {
    let sb = Sandbox::new();
    let http = StubTransport::new().serve(TAR_URL, 200, &release_archive());
    let platform = FixedPlatform::linux("x86_64", Some(ARCH_OS_RELEASE));
    let opts = RunOptions {
        replace_config: true,
        ..options()
    };

    install_with(&sb, &bare_host(), &http, &platform, &opts, &RecordingReporter::new())
        .await
        .unwrap();

    assert_eq!(std::fs::read(&sb.layout.config_path).unwrap(), TEST_CONFIG);
    assert_eq!(mode_of(&sb.layout.config_path), 0o644);
}

#[tokio::test]
async fn test_empty_config_document_is_a_warning() {
    let sb = Sandbox::new();
    let runner = debian_runner(&sb);
    let http = StubTransport::new()
        .serve(DEB_URL, 200, b"deb-bytes")
        .serve(CONFIG_URL, 200, b"");
    let platform = FixedPlatform::linux("x86_64", Some(UBUNTU_OS_RELEASE));
    let opts = RunOptions {
        replace_config: true,
        config_source: ConfigSource::Url(CONFIG_URL.to_string()),
        ..options()
    };
    let reporter = RecordingReporter::new();

    let summary = install_with(&sb, &runner, &http, &platform, &opts, &reporter)
        .await
        .unwrap();

    assert!(summary.warnings.iter().any(|w| w.contains("empty")));
    assert!(reporter.warnings().iter().any(|w| w.contains("empty")));
    assert!(sb.layout.config_path.exists());
}

#[tokio::test]
async fn test_config_fetch_failure_aborts_before_install() {
    let sb = Sandbox::new();
    let runner = debian_runner(&sb);
    let http = StubTransport::new().serve(DEB_URL, 200, b"deb-bytes");
    let platform = FixedPlatform::linux("x86_64", Some(UBUNTU_OS_RELEASE));
    let opts = RunOptions {
        replace_config: true,
        config_source: ConfigSource::Url(CONFIG_URL.to_string()),
        ..options()
    };

    let err = install_with(&sb, &runner, &http, &platform, &opts, &RecordingReporter::new())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("configuration fetch failed"));
    assert!(!runner.called("dpkg -i"));
    assert!(!sb.layout.config_path.exists());
}

#[tokio::test]
async fn test_checksum_mismatch_aborts_before_install() {
    let sb = Sandbox::new();
    let runner = debian_runner(&sb);
    let manifest = format!("{}  otelcol-contrib_0.126.0_linux_amd64.deb\n", "a".repeat(64));
    let http = StubTransport::new()
        .serve(DEB_URL, 200, b"deb-bytes")
        .serve(MANIFEST_URL, 200, manifest.as_bytes());
    let platform = FixedPlatform::linux("x86_64", Some(UBUNTU_OS_RELEASE));
    let opts = RunOptions {
        verify_checksum: true,
        ..options()
    };

    let err = install_with(&sb, &runner, &http, &platform, &opts, &RecordingReporter::new())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("checksum verification failed"));
    assert!(matches!(
        err.downcast_ref::<FetchError>(),
        Some(FetchError::ChecksumMismatch { .. })
    ));
    assert!(!runner.called("dpkg -i"));
}

#[tokio::test]
async fn test_start_after_package_install_enables_unit() {
    let sb = Sandbox::new();
    let runner = debian_runner(&sb);
    let http = StubTransport::new().serve(DEB_URL, 200, b"deb-bytes");
    let platform = FixedPlatform::linux("x86_64", Some(UBUNTU_OS_RELEASE));
    let opts = RunOptions {
        start_service: true,
        ..options()
    };

    let summary = install_with(&sb, &runner, &http, &platform, &opts, &RecordingReporter::new())
        .await
        .unwrap();

    assert_eq!(summary.service_started, Some(true));
    let calls = runner.calls();
    let install = calls.iter().position(|c| c.starts_with("dpkg -i")).unwrap();
    let enable = calls
        .iter()
        .position(|c| c == "systemctl enable --now otelcol-contrib.service")
        .unwrap();
    assert!(install < enable);
}

#[tokio::test]
async fn test_start_after_archive_install_is_a_warning() {
    let sb = Sandbox::new();
    let runner = bare_host();
    let http = StubTransport::new().serve(TAR_URL, 200, &release_archive());
    let platform = FixedPlatform::linux("x86_64", Some(ARCH_OS_RELEASE));
    let opts = RunOptions {
        start_service: true,
        ..options()
    };

    let summary = install_with(&sb, &runner, &http, &platform, &opts, &RecordingReporter::new())
        .await
        .unwrap();

    assert_eq!(summary.service_started, Some(false));
    assert!(summary.warnings.iter().any(|w| w.contains("no unit file")));
    assert!(!runner.called("systemctl enable"));
}

#[tokio::test]
async fn test_phases_are_reported_in_order() {
    let sb = Sandbox::new();
    let runner = debian_runner(&sb);
    let http = StubTransport::new().serve(DEB_URL, 200, b"deb-bytes");
    let platform = FixedPlatform::linux("x86_64", Some(UBUNTU_OS_RELEASE));
    let opts = RunOptions {
        replace_config: true,
        start_service: true,
        ..options()
    };
    let reporter = RecordingReporter::new();

    install_with(&sb, &runner, &http, &platform, &opts, &reporter)
        .await
        .unwrap();

    assert_eq!(
        reporter.phases(),
        vec![
            Step::Probe,
            Step::Remove,
            Step::Fetch,
            Step::Install,
            Step::Configure,
            Step::Service
        ]
    );
}

#[tokio::test]
async fn test_odd_version_string_is_tried_with_a_warning() {
    let sb = Sandbox::new();
    let url = "https://mirror.test/releases/v0.126.0-rc1/otelcol-contrib_0.126.0-rc1_linux_amd64.tar.gz";
    let http = StubTransport::new().serve(url, 200, &release_archive());
    let platform = FixedPlatform::linux("x86_64", Some(ARCH_OS_RELEASE));
    let opts = RunOptions {
        requested_version: "0.126.0-rc1".to_string(),
        ..options()
    };

    let summary = install_with(&sb, &bare_host(), &http, &platform, &opts, &RecordingReporter::new())
        .await
        .unwrap();

    assert!(summary.warnings[0].contains("does not look like X.Y.Z"));
    assert_eq!(http.requests(), vec![url.to_string()]);
}

#[tokio::test]
async fn test_uninstall_on_clean_host_finds_nothing() {
    let sb = Sandbox::new();
    let reporter = RecordingReporter::new();

    let report = run_uninstall(&bare_host(), &LocalFs, &FixedClock::default(), &sb.layout, &reporter).await;

    assert!(report.found_nothing());
    assert_eq!(reporter.phases(), vec![Step::Remove]);
}
