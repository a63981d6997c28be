//! Property-based tests for target resolution and backup naming.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use otelcol_installer::domain::backup::{
    backup_file_name, first_free_backup_name, is_backup_file_name,
};
use otelcol_installer::domain::options::normalize_version;
use otelcol_installer::domain::platform::{artifact_filename, resolve_target};
use otelcol_installer::domain::{Architecture, PackageStrategy, PlatformError, PlatformFacts};

fn timestamp() -> impl Strategy<Value = NaiveDateTime> {
    (2000i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60).prop_map(
        |(y, mo, d, h, mi, s)| {
            NaiveDate::from_ymd_opt(y, mo, d)
                .unwrap()
                .and_hms_opt(h, mi, s)
                .unwrap()
        },
    )
}

// ============================================================================
// Artifact naming
// ============================================================================

proptest! {
    /// Every (strategy, architecture) pair names a different artifact.
    #[test]
    fn prop_artifact_names_are_unique_per_pair(
        major in 0u32..5,
        minor in 0u32..300,
        patch in 0u32..20,
    ) {
        let version = format!("{major}.{minor}.{patch}");
        let mut names = HashSet::new();
        for strategy in [PackageStrategy::NativeDeb, PackageStrategy::NativeRpm, PackageStrategy::Archive] {
            for arch in [Architecture::Amd64, Architecture::Arm64] {
                let name = artifact_filename(&version, arch, strategy);
                prop_assert!(name.starts_with("otelcol-contrib_"), "bad prefix: {}", name);
                prop_assert!(name.contains(&version), "version missing: {}", name);
                prop_assert!(names.insert(name));
            }
        }
        prop_assert_eq!(names.len(), 6);
    }

    /// Machines outside the supported set never resolve.
    #[test]
    fn prop_unknown_machines_are_rejected(machine in "[a-z0-9_]{1,12}") {
        let lowered = machine.to_ascii_lowercase();
        prop_assume!(!matches!(lowered.as_str(), "x86_64" | "amd64" | "aarch64" | "arm64"));
        let facts = PlatformFacts {
            kernel: "linux".to_string(),
            machine: machine.clone(),
            os_release: None,
        };
        let result = resolve_target(&facts, "0.126.0", "https://mirror.test");
        let is_unsupported_arch = matches!(result, Err(PlatformError::UnsupportedArchitecture { .. }));
        prop_assert!(is_unsupported_arch, "resolved {}", machine);
    }

    /// A leading `v` never reaches the artifact name.
    #[test]
    fn prop_normalized_version_has_no_v_prefix(version in "[vV]?[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}") {
        let normalized = normalize_version(&version);
        prop_assert!(!normalized.starts_with(['v', 'V']));
        prop_assert!(version.ends_with(&normalized));
    }
}

// ============================================================================
// Backup naming
// ============================================================================

proptest! {
    /// Generated names are recognized as backups.
    #[test]
    fn prop_backup_names_are_recognized(at in timestamp(), attempt in 0u32..1000) {
        let name = backup_file_name(at, attempt);
        prop_assert!(is_backup_file_name(&name), "not recognized: {}", name);
    }

    /// Repeated backups within one second never reuse a name.
    #[test]
    fn prop_backups_never_collide(at in timestamp(), count in 1usize..20) {
        let mut taken: HashSet<String> = HashSet::new();
        for _ in 0..count {
            let name = first_free_backup_name(at, |n| taken.contains(n));
            prop_assert!(!taken.contains(&name));
            taken.insert(name);
        }
        prop_assert_eq!(taken.len(), count);
    }

    /// The live configuration file name is never mistaken for a backup.
    #[test]
    fn prop_other_yaml_names_are_not_backups(stem in "[a-z]{1,10}") {
        let name = format!("{stem}.yaml");
        prop_assert!(!is_backup_file_name(&name));
    }
}
