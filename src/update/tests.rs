use super::*;
use crate::location::DistributionLayout;

#[test]
fn selector_picks_vcs_when_probe_succeeds() {
    assert_eq!(
        UpdateStrategy::detect_with(|_| true),
        UpdateStrategy::Vcs
    );
}

#[test]
fn selector_picks_archive_when_probe_fails() {
    assert_eq!(
        UpdateStrategy::detect_with(|_| false),
        UpdateStrategy::Archive
    );
}

#[test]
fn selector_ignores_everything_but_the_probe() {
    // Selection is a pure function of client availability; it never
    // inspects the distribution directory.
    let chosen = UpdateStrategy::detect_with(|cmd| {
        assert!(cmd.starts_with("git"));
        false
    });
    assert_eq!(chosen, UpdateStrategy::Archive);
}

#[test]
fn outcome_success_predicate() {
    let ok = UpdateOutcome::Success {
        strategy: UpdateStrategy::Vcs,
        revision: Some("abc".to_string()),
    };
    assert!(ok.is_success());

    let failed = UpdateOutcome::DownloadFailed {
        url: "https://example.invalid/x.zip".to_string(),
        reason: "connection refused".to_string(),
    };
    assert!(!failed.is_success());
}

#[tokio::test]
async fn run_update_requires_distribution_directory() {
    let temp = tempfile::tempdir().unwrap();
    // Script dir four levels deep so the derived root is inside the
    // temp dir, with no Writing3D directory present.
    let script_dir = temp.path().join("Writing3D").join("extras").join("updater");
    let layout = DistributionLayout::from_script_dir(&script_dir);

    let opts = UpdateOptions {
        branch: "master".to_string(),
        archive_url: None,
        skip_backup: false,
        strategy: None,
    };

    let err = run_update(&layout, &opts).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<crate::core::UpdaterError>(),
        Some(crate::core::UpdaterError::DistributionMissing { .. })
    ));
}

#[test]
fn strategy_display_names() {
    assert_eq!(UpdateStrategy::Vcs.to_string(), "git");
    assert_eq!(UpdateStrategy::Archive.to_string(), "archive");
}
