use super::*;
use crate::core::ModpinError;
use crate::test_utils::{FixtureRepo, init_test_logging};
use tempfile::TempDir;

#[test]
fn test_git_is_available() {
    assert!(is_git_installed());
}

#[tokio::test]
async fn test_list_remote_refs_local_fixture() {
    init_test_logging(None);
    let fixture = FixtureRepo::new().unwrap();

    let listing = SystemGit::default().list_remote_refs(&fixture.file_url()).await.unwrap();

    assert!(listing.contains("ref: refs/heads/main\tHEAD"));
    assert!(listing.contains("refs/heads/release-1.x"));
    assert!(listing.contains("refs/tags/v1.0.0"));
    assert!(listing.contains(&fixture.head_commit));
}

#[tokio::test]
async fn test_list_remote_refs_missing_repository_fails() {
    let temp = TempDir::new().unwrap();
    let url = format!("file://{}", temp.path().join("nope").display());

    let err = SystemGit::default().list_remote_refs(&url).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<ModpinError>(), Some(ModpinError::GitCommandError { .. })));
}

#[tokio::test]
async fn test_resolve_commit_finds_historic_commit() {
    let fixture = FixtureRepo::new().unwrap();
    let workdir = TempDir::new().unwrap();

    let found = SystemGit::default()
        .resolve_commit(&fixture.file_url(), &fixture.first_commit, workdir.path())
        .await
        .unwrap();
    assert!(found);
}

#[tokio::test]
async fn test_resolve_commit_abbreviated_hash() {
    let fixture = FixtureRepo::new().unwrap();
    let workdir = TempDir::new().unwrap();

    let found = SystemGit::default()
        .resolve_commit(&fixture.file_url(), &fixture.first_commit[..12], workdir.path())
        .await
        .unwrap();
    assert!(found);
}

#[tokio::test]
async fn test_resolve_commit_unknown_hash() {
    let fixture = FixtureRepo::new().unwrap();
    let workdir = TempDir::new().unwrap();

    let found = SystemGit::default()
        .resolve_commit(
            &fixture.file_url(),
            "0000000000000000000000000000000000000001",
            workdir.path(),
        )
        .await
        .unwrap();
    assert!(!found);
}

#[tokio::test]
async fn test_resolve_commit_clone_failure_is_error() {
    let temp = TempDir::new().unwrap();
    let workdir = TempDir::new().unwrap();
    let url = format!("file://{}", temp.path().join("missing").display());

    let err = SystemGit::default().resolve_commit(&url, "abc123", workdir.path()).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<ModpinError>(), Some(ModpinError::GitCloneFailed { .. })));
}
