use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use super::*;
use crate::config::SimConfig;
use crate::game::Game;

fn make_test_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

fn advanced_game(seed: u64) -> Game {
    let mut game = Game::new_arena(seed, SimConfig::default());
    game.advance(60);
    game
}

fn rewrite_lines(path: &Path, edit: impl FnOnce(&mut Vec<String>)) {
    let content = fs::read_to_string(path).unwrap();
    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    edit(&mut lines);
    let mut rewritten = lines.join("\n");
    rewritten.push('\n');
    fs::write(path, rewritten).unwrap();
}

#[test]
fn snapshot_survives_save_and_load() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "nested/run.json");
    let game = advanced_game(17);

    save_snapshot(&path, &game.snapshot()).unwrap();
    let loaded = load_snapshot_from_file(&path).unwrap();

    assert_eq!(loaded.seed, 17);
    assert_eq!(loaded.format_version, SNAPSHOT_FORMAT_VERSION);
    assert_eq!(Game::from_snapshot(loaded).snapshot_hash(), game.snapshot_hash());
}

#[test]
fn tampered_body_fails_the_digest() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "tampered.json");
    save_snapshot(&path, &advanced_game(17).snapshot()).unwrap();

    rewrite_lines(&path, |lines| {
        assert!(lines[1].contains("\"seed\":17"));
        lines[1] = lines[1].replacen("\"seed\":17", "\"seed\":18", 1);
    });

    assert!(matches!(load_snapshot_from_file(&path), Err(SnapshotLoadError::DigestMismatch)));
}

#[test]
fn header_seed_must_match_the_body() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "mismatch.json");
    save_snapshot(&path, &advanced_game(17).snapshot()).unwrap();

    rewrite_lines(&path, |lines| {
        lines[0] = lines[0].replacen("\"seed\":17", "\"seed\":99", 1);
    });

    assert!(matches!(
        load_snapshot_from_file(&path),
        Err(SnapshotLoadError::HeaderMismatch { .. })
    ));
}

#[test]
fn unknown_format_version_is_rejected() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "future.json");
    save_snapshot(&path, &advanced_game(3).snapshot()).unwrap();

    rewrite_lines(&path, |lines| {
        lines[0] = lines[0].replacen("\"format_version\":1", "\"format_version\":9", 1);
    });

    assert!(matches!(
        load_snapshot_from_file(&path),
        Err(SnapshotLoadError::UnsupportedVersion { found: 9 })
    ));
}

#[test]
fn missing_trailing_newline_is_incomplete() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "cut.json");
    save_snapshot(&path, &advanced_game(3).snapshot()).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    fs::write(&path, content.trim_end()).unwrap();

    assert!(matches!(
        load_snapshot_from_file(&path),
        Err(SnapshotLoadError::IncompleteLine { line: 2 })
    ));
}

#[test]
fn empty_file_returns_error() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "empty.json");
    fs::write(&path, "").unwrap();
    assert!(matches!(load_snapshot_from_file(&path), Err(SnapshotLoadError::EmptyFile)));
}

#[test]
fn invalid_header_returns_error() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "garbage.json");
    fs::write(&path, "not json\n{}\n").unwrap();
    assert!(matches!(
        load_snapshot_from_file(&path),
        Err(SnapshotLoadError::InvalidHeader { .. })
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let path = make_test_path(dir.path(), "absent.json");
    assert!(matches!(load_snapshot_from_file(&path), Err(SnapshotLoadError::Io(_))));
}
