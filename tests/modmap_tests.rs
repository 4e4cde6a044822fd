//! Loading modmap files from disk and resolving scan codes through them.

use key_mon::modmap::{read_mod_map_safely, ConfigError, LineError, ModTable};
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

#[test]
fn test_every_declared_code_resolves_to_its_labels() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(temp_dir.path(), "sample.kbd", SAMPLE_KBD);

    let table = ModTable::load(&path).expect("sample modmap should load");
    assert_eq!(table.len(), 4);
    assert!(table.warnings().is_empty());

    for entry in table.entries() {
        let resolved = table.lookup(entry.scan_code, "");
        assert_eq!(resolved.code, entry.symbolic_name);
        assert_eq!(resolved.medium_label, entry.medium_label);
        assert_eq!(resolved.short_label, entry.short_label);
        assert!(resolved.mapped);
    }
    assert_eq!(table.lookup(44, "KEY_Z").as_tuple(), ("KEY_Z", "Z", "z"));
}

#[test]
fn test_single_entry_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(temp_dir.path(), "a.kbd", "30;KEY_A;A;A\n");

    let table = ModTable::load(&path).unwrap();
    assert_eq!(table.lookup(30, "KEY_A").as_tuple(), ("KEY_A", "A", "A"));
}

#[test]
fn test_empty_file_falls_back_to_binding_name() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(temp_dir.path(), "empty.kbd", "");

    let table = ModTable::load(&path).unwrap();
    assert!(table.is_empty());
    let resolved = table.lookup(999, "KEY_Z");
    assert_eq!(resolved.as_tuple(), ("KEY_Z", "Z", "Z"));
    assert!(!resolved.mapped);
}

#[test]
fn test_unknown_codes_never_come_back_empty() {
    let table = ModTable::parse(SAMPLE_KBD);
    for (code, fallback) in [(999, "KEY_Z"), (1000, ""), (5, "f13"), (6, "  ")] {
        let resolved = table.lookup(code, fallback);
        assert!(!resolved.code.is_empty());
        assert!(!resolved.medium_label.is_empty());
        assert!(!resolved.short_label.is_empty());
    }
}

#[test]
fn test_one_malformed_line_among_valid_ones() {
    let temp_dir = TempDir::new().unwrap();
    let content = format!("{SAMPLE_KBD}thirty;KEY_Q;Q;Q\n");
    let path = write_file(temp_dir.path(), "broken.kbd", &content);

    let table = ModTable::load(&path).unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(table.warnings().len(), 1);
    assert_eq!(table.warnings()[0].line, 6);
    assert_eq!(
        table.warnings()[0].error,
        LineError::BadScanCode("thirty".to_string())
    );
}

#[test]
fn test_missing_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = ModTable::load(&temp_dir.path().join("nope.kbd")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }));
    assert!(err.to_string().contains("nope.kbd"));
}

#[test]
fn test_safe_read_without_candidates_is_empty() {
    let table = read_mod_map_safely(None, &[]);
    assert!(table.is_empty());
    assert_eq!(table.lookup(30, "KEY_A").as_tuple(), ("KEY_A", "A", "A"));
}

#[test]
fn test_safe_read_uses_override_over_candidates() {
    let temp_dir = TempDir::new().unwrap();
    let candidate = write_file(temp_dir.path(), "a.kbd", "30;KEY_A;A;A\n");
    let override_path = write_file(temp_dir.path(), "b.kbd", "30;KEY_Q;Q;Q\n");

    let table = read_mod_map_safely(Some(&override_path), &[candidate]);
    assert_eq!(table.lookup(30, "").code, "KEY_Q");
}
