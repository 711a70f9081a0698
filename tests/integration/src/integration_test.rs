//! End-to-end integration test for the vertical slice
//!
//! These tests exercise the complete flow: configuration -> path resolution ->
//! batch apply -> persisted bank registry and group ledger.

use bank_fs::AssetId;
use bank_manifest::PlatformManifest;
use bank_sync::SyncConfig;
use bank_test_utils::ImportTree;

/// Set up an import tree with a Windows manifest covering the init bank and
/// one localized music bank.
fn setup_tree() -> ImportTree {
    let tree = ImportTree::new();

    let mut manifest = PlatformManifest::new();
    manifest.declare_media("Init", "default", Vec::<String>::new());
    manifest.declare_media("Music", "English", ["804841978", "931784661"]);
    tree.write_manifest("Windows", &manifest);

    tree
}

#[test]
fn test_default_config_resolves_generated_tree() {
    let config = SyncConfig::parse("").unwrap();
    assert_eq!(config.import_root, "GeneratedSoundBanks");
    assert_eq!(config.bank_extension, "bnk");
    assert_eq!(config.media_extension, "wem");

    let layout = config.layout();

    // Two segments below the root: non-localized, language falls back.
    let init = layout
        .resolve(&bank_fs::AssetPath::new("GeneratedSoundBanks/Windows/Init.bnk"))
        .unwrap();
    assert_eq!(init.platform, "Windows");
    assert_eq!(init.language, "default");
    assert_eq!(init.name, "Init");

    // Three segments: the first sub-folder is the language.
    let music = layout
        .resolve(&bank_fs::AssetPath::new(
            "GeneratedSoundBanks/Windows/English/Music.bnk",
        ))
        .unwrap();
    assert_eq!(music.platform, "Windows");
    assert_eq!(music.language, "English");
    assert_eq!(music.name, "Music");

    // Paths outside the import root do not resolve.
    assert!(layout.resolve(&bank_fs::AssetPath::new("Other/Windows/Init.bnk")).is_none());
}

#[test]
fn test_full_vertical_slice() {
    let tree = setup_tree();
    let (mut engine, ledger) = tree.build_engine();

    // 1. Apply a generated batch: init bank, localized bank, streamed media.
    let init_bnk = tree.bank_path("Windows", None, "Init");
    let music_bnk = tree.bank_path("Windows", Some("English"), "Music");
    let music_wem = tree.media_path("Windows", Some("English"), "804841978");
    let added = vec![init_bnk.clone(), music_bnk.clone(), music_wem.clone()];

    let report = engine.apply(&added, &[]).unwrap();

    // 2. Verify the report counters.
    assert!(report.success());
    assert_eq!(report.banks_added, 2);
    assert_eq!(report.media_added, 1);
    assert_eq!(report.grouped, 3);
    assert_eq!(report.records_flushed, 2);

    // 3. Verify the in-memory registry state.
    {
        let handle = engine.records().find("Music").unwrap();
        let record = handle.lock().unwrap();
        let windows = record.platform("Windows").unwrap();
        assert!(windows.bank_assets.contains_key("English"));
        // The manifest is authoritative: both declared media ids are listed.
        assert_eq!(windows.media_ids("English"), vec!["804841978", "931784661"]);
    }

    // 4. Verify the persisted record documents.
    tree.assert_record_exists("Init");
    tree.assert_record_exists("Music");
    let reopened = tree.reopen_records();
    let handle = reopened.find("Music").unwrap();
    let record = handle.lock().unwrap();
    assert!(record.platform("Windows").is_some());

    // 5. Verify group assignment: regular files in the platform group, the
    //    init bank in its dedicated group.
    assert_eq!(
        ledger.group_of(&AssetId::for_path(&music_bnk)).as_deref(),
        Some("Data_Windows")
    );
    assert_eq!(
        ledger.group_of(&AssetId::for_path(&music_wem)).as_deref(),
        Some("Data_Windows")
    );
    assert_eq!(
        ledger.group_of(&AssetId::for_path(&init_bnk)).as_deref(),
        Some("Data_Windows_InitBank")
    );
}

#[test]
fn test_report_serializes_for_scripting() {
    let tree = setup_tree();
    let (mut engine, _ledger) = tree.build_engine();

    let added = vec![
        tree.bank_path("Windows", Some("English"), "Music"),
        tree.bank_path("Windows", Some("English"), "Ghost"),
    ];
    let report = engine.apply(&added, &[]).unwrap();

    let value = serde_json::to_value(&report).unwrap();
    assert!(value.get("batch_id").unwrap().is_string());
    assert_eq!(value.get("banks_added").unwrap(), 1);
    assert_eq!(value.get("media_added").unwrap(), 0);

    // The unknown bank surfaces as a structured diagnostic, not a failure.
    let diagnostics = value.get("diagnostics").unwrap().as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    let message = diagnostics[0].get("message").unwrap().as_str().unwrap();
    assert!(message.contains("Ghost"));
}

#[test]
fn test_state_survives_engine_restart() {
    let tree = setup_tree();

    {
        let (mut engine, _ledger) = tree.build_engine();
        let added = vec![tree.bank_path("Windows", Some("English"), "Music")];
        engine.apply(&added, &[]).unwrap();
    }

    // A fresh engine over the same tree sees the persisted record and
    // reports an idempotent re-apply.
    let (mut engine, ledger) = tree.build_engine();
    assert!(engine.records().find("Music").is_some());
    assert_eq!(
        ledger
            .group_of(&AssetId::for_path(&tree.bank_path("Windows", Some("English"), "Music")))
            .as_deref(),
        Some("Data_Windows")
    );

    let added = vec![tree.bank_path("Windows", Some("English"), "Music")];
    let report = engine.apply(&added, &[]).unwrap();
    assert!(report.success());
    assert_eq!(report.records_flushed, 0);
}
