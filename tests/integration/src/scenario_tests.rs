//! Scenario tests for the soundbank registry
//!
//! These drive the synchronization engine through multi-batch production
//! scenarios over file-backed stores and assert on what each stage leaves
//! in the bank registry and the group ledger.

use std::fs;

use bank_fs::AssetId;
use bank_groups::{GroupSettings, GroupStore};
use bank_manifest::PlatformManifest;
use bank_registry::MediaReference;
use bank_sync::{DiagnosticKind, SyncConfig};
use bank_test_utils::ImportTree;

/// Windows manifest with the init bank and one localized music bank.
fn windows_manifest(media: &[&str]) -> PlatformManifest {
    let mut manifest = PlatformManifest::new();
    manifest.declare_media("Init", "default", Vec::<String>::new());
    manifest.declare_media("Music", "English", media.iter().copied());
    manifest
}

// =============================================================================
// Localization
// =============================================================================

mod localization {
    use super::*;

    /// Localized and non-localized banks share the same record tree; the
    /// non-localized init bank sits under the default language.
    #[test]
    fn localized_and_nonlocalized_banks_coexist() {
        let tree = ImportTree::new();
        let mut manifest = PlatformManifest::new();
        manifest.declare_media("Init", "default", Vec::<String>::new());
        manifest.declare_media("Music", "English", ["101"]);
        manifest.declare_media("Music", "French", ["201"]);
        tree.write_manifest("Windows", &manifest);

        let (mut engine, _ledger) = tree.build_engine();
        let added = vec![
            tree.bank_path("Windows", None, "Init"),
            tree.bank_path("Windows", Some("English"), "Music"),
            tree.bank_path("Windows", Some("French"), "Music"),
        ];
        let report = engine.apply(&added, &[]).unwrap();
        assert!(report.success());
        assert_eq!(report.banks_added, 3);
        assert_eq!(report.records_flushed, 2);

        let handle = engine.records().find("Music").unwrap();
        let record = handle.lock().unwrap();
        let windows = record.platform("Windows").unwrap();
        let languages: Vec<&str> = windows.bank_assets.keys().map(String::as_str).collect();
        assert_eq!(languages, vec!["English", "French"]);

        let handle = engine.records().find("Init").unwrap();
        let record = handle.lock().unwrap();
        let windows = record.platform("Windows").unwrap();
        assert!(windows.bank_assets.contains_key("default"));
    }

    /// Declared languages come from the whole manifest, not just the
    /// languages that have produced files so far.
    #[test]
    fn declared_languages_cover_the_manifest() {
        let tree = ImportTree::new();
        let mut manifest = PlatformManifest::new();
        manifest.declare_media("Music", "English", ["101"]);
        manifest.declare_media("Music", "French", ["201"]);
        tree.write_manifest("Windows", &manifest);

        let (mut engine, _ledger) = tree.build_engine();
        let added = vec![tree.bank_path("Windows", Some("English"), "Music")];
        assert!(engine.apply(&added, &[]).unwrap().success());

        let handle = engine.records().find("Music").unwrap();
        let record = handle.lock().unwrap();
        let windows = record.platform("Windows").unwrap();
        assert!(windows.languages.contains("English"));
        assert!(windows.languages.contains("French"));
        assert!(!windows.bank_assets.contains_key("French"));
    }

    /// Media updates replace only their own language bucket.
    #[test]
    fn media_updates_stay_in_their_language() {
        let tree = ImportTree::new();
        let mut manifest = PlatformManifest::new();
        manifest.declare_media("Music", "English", ["101", "102"]);
        manifest.declare_media("Music", "French", ["201"]);
        tree.write_manifest("Windows", &manifest);

        let (mut engine, _ledger) = tree.build_engine();
        let banks = vec![
            tree.bank_path("Windows", Some("English"), "Music"),
            tree.bank_path("Windows", Some("French"), "Music"),
        ];
        assert!(engine.apply(&banks, &[]).unwrap().success());

        let french_wem = tree.media_path("Windows", Some("French"), "201");
        let report = engine.apply(&[french_wem.clone()], &[]).unwrap();
        assert!(report.success());
        assert_eq!(report.media_added, 1);

        let handle = engine.records().find("Music").unwrap();
        let record = handle.lock().unwrap();
        let windows = record.platform("Windows").unwrap();
        assert_eq!(
            windows.media_by_language["French"],
            vec![MediaReference {
                id: "201".to_string(),
                asset: AssetId::for_path(&french_wem),
            }]
        );
        assert!(windows.media_ids("English").is_empty());
    }
}

// =============================================================================
// Distribution groups
// =============================================================================

mod grouping {
    use super::*;

    /// Every file of a platform batch lands in that platform's data group,
    /// with the init bank split into its own group.
    #[test]
    fn platform_groups_collect_every_file() {
        let tree = ImportTree::new();
        tree.write_manifest("Windows", &windows_manifest(&["101", "102"]));

        let (mut engine, ledger) = tree.build_engine();
        let added = vec![
            tree.bank_path("Windows", None, "Init"),
            tree.bank_path("Windows", Some("English"), "Music"),
            tree.media_path("Windows", Some("English"), "101"),
            tree.media_path("Windows", Some("English"), "102"),
        ];
        let report = engine.apply(&added, &[]).unwrap();
        assert!(report.success());
        assert_eq!(report.grouped, 4);

        assert_eq!(ledger.entries_in("Data_Windows").len(), 3);
        assert_eq!(ledger.entries_in("Data_Windows_InitBank").len(), 1);

        let groups = ledger.groups();
        let names: Vec<&str> = groups.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Data_Windows", "Data_Windows_InitBank"]);
        for (_, settings) in &groups {
            assert_eq!(settings, &GroupSettings::default());
        }
    }

    /// Entry labels come from configuration.
    #[test]
    fn labels_follow_the_configuration() {
        let config = SyncConfig::parse("entry_labels = [\"Streaming\"]\n").unwrap();
        let tree = ImportTree::with_config(config);
        tree.write_manifest("Windows", &windows_manifest(&["101"]));

        let (mut engine, ledger) = tree.build_engine();
        let music_bnk = tree.bank_path("Windows", Some("English"), "Music");
        assert!(engine.apply(&[music_bnk.clone()], &[]).unwrap().success());

        assert_eq!(
            ledger.labels_of(&AssetId::for_path(&music_bnk)),
            vec!["Streaming"]
        );
    }

    /// Groups created ahead of a batch are reused, not recreated.
    #[test]
    fn existing_groups_are_reused() {
        let tree = ImportTree::new();
        tree.write_manifest("Windows", &windows_manifest(&["101"]));

        let (mut engine, ledger) = tree.build_engine();
        assert!(ledger.get_or_create_group("Data_Windows").unwrap());

        let music_bnk = tree.bank_path("Windows", Some("English"), "Music");
        assert!(engine.apply(&[music_bnk], &[]).unwrap().success());

        assert!(!ledger.get_or_create_group("Data_Windows").unwrap());
        assert_eq!(ledger.entries_in("Data_Windows").len(), 1);
    }
}

// =============================================================================
// Production cycle
// =============================================================================

mod production_cycle {
    use super::*;

    /// A localization DLC lands over several batches: importing the new
    /// language fails while it is undeclared, succeeds once the manifest is
    /// regenerated, and a later content cut trims the media list back.
    #[test]
    fn localization_dlc_lands_in_stages() {
        let tree = ImportTree::new();
        let mut manifest = PlatformManifest::new();
        manifest.declare_media("Init", "default", Vec::<String>::new());
        manifest.declare_media("Music", "English", ["101"]);
        tree.write_manifest("Windows", &manifest);

        let (mut engine, _ledger) = tree.build_engine();

        let launch = vec![
            tree.bank_path("Windows", None, "Init"),
            tree.bank_path("Windows", Some("English"), "Music"),
            tree.media_path("Windows", Some("English"), "101"),
        ];
        for path in &launch {
            tree.touch(path);
        }
        assert!(engine.apply(&launch, &[]).unwrap().success());

        // French is not declared yet, so the bank is rejected loudly.
        let french_bnk = tree.bank_path("Windows", Some("French"), "Music");
        tree.touch(&french_bnk);
        let report = engine.apply(&[french_bnk.clone()], &[]).unwrap();
        assert!(!report.success());
        {
            let handle = engine.records().find("Music").unwrap();
            let record = handle.lock().unwrap();
            let windows = record.platform("Windows").unwrap();
            assert!(!windows.bank_assets.contains_key("French"));
        }

        // The DLC build regenerates the manifest with French declared.
        let mut manifest = PlatformManifest::new();
        manifest.declare_media("Init", "default", Vec::<String>::new());
        manifest.declare_media("Music", "English", ["101"]);
        manifest.declare_media("Music", "French", ["201", "202"]);
        tree.write_manifest("Windows", &manifest);

        let dlc = vec![
            french_bnk.clone(),
            tree.media_path("Windows", Some("French"), "201"),
        ];
        for path in &dlc {
            tree.touch(path);
        }
        let report = engine.apply(&dlc, &[]).unwrap();
        assert!(report.success());
        assert_eq!(report.banks_added, 1);
        assert_eq!(report.media_added, 1);

        {
            let handle = engine.records().find("Music").unwrap();
            let record = handle.lock().unwrap();
            let windows = record.platform("Windows").unwrap();
            assert!(windows.languages.contains("French"));
            assert!(windows.bank_assets.contains_key("French"));
            // The manifest list is authoritative for the whole bucket.
            assert_eq!(windows.media_ids("French"), vec!["201", "202"]);
        }

        // Content review cuts one French line; its file disappears.
        let cut = tree.media_path("Windows", Some("French"), "201");
        fs::remove_file(tree.root().join(cut.to_native())).unwrap();
        let report = engine.apply(&[], &[cut]).unwrap();
        assert!(report.success());
        assert_eq!(report.media_removed, 1);

        {
            let handle = engine.records().find("Music").unwrap();
            let record = handle.lock().unwrap();
            let windows = record.platform("Windows").unwrap();
            assert_eq!(windows.media_ids("French"), vec!["202"]);
            // Declared languages never shrink.
            assert!(windows.languages.contains("French"));
        }

        // The final state survives a reopen from disk.
        let store = tree.reopen_records();
        let handle = store.find("Music").unwrap();
        let record = handle.lock().unwrap();
        let windows = record.platform("Windows").unwrap();
        assert_eq!(windows.media_ids("French"), vec!["202"]);
    }

    /// Retiring a bank cleans its record and ledger entries while other
    /// banks keep theirs.
    #[test]
    fn retiring_a_bank_leaves_others_untouched() {
        let tree = ImportTree::new();
        let mut manifest = PlatformManifest::new();
        manifest.declare_media("Music", "English", ["101"]);
        manifest.declare_media("Ambience", "English", ["301"]);
        tree.write_manifest("Windows", &manifest);

        let (mut engine, ledger) = tree.build_engine();
        let music_bnk = tree.bank_path("Windows", Some("English"), "Music");
        let music_wem = tree.media_path("Windows", Some("English"), "101");
        let added = vec![
            music_bnk.clone(),
            music_wem.clone(),
            tree.bank_path("Windows", Some("English"), "Ambience"),
            tree.media_path("Windows", Some("English"), "301"),
        ];
        assert!(engine.apply(&added, &[]).unwrap().success());
        assert_eq!(ledger.entries_in("Data_Windows").len(), 4);

        let removed = vec![music_bnk.clone(), music_wem.clone()];
        let report = engine.apply(&[], &removed).unwrap();
        assert!(report.success());
        assert_eq!(report.banks_removed, 1);
        assert_eq!(report.media_removed, 1);

        tree.assert_record_absent("Music");
        tree.assert_record_exists("Ambience");
        assert!(ledger.group_of(&AssetId::for_path(&music_bnk)).is_none());
        assert!(ledger.group_of(&AssetId::for_path(&music_wem)).is_none());
        assert_eq!(ledger.entries_in("Data_Windows").len(), 2);

        let store = tree.reopen_records();
        assert!(store.find("Music").is_none());
        assert!(store.find("Ambience").is_some());
    }
}

// =============================================================================
// Resilience
// =============================================================================

mod resilience {
    use super::*;

    /// A platform without a manifest is a warning on the affected items,
    /// not a batch failure.
    #[test]
    fn missing_platform_manifest_is_a_warning() {
        let tree = ImportTree::new();
        tree.write_manifest("Windows", &windows_manifest(&["101"]));

        let (mut engine, ledger) = tree.build_engine();
        let mac_bnk = tree.bank_path("Mac", Some("English"), "Music");
        let added = vec![
            mac_bnk.clone(),
            tree.bank_path("Windows", Some("English"), "Music"),
        ];
        let report = engine.apply(&added, &[]).unwrap();

        assert!(report.success());
        assert_eq!(report.banks_added, 1);
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(report.errors().count(), 0);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::ManifestMiss);

        // The registry never saw the Mac bank, but distribution still
        // tracks the file under its platform group.
        let handle = engine.records().find("Music").unwrap();
        assert!(handle.lock().unwrap().platform("Mac").is_none());
        assert_eq!(
            ledger.group_of(&AssetId::for_path(&mac_bnk)).as_deref(),
            Some("Data_Mac")
        );
    }

    /// The resolution pool and a single worker produce identical results.
    #[test]
    fn worker_pool_matches_single_worker() {
        let single = SyncConfig::parse("workers = 1\n").unwrap();
        let pooled = SyncConfig::parse("workers = 4\n").unwrap();

        let mut outcomes = Vec::new();
        for config in [single, pooled] {
            let tree = ImportTree::with_config(config);
            tree.write_manifest("Windows", &windows_manifest(&["101", "102"]));

            let (mut engine, ledger) = tree.build_engine();
            let added = vec![
                tree.bank_path("Windows", None, "Init"),
                tree.bank_path("Windows", Some("English"), "Music"),
                tree.media_path("Windows", Some("English"), "101"),
                tree.media_path("Windows", Some("English"), "102"),
                tree.bank_path("Windows", Some("Klingon"), "Music"),
            ];
            let report = engine.apply(&added, &[]).unwrap();

            let mut entries = ledger.entries_in("Data_Windows");
            entries.sort();
            outcomes.push((
                report.banks_added,
                report.media_added,
                report.grouped,
                report.diagnostics.len(),
                entries,
            ));
        }
        assert_eq!(outcomes[0], outcomes[1]);
    }

    /// Externally sourced media is exempt from manifest coverage but still
    /// distributed with its platform.
    #[test]
    fn external_source_media_is_tolerated() {
        let tree = ImportTree::new();
        tree.write_manifest("Windows", &windows_manifest(&["101"]));

        let (mut engine, ledger) = tree.build_engine();
        let loop_wem = tree.media_path("Windows", Some("ExternalSources"), "ambience_loop");
        let report = engine.apply(&[loop_wem.clone()], &[]).unwrap();

        assert!(report.success());
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.media_added, 0);
        assert_eq!(report.grouped, 1);
        assert_eq!(
            ledger.group_of(&AssetId::for_path(&loop_wem)).as_deref(),
            Some("Data_Windows")
        );
    }
}
