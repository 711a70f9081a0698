//! SyncEngine implementation
//!
//! The engine applies one batch at a time: partition by file kind, resolve
//! identities in parallel, mutate bank records, maintain group assignments,
//! persist once. It holds the record store, the manifest oracle, and an
//! optional group store; taking `&mut self` for `apply` keeps batches from
//! interleaving.

use std::sync::Arc;
use std::thread;

use tracing::{debug, error, info, warn};

use bank_fs::{AssetId, AssetIdentity, AssetPath, ImportLayout, DEFAULT_LANGUAGE};
use bank_groups::{resolve_group_name, GroupClassifier, GroupStore, MoveOutcome};
use bank_manifest::ManifestSource;
use bank_registry::{BankRecord, MediaReference, RecordStore};

use crate::config::{MediaRemovalPolicy, SyncConfig};
use crate::report::{BatchReport, Diagnostic};
use crate::Result;

/// Observer for updates to the initialization bank's record.
///
/// The surrounding application wires this in to refresh whatever holds a
/// live reference to the init bank; the engine never goes looking for that
/// holder itself.
pub trait InitBankObserver: Send + Sync {
    fn init_bank_updated(&self, record: &BankRecord);
}

impl<F> InitBankObserver for F
where
    F: Fn(&BankRecord) + Send + Sync,
{
    fn init_bank_updated(&self, record: &BankRecord) {
        self(record)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Bank,
    Media,
}

/// A path that resolved far enough to participate in group assignment.
struct GroupCandidate {
    path: AssetPath,
    identity: AssetIdentity,
    kind: FileKind,
}

/// Engine for applying path-set deltas to the bank registry.
pub struct SyncEngine {
    config: SyncConfig,
    layout: ImportLayout,
    records: RecordStore,
    manifests: Arc<dyn ManifestSource>,
    groups: Option<Arc<dyn GroupStore>>,
    classifiers: Vec<Box<dyn GroupClassifier>>,
    init_observer: Option<Box<dyn InitBankObserver>>,
}

impl SyncEngine {
    pub fn new(
        config: SyncConfig,
        records: RecordStore,
        manifests: Arc<dyn ManifestSource>,
    ) -> Self {
        let layout = config.layout();
        Self {
            config,
            layout,
            records,
            manifests,
            groups: None,
            classifiers: Vec::new(),
            init_observer: None,
        }
    }

    /// Wire in the distribution-group store. Without one, the engine still
    /// synchronizes the registry and reports grouping as skipped.
    pub fn with_group_store(mut self, groups: Arc<dyn GroupStore>) -> Self {
        self.groups = Some(groups);
        self
    }

    /// Register a classifier consulted before the default group naming
    /// rule. Classifiers run in registration order; first answer wins.
    pub fn with_classifier(mut self, classifier: Box<dyn GroupClassifier>) -> Self {
        self.classifiers.push(classifier);
        self
    }

    pub fn with_init_observer(mut self, observer: Box<dyn InitBankObserver>) -> Self {
        self.init_observer = Some(observer);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// Apply a batch of added and removed paths to the registry.
    ///
    /// Per-item failures become diagnostics on the report and never abort
    /// the batch; `Err` means a store-level failure that prevented the
    /// batch from completing. Takes `&mut self` so a second batch cannot
    /// start until this one has persisted.
    pub fn apply(&mut self, added: &[AssetPath], removed: &[AssetPath]) -> Result<BatchReport> {
        let mut report = BatchReport::new();

        let (added_banks, added_media) = self.partition(added);
        let (removed_banks, removed_media) = self.partition(removed);
        if added_banks.is_empty()
            && added_media.is_empty()
            && removed_banks.is_empty()
            && removed_media.is_empty()
        {
            debug!("batch contains no bank or media paths");
            return Ok(report);
        }

        // A batch often follows a manifest regeneration; drop cached
        // documents so every lookup below sees the fresh ones.
        self.manifests.invalidate();

        let bank_identities = self.resolve_all(&added_banks);
        let media_identities = self.resolve_all(&added_media);

        let mut groupable = Vec::new();
        let mut group_store_diagnosed = false;

        self.apply_bank_adds(&added_banks, &bank_identities, &mut groupable, &mut report);
        self.apply_media_adds(&added_media, &media_identities, &mut groupable, &mut report);

        // Removal order matters: registry references go first so group
        // removal acts on paths the registry has already let go of, and
        // banks are cleaned after their media in case both were deleted in
        // the same batch.
        let removed_media_items = self.resolve_removals(&removed_media, &mut report);
        self.remove_media_references(&removed_media_items, &mut report);
        self.remove_group_entries(&removed_media_items, &mut group_store_diagnosed, &mut report)?;

        let removed_bank_items = self.resolve_removals(&removed_banks, &mut report);
        self.remove_bank_references(&removed_bank_items, &mut report);
        self.remove_group_entries(&removed_bank_items, &mut group_store_diagnosed, &mut report)?;

        self.assign_groups(&groupable, &mut group_store_diagnosed, &mut report)?;

        report.records_flushed = self.records.save_all()?;
        if let Some(groups) = &self.groups {
            groups.flush()?;
        }

        info!(
            batch = %report.batch_id,
            banks_added = report.banks_added,
            media_added = report.media_added,
            banks_removed = report.banks_removed,
            media_removed = report.media_removed,
            grouped = report.grouped,
            flushed = report.records_flushed,
            diagnostics = report.diagnostics.len(),
            "applied batch"
        );
        Ok(report)
    }

    /// Split a path list into bank-kind and media-kind paths. Anything with
    /// neither extension is not ours and is ignored.
    fn partition<'a>(&self, paths: &'a [AssetPath]) -> (Vec<&'a AssetPath>, Vec<&'a AssetPath>) {
        let mut banks = Vec::new();
        let mut media = Vec::new();
        for path in paths {
            match path.extension() {
                Some(ext) if ext.eq_ignore_ascii_case(&self.config.bank_extension) => {
                    banks.push(path);
                }
                Some(ext) if ext.eq_ignore_ascii_case(&self.config.media_extension) => {
                    media.push(path);
                }
                _ => {}
            }
        }
        (banks, media)
    }

    /// Resolve identities for a list of added paths, fanning out over the
    /// configured worker count. Workers also warm the manifest cache for
    /// the platforms they encounter; lookup errors resurface in the apply
    /// phases where they get a diagnostic.
    fn resolve_all(&self, paths: &[&AssetPath]) -> Vec<Option<AssetIdentity>> {
        let workers = self.config.workers.max(1);
        if workers == 1 || paths.len() <= 1 {
            return paths.iter().map(|p| self.resolve_one(p)).collect();
        }

        let chunk_size = paths.len().div_ceil(workers);
        thread::scope(|scope| {
            let handles: Vec<_> = paths
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|p| self.resolve_one(p))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            // Joining in spawn order keeps results aligned with the input.
            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap())
                .collect()
        })
    }

    fn resolve_one(&self, path: &AssetPath) -> Option<AssetIdentity> {
        let identity = self.layout.resolve(path)?;
        let _ = self.manifests.platform_manifest(&identity.platform);
        Some(identity)
    }

    fn apply_bank_adds(
        &self,
        paths: &[&AssetPath],
        identities: &[Option<AssetIdentity>],
        groupable: &mut Vec<GroupCandidate>,
        report: &mut BatchReport,
    ) {
        let mut observer_warned = false;
        for (path, identity) in paths.iter().zip(identities) {
            let Some(identity) = identity else {
                warn!(path = %path, "added bank does not match the convention");
                report.push(Diagnostic::unresolvable(path.as_str()));
                continue;
            };
            groupable.push(GroupCandidate {
                path: (*path).clone(),
                identity: identity.clone(),
                kind: FileKind::Bank,
            });

            let manifest = match self.manifests.platform_manifest(&identity.platform) {
                Ok(Some(manifest)) => manifest,
                Ok(None) => {
                    warn!(path = %path, platform = %identity.platform, "no manifest for platform");
                    report.push(Diagnostic::manifest_miss(
                        path.as_str(),
                        format!("no manifest for platform '{}'", identity.platform),
                    ));
                    continue;
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "manifest lookup failed");
                    report.push(Diagnostic::manifest_miss(path.as_str(), e));
                    continue;
                }
            };
            let Some(bank_manifest) = manifest.bank(&identity.name) else {
                warn!(path = %path, bank = %identity.name, "bank is not in the manifest");
                report.push(Diagnostic::manifest_miss(
                    path.as_str(),
                    format!(
                        "bank '{}' is not in the '{}' manifest",
                        identity.name, identity.platform
                    ),
                ));
                continue;
            };

            // Localized bank files must sit in a declared language folder.
            if identity.language != DEFAULT_LANGUAGE
                && !bank_manifest.has_language(&identity.language)
            {
                report.push(language_diagnostic(path, &identity.language, &identity.name));
                continue;
            }

            let (handle, created) = self.records.find_or_create(&identity.name);
            {
                let mut record = handle.lock().unwrap();
                let mut changed =
                    record.declare_languages(&identity.platform, bank_manifest.languages());
                changed |= record.set_bank_asset(
                    &identity.platform,
                    &identity.language,
                    AssetId::for_path(path),
                );
                if changed {
                    self.records.mark_dirty(&identity.name);
                }
            }
            report.banks_added += 1;
            debug!(bank = %identity.name, platform = %identity.platform, created, "updated bank record");

            if identity.name == self.config.init_bank_name {
                match &self.init_observer {
                    Some(observer) => {
                        let record = handle.lock().unwrap();
                        observer.init_bank_updated(&record);
                    }
                    None if !observer_warned => {
                        warn!("initialization bank updated but no observer is wired");
                        observer_warned = true;
                    }
                    None => {}
                }
            }
        }
    }

    fn apply_media_adds(
        &self,
        paths: &[&AssetPath],
        identities: &[Option<AssetIdentity>],
        groupable: &mut Vec<GroupCandidate>,
        report: &mut BatchReport,
    ) {
        for (path, identity) in paths.iter().zip(identities) {
            let Some(identity) = identity else {
                warn!(path = %path, "added media does not match the convention");
                report.push(Diagnostic::unresolvable(path.as_str()));
                continue;
            };
            groupable.push(GroupCandidate {
                path: (*path).clone(),
                identity: identity.clone(),
                kind: FileKind::Media,
            });

            let manifest = match self.manifests.platform_manifest(&identity.platform) {
                Ok(Some(manifest)) => manifest,
                Ok(None) => {
                    self.media_manifest_miss(
                        path,
                        format!("no manifest for platform '{}'", identity.platform),
                        report,
                    );
                    continue;
                }
                Err(e) => {
                    self.media_manifest_miss(path, e.to_string(), report);
                    continue;
                }
            };
            let banks = manifest.banks_for_media(&identity.name);
            if banks.is_empty() {
                self.media_manifest_miss(
                    path,
                    format!("media id '{}' is not referenced by any bank", identity.name),
                    report,
                );
                continue;
            }

            let Some(directory) = path.parent() else {
                continue;
            };

            let mut updated_any = false;
            let mut language_diagnosed = false;
            for bank_name in banks {
                let Some(bank_manifest) = manifest.bank(bank_name) else {
                    continue;
                };
                let Some(ids) = bank_manifest.media(&identity.language) else {
                    // One diagnostic per path even when several banks
                    // reject the same language.
                    if !language_diagnosed {
                        report.push(language_diagnostic(path, &identity.language, bank_name));
                        language_diagnosed = true;
                    }
                    continue;
                };

                // Media never creates a bank record; an unimported bank
                // picks its media up when the bank file itself arrives.
                let Some(handle) = self.records.find(bank_name) else {
                    debug!(bank = %bank_name, path = %path, "bank not imported yet; media deferred");
                    continue;
                };

                let references = self.media_references(&directory, ids);
                let changed = handle.lock().unwrap().set_streaming_media(
                    &identity.platform,
                    &identity.language,
                    references,
                );
                if changed {
                    self.records.mark_dirty(bank_name);
                }
                updated_any = true;
            }
            if updated_any {
                report.media_added += 1;
            }
        }
    }

    /// The authoritative media list for one bucket: every id the manifest
    /// declares there, resolved to assets next to the file that triggered
    /// the update.
    fn media_references(&self, directory: &AssetPath, ids: &[String]) -> Vec<MediaReference> {
        ids.iter()
            .map(|id| MediaReference {
                id: id.clone(),
                asset: AssetId::for_path(
                    &directory.join(&format!("{id}.{}", self.config.media_extension)),
                ),
            })
            .collect()
    }

    fn media_manifest_miss(&self, path: &AssetPath, detail: String, report: &mut BatchReport) {
        if self.layout.is_external_source(path) {
            debug!(path = %path, "externally sourced media; skipped");
        } else {
            warn!(path = %path, detail = %detail, "media not in manifest");
            report.push(Diagnostic::manifest_miss(path.as_str(), detail));
        }
    }

    fn resolve_removals(
        &self,
        paths: &[&AssetPath],
        report: &mut BatchReport,
    ) -> Vec<(AssetPath, AssetIdentity)> {
        let mut items = Vec::new();
        for path in paths {
            match self.layout.resolve(path) {
                Some(identity) => items.push(((*path).clone(), identity)),
                None => {
                    warn!(path = %path, "removed path does not match the convention");
                    report.push(Diagnostic::unresolvable(path.as_str()));
                }
            }
        }
        items
    }

    /// Scan every record for references to each deleted media asset.
    /// Linear by design: deletions are rare and batches small.
    fn remove_media_references(
        &self,
        items: &[(AssetPath, AssetIdentity)],
        report: &mut BatchReport,
    ) {
        for (path, identity) in items {
            let asset = AssetId::for_path(path);
            let mut matched = false;
            for handle in self.records.handles() {
                let mut record = handle.lock().unwrap();
                if record.remove_media(&identity.platform, &identity.language, &asset) {
                    let name = record.name.clone();
                    drop(record);
                    self.records.mark_dirty(&name);
                    debug!(media = %identity.name, bank = %name, "removed media reference");
                    matched = true;
                    if self.config.media_removal == MediaRemovalPolicy::FirstMatch {
                        break;
                    }
                }
            }
            if matched {
                report.media_removed += 1;
            } else {
                // Already absent from the registry's view; not an error.
                debug!(path = %path, "deleted media not tracked by any bank");
            }
        }
    }

    fn remove_bank_references(
        &self,
        items: &[(AssetPath, AssetIdentity)],
        report: &mut BatchReport,
    ) {
        for (path, _) in items {
            let asset = AssetId::for_path(path);
            let mut matched = false;
            for handle in self.records.handles() {
                let mut record = handle.lock().unwrap();
                if let Some(platform) = record.remove_bank_asset(&asset) {
                    let name = record.name.clone();
                    let orphaned = record.is_orphaned();
                    drop(record);
                    self.records.mark_dirty(&name);
                    debug!(bank = %name, platform = %platform, orphaned, "removed bank platform entry");
                    matched = true;
                    // Bank names are unique; no other record can match.
                    break;
                }
            }
            if matched {
                report.banks_removed += 1;
            } else {
                debug!(path = %path, "deleted bank not tracked by the registry");
            }
        }
    }

    fn remove_group_entries(
        &self,
        items: &[(AssetPath, AssetIdentity)],
        diagnosed: &mut bool,
        report: &mut BatchReport,
    ) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let Some(groups) = &self.groups else {
            self.note_missing_group_store(diagnosed, report);
            return Ok(());
        };
        for (path, _) in items {
            // An entry that was never assigned is a per-path no-op; the
            // loop always continues with the remaining paths.
            if !groups.remove_entry(&AssetId::for_path(path))? {
                debug!(path = %path, "no group entry to remove");
            }
        }
        Ok(())
    }

    fn assign_groups(
        &self,
        candidates: &[GroupCandidate],
        diagnosed: &mut bool,
        report: &mut BatchReport,
    ) -> Result<()> {
        if candidates.is_empty() {
            return Ok(());
        }
        let Some(groups) = &self.groups else {
            self.note_missing_group_store(diagnosed, report);
            return Ok(());
        };

        for candidate in candidates {
            let file_name = candidate.path.file_name().unwrap_or("");
            let is_init = candidate.kind == FileKind::Bank
                && candidate.identity.name == self.config.init_bank_name;
            let group = resolve_group_name(
                &self.classifiers,
                file_name,
                &candidate.identity.platform,
                &candidate.identity.language,
                is_init,
            );

            groups.get_or_create_group(&group)?;
            let asset = AssetId::for_path(&candidate.path);
            let outcome = groups.move_entry(&asset, &group)?;
            for label in &self.config.entry_labels {
                groups.add_label(&asset, label)?;
            }
            report.grouped += 1;
            debug!(
                path = %candidate.path,
                group = %group,
                already = (outcome == MoveOutcome::AlreadyAssigned),
                "assigned group entry"
            );
        }
        Ok(())
    }

    fn note_missing_group_store(&self, diagnosed: &mut bool, report: &mut BatchReport) {
        if !*diagnosed {
            error!("no group store configured; skipping group maintenance for this batch");
            report.push(Diagnostic::missing_group_store());
            *diagnosed = true;
        }
    }
}

fn language_diagnostic(path: &AssetPath, language: &str, bank: &str) -> Diagnostic {
    if language.parse::<i32>().is_ok() {
        error!(path = %path, language = %language, "sub-folder generation is not supported");
        Diagnostic::numeric_language(path.as_str(), language)
    } else {
        error!(path = %path, language = %language, bank = %bank, "language not declared for bank");
        Diagnostic::unrecognized_language(path.as_str(), language, bank)
    }
}
