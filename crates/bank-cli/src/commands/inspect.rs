//! Registry inspection commands

use std::collections::BTreeSet;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use bank_groups::GroupLedger;
use bank_registry::RecordStore;

use crate::commands::apply::load_config;
use crate::error::{CliError, Result};

#[derive(Debug, Serialize)]
struct StatusView {
    banks: usize,
    groups: usize,
    grouped_files: usize,
}

#[derive(Debug, Serialize)]
struct BankView {
    name: String,
    platforms: Vec<String>,
    languages: BTreeSet<String>,
}

#[derive(Debug, Serialize)]
struct GroupView {
    name: String,
    entries: usize,
    compressed: bool,
    pack_separately: bool,
}

/// Run the status command
pub fn run_status(root: &Path, json: bool) -> Result<()> {
    let config = load_config(root)?;
    let records = RecordStore::open(root.join(&config.registry_dir))?;
    let ledger = GroupLedger::open(root.join(&config.group_ledger))?;

    let groups = ledger.groups();
    let grouped_files: usize = groups
        .iter()
        .map(|(name, _)| ledger.entries_in(name).len())
        .sum();

    if json {
        let view = StatusView {
            banks: records.len(),
            groups: groups.len(),
            grouped_files,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{}", "Registry Status".bold());
    println!();
    println!("{}:    {}", "Root".dimmed(), root.display());
    println!("{}:   {}", "Banks".dimmed(), records.len());
    println!("{}:  {}", "Groups".dimmed(), groups.len());
    println!("{}: {} grouped files", "Entries".dimmed(), grouped_files);

    if records.is_empty() {
        println!();
        println!(
            "No banks registered yet. Run {} after the next generation.",
            "bankreg apply".cyan()
        );
    }
    Ok(())
}

/// Run the banks command
pub fn run_banks(root: &Path, json: bool) -> Result<()> {
    let config = load_config(root)?;
    let records = RecordStore::open(root.join(&config.registry_dir))?;

    let mut views = Vec::new();
    for handle in records.handles() {
        let record = handle.lock().unwrap();
        views.push(BankView {
            name: record.name.clone(),
            platforms: record.per_platform.keys().cloned().collect(),
            languages: record
                .per_platform
                .values()
                .flat_map(|entry| entry.languages.iter().cloned())
                .collect(),
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("{}", "No banks registered".dimmed());
        return Ok(());
    }
    for view in &views {
        println!("{} [{}]", view.name.cyan(), view.platforms.join(", "));
    }
    Ok(())
}

/// Run the show command
pub fn run_show(root: &Path, name: &str, json: bool) -> Result<()> {
    let config = load_config(root)?;
    let records = RecordStore::open(root.join(&config.registry_dir))?;

    let Some(handle) = records.find(name) else {
        return Err(CliError::user(format!(
            "No bank named '{name}' in the registry"
        )));
    };
    let record = handle.lock().unwrap();

    if json {
        println!("{}", serde_json::to_string_pretty(&*record)?);
        return Ok(());
    }

    println!("{}", record.name.bold());
    println!("{}: {}", "Updated".dimmed(), record.updated_at);
    for (platform, entry) in &record.per_platform {
        println!();
        println!("{}:", platform.cyan());
        let languages: Vec<_> = entry.languages.iter().cloned().collect();
        println!("   {}: {}", "Languages".dimmed(), languages.join(", "));
        for (language, asset) in &entry.bank_assets {
            println!("   {} bank [{language}] {}", "+".green(), asset.as_str().dimmed());
        }
        for (language, media) in &entry.media_by_language {
            println!("   {} media [{language}] {} files", "+".green(), media.len());
        }
    }
    Ok(())
}

/// Run the groups command
pub fn run_groups(root: &Path, json: bool) -> Result<()> {
    let config = load_config(root)?;
    let ledger = GroupLedger::open(root.join(&config.group_ledger))?;

    let views: Vec<GroupView> = ledger
        .groups()
        .into_iter()
        .map(|(name, settings)| GroupView {
            entries: ledger.entries_in(&name).len(),
            name,
            compressed: settings.compressed,
            pack_separately: settings.pack_separately,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("{}", "No distribution groups".dimmed());
        return Ok(());
    }
    for view in &views {
        println!("{} ({} entries)", view.name.cyan(), view.entries);
    }
    Ok(())
}
