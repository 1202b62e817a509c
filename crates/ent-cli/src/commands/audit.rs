//! Timeline and verification log listings.

use super::print_json;
use crate::runtime::FileIntegrityService;
use anyhow::Result;
use colored::Colorize;
use ent_prov::format_timestamp;

/// List timeline events for a work item, oldest first.
pub fn cmd_timeline(service: &FileIntegrityService, work_item_id: &str, json: bool) -> Result<()> {
    let events = service.timeline(work_item_id)?;
    if json {
        return print_json(&events);
    }
    if events.is_empty() {
        println!("{}", "No timeline events".yellow());
        return Ok(());
    }

    for event in &events {
        let version = event
            .version_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {} {}",
            format_timestamp(&event.created_at).dimmed(),
            event.event_type.to_string().cyan(),
            version
        );
        for (key, value) in &event.event_metadata {
            println!("    {}: {}", key.bold(), value);
        }
    }
    Ok(())
}

/// List verification attempts recorded against a version, oldest first.
pub fn cmd_logs(service: &FileIntegrityService, version_id: &str, json: bool) -> Result<()> {
    let logs = service.verification_logs(version_id)?;
    if json {
        return print_json(&logs);
    }
    if logs.is_empty() {
        println!("{}", "No verification attempts".yellow());
        return Ok(());
    }

    for entry in &logs {
        let outcome = if entry.is_match && entry.signature_valid {
            "match".green()
        } else if entry.is_match {
            "match (bad signature)".yellow()
        } else {
            "no match".red()
        };
        println!(
            "{} {} {}",
            format_timestamp(&entry.created_at).dimmed(),
            entry.submitted_hash,
            outcome
        );
    }
    Ok(())
}
