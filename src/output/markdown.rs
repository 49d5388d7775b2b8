//! Markdown summary generation
//!
//! Renders export records as a markdown table, followed by the domains that
//! could not be crawled.

use crate::crawler::DomainOutcome;
use crate::output::{export_records, ExportRecord, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of `outcomes` to `output_path`
pub fn write_markdown_summary(outcomes: &[DomainOutcome], output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(outcomes);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats harvest outcomes as markdown
pub fn format_markdown_summary(outcomes: &[DomainOutcome]) -> String {
    let records = export_records(outcomes);
    let failed: Vec<(&str, &str)> = outcomes
        .iter()
        .filter_map(|o| match o {
            DomainOutcome::Failed { input, error } => Some((input.as_str(), error.as_str())),
            DomainOutcome::Crawled(_) => None,
        })
        .collect();

    let with_contacts = outcomes
        .iter()
        .filter_map(DomainOutcome::result)
        .filter(|r| !r.is_empty())
        .count();

    let mut md = String::new();

    md.push_str("# Sumi-Scout Contact Summary\n\n");

    md.push_str("## Overview\n\n");
    md.push_str(&format!("- **Domains**: {}\n", outcomes.len()));
    md.push_str(&format!("- **Domains With Contacts**: {}\n", with_contacts));
    md.push_str(&format!(
        "- **Contacts**: {}\n",
        records.iter().filter(|r| !r.is_placeholder()).count()
    ));
    md.push_str(&format!("- **Failed Domains**: {}\n\n", failed.len()));

    md.push_str("## Contacts\n\n");
    md.push_str("| Website | Found_Email | Found_Name | Source_URL |\n");
    md.push_str("|---------|-------------|------------|------------|\n");
    for record in &records {
        md.push_str(&table_row(record));
    }
    md.push('\n');

    if !failed.is_empty() {
        md.push_str("## Failed Domains\n\n");
        for (input, error) in failed {
            md.push_str(&format!("- {}: {}\n", input, error));
        }
        md.push('\n');
    }

    md
}

fn table_row(record: &ExportRecord) -> String {
    format!(
        "| {} | {} | {} | {} |\n",
        cell(&record.website),
        cell(&record.found_email),
        cell(&record.found_name),
        cell(&record.source_url)
    )
}

fn cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
