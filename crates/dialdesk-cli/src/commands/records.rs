use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use crate::util::{
    parse_record_id, read_phone_file, resolve_agent, resolve_organization, state_label,
};
use anyhow::Result;
use clap::Args;
use dialdesk_core::domain::DialingStatus;
use dialdesk_core::dto::RecordDetailDto;
use dialdesk_core::time::{format_timestamp_datetime, now_utc};
use dialdesk_store::repo::{ImportBatch, ImportEntry};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[arg(long)]
    pub org: Option<String>,
    #[arg(long)]
    pub agent: Option<String>,
    #[arg(long)]
    pub uploaded_by: Option<String>,
    #[arg(long, default_value_t = 0)]
    pub priority: i64,
    #[arg(long)]
    pub notes: Option<String>,
    /// File with one number per line
    #[arg(long)]
    pub file: Option<PathBuf>,
    #[arg(value_name = "PHONE")]
    pub phones: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub id: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub org: Option<String>,
    #[arg(long)]
    pub agent: Option<String>,
    /// pending|dialing|completed|failed|busy|no_answer
    #[arg(long)]
    pub status: Option<String>,
}

pub fn import(ctx: &Context<'_>, args: ImportArgs) -> Result<()> {
    let organization_id = resolve_organization(args.org.as_deref(), ctx.config)?;
    let assigned_to = resolve_agent(args.agent.as_deref(), ctx.config)?;

    let mut phones = args.phones;
    if let Some(path) = args.file.as_deref() {
        phones.extend(read_phone_file(path)?);
    }
    if phones.is_empty() {
        return Err(invalid_input("no phone numbers given"));
    }

    let entries = phones
        .into_iter()
        .map(|phone| ImportEntry {
            priority: args.priority,
            notes: args.notes.clone(),
            ..ImportEntry::new(phone)
        })
        .collect();

    let report = ctx.store.records().import(
        now_utc(),
        ImportBatch {
            organization_id,
            assigned_to,
            uploaded_by: args.uploaded_by,
            entries,
        },
    )?;

    if ctx.json {
        print_json(&report)?;
        return Ok(());
    }

    println!(
        "created {}, reset {}, skipped (leased) {}, duplicates {}, rejected {}",
        report.created,
        report.reset,
        report.skipped_leased,
        report.duplicates,
        report.rejected.len()
    );
    for rejected in &report.rejected {
        println!("  rejected {:?}: {}", rejected.input, rejected.reason);
    }
    Ok(())
}

pub fn show(ctx: &Context<'_>, args: ShowArgs) -> Result<()> {
    let id = parse_record_id(&args.id)?;
    let record = ctx
        .store
        .records()
        .get(id)?
        .ok_or_else(|| not_found("record not found"))?;
    let detail = RecordDetailDto::new(record, &ctx.store.attempt_policy());

    if ctx.json {
        print_json(&detail)?;
        return Ok(());
    }

    let record = &detail.record;
    println!("id: {}", record.id);
    println!("organization: {}", record.organization_id);
    println!("phone: {}", record.phone_number);
    println!("assigned to: {}", record.assigned_to);
    if let Some(uploaded_by) = &record.uploaded_by {
        println!("uploaded by: {}", uploaded_by);
    }
    println!("status: {}", state_label(record));
    println!(
        "attempts: {} ({} remaining)",
        record.attempts, detail.attempts_remaining
    );
    println!("priority: {}", record.priority);
    println!("eligibility: {:?}", detail.eligibility);
    if let Some(ts) = record.last_dialed_at {
        println!("last dialed: {}", format_timestamp_datetime(ts));
    }
    if let Some(ts) = record.completed_at {
        println!("completed: {}", format_timestamp_datetime(ts));
    }
    if let Some(disposition) = &record.disposition {
        println!("disposition: {}", disposition);
    }
    if let Some(notes) = &record.notes {
        println!("notes: {}", notes);
    }
    if let Some(comments) = &record.comments {
        println!("comments: {}", comments);
    }
    if let Some(call_log_id) = &record.call_log_id {
        println!("call log: {}", call_log_id);
    }
    Ok(())
}

pub fn list(ctx: &Context<'_>, args: ListArgs) -> Result<()> {
    let organization_id = resolve_organization(args.org.as_deref(), ctx.config)?;
    let agent_id = resolve_agent(args.agent.as_deref(), ctx.config)?;
    let status = args
        .status
        .as_deref()
        .map(DialingStatus::from_str)
        .transpose()?;

    let records = ctx
        .store
        .records()
        .list_for_agent(&organization_id, &agent_id, status)?;

    if ctx.json {
        print_json(&records)?;
        return Ok(());
    }

    if records.is_empty() {
        println!("no records");
        return Ok(());
    }

    for record in records {
        println!(
            "{}  {}  {}  attempts {}  priority {}",
            record.id,
            record.phone_number,
            state_label(&record),
            record.attempts,
            record.priority
        );
    }
    Ok(())
}
