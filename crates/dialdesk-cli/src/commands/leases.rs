use crate::commands::{print_json, Context};
use crate::util::{parse_record_id, resolve_agent, resolve_organization};
use anyhow::Result;
use clap::Args;
use dialdesk_core::domain::RetryStatus;
use dialdesk_core::time::now_utc;
use std::str::FromStr;

#[derive(Debug, Args)]
pub struct NextArgs {
    #[arg(long)]
    pub org: Option<String>,
    #[arg(long)]
    pub agent: Option<String>,
}

#[derive(Debug, Args)]
pub struct ReleaseArgs {
    pub id: String,
    #[arg(long)]
    pub agent: Option<String>,
    /// Put the record back as failed|busy|no_answer instead of pending
    #[arg(long)]
    pub status: Option<String>,
}

pub fn next(ctx: &Context<'_>, args: NextArgs) -> Result<()> {
    let organization_id = resolve_organization(args.org.as_deref(), ctx.config)?;
    let agent_id = resolve_agent(args.agent.as_deref(), ctx.config)?;

    let leased = ctx
        .store
        .leases()
        .lease_next(now_utc(), &organization_id, &agent_id)?;

    if ctx.json {
        print_json(&leased)?;
        return Ok(());
    }

    match leased {
        Some(record) => println!(
            "leased {} {} (attempt {})",
            record.id, record.phone_number, record.attempts
        ),
        None => println!("no eligible record"),
    }
    Ok(())
}

pub fn release(ctx: &Context<'_>, args: ReleaseArgs) -> Result<()> {
    let id = parse_record_id(&args.id)?;
    let agent_id = resolve_agent(args.agent.as_deref(), ctx.config)?;
    let retry = args
        .status
        .as_deref()
        .map(RetryStatus::from_str)
        .transpose()?;

    let leases = ctx.store.leases();
    let record = match retry {
        Some(status) => leases.release_unanswered(now_utc(), id, &agent_id, status)?,
        None => leases.release(now_utc(), id, &agent_id)?,
    };

    if ctx.json {
        print_json(&record)?;
    } else {
        println!("released {} as {}", record.id, record.status());
    }
    Ok(())
}
