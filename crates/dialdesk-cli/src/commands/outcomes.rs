use crate::commands::{print_json, Context};
use crate::util::{parse_record_id, resolve_agent};
use anyhow::Result;
use clap::Args;
use dialdesk_core::time::now_utc;
use dialdesk_store::repo::FinalizeOutcome;

#[derive(Debug, Args)]
pub struct FinalizeArgs {
    pub id: String,
    #[arg(long)]
    pub agent: Option<String>,
    /// Free-form call outcome label; any value completes the record
    #[arg(long)]
    pub disposition: String,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub comments: Option<String>,
    #[arg(long)]
    pub call_log: Option<String>,
}

pub fn finalize(ctx: &Context<'_>, args: FinalizeArgs) -> Result<()> {
    let id = parse_record_id(&args.id)?;
    let agent_id = resolve_agent(args.agent.as_deref(), ctx.config)?;

    let record = ctx.store.outcomes().finalize(
        now_utc(),
        id,
        &agent_id,
        FinalizeOutcome {
            disposition: args.disposition,
            notes: args.notes,
            comments: args.comments,
            call_log_id: args.call_log,
        },
    )?;

    if ctx.json {
        print_json(&record)?;
    } else {
        println!(
            "completed {} ({})",
            record.id,
            record.disposition.as_deref().unwrap_or_default()
        );
    }
    Ok(())
}
