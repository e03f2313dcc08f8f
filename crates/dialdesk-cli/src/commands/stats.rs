use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use crate::util::resolve_organization;
use anyhow::Result;
use clap::{ArgAction, Args};
use dialdesk_core::domain::{AgentId, DialingStatus};
use dialdesk_core::dto::StatusCounts;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[arg(long)]
    pub org: Option<String>,
    /// Counts for one agent instead of the whole organization
    #[arg(long)]
    pub agent: Option<String>,
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "agent")]
    pub per_agent: bool,
}

#[derive(Debug, Serialize)]
struct StatsDto {
    #[serde(flatten)]
    counts: StatusCounts,
    total: i64,
}

#[derive(Debug, Serialize)]
struct AgentStatsDto {
    agent: AgentId,
    #[serde(flatten)]
    stats: StatsDto,
}

impl From<StatusCounts> for StatsDto {
    fn from(counts: StatusCounts) -> Self {
        Self {
            total: counts.total(),
            counts,
        }
    }
}

pub fn stats(ctx: &Context<'_>, args: StatsArgs) -> Result<()> {
    let organization_id = resolve_organization(args.org.as_deref(), ctx.config)?;
    let repo = ctx.store.stats();

    if args.per_agent {
        let rows: Vec<AgentStatsDto> = repo
            .per_agent(&organization_id)?
            .into_iter()
            .map(|(agent, counts)| AgentStatsDto {
                agent,
                stats: counts.into(),
            })
            .collect();
        if ctx.json {
            print_json(&rows)?;
            return Ok(());
        }
        if rows.is_empty() {
            println!("no records");
            return Ok(());
        }
        for row in rows {
            println!("{}: {}", row.agent, summary(&row.stats.counts));
        }
        return Ok(());
    }

    let counts = match args.agent.as_deref() {
        Some(raw) => {
            let agent_id =
                AgentId::new(raw).map_err(|err| invalid_input(format!("--agent: {err}")))?;
            repo.by_agent(&organization_id, &agent_id)?
        }
        None => repo.by_organization(&organization_id)?,
    };

    if ctx.json {
        print_json(&StatsDto::from(counts))?;
    } else {
        println!("{}", summary(&counts));
    }
    Ok(())
}

fn summary(counts: &StatusCounts) -> String {
    let mut parts: Vec<String> = DialingStatus::ALL
        .iter()
        .map(|status| format!("{} {}", status, counts.get(*status)))
        .collect();
    parts.push(format!("total {}", counts.total()));
    parts.join(", ")
}
