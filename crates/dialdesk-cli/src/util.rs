use crate::error::invalid_input;
use anyhow::{Context as _, Result};
use dialdesk_config::AppConfig;
use dialdesk_core::domain::{AgentId, DialRecordId, OrganizationId};
use dialdesk_core::{DialRecord, DialState};
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub fn parse_record_id(raw: &str) -> Result<DialRecordId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_input("record id cannot be empty"));
    }
    DialRecordId::from_str(trimmed)
        .map_err(|_| invalid_input(format!("invalid record id: {trimmed}")))
}

/// `--agent` wins over `[agent] id` in the config.
pub fn resolve_agent(arg: Option<&str>, config: &AppConfig) -> Result<AgentId> {
    match arg {
        Some(raw) => Ok(AgentId::new(raw)?),
        None => config
            .agent
            .id
            .clone()
            .ok_or_else(|| invalid_input("no agent given: pass --agent or set [agent] id")),
    }
}

/// `--org` wins over `[agent] organization` in the config.
pub fn resolve_organization(arg: Option<&str>, config: &AppConfig) -> Result<OrganizationId> {
    match arg {
        Some(raw) => Ok(OrganizationId::new(raw)?),
        None => config.agent.organization.clone().ok_or_else(|| {
            invalid_input("no organization given: pass --org or set [agent] organization")
        }),
    }
}

/// One number per line. Blank lines and `#` comments are skipped.
pub fn read_phone_file(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read phone list {}", path.display()))?;
    Ok(parse_phone_lines(&raw))
}

fn parse_phone_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn state_label(record: &DialRecord) -> String {
    match &record.state {
        DialState::Dialing { agent } => format!("dialing ({agent})"),
        state => state.status().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_phone_lines, parse_record_id, resolve_agent};
    use dialdesk_config::AppConfig;
    use dialdesk_core::domain::AgentId;

    #[test]
    fn phone_lines_skip_comments_and_blanks() {
        let lines = parse_phone_lines("# batch 1\n+1 555 0100\n\n  555-0101  \n#done\n");
        assert_eq!(lines, vec!["+1 555 0100", "555-0101"]);
    }

    #[test]
    fn record_id_rejects_garbage() {
        assert!(parse_record_id("").is_err());
        assert!(parse_record_id("not-a-uuid").is_err());
    }

    #[test]
    fn agent_falls_back_to_config() {
        let mut config = AppConfig::default();
        assert!(resolve_agent(None, &config).is_err());

        config.agent.id = Some(AgentId::new("agent-7").expect("agent"));
        let agent = resolve_agent(None, &config).expect("agent");
        assert_eq!(agent.as_str(), "agent-7");

        let agent = resolve_agent(Some("agent-9"), &config).expect("agent");
        assert_eq!(agent.as_str(), "agent-9");
    }
}
