use std::collections::BTreeSet;
use std::fs;

use log::info;
use pintport_core::{Config, IdPolicy, SourceEntry, SourceId, SourceList};
use serde::Serialize;

use crate::cli::ValidateArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SourcesResponseData {
    policy: &'static str,
    next_id: Option<u32>,
    sources: Vec<SourceEntry>,
}

pub fn validate(args: &ValidateArgs, config: &Config) -> Result<CommandResult, CliError> {
    let raw = fs::read_to_string(&args.manifest)?;
    let entries: Vec<SourceEntry> =
        serde_json::from_str(&raw).map_err(|source| CliError::Manifest {
            path: args.manifest.display().to_string(),
            source,
        })?;

    let policy = IdPolicy::from(args.policy);
    let mut warnings = Vec::new();
    let mut list = match args.high_water_mark {
        Some(mark) => {
            if policy == IdPolicy::HighWaterMark {
                warnings.push(format!(
                    "--high-water-mark {mark} has no effect under the high_water_mark policy"
                ));
            }
            SourceList::with_high_water_mark(policy, SourceId(mark))
        }
        None => SourceList::with_policy(policy),
    };
    list.try_extend(entries.into_iter().map(|entry| entry.into_source(config)))?;
    info!("validated {} sources from {}", list.len(), args.manifest.display());
    warnings.extend(missing_key_warnings(&list));

    let data = serde_json::to_value(SourcesResponseData {
        policy: policy_label(policy),
        next_id: list.next_id().map(|id| id.get()),
        sources: list.iter().map(SourceEntry::from).collect(),
    })?;

    Ok(CommandResult::ok(data).with_warnings(warnings))
}

fn policy_label(policy: IdPolicy) -> &'static str {
    match policy {
        IdPolicy::HighWaterMark => "high_water_mark",
        IdPolicy::Monotonic => "monotonic",
    }
}

fn missing_key_warnings(list: &SourceList) -> Vec<String> {
    list.iter()
        .filter(|source| source.api_key().is_none())
        .map(|source| source.provider())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|provider| format!("no api key configured for provider '{provider}'"))
        .collect()
}
