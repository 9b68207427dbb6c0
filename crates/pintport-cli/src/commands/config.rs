use std::path::Path;

use pintport_core::Config;
use serde::Serialize;

use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ConfigResponseData<'a> {
    path: &'a Path,
    exists: bool,
    providers_with_keys: Vec<&'a str>,
}

pub fn run(path: &Path, config: &Config) -> Result<CommandResult, CliError> {
    let exists = path.is_file();
    let data = serde_json::to_value(ConfigResponseData {
        path,
        exists,
        providers_with_keys: config.api_keys.keys().map(String::as_str).collect(),
    })?;

    let result = CommandResult::ok(data);
    if exists {
        Ok(result)
    } else {
        Ok(result.with_warning(format!(
            "no config file at {}; sources will have no api keys",
            path.display()
        )))
    }
}
