use std::{env, path::PathBuf};

use anyhow::{anyhow, Context, Result};

pub const DATA_DIRECTORY_ENV: &str = "DATA_DIRECTORY";
pub const JOBS_ENV: &str = "HERO_JOBS";

/// `--data-dir` wins; otherwise `DATA_DIRECTORY`, relative to the working directory.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }
    let raw = env::var(DATA_DIRECTORY_ENV)
        .map_err(|_| anyhow!("pass --data-dir or set {DATA_DIRECTORY_ENV}"))?;
    let cwd = env::current_dir().context("failed resolving current directory")?;
    Ok(cwd.join(raw))
}

pub fn resolve_jobs(flag: Option<usize>) -> Result<Option<usize>> {
    match flag {
        Some(0) => Err(anyhow!("--jobs must be >= 1 when provided")),
        Some(jobs) => Ok(Some(jobs)),
        None => Ok(read_env_optional_usize(JOBS_ENV)),
    }
}

pub(crate) fn read_env_optional_usize(name: &str) -> Option<usize> {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_flags_win() {
        let dir = PathBuf::from("/tmp/scenarios");
        assert_eq!(resolve_data_dir(Some(dir.clone())).unwrap(), dir);
        assert_eq!(resolve_jobs(Some(3)).unwrap(), Some(3));
        assert!(resolve_jobs(Some(0)).is_err());
    }
}
