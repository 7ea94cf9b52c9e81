use azops_core::paths::{self, AZOPS_DIR};
use std::path::{Path, PathBuf};

/// Resolve the azops home directory (where `config.yaml` lives).
///
/// Priority:
/// 1. `--home` flag / `AZOPS_HOME` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.azops/`
/// 3. `~/.azops`
pub fn resolve_home(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if let Some(found) = find_upward(&cwd) {
        return Ok(found);
    }

    Ok(paths::user_home_dir()?)
}

fn find_upward(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(AZOPS_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_home_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_home(Some(dir.path())).unwrap();
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_azops_dir_in_ancestor() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".azops")).unwrap();
        let subdir = dir.path().join("infra/keyvault");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_upward(&subdir), Some(dir.path().join(".azops")));
    }
}
