//! Locating and reading `.shopfront.toml`
//!
//! Lookup order:
//! 1. `$SHOPFRONT_CONFIG`, if set (no fallback when it is unreadable)
//! 2. `.shopfront.toml` in the current working directory
//! 3. `.shopfront.toml` in `$HOME`

use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = ".shopfront.toml";
const CONFIG_ENV: &str = "SHOPFRONT_CONFIG";

/// Raw config text and the file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub content: String,
}

/// Read the first config file found, or None
pub fn load_config_file() -> Option<ConfigSource> {
    let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    first_readable(&candidate_paths(explicit, home))
}

/// An explicit path replaces the default search entirely
fn candidate_paths(explicit: Option<PathBuf>, home: Option<PathBuf>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path];
    }

    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    paths.extend(home.map(|dir| dir.join(CONFIG_FILE)));
    paths
}

fn first_readable(paths: &[PathBuf]) -> Option<ConfigSource> {
    paths.iter().find_map(|path| read_source(path))
}

fn read_source(path: &Path) -> Option<ConfigSource> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            log::debug!("Loaded config from {}", path.display());
            Some(ConfigSource {
                path: path.to_path_buf(),
                content,
            })
        }
        Err(e) => {
            log::trace!("No config at {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_search_order() {
        let paths = candidate_paths(None, Some(PathBuf::from("/home/ada")));
        assert_eq!(
            paths,
            vec![
                PathBuf::from(CONFIG_FILE),
                PathBuf::from("/home/ada").join(CONFIG_FILE)
            ]
        );
    }

    #[test]
    fn test_no_home() {
        assert_eq!(candidate_paths(None, None), vec![PathBuf::from(CONFIG_FILE)]);
    }

    #[test]
    fn test_explicit_path_replaces_search() {
        let paths = candidate_paths(
            Some(PathBuf::from("/etc/shopfront.toml")),
            Some(PathBuf::from("/home/ada")),
        );
        assert_eq!(paths, vec![PathBuf::from("/etc/shopfront.toml")]);
    }

    #[test]
    fn test_first_readable_skips_missing() {
        let dir = std::env::temp_dir().join(format!("shopfront-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let present = dir.join(CONFIG_FILE);
        std::fs::write(&present, "action_delay_ms = 10\n").unwrap();

        let found = first_readable(&[dir.join("missing.toml"), present.clone()]).unwrap();
        assert_eq!(found.path, present);
        assert_eq!(found.content, "action_delay_ms = 10\n");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_nothing_readable() {
        assert_eq!(first_readable(&[PathBuf::from("/nonexistent/shopfront.toml")]), None);
    }
}
