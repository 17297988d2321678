use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::BanterConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["banter.toml", "banter.yaml", "banter.yml", "banter.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<BanterConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./banter.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/banter/banter.{toml,yaml,yml,json}` (user-global)
///
/// Returns `BanterConfig::default()` if no config file is found. A file that
/// exists but fails to parse is logged and ignored rather than aborting
/// startup.
pub fn discover_and_load() -> BanterConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    BanterConfig::default()
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/banter/
    if let Some(dirs) = directories::ProjectDirs::from("", "", "banter") {
        let config_dir = dirs.config_dir();
        for name in CONFIG_FILENAMES {
            let p = config_dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

fn parse_config(raw: &str, path: &Path) -> Result<BanterConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => toml::from_str(raw).with_context(|| format!("parse {}", path.display())),
        "yaml" | "yml" => {
            serde_yaml::from_str(raw).with_context(|| format!("parse {}", path.display()))
        },
        "json" => serde_json::from_str(raw).with_context(|| format!("parse {}", path.display())),
        _ => Err(Error::message(format!("unsupported config format: .{ext}"))),
    }
}
