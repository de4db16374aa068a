//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "playbook-arbiter";
const PROJECT_FILES: [&str; 2] = ["arbiter.toml", ".arbiter.toml"];
const ENV_PREFIX: &str = "ARBITER_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `ARBITER_` environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./arbiter.toml` or `./.arbiter.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/playbook-arbiter/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(project_path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(project_path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().map_err(Box::new)
    }

    /// Load a single file on top of the defaults, ignoring every other source
    pub fn load_file(path: &Path) -> Result<FileConfig, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(FileConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// `<config dir>/playbook-arbiter/config.toml`, whether or not it exists
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// First existing project file in the working directory
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Config sources from highest to lowest priority, with whether each was found
    pub fn config_sources(explicit: Option<&PathBuf>) -> Vec<ConfigSource> {
        let mut sources = vec![ConfigSource {
            label: "env",
            location: format!("{}*", ENV_PREFIX),
            found: true,
        }];

        if let Some(path) = explicit {
            sources.push(ConfigSource::file("explicit", path));
        }

        sources.push(match Self::project_config_path() {
            Some(path) => ConfigSource::file("project", &path),
            None => ConfigSource {
                label: "project",
                location: PROJECT_FILES.join(" | "),
                found: false,
            },
        });

        if let Some(path) = Self::global_config_path() {
            sources.push(ConfigSource::file("global", &path));
        }

        sources.push(ConfigSource {
            label: "default",
            location: "built-in".to_string(),
            found: true,
        });
        sources
    }

    /// Print the config sources (for `playbook-arbiter config`)
    pub fn print_config_sources(explicit: Option<&PathBuf>) {
        println!("Configuration sources (highest priority first):");
        for source in Self::config_sources(explicit) {
            let marker = if source.found { "x" } else { " " };
            println!("  [{}] {:<8} {}", marker, source.label, source.location);
        }
    }
}

/// One place configuration may come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub label: &'static str,
    pub location: String,
    pub found: bool,
}

impl ConfigSource {
    fn file(label: &'static str, path: &Path) -> Self {
        Self {
            label,
            location: path.display().to_string(),
            found: path.exists(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.coordinator.max_id_attempts, 3);
        assert!(config.intent.routes.is_empty());
    }

    #[test]
    fn test_global_config_path_under_app_dir() {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.ends_with("playbook-arbiter/config.toml"));
    }

    #[test]
    fn test_load_file_merges_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[coordinator]
max_id_attempts = 7

[governance]
cost_budget = 25.0
"#
        )
        .unwrap();

        let config = ConfigLoader::load_file(file.path()).unwrap();
        assert_eq!(config.coordinator.max_id_attempts, 7);
        assert!(config.coordinator.emit_branch_events);
        assert_eq!(config.governance.cost_budget, Some(25.0));
    }

    #[test]
    fn test_config_sources_order() {
        let missing = PathBuf::from("/nonexistent/arbiter.toml");
        let sources = ConfigLoader::config_sources(Some(&missing));

        let labels: Vec<&str> = sources.iter().map(|s| s.label).collect();
        assert_eq!(labels.first(), Some(&"env"));
        assert_eq!(labels.get(1), Some(&"explicit"));
        assert_eq!(labels.last(), Some(&"default"));
        assert!(!sources[1].found);
    }

    #[test]
    fn test_load_file_rejects_bad_types() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[coordinator]\nmax_id_attempts = \"many\"").unwrap();

        assert!(ConfigLoader::load_file(file.path()).is_err());
    }
}
