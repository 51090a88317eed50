use std::env;
use std::fs;
use std::path::Path;

use listly_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            );
        }
    };

    CommandResult::success("config", render(&config, resolve_config_path(None).as_deref()))
}

/// Effective values, one per line, each tagged with the layer it came from.
pub fn render(config: &AppConfig, config_file_path: Option<&Path>) -> String {
    let config_file_doc = load_config_file_doc(config_file_path);
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path)
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_owned()];

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["LISTLY_LOGGING_LEVEL", "LISTLY_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format).to_ascii_lowercase(),
        source("logging.format", &["LISTLY_LOGGING_FORMAT", "LISTLY_LOG_FORMAT"]),
    ));
    lines.push(render_line(
        "commit.close_on_failure",
        &config.commit.close_on_failure.to_string(),
        source("commit.close_on_failure", &["LISTLY_COMMIT_CLOSE_ON_FAILURE"]),
    ));
    lines.push(render_line(
        "fixtures.dataset",
        config.fixtures.dataset.as_str(),
        source("fixtures.dataset", &["LISTLY_FIXTURES_DATASET"]),
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_owned());
            return format!("file ({file_path})");
        }
    }

    "default".to_owned()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use listly_core::config::{AppConfig, FixtureDataset};
    use tempfile::TempDir;

    use super::{contains_path, render};

    #[test]
    fn file_values_are_attributed_to_the_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("listly.toml");
        fs::write(&path, "[fixtures]\ndataset = \"empty\"\n").expect("write config");

        let mut config = AppConfig::default();
        config.fixtures.dataset = FixtureDataset::Empty;
        let rendered = render(&config, Some(&path));

        assert!(rendered.contains(&format!(
            "- fixtures.dataset = empty (source: file ({}))",
            path.display()
        )));
        assert!(rendered.contains("- commit.close_on_failure = false (source: default)"));
    }

    #[test]
    fn nested_keys_are_resolved_through_tables() {
        let doc = "[commit]\nclose_on_failure = true\n".parse::<toml::Value>().expect("toml");

        assert!(contains_path(&doc, "commit.close_on_failure"));
        assert!(!contains_path(&doc, "commit.retries"));
        assert!(!contains_path(&doc, "logging.level"));
    }
}
