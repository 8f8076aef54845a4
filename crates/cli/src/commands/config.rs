use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use toml::Value;
use wayfare_core::config::{AppConfig, LoadOptions};

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields: [(&str, String, &[&str]); 14] = [
        ("database.url", config.database.url.clone(), &["WAYFARE_DATABASE_URL"]),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["WAYFARE_DATABASE_MAX_CONNECTIONS"],
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["WAYFARE_DATABASE_TIMEOUT_SECS"],
        ),
        ("server.bind_address", config.server.bind_address.clone(), &["WAYFARE_SERVER_BIND_ADDRESS"]),
        ("server.port", config.server.port.to_string(), &["WAYFARE_SERVER_PORT"]),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["WAYFARE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        ("worker.program", config.worker.program.clone(), &["WAYFARE_WORKER_PROGRAM"]),
        ("worker.args", config.worker.args.join(" "), &["WAYFARE_WORKER_ARGS"]),
        ("worker.timeout_secs", config.worker.timeout_secs.to_string(), &["WAYFARE_WORKER_TIMEOUT_SECS"]),
        (
            "recommendations.fallback_limit",
            config.recommendations.fallback_limit.to_string(),
            &["WAYFARE_RECOMMENDATIONS_FALLBACK_LIMIT"],
        ),
        ("trending.limit", config.trending.limit.to_string(), &["WAYFARE_TRENDING_LIMIT"]),
        ("logging.level", config.logging.level.clone(), &["WAYFARE_LOGGING_LEVEL", "WAYFARE_LOG_LEVEL"]),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            &["WAYFARE_LOGGING_FORMAT", "WAYFARE_LOG_FORMAT"],
        ),
        ("config.file", display_path(config_file_path.as_deref()), &[]),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_keys) in &fields {
        let source =
            field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(render_line(key, value, source));
    }

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("wayfare.toml"), PathBuf::from("config/wayfare.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|path| path.display().to_string()).unwrap_or_else(|| "<none>".to_string())
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
            return format!("file ({})", display_path(config_file_path));
        }
    }

    "default".to_string()
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
    use toml::Value;

    use super::{contains_path, field_source, render_line};

    #[test]
    fn nested_keys_are_found_in_the_config_document() {
        let doc: Value = "[worker]\ntimeout_secs = 20\n".parse().expect("toml");

        assert!(contains_path(&doc, "worker.timeout_secs"));
        assert!(!contains_path(&doc, "worker.program"));
        assert!(!contains_path(&doc, "trending.limit"));
    }

    #[test]
    fn file_source_is_reported_when_no_env_var_is_set() {
        let doc: Value = "[trending]\nlimit = 50\n".parse().expect("toml");

        let source = field_source("trending.limit", &[], Some(&doc), None);

        assert_eq!(source, "file (<none>)");
        assert_eq!(field_source("server.port", &[], Some(&doc), None), "default");
        assert_eq!(
            render_line("trending.limit", "50", source),
            "- trending.limit = 50 (source: file (<none>))"
        );
    }
}
