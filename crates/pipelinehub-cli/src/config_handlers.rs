//! Handler functions for config CLI commands.
//!
//! Implements the `path`, `get`, `set` and `init` subcommands over
//! [`CrmConfig`]. Keys are dotted paths such as `api.timeout_secs`.

use pipelinehub_client::config::PROJECT_NAME;
use pipelinehub_client::{CrmConfig, Error as ClientError};
use std::io::Write;
use std::path::PathBuf;

use crate::cli::ConfigAction;
use crate::error::{Error, Result};

// ============================================================================
// Command dispatch
// ============================================================================

/// Handle a config subcommand, writing results to `out`.
pub fn handle_config_command(
    config_path: Option<&str>,
    action: ConfigAction,
    out: &mut impl Write,
) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path, out),
        ConfigAction::Get { key } => cmd_config_get(config_path, &key, out),
        ConfigAction::Set { key, value } => cmd_config_set(config_path, &key, &value, out),
        ConfigAction::Init { file, force } => cmd_config_init(file.as_deref(), force, out),
    }
}

// ============================================================================
// Command handlers
// ============================================================================

/// Show the resolved config file path.
pub fn cmd_config_path(config_path: Option<&str>, out: &mut impl Write) -> Result<()> {
    let path = CrmConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory for this platform"))?;
    writeln!(out, "{}", path.display())?;
    if !path.exists() {
        tracing::warn!(
            path = %path.display(),
            "config file does not exist; run `{PROJECT_NAME} config init` to create it"
        );
    }
    Ok(())
}

/// Get a configuration value by dotted key.
pub fn cmd_config_get(config_path: Option<&str>, key: &str, out: &mut impl Write) -> Result<()> {
    let config = CrmConfig::load(config_path)?;
    let doc = toml::Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    let found = ConfigKey::parse(key)?
        .lookup(&doc)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))?;
    writeln!(out, "{}", display_value(found))?;
    Ok(())
}

/// Set a configuration value by dotted key in the config file.
pub fn cmd_config_set(
    config_path: Option<&str>,
    key: &str,
    value: &str,
    out: &mut impl Write,
) -> Result<()> {
    let target = ConfigKey::parse(key)?;
    let path = CrmConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;

    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `{PROJECT_NAME} config init` first.",
            path.display()
        )));
    }
    let content =
        std::fs::read_to_string(&path).map_err(|e| ClientError::io_with_path(e, &path))?;
    let mut doc: toml::Value = toml::from_str(&content).map_err(|source| ClientError::ConfigParse {
        path: path.clone(),
        source,
    })?;

    target.assign(&mut doc, parse_value(value))?;

    // Reject edits that no longer deserialize, e.g. a string timeout.
    let rendered = toml::to_string_pretty(&doc).map_err(ClientError::from)?;
    toml::from_str::<CrmConfig>(&rendered)
        .map_err(|e| Error::config(format!("Invalid value for '{key}': {e}")))?;

    std::fs::write(&path, rendered).map_err(|e| ClientError::io_with_path(e, &path))?;
    writeln!(out, "Set {key} = {value} in {}", path.display())?;
    Ok(())
}

/// Create a default configuration file.
pub fn cmd_config_init(file: Option<&str>, force: bool, out: &mut impl Write) -> Result<()> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => CrmConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ClientError::io_with_path(e, parent))?;
    }

    let toml_str = CrmConfig::default().to_toml_string()?;
    std::fs::write(&path, &toml_str).map_err(|e| ClientError::io_with_path(e, &path))?;

    writeln!(out, "Config file created at {}", path.display())?;
    Ok(())
}

// ============================================================================
// Config keys and values
// ============================================================================

/// A dotted path into the config document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigKey<'k> {
    segments: Vec<&'k str>,
}

impl<'k> ConfigKey<'k> {
    /// Splits `key` on dots; every segment must be non-empty.
    pub fn parse(key: &'k str) -> Result<Self> {
        let segments: Vec<&str> = key.split('.').map(str::trim).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(Error::config(format!("Invalid config key '{key}'")));
        }
        Ok(Self { segments })
    }

    /// The value at this path, if every table along it exists.
    pub fn lookup<'v>(&self, doc: &'v toml::Value) -> Option<&'v toml::Value> {
        self.segments
            .iter()
            .try_fold(doc, |node, segment| node.get(*segment))
    }

    /// Stores `value` at this path, creating missing tables on the way.
    pub fn assign(&self, doc: &mut toml::Value, value: toml::Value) -> Result<()> {
        let Some((leaf, branches)) = self.segments.split_last() else {
            return Err(Error::config("Invalid config key ''"));
        };
        let mut node = doc;
        for segment in branches {
            node = table_of(node, segment)?
                .entry((*segment).to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        }
        table_of(node, leaf)?.insert((*leaf).to_string(), value);
        Ok(())
    }
}

fn table_of<'v>(node: &'v mut toml::Value, segment: &str) -> Result<&'v mut toml::Table> {
    node.as_table_mut()
        .ok_or_else(|| Error::config(format!("Cannot set '{segment}' inside a non-table value")))
}

/// Reads a command-line value as a TOML literal, falling back to a bare string.
///
/// `5` becomes an integer, `true` a boolean, `["a", "b"]` an array; `debug`
/// stays the string it looks like.
pub fn parse_value(raw: &str) -> toml::Value {
    toml::from_str::<toml::Table>(&format!("value = {raw}"))
        .ok()
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| toml::Value::String(raw.to_string()))
}

/// Renders a config value for stdout; strings print unquoted.
pub fn display_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn written_config(dir: &TempDir, content: &str) -> String {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        path.to_str().unwrap().to_string()
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    // ------------------------------------------------------------------------
    // cmd_config_path tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_path_explicit() {
        let mut out = Vec::new();
        cmd_config_path(Some("/explicit/config.toml"), &mut out).unwrap();
        assert_eq!(output(out), "/explicit/config.toml\n");
    }

    // ------------------------------------------------------------------------
    // cmd_config_get tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_get_nested_key() {
        let dir = TempDir::new().unwrap();
        let path = written_config(&dir, "[api]\nproject_id = \"p-7\"\n");
        let mut out = Vec::new();
        cmd_config_get(Some(&path), "api.project_id", &mut out).unwrap();
        assert_eq!(output(out), "p-7\n");
    }

    #[test]
    fn test_cmd_config_get_default_value() {
        let dir = TempDir::new().unwrap();
        let path = written_config(&dir, "");
        let mut out = Vec::new();
        cmd_config_get(Some(&path), "api.timeout_secs", &mut out).unwrap();
        assert_eq!(output(out), "30\n");
    }

    #[test]
    fn test_cmd_config_get_missing_key() {
        let dir = TempDir::new().unwrap();
        let path = written_config(&dir, "");
        let err = cmd_config_get(Some(&path), "api.nope", &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("api.nope"));
    }

    #[test]
    fn test_cmd_config_get_missing_explicit_file() {
        let err = cmd_config_get(Some("/nonexistent/pipelinehub.toml"), "log.level", &mut Vec::new());
        assert!(err.is_err());
    }

    // ------------------------------------------------------------------------
    // cmd_config_set tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_set_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = written_config(&dir, "[api]\nbase_url = \"\"\n");
        cmd_config_set(Some(&path), "api.timeout_secs", "5", &mut Vec::new()).unwrap();
        cmd_config_set(Some(&path), "log.level", "debug", &mut Vec::new()).unwrap();

        let config = CrmConfig::from_file(std::path::Path::new(&path)).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_cmd_config_set_rejects_mistyped_value() {
        let dir = TempDir::new().unwrap();
        let path = written_config(&dir, "");
        let err = cmd_config_set(Some(&path), "api.timeout_secs", "soon", &mut Vec::new())
            .unwrap_err();
        assert!(err.to_string().contains("api.timeout_secs"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_cmd_config_set_requires_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        let err = cmd_config_set(path.to_str(), "log.level", "debug", &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("config init"));
    }

    // ------------------------------------------------------------------------
    // cmd_config_init tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_init_creates_loadable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        cmd_config_init(path.to_str(), false, &mut Vec::new()).unwrap();

        let config = CrmConfig::from_file(&path).unwrap();
        assert_eq!(config, CrmConfig::default());
    }

    #[test]
    fn test_cmd_config_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = written_config(&dir, "[log]\nlevel = \"warn\"\n");
        assert!(cmd_config_init(Some(&path), false, &mut Vec::new()).is_err());
        cmd_config_init(Some(&path), true, &mut Vec::new()).unwrap();
        assert!(!std::fs::read_to_string(&path).unwrap().contains("warn"));
    }

    // ------------------------------------------------------------------------
    // Helper tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_config_key_assign_creates_tables() {
        let mut doc = toml::Value::Table(toml::Table::new());
        let key = ConfigKey::parse("a.b.c").unwrap();
        key.assign(&mut doc, toml::Value::Integer(1)).unwrap();
        assert_eq!(key.lookup(&doc), Some(&toml::Value::Integer(1)));

        let top = ConfigKey::parse("top").unwrap();
        top.assign(&mut doc, toml::Value::Boolean(true)).unwrap();
        assert_eq!(top.lookup(&doc), Some(&toml::Value::Boolean(true)));
        assert!(ConfigKey::parse("a.b.missing").unwrap().lookup(&doc).is_none());
    }

    #[test]
    fn test_config_key_assign_rejects_non_table() {
        let mut doc = toml::Value::Table(toml::Table::new());
        ConfigKey::parse("a")
            .unwrap()
            .assign(&mut doc, toml::Value::Integer(1))
            .unwrap();
        let err = ConfigKey::parse("a.b")
            .unwrap()
            .assign(&mut doc, toml::Value::Integer(2))
            .unwrap_err();
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn test_config_key_rejects_empty_segments() {
        assert!(ConfigKey::parse("a.").is_err());
        assert!(ConfigKey::parse("api..level").is_err());
        assert!(ConfigKey::parse("").is_err());
        let dir = TempDir::new().unwrap();
        let path = written_config(&dir, "");
        let err = cmd_config_get(Some(&path), "log..level", &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("log..level"));
    }

    #[test]
    fn test_parse_value_reads_toml_literals() {
        assert_eq!(parse_value("true"), toml::Value::Boolean(true));
        assert_eq!(parse_value("42"), toml::Value::Integer(42));
        assert_eq!(parse_value("2.5"), toml::Value::Float(2.5));
        assert_eq!(parse_value("info"), toml::Value::String("info".to_string()));
        assert_eq!(parse_value("\"quoted\""), toml::Value::String("quoted".to_string()));
        assert_eq!(
            parse_value(r#"["a", "b"]"#),
            toml::Value::Array(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&toml::Value::String("x".into())), "x");
        assert_eq!(display_value(&toml::Value::Integer(3)), "3");
        let mut table = toml::Table::new();
        table.insert("k".to_string(), toml::Value::Integer(1));
        assert!(display_value(&toml::Value::Table(table)).contains("k = 1"));
    }
}
