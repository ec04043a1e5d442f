use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub converter: ConverterConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_cors_origins() -> Vec<String> {
    [
        "http://127.0.0.1:5500",
        "http://localhost",
        "http://localhost:8080",
        "http://127.0.0.1",
        "http://127.0.0.1:8080",
        "null",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Where the external tutorial generator lives and how to start it.
#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorConfig {
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    #[serde(default = "default_script")]
    pub script: PathBuf,
    /// Working directory for the child process. Relative `script` paths
    /// resolve against it.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            script: default_script(),
            working_dir: None,
        }
    }
}

fn default_interpreter() -> String {
    "python3".to_string()
}
fn default_script() -> PathBuf {
    PathBuf::from("main.py")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConverterConfig {
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub rewrite: RewriteMode,
    #[serde(default = "default_mermaid_url")]
    pub mermaid_url: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
            rewrite: RewriteMode::default(),
            mermaid_url: default_mermaid_url(),
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string()]
}
fn default_mermaid_url() -> String {
    "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.esm.min.mjs".to_string()
}

/// How `.md` cross-references are rewritten before rendering.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RewriteMode {
    /// Replace every `.md` occurrence in the body, prose and code included.
    #[default]
    All,
    /// Only rewrite link and image destinations that point at `.md` files.
    Links,
}

/// Load and validate a config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.generator.interpreter.trim().is_empty() {
        anyhow::bail!("generator.interpreter must not be empty");
    }

    if config.converter.include_globs.is_empty() {
        anyhow::bail!("converter.include_globs must list at least one pattern");
    }
    for pattern in &config.converter.include_globs {
        globset::Glob::new(pattern)
            .with_context(|| format!("Invalid converter.include_globs pattern: '{}'", pattern))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:8000");
        assert_eq!(cfg.generator.interpreter, "python3");
        assert_eq!(cfg.generator.script, PathBuf::from("main.py"));
        assert_eq!(cfg.converter.rewrite, RewriteMode::All);
        assert!(cfg.server.cors_origins.contains(&"null".to_string()));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tutorgen.toml");
        fs::write(
            &path,
            r#"
[generator]
script = "tools/main.py"

[converter]
rewrite = "links"
"#,
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.generator.script, PathBuf::from("tools/main.py"));
        assert_eq!(cfg.generator.interpreter, "python3");
        assert_eq!(cfg.converter.rewrite, RewriteMode::Links);
        assert_eq!(cfg.converter.include_globs, vec!["**/*.md".to_string()]);
    }

    #[test]
    fn test_empty_interpreter_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tutorgen.toml");
        fs::write(&path, "[generator]\ninterpreter = \"\"\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("interpreter"));
    }

    #[test]
    fn test_bad_glob_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tutorgen.toml");
        fs::write(&path, "[converter]\ninclude_globs = [\"**/[*.md\"]\n").unwrap();
        assert!(load_config(&path).is_err());
    }
}
