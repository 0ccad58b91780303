//! `config init` and `config validate`.

use std::path::Path;

use anyhow::{Context, Result};

use forgescope_core::config::ForgescopeConfig;

use crate::style;

const HEADER: &str = "# forgescope configuration\n# Every key is optional; the values below are the defaults.\n\n";

/// Write a configuration file containing the defaults.
pub fn run_init(output: &Path) -> Result<()> {
    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    let body = ForgescopeConfig::default()
        .to_toml()
        .context("failed to render default configuration")?;
    std::fs::write(output, format!("{HEADER}{body}")).context("failed to write config file")?;

    println!("{}", style::success(&format!("Default configuration written to {}", output.display())));
    println!();
    println!("Validate with: forgescope config validate --config {}", output.display());
    Ok(())
}

/// Report the configuration in effect. Loading already validated it.
pub fn run_validate(path: Option<&Path>, config: &ForgescopeConfig) -> Result<()> {
    match path {
        Some(path) => println!("Configuration: {}", path.display()),
        None => println!("Configuration: {}", style::dim("built-in defaults")),
    }
    println!();
    println!("  [OK] TOML structure is valid");
    println!("  [OK] All values are valid");
    println!();
    println!("  git binary   : {}", config.git.binary);
    println!("  git timeout  : {}s", config.git.timeout_secs);
    println!("  pin locale   : {}", config.git.pin_locale);
    println!("  log level    : {}", config.logging.level);
    println!();
    println!("{}", style::success("Configuration is valid"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forgescope.toml");
        run_init(&path).unwrap();

        let loaded = ForgescopeConfig::load_and_validate(&path).unwrap();
        assert_eq!(loaded, ForgescopeConfig::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forgescope.toml");
        std::fs::write(&path, "keep me").unwrap();

        assert!(run_init(&path).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }
}
