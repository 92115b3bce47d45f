// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - inspect the effective configuration

use crate::config::{self, Config};
use anyhow::{bail, Result};

/// Run the config command
pub fn run(config: &Config, action: &str, key: Option<&str>) -> Result<()> {
    match action {
        "show" => {
            print!("{}", config.to_toml()?);
        }
        "path" => match config::default_path() {
            Some(path) => println!("{}", path.display()),
            None => bail!("No configuration directory available on this platform"),
        },
        "get" => {
            let key = key.ok_or_else(|| anyhow::anyhow!("A key is required, e.g. selection.language_cap"))?;
            match config.get(key)? {
                Some(value) => println!("{value}"),
                None => bail!("Unknown configuration key: {}", key),
            }
        }
        _ => bail!("Unknown action: {}. Use show, path, or get", action),
    }
    Ok(())
}
