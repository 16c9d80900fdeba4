/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::anyhow;

static CONFIG_FILE_PATH: OnceLock<PathBuf> = OnceLock::new();
static CONFIG_DIR_PATH: OnceLock<PathBuf> = OnceLock::new();

fn guess_config_file(dir: &Path, program_name: &str) -> anyhow::Result<PathBuf> {
    const GUESS_EXT: &[&str] = &["yml", "yaml", "conf"];

    for ext in GUESS_EXT {
        for stem in ["main", program_name] {
            let path = dir.join(format!("{stem}.{ext}"));
            if path.is_file() {
                return Ok(path);
            }
        }
    }
    Err(anyhow!(
        "no main config file found in dir {}",
        dir.display()
    ))
}

fn validate_and_get_config_file(path: &Path, program_name: &str) -> anyhow::Result<PathBuf> {
    let metadata = fs::metadata(path)
        .map_err(|e| anyhow!("failed to get metadata of path {}: {e}", path.display()))?;

    let path = if metadata.is_dir() {
        guess_config_file(path, program_name)?
    } else {
        path.to_path_buf()
    };

    path.canonicalize()
        .map_err(|e| anyhow!("failed to canonicalize path: {e}"))
}

/// Check the config file path given on the command line and record it.
///
/// If a directory is given, `main.{yml,yaml,conf}` or `<program>.{yml,yaml,conf}` in it is used.
pub fn validate_and_set_config_file(path: &Path, program_name: &str) -> anyhow::Result<()> {
    let config_file = validate_and_get_config_file(path, program_name)?;

    let conf_dir = match config_file.parent() {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };

    CONFIG_FILE_PATH
        .set(config_file)
        .map_err(|_| anyhow!("config file has already been set"))?;
    CONFIG_DIR_PATH
        .set(conf_dir)
        .map_err(|_| anyhow!("config dir has already been set"))?;
    Ok(())
}

pub fn config_file() -> Option<&'static Path> {
    CONFIG_FILE_PATH.get().map(|p| p.as_path())
}

pub fn config_dir() -> Option<&'static Path> {
    CONFIG_DIR_PATH.get().map(|p| p.as_path())
}
