//! Catalog and selection files.
//!
//! The format is picked from the file extension: `.json` or `.toml`.
//! A JSON selection file holds the bare wire array; TOML cannot hold an
//! array at the root, so a TOML selection file is a [`SelectionDocument`]
//! with a `selection` array of tables.

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::{Context, bail};
use schemars::schema_for;

use crate::data::{
    catalog::Catalog,
    selection::{SelectedOption, SelectionDocument},
};

fn extension(path: &Path) -> &str {
    path.extension().and_then(|s| s.to_str()).unwrap_or("")
}

/// Derive the default selection file path from a catalog path.
///
/// `shirt.json` becomes `shirt-selection.json` next to it.
pub fn default_selection_path(catalog: &Path) -> PathBuf {
    let binding = catalog
        .file_name()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let mut name_split = binding.split('.').collect::<Vec<_>>();
    if name_split.len() > 1 {
        name_split.pop();
    }

    let name = format!("{}-selection.json", name_split.join("."));

    match catalog.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Load a catalog from a `.json` or `.toml` file.
pub fn load_catalog(path: impl AsRef<Path>) -> anyhow::Result<Catalog> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_catalog(&content, extension(path))
}

/// Parse catalog content in the format named by `ext`.
pub fn parse_catalog(content: &str, ext: &str) -> anyhow::Result<Catalog> {
    let catalog = match ext {
        "json" => serde_json::from_str(content)?,
        "toml" => toml::from_str(content)?,
        _ => bail!("Unsupported catalog file extension: {ext:?}"),
    };
    Ok(catalog)
}

/// Load a selection from a `.json` or `.toml` file.
///
/// A missing or blank file is an empty selection.
pub fn load_selection(path: impl AsRef<Path>) -> anyhow::Result<Vec<SelectedOption>> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("no selection at {}, starting empty", path.display());
        return Ok(Vec::new());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_selection(&content, extension(path))
}

/// Parse selection content in the format named by `ext`.
pub fn parse_selection(content: &str, ext: &str) -> anyhow::Result<Vec<SelectedOption>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let selection = match ext {
        "json" => serde_json::from_str(content)?,
        "toml" => toml::from_str::<SelectionDocument>(content)?.selection,
        _ => bail!("Unsupported selection file extension: {ext:?}"),
    };
    Ok(selection)
}

/// Render a selection in the format named by `ext`.
pub fn format_selection(selection: &[SelectedOption], ext: &str) -> anyhow::Result<String> {
    let s = match ext {
        "json" => serde_json::to_string_pretty(selection)?,
        "toml" => toml::to_string_pretty(&SelectionDocument {
            selection: selection.to_vec(),
        })?,
        _ => bail!("Unsupported selection file extension: {ext:?}"),
    };
    Ok(s)
}

/// Write a selection, keeping a timestamped backup of any previous file.
///
/// The backup sits next to `path` as `<stem>.bk-<unix-seconds>.<ext>`.
/// Saves within the same second get `bk-<secs>-1`, `bk-<secs>-2` and so on,
/// so no earlier backup is overwritten. Returns the backup path when one was
/// made.
pub fn save_selection(
    path: impl AsRef<Path>,
    selection: &[SelectedOption],
) -> anyhow::Result<Option<PathBuf>> {
    let path = path.as_ref();
    let ext = extension(path);
    let s = format_selection(selection, ext)?;

    let mut backup = None;
    if path.exists() {
        let backup_path = backup_path(path, ext)?;
        fs::copy(path, &backup_path)
            .with_context(|| format!("Failed to back up {}", path.display()))?;
        info!("backed up {} to {}", path.display(), backup_path.display());
        backup = Some(backup_path);
    }

    fs::write(path, s).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(backup)
}

fn backup_path(path: &Path, ext: &str) -> anyhow::Result<PathBuf> {
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)?
        .as_secs();
    let mut candidate = path.with_extension(format!("bk-{secs}.{ext}"));
    let mut n = 1;
    while candidate.exists() {
        candidate = path.with_extension(format!("bk-{secs}-{n}.{ext}"));
        n += 1;
    }
    Ok(candidate)
}

/// JSON schema of the catalog format.
pub fn catalog_schema() -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::to_value(schema_for!(Catalog))?)
}

/// JSON schema of the selection wire format.
pub fn selection_schema() -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::to_value(schema_for!(Vec<SelectedOption>))?)
}
