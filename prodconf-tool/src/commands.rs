//! Subcommand handlers.
//!
//! Each handler returns the text to print so the binary stays a thin
//! dispatcher.

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::ValueEnum;
use colored::Colorize;
use prodconf::{Catalog, ProductConfiguration, SelectedOption, files, render::render};
use prodconf_api::{ApiClient, ApiConfig};

use crate::{ctx::AppContext, render::ColoredTree};

/// Which JSON schema to print.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SchemaKind {
    /// Catalog file format.
    Catalog,
    /// Selection wire format.
    Selection,
}

/// How `select` changes the named option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectMode {
    On,
    Off,
    Exclusive,
}

/// Validate a catalog and summarize its features.
pub fn validate(catalog: &Catalog) -> anyhow::Result<String> {
    let index = catalog.validate()?;
    let mut out = format!(
        "{} {} feature definitions, {} top-level",
        "valid:".green().bold(),
        index.len(),
        catalog.feature_refs.len()
    );
    for def in &catalog.feature_defs {
        let kind = def.selection_kind()?;
        out.push_str(&format!(
            "\n  {} {kind} ({} options)",
            def.code.bold(),
            def.options.len()
        ));
    }
    Ok(out)
}

/// Render the visible tree and list the unsatisfied features.
pub fn tree(config: &ProductConfiguration) -> String {
    let mut renderer = ColoredTree::new();
    render(config, &mut renderer);
    let mut out = renderer.finish();

    let unsatisfied = config.unsatisfied_features();
    if !unsatisfied.is_empty() {
        out.push_str(&format!("\n{}", "unsatisfied:".yellow().bold()));
        for id in unsatisfied {
            if let Some(feature) = config.feature(id) {
                out.push_str(&format!("\n  {}", feature.key()));
            }
        }
    }
    out
}

/// Change one option, addressed by its key path.
pub fn select(
    config: &mut ProductConfiguration,
    key: &str,
    mode: SelectMode,
) -> anyhow::Result<Vec<SelectedOption>> {
    let option = config
        .find_option(key)
        .ok_or_else(|| anyhow!("no option with key `{key}`"))?;
    match mode {
        SelectMode::On => config.set_selected(option, true)?,
        SelectMode::Off => config.set_selected(option, false)?,
        SelectMode::Exclusive => config.select_exclusive(option)?,
    }
    Ok(config.get_api_selection())
}

/// Merge or replace the current selection with the one in `incoming`.
pub fn apply(
    config: &mut ProductConfiguration,
    incoming: &Path,
    replace: bool,
) -> anyhow::Result<Vec<SelectedOption>> {
    let selection = files::load_selection(incoming)?;
    config.set_api_selection(&selection, replace);
    Ok(config.get_api_selection())
}

/// Print a selection or save it to `output`.
pub fn emit_selection(
    selection: &[SelectedOption],
    output: Option<&Path>,
) -> anyhow::Result<String> {
    match output {
        Some(path) => {
            let backup = files::save_selection(path, selection)?;
            let mut out = format!("saved {}", path.display());
            if let Some(backup) = backup {
                out.push_str(&format!(" (previous kept as {})", backup.display()));
            }
            Ok(out)
        }
        None => Ok(serde_json::to_string_pretty(selection)?),
    }
}

pub fn schema(kind: SchemaKind) -> anyhow::Result<String> {
    let schema = match kind {
        SchemaKind::Catalog => files::catalog_schema()?,
        SchemaKind::Selection => files::selection_schema()?,
    };
    Ok(serde_json::to_string_pretty(&schema)?)
}

/// Build an API client from a TOML file or the environment.
pub fn api_client(api_config: Option<&Path>) -> anyhow::Result<ApiClient> {
    let config = match api_config {
        Some(path) => ApiConfig::from_file(path)?,
        None => ApiConfig::from_env()?,
    };
    Ok(ApiClient::new(config)?)
}

/// Download a catalog, check it and print or save it.
pub async fn fetch(
    client: &ApiClient,
    product: &str,
    output: Option<&Path>,
) -> anyhow::Result<String> {
    let catalog = client.fetch_catalog(product).await?;
    catalog
        .validate()
        .with_context(|| format!("Catalog of {product} is invalid"))?;
    let content = serde_json::to_string_pretty(&catalog)?;
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Ok(format!("saved {}", path.display()))
        }
        None => Ok(content),
    }
}

/// Upload the selection stored in `selection`.
pub async fn push(client: &ApiClient, product: &str, selection: &Path) -> anyhow::Result<String> {
    let selection = files::load_selection(selection)?;
    let id = client.save_selection(product, &selection).await?;
    Ok(format!("{} {id}", "stored:".green().bold()))
}

/// Load the context and configuration for a catalog-based command.
pub fn open(
    catalog: &Path,
    selection: Option<PathBuf>,
) -> anyhow::Result<(AppContext, ProductConfiguration)> {
    let ctx = AppContext::load(catalog, selection)?;
    let config = ctx.configuration()?;
    Ok((ctx, config))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use prodconf::ConfigError;

    use super::*;

    const CATALOG: &str = r#"{
        "featureRefs": ["size", "extras"],
        "featureDefs": [
            {"code": "size", "kind": "selectOne", "options": [{"code": "s"}, {"code": "m"}]},
            {"code": "extras", "multiple": true, "optional": true, "options": [
                {"code": "bag"}, {"code": "strap"}
            ]}
        ]
    }"#;

    fn workspace() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("shirt.json");
        fs::write(&catalog, CATALOG).unwrap();
        (dir, catalog)
    }

    #[test]
    fn test_validate_reports_errors() {
        colored::control::set_override(false);
        let catalog: Catalog = serde_json::from_str(CATALOG).unwrap();
        let out = validate(&catalog).unwrap();
        assert!(out.contains("2 feature definitions"));
        assert!(out.contains("extras selectMany"));

        let broken: Catalog = serde_json::from_str(
            r#"{"featureRefs": ["x"], "featureDefs": [{"code": "x", "options": []}]}"#,
        )
        .unwrap();
        assert!(validate(&broken).is_err());
    }

    #[test]
    fn test_select_and_save() {
        let (dir, catalog) = workspace();
        let (ctx, mut config) = open(&catalog, None).unwrap();

        let selection = select(&mut config, "size/m", SelectMode::On).unwrap();
        let out = dir.path().join("shirt-selection.json");
        emit_selection(&selection, Some(&out)).unwrap();
        ctx.shutdown();

        let (_, config) = open(&catalog, None).unwrap();
        let m = config.find_option("size/m").unwrap();
        assert!(config.option(m).unwrap().is_selected());
        assert_eq!(config.revision(), 0);
    }

    #[test]
    fn test_select_rejects_bad_targets() {
        let (_dir, catalog) = workspace();
        let (_, mut config) = open(&catalog, None).unwrap();

        assert!(select(&mut config, "size/xl", SelectMode::On).is_err());
        let err = select(&mut config, "extras/bag", SelectMode::Exclusive).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_apply_replace() {
        let (dir, catalog) = workspace();
        let base = dir.path().join("base.json");
        fs::write(
            &base,
            r#"[{"code":"!~!","next":{"s":{"code":"s"}}},{"code":"!~!","next":{"bag":{"code":"bag"}}}]"#,
        )
        .unwrap();
        let incoming = dir.path().join("incoming.json");
        fs::write(&incoming, r#"[{"code":"!~!"},{"code":"!~!","next":{"strap":{"code":"strap"}}}]"#)
            .unwrap();

        let (_, mut config) = open(&catalog, Some(base.clone())).unwrap();
        let merged = apply(&mut config, &incoming, false).unwrap();
        assert_eq!(merged[1].next.len(), 2);

        let (_, mut config) = open(&catalog, Some(base)).unwrap();
        let replaced = apply(&mut config, &incoming, true).unwrap();
        assert!(replaced[0].next.is_empty());
        assert_eq!(replaced[1].next.keys().collect::<Vec<_>>(), ["strap"]);
    }

    #[test]
    fn test_schema_output() {
        let out = schema(SchemaKind::Selection).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["type"], "array");
    }
}
