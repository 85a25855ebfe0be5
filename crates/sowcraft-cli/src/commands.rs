//! Subcommand handlers.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use sowcraft_core::{Document, SowcraftConfig};
use sowcraft_doc::{Conversion, extract_scope, render_html};
use sowcraft_sheet::build_workbook;
use tracing::info;

use crate::cli::{ConvertArgs, RepriceArgs, RolesArgs, WorkbookArgs};
use crate::display;

pub fn load_config(path: Option<&Path>) -> anyhow::Result<SowcraftConfig> {
    match path {
        Some(path) => SowcraftConfig::load(path)
            .with_context(|| format!("loading policy {}", path.display())),
        None => Ok(SowcraftConfig::default()),
    }
}

pub fn convert(args: &ConvertArgs, config: &SowcraftConfig) -> anyhow::Result<()> {
    let raw = read_input(&args.input)?;
    let catalog = config.catalog();
    let conversion = sowcraft_doc::convert(&raw, &catalog, &config.pricing)
        .context("converting narrative")?;

    display::print_conversion(&conversion, &config.pricing);
    write_outputs(&conversion, args.json.as_deref(), args.html.as_deref(), config)
}

pub fn reprice(args: &RepriceArgs, config: &SowcraftConfig) -> anyhow::Result<()> {
    let text = read_input(&args.input)?;
    let document = Document::from_json(&text)
        .with_context(|| format!("parsing document {}", args.input.display()))?;
    let catalog = config.catalog();
    let conversion = sowcraft_doc::reprice(&document, &catalog, &config.pricing)
        .context("repricing document")?;

    display::print_conversion(&conversion, &config.pricing);
    write_outputs(&conversion, args.json.as_deref(), args.html.as_deref(), config)
}

pub fn workbook(args: &WorkbookArgs, config: &SowcraftConfig) -> anyhow::Result<()> {
    let raw = read_input(&args.input)?;
    let catalog = config.catalog();
    let extracted = extract_scope(&raw)
        .context("response has no structured scope (scopeItems) to build a workbook from")?;

    let model = build_workbook(
        &extracted.scope,
        &catalog,
        &config.pricing,
        extracted.discount_percent,
    )?;
    model
        .write_xlsx(&args.out)
        .with_context(|| format!("writing {}", args.out.display()))?;

    display::print_workbook(&model, &args.out);
    Ok(())
}

pub fn roles(args: &RolesArgs, config: &SowcraftConfig) -> anyhow::Result<()> {
    let catalog = config.catalog();
    let entries = match args.search.as_deref() {
        Some(term) => catalog.search(term),
        None => catalog.entries().iter().collect(),
    };
    display::print_roles(&entries);
    Ok(())
}

// ── I/O ──

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn write_outputs(
    conversion: &Conversion,
    json: Option<&Path>,
    html: Option<&Path>,
    config: &SowcraftConfig,
) -> anyhow::Result<()> {
    if let Some(path) = json {
        let body = conversion.document.to_json_pretty()?;
        std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote document json");
    }
    if let Some(path) = html {
        let body = render_html(&conversion.document, &config.pricing);
        std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote html");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    const RAW: &str = r#"# Scope of Work: Acme Portal

## Overview
A customer portal.

[pricing_table]

```json
{"scopeItems":[
  {"name":"Discovery","roles":[{"role":"Tech - Producer - Design","hours":12}]},
  {"name":"Build","roles":[
    {"role":"Tech - Producer - Development","hours":40},
    {"role":"Chief Vibes Officer","hours":2}
  ]}
]}
```"#;

    fn write_input(dir: &Path) -> PathBuf {
        let path = dir.join("response.md");
        std::fs::write(&path, RAW).unwrap();
        path
    }

    #[test]
    fn convert_writes_json_and_html() {
        let dir = tempfile::tempdir().unwrap();
        let args = ConvertArgs {
            input: write_input(dir.path()),
            json: Some(dir.path().join("doc.json")),
            html: Some(dir.path().join("doc.html")),
        };
        convert(&args, &SowcraftConfig::default()).unwrap();

        let json = std::fs::read_to_string(dir.path().join("doc.json")).unwrap();
        let doc = Document::from_json(&json).unwrap();
        assert_eq!(doc.pricing_table_count(), 1);

        let html = std::fs::read_to_string(dir.path().join("doc.html")).unwrap();
        assert!(html.contains("<table class=\"pricing-table\">"));
    }

    #[test]
    fn reprice_round_trips_a_converted_document() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("doc.json");
        convert(
            &ConvertArgs {
                input: write_input(dir.path()),
                json: Some(json.clone()),
                html: None,
            },
            &SowcraftConfig::default(),
        )
        .unwrap();

        let again = dir.path().join("again.json");
        reprice(
            &RepriceArgs {
                input: json.clone(),
                json: Some(again.clone()),
                html: None,
            },
            &SowcraftConfig::default(),
        )
        .unwrap();
        assert_eq!(std::fs::read_to_string(json).unwrap(), std::fs::read_to_string(again).unwrap());
    }

    #[test]
    fn workbook_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sow.xlsx");
        let args = WorkbookArgs {
            input: write_input(dir.path()),
            out: out.clone(),
        };
        workbook(&args, &SowcraftConfig::default()).unwrap();
        assert!(std::fs::metadata(out).unwrap().len() > 0);
    }

    #[test]
    fn workbook_without_scope_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("table.md");
        let table = "| Role | Hours | Rate |\n|---|---|---|\n| Tech - Producer - Design | 2 | 0 |";
        std::fs::write(&input, table).unwrap();
        let args = WorkbookArgs {
            input,
            out: dir.path().join("sow.xlsx"),
        };
        let err = workbook(&args, &SowcraftConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("no structured scope"));
    }

    #[test]
    fn workbook_does_not_need_priceable_roles() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("placeholders.md");
        let raw = r#"```json
{"scopeItems":[{"name":"Phase 1","roles":[{"role":"TBD","hours":8}]}]}
```"#;
        std::fs::write(&input, raw).unwrap();
        let out = dir.path().join("sow.xlsx");
        let convert_args = ConvertArgs {
            input: input.clone(),
            json: None,
            html: None,
        };
        assert!(convert(&convert_args, &SowcraftConfig::default()).is_err());

        workbook(
            &WorkbookArgs {
                input,
                out: out.clone(),
            },
            &SowcraftConfig::default(),
        )
        .unwrap();
        assert!(std::fs::metadata(out).unwrap().len() > 0);
    }

    #[test]
    fn missing_pricing_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.md");
        std::fs::write(&input, "## Overview\nNothing priced here.").unwrap();
        let args = ConvertArgs {
            input,
            json: None,
            html: None,
        };
        let err = convert(&args, &SowcraftConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("converting narrative"));
    }

    #[test]
    fn policy_file_overrides_rate_card() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        std::fs::write(
            &path,
            "[[roles]]\nname = \"Tech - Producer - Development\"\nhourly_rate = 99.0\n",
        )
        .unwrap();
        let config = load_config(Some(&path)).unwrap();
        let catalog = config.catalog();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lookup("tech - producer - development").unwrap().hourly_rate, 99.0);
    }
}
