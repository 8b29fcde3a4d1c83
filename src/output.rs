use std::{fmt::Write as _, io::Write};

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled, settings::Style};

use crate::report::{OutdatedElement, RepoDuplicateGroup, Report};

/// Width of the label column in the duplicate repository blocks
const LABEL_WIDTH: usize = 24;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum Format {
  /// Aligned columns for reading in a terminal
  #[default]
  Table,
  /// JSON array of outdated releases
  Json,
  /// YAML list of outdated releases
  Yaml,
}

/// A repository serving the chart of an ambiguous release
#[derive(Tabled)]
#[tabled(rename_all = "UpperCase")]
struct RepoRow {
  repository: String,
  deprecated: bool,
  #[tabled(rename = "CHART VERSION")]
  chart_version: String,
  #[tabled(rename = "APP VERSION")]
  app_version: String,
  updated: String,
}

impl From<&OutdatedElement> for RepoRow {
  fn from(element: &OutdatedElement) -> Self {
    Self {
      repository: element.repository().to_owned(),
      deprecated: element.deprecated,
      chart_version: element.latest_version.to_owned(),
      app_version: element.app_version.to_owned(),
      updated: element.updated.as_ref().map(timestamp).unwrap_or_default(),
    }
  }
}

fn timestamp(time: &DateTime<Utc>) -> String {
  time.format("%Y-%m-%d %H:%M:%S %z %Z").to_string()
}

impl Report {
  pub(crate) fn to_stdout_table(&self) -> Result<String> {
    let mut output = String::new();

    let mut table = Table::new(&self.outdated);
    table.with(Style::blank());
    writeln!(output, "{table}")?;

    if self.duplicates.is_empty() {
      return Ok(output);
    }

    output.push_str("\n\n");
    for group in &self.duplicates {
      output.push_str(&group.to_stdout_block()?);
    }
    output.push_str("----\n");

    Ok(output)
  }

  fn to_names(&self) -> String {
    self
      .outdated
      .iter()
      .map(|element| format!("{}\n", element.name))
      .collect()
  }
}

impl RepoDuplicateGroup {
  fn to_stdout_block(&self) -> Result<String> {
    let mut output = String::new();
    let installed = self
      .repos
      .first()
      .map(|element| element.installed_version.as_str())
      .unwrap_or_default();

    writeln!(output, "----")?;
    writeln!(output, "{:<LABEL_WIDTH$}{}", "NAME", self.name)?;
    writeln!(output, "{:<LABEL_WIDTH$}{}", "NAMESPACE", self.namespace)?;
    writeln!(output, "{:<LABEL_WIDTH$}{}\n", "INSTALLED VERSION", installed)?;

    let rows: Vec<RepoRow> = self.repos.iter().map(RepoRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::blank());
    writeln!(output, "{table}")?;

    Ok(output)
  }
}

/// Render a report in the requested format
///
/// Structured formats carry the outdated releases only; ambiguous releases are a table-only block.
/// `short` prints just the names of outdated releases.
pub fn render(report: &Report, format: Format, short: bool) -> Result<String> {
  let output = match format {
    Format::Table if short => report.to_names(),
    Format::Table => report.to_stdout_table()?,
    Format::Json => format!("{}\n", serde_json::to_string_pretty(&report.outdated)?),
    Format::Yaml => serde_yaml::to_string(&report.outdated)?,
  };

  Ok(output)
}

pub fn output(out: &mut impl Write, report: &Report, format: Format, short: bool) -> Result<()> {
  out.write_all(render(report, format, short)?.as_bytes())?;
  out.flush()?;

  Ok(())
}
