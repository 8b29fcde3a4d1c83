use std::{cmp::Ordering, fmt};

use semver::Version;

use crate::error::{Error, Result};

/// Given a chart version, parse it into a semantic version
///
/// Chart versions are parsed leniently: a leading `v` is accepted and partial
/// versions are padded with zeros.
///
/// For example, `v1.2` is parsed as `1.2.0` and `3` as `3.0.0`
pub fn parse(version: &str) -> Result<Version> {
  let trimmed = version.trim();
  let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

  let split = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
  let (core, suffix) = trimmed.split_at(split);
  let normalized = match core.split('.').count() {
    1 => format!("{core}.0.0{suffix}"),
    2 => format!("{core}.0{suffix}"),
    _ => trimmed.to_string(),
  };

  Version::parse(&normalized).map_err(|source| Error::VersionParse {
    version: version.to_string(),
    source,
  })
}

/// Semantic version precedence, ignoring build metadata
pub(crate) fn precedence(a: &Version, b: &Version) -> Ordering {
  (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

/// Constraint that accepts chart versions strictly newer than an installed version
///
/// Built once per release; the installed version is parsed when the constraint is created.
#[derive(Clone, Debug)]
pub struct Constraint {
  installed: Version,
  devel: bool,
}

impl Constraint {
  /// Equivalent to `> installed`, or `> installed-0, != installed` when `devel` is set
  pub fn newer_than(installed: &str, devel: bool) -> Result<Self> {
    Ok(Self {
      installed: parse(installed)?,
      devel,
    })
  }

  pub fn matches(&self, candidate: &Version) -> bool {
    // Pre-releases are only eligible when asked for, or when the installed version is one itself
    if !candidate.pre.is_empty() && !self.devel && self.installed.pre.is_empty() {
      return false;
    }

    precedence(candidate, &self.installed) == Ordering::Greater
  }
}

impl fmt::Display for Constraint {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    if self.devel && self.installed.pre.is_empty() {
      write!(f, "> {}-0 != {}", self.installed, self.installed)
    } else {
      write!(f, "> {}", self.installed)
    }
  }
}

/// Returns true if `candidate` is strictly newer than `installed`
pub fn is_newer(installed: &str, candidate: &str, devel: bool) -> Result<bool> {
  let constraint = Constraint::newer_than(installed, devel)?;
  Ok(constraint.matches(&parse(candidate)?))
}
