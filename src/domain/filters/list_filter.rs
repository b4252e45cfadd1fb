//! Block-list membership filter.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{Filter, FilterRegistry};
use crate::domain::error::{ConfigError, RunError};
use crate::domain::{normalize_url, FilterResult, Params};

/// Plain block-list, empty unless URLs are declared.
pub const BLOCK_FILTER_NAME: &str = "Block";

/// Block-list seeded from a PhishTank dump.
pub const PHISHTANK_FILTER_NAME: &str = "PhishTankFilter";

/// Parameter naming a block-list file to load.
const DATA_FILE_PARAM: &str = "DATA_FILE";

/// First header field of a PhishTank CSV dump.
const HEADER_FIELD: &str = "phish_id";

/// PhishTank dump file names searched when no `DATA_FILE` is given.
const PHISHTANK_DATA_FILES: &[&str] = &["verified_online.csv", "verified_online.txt"];

/// Filter that blocks URLs present in a set of known-bad URLs.
pub struct ListFilter {
    label: &'static str,
    search_default_data: bool,
    bad: HashSet<String>,
}

impl ListFilter {
    /// A list that only holds URLs given as parameters or via `DATA_FILE`.
    pub fn new() -> Self {
        Self {
            label: "Block",
            search_default_data: false,
            bad: HashSet::new(),
        }
    }

    /// A list that also loads the PhishTank dump from the default locations.
    pub fn phishtank() -> Self {
        Self {
            label: "PhishTank",
            search_default_data: true,
            bad: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bad.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bad.is_empty()
    }

    fn insert(&mut self, raw: &str) {
        match normalize_url(raw) {
            Ok(url) => {
                self.bad.insert(url);
            }
            Err(e) => debug!("Skipping block-list entry {:?}: {}", raw, e),
        }
    }

    fn load_file(&mut self, path: &Path) -> Result<usize, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new(format!("failed to read {}: {}", path.display(), e))
        })?;
        let format = ListFormat::detect(path, &content);
        debug!("Reading {} as {:?} block-list", path.display(), format);
        let entries = match format {
            ListFormat::Csv => parse_csv(&content),
            ListFormat::Plain => parse_plain(&content),
        };

        let before = self.bad.len();
        for entry in &entries {
            self.insert(entry);
        }
        Ok(self.bad.len() - before)
    }
}

impl Default for ListFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Layout of a block-list file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListFormat {
    /// PhishTank dump with the URL in the second column
    Csv,
    /// One URL per line, taken whole
    Plain,
}

impl ListFormat {
    /// CSV when the file has a `.csv` extension or starts with a
    /// `phish_id` header row; plain text otherwise.
    fn detect(path: &Path, content: &str) -> Self {
        let csv_extension = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let csv_header = content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with('#'))
            .is_some_and(is_header);

        if csv_extension || csv_header {
            ListFormat::Csv
        } else {
            ListFormat::Plain
        }
    }
}

fn is_header(field: &str) -> bool {
    field
        .get(..HEADER_FIELD.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(HEADER_FIELD))
}

/// URLs from a PhishTank CSV dump. Quoted fields may contain commas.
///
/// Single-column rows are taken as the URL itself. Malformed rows are
/// skipped with a warning.
fn parse_csv(content: &str) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(content.as_bytes());

    let mut urls = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping malformed block-list row {}: {}", index + 1, e);
                continue;
            }
        };
        if record.get(0).is_some_and(is_header) {
            continue;
        }
        let url = if record.len() > 1 {
            record.get(1)
        } else {
            record.get(0)
        };
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            urls.push(url.to_string());
        }
    }
    urls
}

/// URLs from a plain list. Lines starting with `#` are comments.
fn parse_plain(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Candidate directories holding a PhishTank dump.
fn default_data_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(exe_dir) = env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir.join("data"));
    }
    dirs.push(PathBuf::from("data"));
    dirs.push(PathBuf::from("..").join("data"));
    dirs
}

fn locate_default_data() -> Option<PathBuf> {
    default_data_dirs()
        .into_iter()
        .flat_map(|dir| PHISHTANK_DATA_FILES.iter().map(move |f| dir.join(f)))
        .find(|path| path.is_file())
}

impl Filter for ListFilter {
    fn configure(&mut self, params: &Params) -> Result<(), ConfigError> {
        let data_file = params.get(DATA_FILE_PARAM).map(PathBuf::from);

        match data_file {
            Some(path) => {
                let added = self.load_file(&path)?;
                debug!("Loaded {} block-list entries from {}", added, path.display());
            }
            None if self.search_default_data => match locate_default_data() {
                Some(path) => {
                    let added = self.load_file(&path)?;
                    debug!("Loaded {} PhishTank entries from {}", added, path.display());
                }
                None => warn!("PhishTank data not found, continuing with an empty list"),
            },
            None => {}
        }

        for (key, value) in params {
            if key != DATA_FILE_PARAM {
                self.insert(value);
            }
        }

        if self.is_empty() {
            debug!("[{}] block-list is empty", self.label);
        } else {
            debug!("[{}] block-list holds {} entries", self.label, self.len());
        }
        Ok(())
    }

    fn run(&self, url: &str) -> Result<FilterResult, RunError> {
        let key = url.trim();
        if key.is_empty() {
            return Ok(FilterResult::pass(format!("[{}] empty URL", self.label)));
        }

        let listed = self.bad.contains(key)
            || normalize_url(key).is_ok_and(|normalized| self.bad.contains(&normalized));

        if listed {
            Ok(FilterResult::block(format!(
                "[{}] URL blocked: {}",
                self.label, url
            )))
        } else {
            Ok(FilterResult::pass(format!("[{}] not listed", self.label)))
        }
    }
}

/// Register the block-list filters.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(BLOCK_FILTER_NAME, || Box::new(ListFilter::new()));
    registry.register(PHISHTANK_FILTER_NAME, || Box::new(ListFilter::phishtank()));
}
