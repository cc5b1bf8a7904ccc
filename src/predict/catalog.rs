use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::predict::elements::OrbitalElementSet;
use crate::predict::error::PredictError;

/// Outcome of ingesting a batch of element sets.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub loaded: Vec<String>,
    pub rejected: Vec<(String, PredictError)>,
}

impl IngestReport {
    fn merge(&mut self, other: IngestReport) {
        self.loaded.extend(other.loaded);
        self.rejected.extend(other.rejected);
    }
}

/// Element sets keyed by satellite name. Names are unique; a later set
/// with the same name replaces the earlier one.
#[derive(Debug, Default, Clone)]
pub struct ElementCatalog {
    satellites: BTreeMap<String, Arc<OrbitalElementSet>>,
}

impl ElementCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, set: OrbitalElementSet) -> Option<Arc<OrbitalElementSet>> {
        self.satellites.insert(set.name().to_string(), Arc::new(set))
    }

    pub fn get(&self, name: &str) -> Option<Arc<OrbitalElementSet>> {
        self.satellites.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.satellites.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.satellites.keys().cloned().collect()
    }

    pub fn satellites(&self) -> impl Iterator<Item = &Arc<OrbitalElementSet>> {
        self.satellites.values()
    }

    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }

    /// Parses 2- or 3-line sets from `content`. Sets that fail to parse
    /// are reported and skipped; the rest are inserted.
    pub fn ingest_str(&mut self, content: &str) -> IngestReport {
        let mut report = IngestReport::default();

        for (name, line1, line2) in parse_multi_tle(content) {
            let label = name.clone().unwrap_or_else(|| line1.clone());
            match OrbitalElementSet::parse(name.as_deref().unwrap_or(""), &line1, &line2) {
                Ok(set) => {
                    let name = set.name().to_string();
                    if self.insert(set).is_some() {
                        log::debug!("Replaced elements for {}", name);
                    }
                    report.loaded.push(name);
                }
                Err(e) => {
                    log::warn!("Skipping {}: {}", label, e);
                    report.rejected.push((label, e));
                }
            }
        }

        report
    }

    pub fn load_file(&mut self, path: &Path) -> Result<IngestReport, PredictError> {
        let content = fs::read_to_string(path)?;
        Ok(self.ingest_str(&content))
    }

    /// Loads every `*.tle` and `*.txt` file in `dir`, in file name order.
    pub fn load_dir(&mut self, dir: &Path) -> Result<IngestReport, PredictError> {
        if !dir.is_dir() {
            return Err(PredictError::DirectoryNotFound(dir.display().to_string()));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_tle = path
                .extension()
                .is_some_and(|ext| ext == "tle" || ext == "txt");
            if path.is_file() && is_tle {
                paths.push(path);
            }
        }
        paths.sort();

        let mut report = IngestReport::default();
        for path in paths {
            match self.load_file(&path) {
                Ok(file_report) => report.merge(file_report),
                Err(e) => log::warn!("Failed to read TLE file {}: {}", path.display(), e),
            }
        }

        log::info!(
            "Loaded {} element sets from {} ({} rejected)",
            report.loaded.len(),
            dir.display(),
            report.rejected.len()
        );
        Ok(report)
    }
}

/// Splits text into (name, line1, line2) triples. Unrecognized lines are
/// skipped.
fn parse_multi_tle(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            let name = lines[i].strip_prefix("0 ").unwrap_or(lines[i]).trim();
            result.push((
                Some(name.to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::test_support::{ISS_LINE1, ISS_LINE2};

    fn three_line(name: &str, line2: &str) -> String {
        format!("{}\n{}\n{}\n", name, ISS_LINE1, line2)
    }

    #[test]
    fn splits_two_and_three_line_sets() {
        let text = format!(
            "ISS (ZARYA)\n{l1}\n{l2}\n\n{l1}\n{l2}\n0 ZARYA\n{l1}\n{l2}\ngarbage\n",
            l1 = ISS_LINE1,
            l2 = ISS_LINE2
        );
        let sets = parse_multi_tle(&text);
        assert_eq!(sets.len(), 3);
        assert_eq!(sets[0].0.as_deref(), Some("ISS (ZARYA)"));
        assert_eq!(sets[1].0, None);
        assert_eq!(sets[2].0.as_deref(), Some("ZARYA"));
    }

    #[test]
    fn later_entries_overwrite_by_name() {
        let mut catalog = ElementCatalog::new();
        let report = catalog.ingest_str(&format!(
            "{}{}",
            three_line("ISS", ISS_LINE2),
            three_line("ISS", ISS_LINE2)
        ));
        assert_eq!(report.loaded, vec!["ISS", "ISS"]);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn malformed_set_is_excluded_but_others_load() {
        let bad = "2 25544  5X.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";
        let mut catalog = ElementCatalog::new();
        let report = catalog.ingest_str(&format!(
            "{}{}",
            three_line("BROKEN", bad),
            three_line("ISS", ISS_LINE2)
        ));

        assert_eq!(report.loaded, vec!["ISS"]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, "BROKEN");
        assert!(!catalog.contains("BROKEN"));
        assert_eq!(catalog.names(), vec!["ISS"]);
    }

    #[test]
    fn loads_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("amateur.tle"), three_line("ISS", ISS_LINE2)).unwrap();
        fs::write(dir.path().join("notes.md"), "not elements").unwrap();

        let mut catalog = ElementCatalog::new();
        let report = catalog.load_dir(dir.path()).unwrap();
        assert_eq!(report.loaded, vec!["ISS"]);
        assert!(catalog.get("ISS").is_some());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let mut catalog = ElementCatalog::new();
        let err = catalog
            .load_dir(Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(matches!(err, PredictError::DirectoryNotFound(_)));
    }
}
