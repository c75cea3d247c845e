//! Tolerant TSV reader.
//!
//! Blank lines and `#` comment lines are skipped. The header is the first
//! remaining line that names a known feature column (or simply the first
//! remaining line under [`HeaderMode::FirstLine`]); without one, columns are
//! named `col0..colN`. Short rows are padded with empty cells.

use std::path::Path;

use phenorank_core::constants::FEATURE_HEADER_ALIASES;
use phenorank_core::errors::TableError;

/// How the header line is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// First line containing a feature-header alias; headerless otherwise.
    #[default]
    Detect,
    /// First non-comment line is always the header.
    FirstLine,
}

/// One data row with its 1-based physical line number.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub line: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn cell(&self, idx: usize) -> &str {
        self.cells.get(idx).map(String::as_str).unwrap_or("")
    }
}

/// A raw tabular source with uniform row width.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub source_name: String,
    pub columns: Vec<String>,
    pub has_header: bool,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Index of the first column whose name equals one of `aliases`,
    /// case-insensitively.
    pub fn find_column(&self, aliases: &[&str]) -> Option<usize> {
        if !self.has_header {
            return None;
        }
        self.columns.iter().position(|c| {
            let c = c.trim();
            aliases.iter().any(|a| c.eq_ignore_ascii_case(a))
        })
    }

    /// Cell values of one column, top to bottom.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |r| r.cell(idx))
    }
}

/// Read a TSV file from disk.
pub fn read_tsv(path: &Path, mode: HeaderMode) -> Result<RawTable, TableError> {
    if !path.exists() {
        return Err(TableError::MissingSource {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| TableError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_tsv(&source_name, &content, mode)
}

/// Parse TSV text. Fails with `EmptySource` when no data rows remain.
pub fn parse_tsv(source_name: &str, content: &str, mode: HeaderMode) -> Result<RawTable, TableError> {
    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let cells: Vec<String> = line.split('\t').map(|c| c.to_string()).collect();
        if header.is_none() && rows.is_empty() {
            let is_header = match mode {
                HeaderMode::FirstLine => true,
                HeaderMode::Detect => is_feature_header(&cells),
            };
            if is_header {
                header = Some(cells);
                continue;
            }
        }
        rows.push(RawRow { line: idx + 1, cells });
    }

    if rows.is_empty() {
        return Err(TableError::EmptySource {
            source_name: source_name.to_string(),
        });
    }

    let has_header = header.is_some();
    let columns = match header {
        Some(h) => h.into_iter().map(|c| c.trim().to_string()).collect(),
        None => {
            let width = rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
            (0..width).map(|i| format!("col{i}")).collect::<Vec<_>>()
        }
    };
    let width = columns.len();
    for row in &mut rows {
        row.cells.resize(width, String::new());
    }

    tracing::debug!(
        source = source_name,
        rows = rows.len(),
        columns = width,
        has_header,
        "read tabular source"
    );

    Ok(RawTable {
        source_name: source_name.to_string(),
        columns,
        has_header,
        rows,
    })
}

fn is_feature_header(cells: &[String]) -> bool {
    cells.iter().any(|c| {
        let c = c.trim();
        FEATURE_HEADER_ALIASES
            .iter()
            .any(|alias| c.eq_ignore_ascii_case(alias))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_detected_after_comments() {
        let text = "#description: test\n#date: 2025\n\ndatabase_id\tdisease_name\thpo_id\nOMIM:1\tA\tHP:1\nOMIM:2\tB\n";
        let t = parse_tsv("t.hpoa", text, HeaderMode::Detect).unwrap();
        assert!(t.has_header);
        assert_eq!(t.columns, vec!["database_id", "disease_name", "hpo_id"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0].line, 5);
        // padded
        assert_eq!(t.rows[1].cells, vec!["OMIM:2", "B", ""]);
        assert_eq!(t.find_column(&["HPO_ID"]), Some(2));
    }

    #[test]
    fn headerless_gets_positional_names() {
        let text = "ORPHA\t558\tHP:1\nORPHA\t166024\tHP:2\tHP:0040280\n";
        let t = parse_tsv("dump.tsv", text, HeaderMode::Detect).unwrap();
        assert!(!t.has_header);
        assert_eq!(t.columns, vec!["col0", "col1", "col2", "col3"]);
        assert_eq!(t.rows[0].cells.len(), 4);
        assert_eq!(t.find_column(&["col0"]), None);
    }

    #[test]
    fn uppercase_alias_is_a_header() {
        let text = "DatabaseID\tHPO-ID\nOMIM:1\tHP:1\n";
        let t = parse_tsv("x", text, HeaderMode::Detect).unwrap();
        assert!(t.has_header);
        assert_eq!(t.rows.len(), 1);
    }

    #[test]
    fn first_line_mode() {
        let text = "term\tic\nHP:1\t2.5\n";
        let t = parse_tsv("ic.tsv", text, HeaderMode::FirstLine).unwrap();
        assert_eq!(t.columns, vec!["term", "ic"]);
        assert_eq!(t.column(1).collect::<Vec<_>>(), vec!["2.5"]);
    }

    #[test]
    fn comments_only_is_empty_source() {
        let err = parse_tsv("x", "# nothing\n\n", HeaderMode::Detect).unwrap_err();
        assert!(matches!(err, TableError::EmptySource { .. }));
    }

    #[test]
    fn missing_file_is_missing_source() {
        let err = read_tsv(Path::new("/definitely/not/here.tsv"), HeaderMode::Detect).unwrap_err();
        assert!(matches!(err, TableError::MissingSource { .. }));
    }
}
