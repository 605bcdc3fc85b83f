//! The miRTarBase MTI records that are the input of the mapping.
//!
//! Each record has nine positional fields:
//!
//! | column | field |
//! |---|---|
//! | 0 | miRTarBase ID, like MIRT000002 |
//! | 1 | miRNA |
//! | 2 | Species (miRNA) |
//! | 3 | Target Gene |
//! | 4 | Target Gene (Entrez Gene ID) |
//! | 5 | Species (Target Gene) |
//! | 6 | Experiments |
//! | 7 | Support Type |
//! | 8 | References (PMID) |
//!
//! The same ID and the next five columns can be repeated on several
//! rows, with different evidence in columns 6-8.

use std::io::{BufRead, BufReader, Read};

use anyhow::{Context, Result};

/// One row of the MTI table.  Blank cells are `None`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct MtiRecord {
    pub mirtarbase_id: Option<String>,
    pub mirna: Option<String>,
    pub mirna_species: Option<String>,
    pub target_gene: Option<String>,
    pub target_gene_id: Option<String>,
    pub target_species: Option<String>,
    pub experiments: Option<String>,
    pub support_type: Option<String>,
    pub pmid: Option<String>,
}

fn cell(fields: &[&str], index: usize) -> Option<String> {
    let value = fields.get(index)?.trim();

    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

impl MtiRecord {
    /// Make a record from positional fields.  Cells are trimmed and
    /// missing or blank cells become `None`.
    pub fn from_fields(fields: &[&str]) -> MtiRecord {
        MtiRecord {
            mirtarbase_id: cell(fields, 0),
            mirna: cell(fields, 1),
            mirna_species: cell(fields, 2),
            target_gene: cell(fields, 3),
            target_gene_id: cell(fields, 4),
            target_species: cell(fields, 5),
            experiments: cell(fields, 6),
            support_type: cell(fields, 7),
            pmid: cell(fields, 8),
        }
    }
}

/// The value of a cell that should hold a positive integer ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericCell {
    Blank,
    Valid(u64),
    /// The cell text, which isn't a positive integer
    Invalid(String),
}

// the largest integer an f64 holds exactly
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

/// Parse a gene or publication ID cell.  Spreadsheet exports write
/// numbers like "7157.0" so integral floats are accepted.  Zero and
/// negative values are invalid.
pub fn parse_numeric_cell(cell: Option<&str>) -> NumericCell {
    let Some(text) = cell.map(str::trim).filter(|text| !text.is_empty())
    else {
        return NumericCell::Blank;
    };

    if let Ok(value) = text.parse::<u64>() {
        if value > 0 {
            return NumericCell::Valid(value);
        }
        return NumericCell::Invalid(text.to_owned());
    }

    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 &&
            value > 0.0 && value <= MAX_EXACT_FLOAT_INT => NumericCell::Valid(value as u64),
        _ => NumericCell::Invalid(text.to_owned()),
    }
}

/// Read a tab-delimited MTI table.  The first line is the header.
pub fn parse_mti_tsv(source: &mut dyn Read) -> Result<Vec<MtiRecord>> {
    let reader = BufReader::new(source);

    let mut ret = vec![];

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read MTI line {}", line_idx + 1))?;

        if line_idx == 0 || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<_> = line.split('\t').collect();

        ret.push(MtiRecord::from_fields(&fields));
    }

    Ok(ret)
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use super::*;

    #[test]
    fn numeric_cell_test() {
        assert_eq!(parse_numeric_cell(Some("7157")), NumericCell::Valid(7157));
        assert_eq!(parse_numeric_cell(Some(" 7157.0 ")), NumericCell::Valid(7157));
        assert_eq!(parse_numeric_cell(Some("N/A")), NumericCell::Invalid("N/A".to_owned()));
        assert_eq!(parse_numeric_cell(Some("0")), NumericCell::Invalid("0".to_owned()));
        assert_eq!(parse_numeric_cell(Some("-12")), NumericCell::Invalid("-12".to_owned()));
        assert_eq!(parse_numeric_cell(Some("12.5")), NumericCell::Invalid("12.5".to_owned()));
        assert_eq!(parse_numeric_cell(Some("  ")), NumericCell::Blank);
        assert_eq!(parse_numeric_cell(None), NumericCell::Blank);
    }

    #[test]
    fn from_fields_test() {
        let record = MtiRecord::from_fields(&["MIRT000001 ", "hsa-miR-21-5p", "Homo sapiens",
                                              "PTEN", ""]);

        assert_eq!(record.mirtarbase_id.as_deref(), Some("MIRT000001"));
        assert_eq!(record.target_gene.as_deref(), Some("PTEN"));
        assert!(record.target_gene_id.is_none());
        assert!(record.pmid.is_none());
    }

    #[test]
    fn parse_mti_tsv_test() {
        let mut source = File::open("tests/data/mti_small.tsv").unwrap();
        let records = parse_mti_tsv(&mut source).unwrap();

        assert_eq!(records.len(), 6);

        let first = &records[0];
        assert_eq!(first.mirtarbase_id.as_deref(), Some("MIRT000001"));
        assert_eq!(first.mirna.as_deref(), Some("hsa-miR-21-5p"));
        assert_eq!(first.target_gene_id.as_deref(), Some("5728"));
        assert_eq!(first.pmid.as_deref(), Some("1001"));
    }
}
