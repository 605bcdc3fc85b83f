//! Reading the miRBase reference tables.
//!
//! `aliases.txt` maps miRBase accessions to the names of the
//! microRNAs:
//! ```text
//! MI0000060	hsa-let-7a-1;
//! MIMAT0000062	hsa-let-7a-5p;hsa-let-7a;
//! ```
//! `organisms.txt` has the organism code in column 0, the name in
//! column 2 and the NCBI taxonomy ID in column 4:
//! ```text
//! #organism	#division	#name	#tree	#NCBI-taxid
//! hsa	HSA	Homo sapiens	Metazoa;Bilateria;Deuterostoma;Chordata;Vertebrata;Mammalia;Primates;Hominidae;	9606
//! ```
//! Lines starting with `#` are comments in both files.
//!
//! ## Example
//! ```
//! use std::fs::File;
//! use mirtarbase_graph::{config::MalformedLinePolicy, tables::ReferenceTables};
//!
//! let mut aliases = File::open("tests/data/aliases.txt").unwrap();
//! let mut organisms = File::open("tests/data/organisms.txt").unwrap();
//! let tables = ReferenceTables::load(&mut aliases, &mut organisms,
//!                                    MalformedLinePolicy::Skip).unwrap();
//!
//! assert_eq!(tables.accessions("hsa-mir-21"), ["MI0000077"]);
//! assert_eq!(tables.organism_by_name("Homo sapiens").unwrap().taxon_id, "9606");
//! ```

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};

use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};

use crate::config::MalformedLinePolicy;
use crate::error::{ConversionWarning, WarningKind};

const SEPARATOR: char = '\t';
const INTRA_FIELD_SEPARATOR: char = ';';

/// A row of the organism table
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrganismInfo {
    /// The miRBase organism code, like "hsa"
    pub code: String,
    pub name: String,
    pub taxon_id: String,
}

/// One line of the alias table: an accession and its names in file order
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub accession: String,
    pub names: Vec<String>,
}

/// The lookups built from the reference tables.  They are loaded once
/// and only read while mapping.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ReferenceTables {
    // lower-cased name -> accessions, without repeats
    accessions_by_name: HashMap<String, Vec<String>>,
    alias_entries: Vec<AliasEntry>,
    organisms_by_code: HashMap<String, OrganismInfo>,
    // lower-cased organism name -> code
    codes_by_name: HashMap<String, String>,
    warnings: Vec<ConversionWarning>,
}

fn check_columns(cols: &[&str], min_cols: usize, line_no: usize, line: &str,
                 table_name: &str, policy: MalformedLinePolicy,
                 warnings: &mut Vec<ConversionWarning>)
    -> Result<bool>
{
    if cols.len() >= min_cols && cols.iter().take(min_cols).all(|col| !col.trim().is_empty()) {
        return Ok(true);
    }

    let message = format!("{} line {} has {} columns, expected at least {}: {}",
                          table_name, line_no, cols.len(), min_cols, line);

    match policy {
        MalformedLinePolicy::Fail => Err(anyhow!(message)),
        MalformedLinePolicy::Skip => {
            warn!("skipping {}", message);
            // rows number records, the line number is in the message
            warnings.push(ConversionWarning::new(None, WarningKind::MalformedTableLine,
                                                 message));
            Ok(false)
        }
    }
}

impl ReferenceTables {
    /// Tables with no aliases and no organisms
    pub fn empty() -> ReferenceTables {
        ReferenceTables::default()
    }

    /// Parse the alias and organism tables.  Read errors are fatal.
    /// Lines with missing columns are skipped or fatal depending on
    /// `policy`.
    pub fn load(aliases: &mut dyn Read, organisms: &mut dyn Read,
                policy: MalformedLinePolicy)
        -> Result<ReferenceTables>
    {
        let mut tables = ReferenceTables::default();

        tables.load_aliases(aliases, policy)?;
        tables.load_organisms(organisms, policy)?;

        info!("loaded {} microRNA names ({} accessions) and {} organisms",
              tables.accessions_by_name.len(), tables.alias_entries.len(),
              tables.organisms_by_code.len());

        Ok(tables)
    }

    fn load_aliases(&mut self, source: &mut dyn Read, policy: MalformedLinePolicy)
        -> Result<()>
    {
        let reader = BufReader::new(source);

        for (line_idx, line) in reader.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = line.with_context(|| format!("failed to read alias table line {}",
                                                    line_no))?;

            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            let cols: Vec<_> = line.split(SEPARATOR).collect();

            if !check_columns(&cols, 2, line_no, &line, "alias table", policy,
                              &mut self.warnings)? {
                continue;
            }

            let accession = cols[0].trim();
            let names = cols[1].trim();
            let names = names.strip_suffix(INTRA_FIELD_SEPARATOR).unwrap_or(names);

            let mut entry = AliasEntry {
                accession: accession.to_owned(),
                names: vec![],
            };

            for name in names.split(INTRA_FIELD_SEPARATOR) {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }

                entry.names.push(name.to_owned());

                let lc_name = name.to_lowercase();
                let accessions = self.accessions_by_name.entry(lc_name).or_default();

                if !accessions.is_empty() {
                    debug!("miR name {} maps to: {};{}", name, accessions.join(";"), accession);
                }

                if !accessions.iter().any(|existing| existing == accession) {
                    accessions.push(accession.to_owned());
                }
            }

            self.alias_entries.push(entry);
        }

        Ok(())
    }

    fn load_organisms(&mut self, source: &mut dyn Read, policy: MalformedLinePolicy)
        -> Result<()>
    {
        let reader = BufReader::new(source);

        for (line_idx, line) in reader.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = line.with_context(|| format!("failed to read organism table line {}",
                                                    line_no))?;

            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            let cols: Vec<_> = line.split(SEPARATOR).collect();

            if !check_columns(&cols, 5, line_no, &line, "organism table", policy,
                              &mut self.warnings)? {
                continue;
            }

            let organism = OrganismInfo {
                code: cols[0].trim().to_owned(),
                name: cols[2].trim().to_owned(),
                taxon_id: cols[4].trim().to_owned(),
            };

            self.codes_by_name.insert(organism.name.to_lowercase(), organism.code.clone());
            self.organisms_by_code.insert(organism.code.clone(), organism);
        }

        Ok(())
    }

    /// The miRBase accessions of a microRNA name.  The name must be
    /// lower-cased.
    pub fn accessions(&self, lc_name: &str) -> &[String] {
        self.accessions_by_name.get(lc_name)
            .map(|accessions| accessions.as_slice())
            .unwrap_or(&[])
    }

    /// The alias table lines in file order
    pub fn alias_entries(&self) -> &[AliasEntry] {
        &self.alias_entries
    }

    pub fn organism_by_code(&self, code: &str) -> Option<&OrganismInfo> {
        self.organisms_by_code.get(code)
    }

    /// Look up an organism by name, ignoring case
    pub fn organism_by_name(&self, name: &str) -> Option<&OrganismInfo> {
        self.codes_by_name.get(&name.to_lowercase())
            .and_then(|code| self.organisms_by_code.get(code))
    }

    /// The lines that were skipped while loading
    pub fn warnings(&self) -> &[ConversionWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use super::*;

    fn load_test_tables() -> ReferenceTables {
        let mut aliases = File::open("tests/data/aliases.txt").unwrap();
        let mut organisms = File::open("tests/data/organisms.txt").unwrap();
        ReferenceTables::load(&mut aliases, &mut organisms, MalformedLinePolicy::Skip).unwrap()
    }

    #[test]
    fn load_aliases_test() {
        let tables = load_test_tables();

        assert_eq!(tables.accessions("hsa-mir-21"), ["MI0000077"]);
        assert_eq!(tables.accessions("hsa-mir-21-5p"), ["MIMAT0000076"]);
        // listed under two accessions:
        assert_eq!(tables.accessions("hsa-let-7a"), ["MIMAT0000062", "MIMAT0004481"]);
        assert!(tables.accessions("HSA-MIR-21").is_empty());
        assert!(tables.accessions("hsa-mir-9999").is_empty());

        let first_entry = &tables.alias_entries()[0];
        assert_eq!(first_entry.accession, "MI0000060");
        assert_eq!(first_entry.names, vec!["hsa-let-7a-1"]);
    }

    #[test]
    fn load_organisms_test() {
        let tables = load_test_tables();

        let human = tables.organism_by_code("hsa").unwrap();
        assert_eq!(human.name, "Homo sapiens");
        assert_eq!(human.taxon_id, "9606");

        assert_eq!(tables.organism_by_name("homo SAPIENS").unwrap().code, "hsa");
        assert_eq!(tables.organism_by_name("Mus musculus").unwrap().taxon_id, "10090");
        assert!(tables.organism_by_name("Danio rerio").is_none());
    }

    #[test]
    fn malformed_line_skip_test() {
        let aliases = "MI0000077\thsa-mir-21;\nMI0000999\n#comment\n";
        let organisms = "hsa\tHSA\tHomo sapiens\tMetazoa;\t9606\nmmu\tMMU\tMus musculus\n";

        let tables = ReferenceTables::load(&mut aliases.as_bytes(), &mut organisms.as_bytes(),
                                           MalformedLinePolicy::Skip).unwrap();

        assert_eq!(tables.accessions("hsa-mir-21"), ["MI0000077"]);
        assert!(tables.organism_by_code("mmu").is_none());
        assert_eq!(tables.warnings().len(), 2);
        assert_eq!(tables.warnings()[0].row, None);
        assert_eq!(tables.warnings()[0].kind, WarningKind::MalformedTableLine);
        assert!(tables.warnings()[0].message.starts_with("alias table line 2 "));
        assert!(tables.warnings()[1].message.starts_with("organism table line 2 "));
    }

    #[test]
    fn malformed_line_fail_test() {
        let aliases = "MI0000077\thsa-mir-21;\nMI0000999\n";
        let organisms = "";

        let result = ReferenceTables::load(&mut aliases.as_bytes(), &mut organisms.as_bytes(),
                                           MalformedLinePolicy::Fail);
        assert!(result.is_err());
    }
}
