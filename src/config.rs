//! Conversion settings, readable from YAML.  Every setting has a
//! default so a config file only needs the ones that differ.

use std::io::{BufReader, Read};

use anyhow::Result;

use crate::model::EntityKind;

pub const DEFAULT_XML_BASE: &str = "http://mirtarbase.mbc.nctu.edu.tw/#";

/// Whether identical (database, ID) references on different owners
/// share one node
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum XrefScope {
    /// one node per (database, ID), shared by all owners
    Global,
    /// one node per (owner, database, ID)
    OwnerLocal,
}

/// What to do with a reference table line that has too few columns
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MalformedLinePolicy {
    /// log a warning and carry on
    Skip,
    /// fail the load
    Fail,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ConverterConfig {
    /// Prepended to local IDs to make absolute URIs
    pub xml_base: String,
    /// Group the interactions of each microRNA organism in a pathway
    pub make_pathway_per_organism: bool,
    /// Run the dangling object pruner after mapping
    pub remove_dangling: bool,
    /// The kinds the pruner may remove
    pub prune_kinds: Vec<EntityKind>,
    /// Create sequences and references for every alias table entry
    /// before mapping
    pub include_alias_entities: bool,
    pub publication_xref_scope: XrefScope,
    pub malformed_line_policy: MalformedLinePolicy,
    /// Key records without a miRTarBase ID by row instead of skipping them
    pub allow_missing_record_id: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig {
            xml_base: DEFAULT_XML_BASE.to_owned(),
            make_pathway_per_organism: false,
            remove_dangling: false,
            prune_kinds: vec![
                EntityKind::RegulatorSequence,
                EntityKind::RegulatorSequenceReference,
                EntityKind::UnificationXref,
            ],
            include_alias_entities: false,
            publication_xref_scope: XrefScope::OwnerLocal,
            malformed_line_policy: MalformedLinePolicy::Skip,
            allow_missing_record_id: false,
        }
    }
}

impl ConverterConfig {
    /// Read a config from YAML.  Missing settings get their defaults.
    pub fn from_yaml(source: &mut dyn Read) -> Result<ConverterConfig> {
        let reader = BufReader::new(source);

        let config: ConverterConfig = serde_yaml::from_reader(reader)?;

        Ok(config)
    }
}
