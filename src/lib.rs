//! Converts miRTarBase microRNA-target interaction records into a
//! biological pathway object graph.
//!
//! Each interaction becomes a regulation (an inhibition) whose
//! controller is the microRNA and whose controlled process is the
//! production of the target gene's product.  Shared objects (processes,
//! products, microRNAs, organisms, xrefs) are created once and found
//! again by identifiers derived from their business keys.

use std::io::Read;

extern crate serde_json;
#[macro_use] extern crate serde_derive;

use anyhow::{Context, Result};
use log::info;

pub mod model;
pub mod graph;
pub mod error;
pub mod config;
pub mod identity;
pub mod xref;
pub mod tables;
pub mod records;
pub mod mapper;
pub mod pathway;
pub mod prune;
pub mod aliases;

pub use config::ConverterConfig;
pub use error::{ConversionWarning, MappingError, WarningKind};
pub use graph::BioGraph;
pub use mapper::MappingSession;
pub use model::{Entity, EntityKind, Relation};
pub use records::MtiRecord;
pub use tables::ReferenceTables;

/// A summary of a conversion run
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub rows_read: usize,
    pub rows_converted: usize,
    pub removed_dangling: usize,
    pub warnings: Vec<ConversionWarning>,
}

impl ConversionOutcome {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The result of [convert()]
#[derive(Debug, Clone)]
pub struct Conversion {
    pub graph: BioGraph,
    pub outcome: ConversionOutcome,
}

/// Convert records, in order, to a graph.  Records are numbered from
/// 1 in warnings.
pub fn convert(records: &[MtiRecord], tables: ReferenceTables, config: ConverterConfig)
    -> Result<Conversion>
{
    info!("converting {} miRTarBase records", records.len());

    let mut session = MappingSession::new(config, tables);

    if session.config().include_alias_entities {
        aliases::add_alias_entities(&mut session)
            .context("failed to create the miRBase alias entities")?;
    }

    for (record_idx, record) in records.iter().enumerate() {
        session.process_record(record_idx + 1, record)?;
    }

    Ok(session.finish())
}

/// Read an MTI table, the miRBase alias table and the organism table,
/// then [convert()]
///
/// # Example:
///
/// ```
/// use std::fs::File;
/// use mirtarbase_graph::{convert_tsv, ConverterConfig, EntityKind};
///
/// let mut mti = File::open("tests/data/mti_small.tsv").unwrap();
/// let mut aliases = File::open("tests/data/aliases.txt").unwrap();
/// let mut organisms = File::open("tests/data/organisms.txt").unwrap();
///
/// let conversion = convert_tsv(&mut mti, &mut aliases, &mut organisms,
///                              ConverterConfig::default()).unwrap();
///
/// assert_eq!(conversion.outcome.rows_read, 6);
/// assert_eq!(conversion.outcome.rows_converted, 5);
///
/// for (_, regulation) in conversion.graph.nodes_of_kind(EntityKind::RegulationRelationship) {
///   println!("{}", regulation.label());
/// }
/// ```
pub fn convert_tsv(mti: &mut dyn Read, aliases: &mut dyn Read, organisms: &mut dyn Read,
                   config: ConverterConfig)
    -> Result<Conversion>
{
    let tables = ReferenceTables::load(aliases, organisms, config.malformed_line_policy)?;
    let records = records::parse_mti_tsv(mti)?;

    convert(&records, tables, config)
}
