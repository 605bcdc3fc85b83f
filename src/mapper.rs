//! Mapping MTI records onto the graph.
//!
//! A [MappingSession] owns everything a conversion run touches: the
//! graph, the reference tables, the configuration and the warnings.
//! Records are mapped one at a time in file order.  For each record the
//! session finds or creates the target's production process (and its
//! product and product reference), the microRNA and the regulation
//! joining them, then adds the record's evidence to the regulation.
//!
//! Rows with the same miRTarBase ID describe one interaction, so the
//! second and later rows only add evidence.

use petgraph::graph::NodeIndex;

use anyhow::Result;
use log::{debug, error, info, warn};

use crate::config::{ConverterConfig, XrefScope};
use crate::error::{ConversionWarning, MappingError, WarningKind};
use crate::graph::BioGraph;
use crate::identity::{Identities, Resolved};
use crate::model::{ControlType, EntityKind, Relation, TemplateDirection};
use crate::records::{MtiRecord, NumericCell, parse_numeric_cell};
use crate::tables::{OrganismInfo, ReferenceTables};
use crate::xref::{self, HGNC_SYMBOL_DB, MIRTARBASE_DB, NCBI_GENE_DB, PUBMED_DB};
use crate::{Conversion, ConversionOutcome, pathway, prune};

// the fields a record can't be mapped without
struct RequiredFields<'a> {
    mirtarbase_id: Option<&'a str>,
    mirna: &'a str,
    mirna_species: &'a str,
    target_gene: &'a str,
    target_species: &'a str,
}

/// The key parts of an organism, or of the pathway of an organism:
/// the taxon ID if the organism table knows it, otherwise the
/// lower-cased name
pub(crate) fn organism_key(info: Option<&OrganismInfo>, name: &str) -> [String; 2] {
    match info {
        Some(info) if !info.taxon_id.is_empty() =>
            ["taxon".to_owned(), info.taxon_id.clone()],
        _ => ["name".to_owned(), name.to_lowercase()],
    }
}

/// The state of one conversion run
pub struct MappingSession {
    pub(crate) config: ConverterConfig,
    pub(crate) tables: ReferenceTables,
    pub(crate) identities: Identities,
    pub(crate) graph: BioGraph,
    warnings: Vec<ConversionWarning>,
    rows_read: usize,
    rows_converted: usize,
}

impl MappingSession {
    pub fn new(config: ConverterConfig, tables: ReferenceTables) -> MappingSession {
        let identities = Identities::new(&config.xml_base);
        let warnings = tables.warnings().to_vec();

        MappingSession {
            config,
            tables,
            identities,
            graph: BioGraph::new(),
            warnings,
            rows_read: 0,
            rows_converted: 0,
        }
    }

    pub fn graph(&self) -> &BioGraph {
        &self.graph
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn identities(&self) -> &Identities {
        &self.identities
    }

    pub fn warnings(&self) -> &[ConversionWarning] {
        &self.warnings
    }

    pub(crate) fn add_warning(&mut self, row: Option<usize>, kind: WarningKind, message: String) {
        warn!("{}", message);
        self.warnings.push(ConversionWarning::new(row, kind, message));
    }

    /// Map a record, applying the error policy: a record with a
    /// missing field is skipped with a warning, an identity collision
    /// aborts the run.  Returns the regulation of the record, or None
    /// if it was skipped.
    pub fn process_record(&mut self, row: usize, record: &MtiRecord)
        -> Result<Option<NodeIndex>>
    {
        self.rows_read += 1;

        match self.map_row(row, record) {
            Ok(regulation_idx) => {
                self.rows_converted += 1;
                Ok(Some(regulation_idx))
            },
            Err(err @ MappingError::MissingField { .. }) => {
                self.add_warning(Some(row), WarningKind::MissingField,
                                 format!("skipping record: {}", err));
                Ok(None)
            },
            Err(err @ MappingError::IdentityCollision { .. }) => {
                error!("row {}: {}", row, err);
                Err(err.into())
            },
        }
    }

    fn required_fields<'a>(&self, row: usize, record: &'a MtiRecord)
        -> Result<RequiredFields<'a>, MappingError>
    {
        let missing = |field: &'static str| {
            let context = [("id", &record.mirtarbase_id), ("miRNA", &record.mirna),
                           ("gene", &record.target_gene)]
                .iter()
                .filter_map(|(label, value)| match value {
                    Some(value) => Some(format!("{}: {}", label, value)),
                    None => None,
                })
                .collect::<Vec<_>>()
                .join(", ");
            MappingError::MissingField { row, field, context }
        };

        let mirtarbase_id = record.mirtarbase_id.as_deref();

        if mirtarbase_id.is_none() && !self.config.allow_missing_record_id {
            return Err(missing("miRTarBase ID"));
        }

        Ok(RequiredFields {
            mirtarbase_id,
            mirna: record.mirna.as_deref().ok_or_else(|| missing("miRNA"))?,
            mirna_species: record.mirna_species.as_deref()
                .ok_or_else(|| missing("Species (miRNA)"))?,
            target_gene: record.target_gene.as_deref().ok_or_else(|| missing("Target Gene"))?,
            target_species: record.target_species.as_deref()
                .ok_or_else(|| missing("Species (Target Gene)"))?,
        })
    }

    /// Map one record and return the index of its regulation.
    pub fn map_row(&mut self, row: usize, record: &MtiRecord)
        -> Result<NodeIndex, MappingError>
    {
        let fields = self.required_fields(row, record)?;

        let gene_id = match parse_numeric_cell(record.target_gene_id.as_deref()) {
            NumericCell::Valid(gene_id) => Some(gene_id),
            NumericCell::Blank => None,
            NumericCell::Invalid(text) => {
                let message =
                    format!("failed to parse gene ID \"{}\": {} {}, gene: {} - using the symbol",
                            text, fields.mirtarbase_id.unwrap_or("-"), fields.mirna,
                            fields.target_gene);
                self.add_warning(Some(row), WarningKind::UnparsableGeneId, message);
                None
            },
        };

        let row_key = row.to_string();
        let regulation_key = match fields.mirtarbase_id {
            Some(mirtarbase_id) => vec![mirtarbase_id],
            None => vec!["row", row_key.as_str()],
        };

        let regulation = self.identities.resolve(&mut self.graph,
                                                 EntityKind::RegulationRelationship,
                                                 &regulation_key)?;

        if regulation.created {
            let process_idx = self.production_process(fields.target_gene, gene_id,
                                                      fields.target_species)?;
            let regulator_idx = self.regulator_sequence(fields.mirna, fields.mirna_species)?;

            self.init_regulation(regulation.idx, &fields, &row_key, regulator_idx,
                                 process_idx)?;
        } else {
            debug!("row {}: adding evidence to existing regulation {}", row,
                   self.graph.entity(regulation.idx).id);
        }

        self.add_evidence(row, regulation.idx, record)?;

        if self.config.make_pathway_per_organism {
            // per miRNA's species, not the target's
            pathway::assign_to_pathway(self, regulation.idx, fields.mirna_species)?;
        }

        Ok(regulation.idx)
    }

    fn init_regulation(&mut self, regulation_idx: NodeIndex, fields: &RequiredFields,
                       row_key: &str, regulator_idx: NodeIndex, process_idx: NodeIndex)
        -> Result<(), MappingError>
    {
        let regulation = self.graph.entity_mut(regulation_idx);
        regulation.control_type = Some(ControlType::Inhibition);
        regulation.add_name(&format!("{} ({}) regulates expression of {} in {}",
                                     fields.mirna, fields.mirna_species,
                                     fields.target_gene, fields.target_species));
        regulation.display_name = Some(format!("{} regulates {}", fields.mirna,
                                               fields.target_gene));
        regulation.standard_name =
            Some(fields.mirtarbase_id.map(str::to_owned)
                 .unwrap_or_else(|| format!("row {}", row_key)));

        self.graph.add_edge(regulation_idx, Relation::Controller, regulator_idx);
        self.graph.add_edge(regulation_idx, Relation::Controlled, process_idx);

        if let Some(mirtarbase_id) = fields.mirtarbase_id {
            xref::attach(&self.identities, &mut self.graph, regulation_idx,
                         EntityKind::RelationshipXref, MIRTARBASE_DB, mirtarbase_id,
                         XrefScope::OwnerLocal)?;
        }

        Ok(())
    }

    // Publication reference and comments.  Evidence from every row of
    // an interaction is added, in file order.
    fn add_evidence(&mut self, row: usize, regulation_idx: NodeIndex, record: &MtiRecord)
        -> Result<(), MappingError>
    {
        match parse_numeric_cell(record.pmid.as_deref()) {
            NumericCell::Valid(pmid) => {
                xref::attach(&self.identities, &mut self.graph, regulation_idx,
                             EntityKind::PublicationXref, PUBMED_DB, &pmid.to_string(),
                             self.config.publication_xref_scope)?;
            },
            NumericCell::Blank => (),
            NumericCell::Invalid(text) => {
                let message = format!("failed to parse PMID \"{}\": {}, miRNA: {}",
                                      text, record.mirtarbase_id.as_deref().unwrap_or("-"),
                                      record.mirna.as_deref().unwrap_or("-"));
                self.add_warning(Some(row), WarningKind::UnparsablePublicationId, message);
            },
        }

        let regulation = self.graph.entity_mut(regulation_idx);

        if let Some(ref experiments) = record.experiments {
            regulation.add_comment(experiments);
        }
        if let Some(ref support_type) = record.support_type {
            regulation.add_comment(support_type);
        }

        Ok(())
    }

    /// Find or create the production (template reaction) of a gene,
    /// with its protein and protein reference.  The gene is
    /// keyed by its Entrez ID, or by its symbol if there's no valid ID.
    fn production_process(&mut self, gene: &str, gene_id: Option<u64>, target_species: &str)
        -> Result<NodeIndex, MappingError>
    {
        let gene_key = gene_id.map(|gene_id| gene_id.to_string())
            .unwrap_or_else(|| gene.to_owned());

        let key = [gene_key.as_str()];

        let process = self.identities.resolve(&mut self.graph, EntityKind::ProductionProcess,
                                              &key)?;

        if !process.created {
            return Ok(process.idx);
        }

        let process_entity = self.graph.entity_mut(process.idx);
        process_entity.set_all_names(&format!("{} production.", gene));
        process_entity.template_direction = Some(TemplateDirection::Forward);

        let protein = self.identities.resolve(&mut self.graph, EntityKind::TargetProduct,
                                              &key)?;

        if protein.created {
            self.graph.entity_mut(protein.idx).set_all_names(gene);

            let reference = self.identities.resolve(&mut self.graph,
                                                    EntityKind::TargetProductReference,
                                                    &key)?;

            if reference.created {
                self.init_product_reference(reference.idx, gene, gene_id, target_species)?;
            }

            self.graph.add_edge(protein.idx, Relation::EntityReference, reference.idx);
        }

        self.graph.add_edge(process.idx, Relation::Product, protein.idx);

        Ok(process.idx)
    }

    fn init_product_reference(&mut self, reference_idx: NodeIndex, gene: &str,
                              gene_id: Option<u64>, target_species: &str)
        -> Result<(), MappingError>
    {
        self.graph.entity_mut(reference_idx).set_all_names(gene);

        // the organism of the first row that names the gene
        let organism_info = self.tables.organism_by_name(target_species).cloned();
        let organism_idx = self.organism(organism_info.as_ref(), target_species)?;
        self.graph.add_edge(reference_idx, Relation::Organism, organism_idx);

        // the gene is known by ID and symbol, but each owner has its own xrefs
        let scope = XrefScope::OwnerLocal;

        if let Some(gene_id) = gene_id {
            xref::attach(&self.identities, &mut self.graph, reference_idx,
                         EntityKind::RelationshipXref, NCBI_GENE_DB, &gene_id.to_string(),
                         scope)?;
        }

        xref::attach(&self.identities, &mut self.graph, reference_idx,
                     EntityKind::RelationshipXref, HGNC_SYMBOL_DB, gene, scope)?;

        Ok(())
    }

    /// Find or create a microRNA and its reference.  Names differing
    /// only in case are the same microRNA.
    fn regulator_sequence(&mut self, mirna: &str, mirna_species: &str)
        -> Result<NodeIndex, MappingError>
    {
        let lc_name = mirna.to_lowercase();

        let rna = self.identities.resolve(&mut self.graph, EntityKind::RegulatorSequence,
                                          &[lc_name.as_str()])?;

        if !rna.created {
            return Ok(rna.idx);
        }

        let rna_entity = self.graph.entity_mut(rna.idx);
        rna_entity.display_name = Some(mirna.to_owned());
        rna_entity.standard_name = Some(mirna.to_owned());
        rna_entity.add_name(mirna);

        // keyed by name: a name's accessions can be shared with other names
        let reference = self.identities.resolve(&mut self.graph,
                                                EntityKind::RegulatorSequenceReference,
                                                &["name", lc_name.as_str()])?;

        if reference.created {
            self.graph.entity_mut(reference.idx).set_all_names(&lc_name);

            if let Some(organism_idx) = self.regulator_organism(&lc_name, Some(mirna_species))? {
                self.graph.add_edge(reference.idx, Relation::Organism, organism_idx);
            }

            let accessions = self.tables.accessions(&lc_name).to_vec();

            for accession in &accessions {
                xref::attach(&self.identities, &mut self.graph, reference.idx,
                             EntityKind::RelationshipXref, xref::mirbase_database(accession),
                             accession, XrefScope::OwnerLocal)?;
            }
        }

        self.graph.add_edge(rna.idx, Relation::EntityReference, reference.idx);

        Ok(rna.idx)
    }

    /// The organism table row of a microRNA: by the code at the start of
    /// its name, then by the species name
    pub(crate) fn regulator_organism_info(&self, lc_name: &str, mirna_species: Option<&str>)
        -> Option<OrganismInfo>
    {
        let code = lc_name.split('-').next().unwrap_or(lc_name);

        self.tables.organism_by_code(code)
            .or_else(|| mirna_species.and_then(|species| self.tables.organism_by_name(species)))
            .cloned()
    }

    /// The organism of a microRNA from the code at the start of its
    /// name ("hsa" in "hsa-mir-21"), falling back to the species name.
    /// Returns None if neither is known and there is no species name.
    pub(crate) fn regulator_organism(&mut self, lc_name: &str, mirna_species: Option<&str>)
        -> Result<Option<NodeIndex>, MappingError>
    {
        let organism_info = self.regulator_organism_info(lc_name, mirna_species);

        let name = match (&organism_info, mirna_species) {
            (_, Some(species)) => species.to_owned(),
            (Some(info), None) => info.name.clone(),
            (None, None) => return Ok(None),
        };

        Ok(Some(self.organism(organism_info.as_ref(), &name)?))
    }

    /// Find or create an organism.  If `info` is None the organism is
    /// keyed by name and has no taxonomy xref.
    pub(crate) fn organism(&mut self, info: Option<&OrganismInfo>, name: &str)
        -> Result<NodeIndex, MappingError>
    {
        let key = organism_key(info, name);

        let Resolved { idx, created } =
            self.identities.resolve(&mut self.graph, EntityKind::Organism,
                                    &[key[0].as_str(), key[1].as_str()])?;

        if !created {
            return Ok(idx);
        }

        let display_name = info.map(|info| info.name.as_str()).unwrap_or(name);
        self.graph.entity_mut(idx).set_all_names(display_name);

        match info {
            Some(info) if !info.taxon_id.is_empty() => {
                xref::attach(&self.identities, &mut self.graph, idx,
                             EntityKind::UnificationXref, xref::TAXONOMY_DB, &info.taxon_id,
                             XrefScope::Global)?;
            },
            _ => {
                debug!("organism \"{}\" isn't in the organism table", name);
                self.add_warning(None, WarningKind::UnknownOrganism,
                                 format!("no taxonomy ID for organism \"{}\"", name));
            },
        }

        Ok(idx)
    }

    /// Run the pruner if it's enabled, log a summary and return the
    /// graph and the outcome.
    pub fn finish(mut self) -> Conversion {
        let removed_dangling =
            if self.config.remove_dangling {
                let removed = prune::prune(&mut self.graph, &self.config.prune_kinds);
                info!("removed {} dangling objects", removed);
                removed
            } else {
                0
            };

        info!("Converted miRTarBase model contains: {} pathways; {} template reactions; \
               {} controls; {} products.",
              self.graph.count_of_kind(EntityKind::PathwayGroup),
              self.graph.count_of_kind(EntityKind::ProductionProcess),
              self.graph.count_of_kind(EntityKind::RegulationRelationship),
              self.graph.count_of_kind(EntityKind::TargetProduct));

        let outcome = ConversionOutcome {
            rows_read: self.rows_read,
            rows_converted: self.rows_converted,
            removed_dangling,
            warnings: self.warnings,
        };

        info!("converted {} of {} records, {} warnings", outcome.rows_converted,
              outcome.rows_read, outcome.warnings.len());

        Conversion {
            graph: self.graph,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_without_id() -> MtiRecord {
        MtiRecord::from_fields(&["", "hsa-miR-21-5p", "Homo sapiens", "PTEN", "5728",
                                 "Homo sapiens", "Western blot", "", "1001"])
    }

    #[test]
    fn missing_record_id_test() {
        let mut session = MappingSession::new(ConverterConfig::default(),
                                              ReferenceTables::empty());

        assert_eq!(session.process_record(3, &record_without_id()).unwrap(), None);
        assert_eq!(session.warnings().len(), 1);
        assert_eq!(session.warnings()[0].kind, WarningKind::MissingField);
        assert_eq!(session.warnings()[0].row, Some(3));
        assert_eq!(session.graph().node_count(), 0);

        let config = ConverterConfig {
            allow_missing_record_id: true,
            ..ConverterConfig::default()
        };
        let mut session = MappingSession::new(config, ReferenceTables::empty());

        let regulation_idx = session.process_record(3, &record_without_id()).unwrap().unwrap();
        let regulation = session.graph().entity(regulation_idx);

        assert_eq!(regulation.id,
                   session.identities().id_for(EntityKind::RegulationRelationship,
                                               &["row", "3"]));
        assert_eq!(regulation.standard_name.as_deref(), Some("row 3"));
        // no miRTarBase xref without an ID
        let xref_dbs: Vec<_> = session.graph().targets(regulation_idx, Relation::Xref)
            .into_iter()
            .map(|idx| session.graph().entity(idx).db.clone().unwrap())
            .collect();
        assert_eq!(xref_dbs, vec![PUBMED_DB.to_owned()]);
    }

    #[test]
    fn unknown_organism_test() {
        let mut session = MappingSession::new(ConverterConfig::default(),
                                              ReferenceTables::empty());

        let record = MtiRecord::from_fields(&["MIRT000001", "hsa-miR-21-5p", "Homo sapiens",
                                              "PTEN", "5728", "Homo sapiens"]);
        session.process_record(1, &record).unwrap();

        // the microRNA and the target share the organism, keyed by name
        let organism_id = session.identities().id_for(EntityKind::Organism,
                                                      &["name", "homo sapiens"]);
        let organism_idx = session.graph().find_node(&organism_id).unwrap();
        assert_eq!(session.graph().entity(organism_idx).label(), "Homo sapiens");
        assert!(session.graph().targets(organism_idx, Relation::Xref).is_empty());

        assert_eq!(session.graph().count_of_kind(EntityKind::Organism), 1);
        assert_eq!(session.warnings().len(), 1);
        assert_eq!(session.warnings()[0].kind, WarningKind::UnknownOrganism);

        let conversion = session.finish();
        assert_eq!(conversion.outcome.rows_read, 1);
        assert_eq!(conversion.outcome.rows_converted, 1);
    }
}
