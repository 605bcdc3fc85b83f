//! Entities for the whole miRBase alias table.
//!
//! Each accession becomes a microRNA reference with a miRBase
//! unification xref and each of its names becomes a microRNA
//! (`rna_<lower-cased name>`) pointing at it.  A name that was already
//! used by an earlier accession gets a variant microRNA, keyed by name
//! and accession, which is made a member of the generic one.
//!
//! Records mapped afterwards find these entities by ID.  The ones no
//! record uses can be removed with the pruner.

use log::info;

use crate::config::XrefScope;
use crate::error::MappingError;
use crate::mapper::MappingSession;
use crate::model::{EntityKind, Relation};
use crate::xref;

/// Create the alias entities, returning the number of microRNA names
/// added to the graph
pub fn add_alias_entities(session: &mut MappingSession) -> Result<usize, MappingError> {
    let entries = session.tables.alias_entries().to_vec();

    let mut added_count = 0;

    for entry in &entries {
        let accession = entry.accession.as_str();

        let reference = session.identities.resolve(&mut session.graph,
                                                   EntityKind::RegulatorSequenceReference,
                                                   &["accession", accession])?;

        if reference.created {
            session.graph.entity_mut(reference.idx).set_all_names(accession);

            xref::attach(&session.identities, &mut session.graph, reference.idx,
                         EntityKind::UnificationXref, xref::mirbase_database(accession),
                         accession, XrefScope::OwnerLocal)?;

            if let Some(first_name) = entry.names.first() {
                let organism_idx =
                    session.regulator_organism(&first_name.to_lowercase(), None)?;
                if let Some(organism_idx) = organism_idx {
                    session.graph.add_edge(reference.idx, Relation::Organism, organism_idx);
                }
            }
        }

        for name in &entry.names {
            session.graph.entity_mut(reference.idx).add_name(name);

            let lc_name = name.to_lowercase();

            let generic = session.identities.resolve(&mut session.graph,
                                                     EntityKind::RegulatorSequence,
                                                     &[lc_name.as_str()])?;

            let rna_idx =
                if generic.created ||
                   session.graph.has_edge(generic.idx, Relation::EntityReference,
                                          reference.idx) {
                    generic.idx
                } else {
                    let variant =
                        session.identities.resolve(&mut session.graph,
                                                   EntityKind::RegulatorSequence,
                                                   &[lc_name.as_str(), accession])?;
                    session.graph.add_edge(generic.idx, Relation::MemberPhysicalEntity,
                                           variant.idx);
                    variant.idx
                };

            let rna = session.graph.entity_mut(rna_idx);
            if rna.display_name.is_none() {
                rna.display_name = Some(name.to_owned());
                rna.standard_name = Some(name.to_owned());
                added_count += 1;
            }
            rna.add_name(name);
            rna.add_name(accession);

            session.graph.add_edge(rna_idx, Relation::EntityReference, reference.idx);
        }
    }

    info!("added {} microRNAs from {} miRBase accessions", added_count, entries.len());

    Ok(added_count)
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use crate::config::{ConverterConfig, MalformedLinePolicy};
    use crate::tables::ReferenceTables;

    use super::*;

    fn alias_session() -> MappingSession {
        let mut aliases = File::open("tests/data/aliases.txt").unwrap();
        let mut organisms = File::open("tests/data/organisms.txt").unwrap();
        let tables = ReferenceTables::load(&mut aliases, &mut organisms,
                                           MalformedLinePolicy::Skip).unwrap();
        MappingSession::new(ConverterConfig::default(), tables)
    }

    #[test]
    fn alias_entities_test() {
        let mut session = alias_session();

        let added_count = add_alias_entities(&mut session).unwrap();

        // 15 names, "hsa-let-7a" and "hsa-mir-155" are each used by two accessions
        assert_eq!(added_count, 15);
        assert_eq!(session.graph().count_of_kind(EntityKind::RegulatorSequenceReference), 9);
        assert_eq!(session.graph().count_of_kind(EntityKind::RegulatorSequence), 15);

        let identities = session.identities().clone();

        let generic_id = identities.id_for(EntityKind::RegulatorSequence, &["hsa-let-7a"]);
        let variant_id = identities.id_for(EntityKind::RegulatorSequence,
                                           &["hsa-let-7a", "MIMAT0004481"]);

        let generic_idx = session.graph().find_node(&generic_id).unwrap();
        let variant_idx = session.graph().find_node(&variant_id).unwrap();

        assert_eq!(session.graph().targets(generic_idx, Relation::MemberPhysicalEntity),
                   vec![variant_idx]);

        let variant_refs = session.graph().targets(variant_idx, Relation::EntityReference);
        assert_eq!(session.graph().entity(variant_refs[0]).label(), "MIMAT0004481");

        let human_ref_id = identities.id_for(EntityKind::RegulatorSequenceReference,
                                             &["accession", "MI0000077"]);
        let human_ref_idx = session.graph().find_node(&human_ref_id).unwrap();
        let organisms = session.graph().targets(human_ref_idx, Relation::Organism);
        assert_eq!(session.graph().entity(organisms[0]).label(), "Homo sapiens");

        let xrefs = session.graph().targets(human_ref_idx, Relation::Xref);
        let xref = session.graph().entity(xrefs[0]);
        assert_eq!(xref.kind, EntityKind::UnificationXref);
        assert_eq!(xref.db.as_deref(), Some("miRBase Sequence"));

        // running again adds nothing
        let node_count = session.graph().node_count();
        assert_eq!(add_alias_entities(&mut session).unwrap(), 0);
        assert_eq!(session.graph().node_count(), node_count);
    }
}
