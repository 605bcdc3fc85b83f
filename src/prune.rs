//! Removing dangling objects

use log::debug;

use crate::graph::BioGraph;
use crate::model::EntityKind;

/// Remove every entity whose kind is in `kinds` and that nothing
/// refers to, repeating until there is nothing left to remove (removing
/// an owner can leave its xrefs dangling).  Returns the number of
/// entities removed.
pub fn prune(graph: &mut BioGraph, kinds: &[EntityKind]) -> usize {
    let mut removed_count = 0;

    loop {
        let dangling: Vec<_> = graph.entities()
            .filter(|entity| kinds.contains(&entity.kind))
            .filter_map(|entity| graph.find_node(&entity.id))
            .filter(|idx| graph.incoming_count(*idx) == 0)
            .collect();

        if dangling.is_empty() {
            break;
        }

        for idx in dangling {
            if let Some(entity) = graph.remove_node(idx) {
                debug!("removed dangling {} {}", entity.kind, entity.id);
                removed_count += 1;
            }
        }
    }

    removed_count
}

#[cfg(test)]
mod tests {
    use crate::model::Relation;

    use super::*;

    #[test]
    fn prune_transitively_test() {
        let mut graph = BioGraph::new();

        let regulation = graph.create_node(EntityKind::RegulationRelationship, "control_1").unwrap();
        let used_rna = graph.create_node(EntityKind::RegulatorSequence, "rna_used").unwrap();
        let used_ref = graph.create_node(EntityKind::RegulatorSequenceReference, "rnaref_used")
            .unwrap();
        let unused_rna = graph.create_node(EntityKind::RegulatorSequence, "rna_unused").unwrap();
        let variant_rna = graph.create_node(EntityKind::RegulatorSequence, "rna_unused|MI1")
            .unwrap();
        let unused_ref = graph.create_node(EntityKind::RegulatorSequenceReference,
                                           "rnaref_unused").unwrap();
        let unused_xref = graph.create_node(EntityKind::UnificationXref, "uxref_MI1").unwrap();
        let organism = graph.create_node(EntityKind::Organism, "org_taxon|9606").unwrap();

        graph.add_edge(regulation, Relation::Controller, used_rna);
        graph.add_edge(used_rna, Relation::EntityReference, used_ref);
        graph.add_edge(unused_rna, Relation::MemberPhysicalEntity, variant_rna);
        graph.add_edge(unused_rna, Relation::EntityReference, unused_ref);
        graph.add_edge(variant_rna, Relation::EntityReference, unused_ref);
        graph.add_edge(unused_ref, Relation::Xref, unused_xref);
        graph.add_edge(unused_ref, Relation::Organism, organism);

        let kinds = [EntityKind::RegulatorSequence, EntityKind::RegulatorSequenceReference,
                     EntityKind::UnificationXref];

        assert_eq!(prune(&mut graph, &kinds), 4);

        assert!(graph.find_node("rna_unused").is_none());
        assert!(graph.find_node("rna_unused|MI1").is_none());
        assert!(graph.find_node("rnaref_unused").is_none());
        assert!(graph.find_node("uxref_MI1").is_none());

        assert!(graph.find_node("control_1").is_some());
        assert!(graph.find_node("rna_used").is_some());
        assert!(graph.find_node("rnaref_used").is_some());
        // not a kind that may be pruned
        assert!(graph.find_node("org_taxon|9606").is_some());

        assert_eq!(prune(&mut graph, &kinds), 0);
    }
}
