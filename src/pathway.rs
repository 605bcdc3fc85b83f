//! Per-organism "pathways": one grouping node per microRNA organism,
//! holding every interaction of that organism and every process the
//! interactions lead to.  These aren't biological pathways, they make
//! it easy to select all interactions of one species.

use std::iter;

use petgraph::graph::NodeIndex;

use log::{debug, warn};

use crate::error::MappingError;
use crate::graph::{self, FollowPred};
use crate::mapper::{MappingSession, organism_key};
use crate::model::{EntityKind, Relation};

// Don't wander from one pathway into the members of another
const FOLLOW_PROPERTY_EDGES: FollowPred =
    |relation: &Relation| *relation != Relation::PathwayComponent;

/// Find or create the pathway of `organism_name` and add to it the
/// regulation and every process reachable from it.  The organism is
/// found the same way as the organism of the regulation's microRNA.
/// Returns the pathway.
pub fn assign_to_pathway(session: &mut MappingSession, regulation_idx: NodeIndex,
                         organism_name: &str)
    -> Result<NodeIndex, MappingError>
{
    let controllers = session.graph.targets(regulation_idx, Relation::Controller);
    let organism_info = match controllers.first() {
        Some(rna_idx) => {
            let lc_name = session.graph.entity(*rna_idx).label().to_lowercase();
            session.regulator_organism_info(&lc_name, Some(organism_name))
        },
        None => session.tables.organism_by_name(organism_name).cloned(),
    };

    let key = organism_key(organism_info.as_ref(), organism_name);

    let pathway = session.identities.resolve(&mut session.graph, EntityKind::PathwayGroup,
                                             &[key[0].as_str(), key[1].as_str()])?;

    if pathway.created {
        let pathway_name = organism_info.as_ref()
            .map(|info| info.name.as_str())
            .unwrap_or(organism_name);
        session.graph.entity_mut(pathway.idx).set_all_names(pathway_name);

        let organism_idx = session.organism(organism_info.as_ref(), organism_name)?;
        session.graph.add_edge(pathway.idx, Relation::Organism, organism_idx);
    }

    let reachable =
        match graph::reachable_by(session.graph.stable_graph(), regulation_idx,
                                  &FOLLOW_PROPERTY_EDGES) {
            Ok(reachable) => reachable,
            Err(err) => {
                warn!("can't collect the processes of {:?}: {}", regulation_idx, err);
                vec![]
            }
        };

    let mut added_count = 0;

    for idx in iter::once(regulation_idx).chain(reachable) {
        if idx == pathway.idx || !session.graph.entity(idx).kind.is_process() {
            continue;
        }

        if session.graph.add_edge(pathway.idx, Relation::PathwayComponent, idx) {
            added_count += 1;
        }
    }

    if added_count > 0 {
        debug!("added {} processes to pathway {}", added_count,
               session.graph.entity(pathway.idx).id);
    }

    Ok(pathway.idx)
}

#[cfg(test)]
mod tests {
    use crate::config::ConverterConfig;
    use crate::records::MtiRecord;
    use crate::tables::ReferenceTables;

    use super::*;

    #[test]
    fn member_cycle_test() {
        let config = ConverterConfig {
            make_pathway_per_organism: true,
            ..ConverterConfig::default()
        };
        let mut session = MappingSession::new(config, ReferenceTables::empty());

        let record = MtiRecord::from_fields(&["MIRT000001", "hsa-miR-21-5p", "Homo sapiens",
                                              "PTEN", "5728", "Homo sapiens"]);
        let regulation_idx = session.map_row(1, &record).unwrap();

        let rna_a = session.graph.targets(regulation_idx, Relation::Controller)[0];
        let rna_b = session.identities.resolve(&mut session.graph,
                                               EntityKind::RegulatorSequence,
                                               &["hsa-mir-21-5p", "variant"]).unwrap().idx;
        session.graph.add_edge(rna_a, Relation::MemberPhysicalEntity, rna_b);
        session.graph.add_edge(rna_b, Relation::MemberPhysicalEntity, rna_a);

        let pathway_idx = assign_to_pathway(&mut session, regulation_idx, "Homo sapiens").unwrap();
        // again, the cycle is still there
        let again_idx = assign_to_pathway(&mut session, regulation_idx, "Homo sapiens").unwrap();
        assert_eq!(pathway_idx, again_idx);

        let members = session.graph.targets(pathway_idx, Relation::PathwayComponent);
        assert_eq!(members.len(), 2);

        let member_kinds: Vec<_> = members.iter()
            .map(|idx| session.graph.entity(*idx).kind)
            .collect();
        assert!(member_kinds.contains(&EntityKind::RegulationRelationship));
        assert!(member_kinds.contains(&EntityKind::ProductionProcess));

        assert_eq!(session.graph.count_of_kind(EntityKind::PathwayGroup), 1);
        assert_eq!(session.graph.entity(pathway_idx).label(), "Homo sapiens");
    }
}
