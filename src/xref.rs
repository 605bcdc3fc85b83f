//! Attaching external references (xrefs) to entities

use petgraph::graph::NodeIndex;
use phf::phf_map;

use crate::config::XrefScope;
use crate::error::MappingError;
use crate::graph::BioGraph;
use crate::identity::Identities;
use crate::model::{EntityKind, Relation};

pub const PUBMED_DB: &str = "PubMed";
pub const TAXONOMY_DB: &str = "Taxonomy";
pub const NCBI_GENE_DB: &str = "NCBI Gene";
pub const HGNC_SYMBOL_DB: &str = "HGNC Symbol";
pub const MIRTARBASE_DB: &str = "miRTarBase";

/// miRBase accession prefixes and the database of each
pub static MIRBASE_DATABASES: phf::Map<&'static str, &'static str> = phf_map! {
    "MIMAT" => "miRBase mature sequence",
    "MI" => "miRBase Sequence",
};

/// The database name for a miRBase accession, like "MIMAT0000076".
/// Unknown prefixes are treated as precursor accessions.
pub fn mirbase_database(accession: &str) -> &'static str {
    let prefix = accession.trim_end_matches(|c: char| c.is_ascii_digit());

    MIRBASE_DATABASES.get(prefix)
        .copied()
        .unwrap_or("miRBase Sequence")
}

/// Find or create the xref (`kind`, `db`, `external_id`) and make `owner`
/// refer to it.  With [XrefScope::OwnerLocal] each owner gets its own
/// xref node, with [XrefScope::Global] all owners share one.  Calling
/// this again with the same arguments changes nothing.
pub fn attach(identities: &Identities, graph: &mut BioGraph, owner: NodeIndex,
              kind: EntityKind, db: &str, external_id: &str, scope: XrefScope)
    -> Result<NodeIndex, MappingError>
{
    debug_assert!(kind.is_xref());

    let resolved = match scope {
        XrefScope::Global => identities.resolve(graph, kind, &[db, external_id])?,
        XrefScope::OwnerLocal => {
            let owner_id = graph.entity(owner).id.clone();
            identities.resolve(graph, kind, &[db, external_id, owner_id.as_str()])?
        }
    };

    if resolved.created {
        let xref = graph.entity_mut(resolved.idx);
        xref.db = Some(db.to_owned());
        xref.external_id = Some(external_id.to_owned());
    }

    graph.add_edge(owner, Relation::Xref, resolved.idx);

    Ok(resolved.idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_owners() -> (Identities, BioGraph, NodeIndex, NodeIndex) {
        let identities = Identities::new("http://example.org/#");
        let mut graph = BioGraph::new();
        let owner1 = identities.resolve(&mut graph, EntityKind::RegulationRelationship,
                                        &["MIRT000001"]).unwrap().idx;
        let owner2 = identities.resolve(&mut graph, EntityKind::RegulationRelationship,
                                        &["MIRT000002"]).unwrap().idx;
        (identities, graph, owner1, owner2)
    }

    #[test]
    fn attach_twice_test() {
        let (identities, mut graph, owner1, _) = two_owners();

        let x1 = attach(&identities, &mut graph, owner1, EntityKind::PublicationXref,
                        PUBMED_DB, "1001", XrefScope::OwnerLocal).unwrap();
        let x2 = attach(&identities, &mut graph, owner1, EntityKind::PublicationXref,
                        PUBMED_DB, "1001", XrefScope::OwnerLocal).unwrap();

        assert_eq!(x1, x2);
        assert_eq!(graph.count_of_kind(EntityKind::PublicationXref), 1);
        assert_eq!(graph.targets(owner1, Relation::Xref), vec![x1]);

        let xref = graph.entity(x1);
        assert_eq!(xref.db.as_deref(), Some("PubMed"));
        assert_eq!(xref.external_id.as_deref(), Some("1001"));
    }

    #[test]
    fn owner_local_scope_test() {
        let (identities, mut graph, owner1, owner2) = two_owners();

        let x1 = attach(&identities, &mut graph, owner1, EntityKind::PublicationXref,
                        PUBMED_DB, "1001", XrefScope::OwnerLocal).unwrap();
        let x2 = attach(&identities, &mut graph, owner2, EntityKind::PublicationXref,
                        PUBMED_DB, "1001", XrefScope::OwnerLocal).unwrap();

        assert_ne!(x1, x2);
        assert_eq!(graph.incoming_count(x1), 1);
        assert_eq!(graph.incoming_count(x2), 1);
    }

    #[test]
    fn global_scope_test() {
        let (identities, mut graph, owner1, owner2) = two_owners();

        let x1 = attach(&identities, &mut graph, owner1, EntityKind::PublicationXref,
                        PUBMED_DB, "1001", XrefScope::Global).unwrap();
        let x2 = attach(&identities, &mut graph, owner2, EntityKind::PublicationXref,
                        PUBMED_DB, "1001", XrefScope::Global).unwrap();

        assert_eq!(x1, x2);
        assert_eq!(graph.incoming_count(x1), 2);
        assert_eq!(graph.count_of_kind(EntityKind::PublicationXref), 1);
    }

    #[test]
    fn mirbase_database_test() {
        assert_eq!(mirbase_database("MIMAT0000076"), "miRBase mature sequence");
        assert_eq!(mirbase_database("MI0000077"), "miRBase Sequence");
        assert_eq!(mirbase_database("XYZ1"), "miRBase Sequence");
    }
}
