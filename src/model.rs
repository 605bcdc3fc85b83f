//! The entities and relations of the output graph.
//!
//! Every node of a [BioGraph](crate::graph::BioGraph) is an [Entity]
//! tagged with an [EntityKind].  Edges are [Relation]s, pointing from
//! the entity that holds the property to its value, like the properties
//! of a BioPAX object (a control interaction points at its controller
//! and at the reaction it controls).

use std::fmt::{self, Display};

/// The kinds of entity in the graph
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A microRNA instance (BioPAX Rna)
    RegulatorSequence,
    /// The sequence-level description of a microRNA (RnaReference)
    RegulatorSequenceReference,
    /// A target protein (Protein)
    TargetProduct,
    /// ProteinReference
    TargetProductReference,
    /// Transcription/translation of the target gene (TemplateReaction)
    ProductionProcess,
    /// A microRNA-target interaction (TemplateReactionRegulation)
    RegulationRelationship,
    /// BioSource
    Organism,
    UnificationXref,
    RelationshipXref,
    PublicationXref,
    /// A per-organism grouping of interactions (Pathway)
    PathwayGroup,
}

impl EntityKind {
    /// Return true for activities, reactions and regulations - the kinds
    /// that can be members of a [PathwayGroup](EntityKind::PathwayGroup)
    pub fn is_process(&self) -> bool {
        matches!(self,
                 EntityKind::ProductionProcess |
                 EntityKind::RegulationRelationship |
                 EntityKind::PathwayGroup)
    }

    pub fn is_xref(&self) -> bool {
        matches!(self,
                 EntityKind::UnificationXref |
                 EntityKind::RelationshipXref |
                 EntityKind::PublicationXref)
    }

    /// The prefix of the local identifiers of this kind.  The prefixes
    /// are all distinct so keys of different kinds can't collide.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            EntityKind::RegulatorSequence => "rna_",
            EntityKind::RegulatorSequenceReference => "rnaref_",
            EntityKind::TargetProduct => "protein_",
            EntityKind::TargetProductReference => "ref_",
            EntityKind::ProductionProcess => "template_",
            EntityKind::RegulationRelationship => "control_",
            EntityKind::Organism => "org_",
            EntityKind::UnificationXref => "uxref_",
            EntityKind::RelationshipXref => "rxref_",
            EntityKind::PublicationXref => "pub_",
            EntityKind::PathwayGroup => "pathway_",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::RegulatorSequence => "regulator sequence",
            EntityKind::RegulatorSequenceReference => "regulator sequence reference",
            EntityKind::TargetProduct => "target product",
            EntityKind::TargetProductReference => "target product reference",
            EntityKind::ProductionProcess => "production process",
            EntityKind::RegulationRelationship => "regulation relationship",
            EntityKind::Organism => "organism",
            EntityKind::UnificationXref => "unification xref",
            EntityKind::RelationshipXref => "relationship xref",
            EntityKind::PublicationXref => "publication xref",
            EntityKind::PathwayGroup => "pathway group",
        };
        write!(f, "{}", name)
    }
}

/// Edge labels.  An edge goes from the owner of a property to its value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// sequence or product -> its reference entity
    EntityReference,
    /// reference entity or pathway -> organism
    Organism,
    /// any entity -> an xref it owns
    Xref,
    /// regulation -> regulator sequence
    Controller,
    /// regulation -> production process
    Controlled,
    /// production process -> target product
    Product,
    /// generic regulator sequence -> specific variant
    MemberPhysicalEntity,
    /// pathway -> process
    PathwayComponent,
}

impl Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Relation::EntityReference => "entityReference",
            Relation::Organism => "organism",
            Relation::Xref => "xref",
            Relation::Controller => "controller",
            Relation::Controlled => "controlled",
            Relation::Product => "product",
            Relation::MemberPhysicalEntity => "memberPhysicalEntity",
            Relation::PathwayComponent => "pathwayComponent",
        };
        write!(f, "{}", name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlType {
    Inhibition,
    Activation,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateDirection {
    Forward,
    Reverse,
}

/// A node in the graph.  Which of the optional fields are set depends
/// on the `kind`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// The absolute identifier (URI)
    pub id: String,
    pub kind: EntityKind,
    #[serde(skip_serializing_if="Option::is_none", default)]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if="Option::is_none", default)]
    pub standard_name: Option<String>,
    #[serde(skip_serializing_if="Vec::is_empty", default)]
    pub names: Vec<String>,
    #[serde(skip_serializing_if="Vec::is_empty", default)]
    pub comments: Vec<String>,
    #[serde(skip_serializing_if="Option::is_none", default)]
    pub control_type: Option<ControlType>,
    #[serde(skip_serializing_if="Option::is_none", default)]
    pub template_direction: Option<TemplateDirection>,
    /// The database name of an xref, like "PubMed"
    #[serde(skip_serializing_if="Option::is_none", default)]
    pub db: Option<String>,
    /// The ID of an xref in its database
    #[serde(skip_serializing_if="Option::is_none", default)]
    pub external_id: Option<String>,
}

fn push_unique(values: &mut Vec<String>, value: &str) -> bool {
    if values.iter().any(|existing| existing == value) {
        false
    } else {
        values.push(value.to_owned());
        true
    }
}

impl Entity {
    pub fn new(kind: EntityKind, id: &str) -> Entity {
        Entity {
            id: id.to_owned(),
            kind,
            display_name: None,
            standard_name: None,
            names: vec![],
            comments: vec![],
            control_type: None,
            template_direction: None,
            db: None,
            external_id: None,
        }
    }

    /// Set the display and standard names and add `name` to the names
    pub fn set_all_names(&mut self, name: &str) {
        self.display_name = Some(name.to_owned());
        self.standard_name = Some(name.to_owned());
        self.add_name(name);
    }

    /// Add a name unless it is already present.  Returns false if it was.
    pub fn add_name(&mut self, name: &str) -> bool {
        push_unique(&mut self.names, name)
    }

    /// Append a comment unless the same text is already there
    pub fn add_comment(&mut self, comment: &str) -> bool {
        push_unique(&mut self.comments, comment)
    }

    /// The display name, or the ID if there isn't one
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}
