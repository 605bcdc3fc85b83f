//! Deriving identifiers from business keys, and find-or-create.
//!
//! A local ID is the kind's prefix (see [EntityKind::id_prefix]) followed
//! by the escaped key parts joined with `|`.  The prefixes are
//! prefix-free and escaping removes every `|` from the parts, so two
//! different (kind, key) pairs never give the same ID.
//!
//! Keys are used exactly as given: callers normalise them first, for
//! example by lower-casing microRNA names.

use petgraph::graph::NodeIndex;

use crate::error::MappingError;
use crate::graph::BioGraph;
use crate::model::EntityKind;

const KEY_PART_SEPARATOR: &str = "|";

/// Percent-encode the characters that can't appear in a key part
pub fn escape_key(part: &str) -> String {
    let mut ret = String::with_capacity(part.len());

    for c in part.chars() {
        match c {
            '%' => ret.push_str("%25"),
            '|' => ret.push_str("%7C"),
            ' ' => ret.push_str("%20"),
            '#' => ret.push_str("%23"),
            '\t' => ret.push_str("%09"),
            '\n' => ret.push_str("%0A"),
            '\r' => ret.push_str("%0D"),
            _ => ret.push(c),
        }
    }

    ret
}

/// The result of [Identities::resolve()]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub idx: NodeIndex,
    /// true if the node didn't exist before the call
    pub created: bool,
}

/// Turns business keys into absolute IDs under an XML base
#[derive(Debug, Clone)]
pub struct Identities {
    xml_base: String,
}

impl Identities {
    pub fn new(xml_base: &str) -> Identities {
        Identities {
            xml_base: xml_base.to_owned(),
        }
    }

    pub fn xml_base(&self) -> &str {
        &self.xml_base
    }

    /// The ID of an entity, relative to the XML base
    pub fn local_id(kind: EntityKind, key_parts: &[&str]) -> String {
        let escaped: Vec<_> = key_parts.iter().map(|part| escape_key(part)).collect();

        format!("{}{}", kind.id_prefix(), escaped.join(KEY_PART_SEPARATOR))
    }

    pub fn absolute_uri(&self, local_id: &str) -> String {
        format!("{}{}", self.xml_base, local_id)
    }

    pub fn id_for(&self, kind: EntityKind, key_parts: &[&str]) -> String {
        self.absolute_uri(&Self::local_id(kind, key_parts))
    }

    /// Return the node for a key, creating an empty one if there isn't
    /// one yet.  Fails if the ID is taken by an entity of another kind.
    pub fn resolve(&self, graph: &mut BioGraph, kind: EntityKind, key_parts: &[&str])
        -> Result<Resolved, MappingError>
    {
        let id = self.id_for(kind, key_parts);

        if let Some(idx) = graph.find_node(&id) {
            let existing = graph.entity(idx).kind;

            if existing != kind {
                return Err(MappingError::IdentityCollision {
                    id,
                    existing,
                    requested: kind,
                });
            }

            return Ok(Resolved { idx, created: false });
        }

        match graph.create_node(kind, &id) {
            Ok(idx) => Ok(Resolved { idx, created: true }),
            Err(_) => Err(MappingError::IdentityCollision {
                id,
                existing: kind,
                requested: kind,
            }),
        }
    }
}
