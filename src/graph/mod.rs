//! The graph store and graph algorithms

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use petgraph::{Direction, stable_graph::StableGraph};
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use anyhow::{Result, anyhow};

use crate::model::{Entity, EntityKind, Relation};

pub type BioStableGraph = StableGraph<Entity, Relation>;

/// The output object graph: entities indexed by their absolute ID.
///
/// Nodes are only removed by the pruner, so a `NodeIndex` returned
/// while mapping stays valid until the end of the run.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct BioGraph {
    graph: BioStableGraph,
    ids: BTreeMap<String, NodeIndex>,
}

impl BioGraph {
    pub fn new() -> BioGraph {
        BioGraph::default()
    }

    /// Add a new node.  Fails if the ID is already used.
    pub fn create_node(&mut self, kind: EntityKind, id: &str) -> Result<NodeIndex> {
        if self.ids.contains_key(id) {
            return Err(anyhow!("a node with ID {} already exists", id));
        }

        let idx = self.graph.add_node(Entity::new(kind, id));
        self.ids.insert(id.to_owned(), idx);

        Ok(idx)
    }

    pub fn find_node(&self, id: &str) -> Option<NodeIndex> {
        self.ids.get(id).cloned()
    }

    /// Return the Entity at `idx`.  Panics if the node has been removed.
    pub fn entity(&self, idx: NodeIndex) -> &Entity {
        &self.graph[idx]
    }

    pub fn entity_mut(&mut self, idx: NodeIndex) -> &mut Entity {
        &mut self.graph[idx]
    }

    pub fn entity_by_id(&self, id: &str) -> Option<&Entity> {
        self.find_node(id).and_then(|idx| self.graph.node_weight(idx))
    }

    pub fn has_edge(&self, from: NodeIndex, relation: Relation, to: NodeIndex) -> bool {
        self.graph.edges_directed(from, Direction::Outgoing)
            .any(|edge_ref| edge_ref.target() == to && *edge_ref.weight() == relation)
    }

    /// Add an edge unless an identical one exists.  Returns true if the
    /// edge was added.
    pub fn add_edge(&mut self, from: NodeIndex, relation: Relation, to: NodeIndex) -> bool {
        if self.has_edge(from, relation, to) {
            return false;
        }

        self.graph.add_edge(from, to, relation);

        true
    }

    /// The targets of the outgoing `relation` edges of `idx`, oldest first
    pub fn targets(&self, idx: NodeIndex, relation: Relation) -> Vec<NodeIndex> {
        let mut ret: Vec<_> =
            self.graph.edges_directed(idx, Direction::Outgoing)
            .filter(|edge_ref| *edge_ref.weight() == relation)
            .map(|edge_ref| (edge_ref.id(), edge_ref.target()))
            .collect();

        ret.sort();

        ret.into_iter().map(|(_, target)| target).collect()
    }

    pub fn incoming_count(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    /// All nodes of the given kind, ordered by ID
    pub fn nodes_of_kind(&self, kind: EntityKind)
        -> impl Iterator<Item = (NodeIndex, &Entity)> + '_
    {
        self.ids.values()
            .map(|idx| (*idx, &self.graph[*idx]))
            .filter(move |(_, entity)| entity.kind == kind)
    }

    pub fn count_of_kind(&self, kind: EntityKind) -> usize {
        self.nodes_of_kind(kind).count()
    }

    /// Remove a node and all of its edges
    pub fn remove_node(&mut self, idx: NodeIndex) -> Option<Entity> {
        let entity = self.graph.remove_node(idx)?;
        self.ids.remove(&entity.id);
        Some(entity)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// An iterator over the entities, ordered by ID
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.ids.values().map(|idx| &self.graph[*idx])
    }

    /// Every edge as a (subject ID, relation, object ID) triple.  Two
    /// graphs with equal triples and equal IDs have the same structure
    /// whatever order their nodes were created in.
    pub fn edge_triples(&self) -> BTreeSet<(String, Relation, String)> {
        self.graph.edge_indices()
            .filter_map(|edge_idx| {
                let (source, target) = self.graph.edge_endpoints(edge_idx)?;
                let relation = self.graph.edge_weight(edge_idx)?;
                Some((self.graph[source].id.clone(), *relation,
                      self.graph[target].id.clone()))
            })
            .collect()
    }

    pub fn stable_graph(&self) -> &BioStableGraph {
        &self.graph
    }
}

/// A predicate to pass to [reachable_by].  It is called with the
/// relation of each outgoing edge and decides whether to follow it.
pub type FollowPred = fn(relation: &Relation) -> bool;

/// Return the nodes reachable from `start_idx` along outgoing edges
/// where `follow_pred` returns true, in breadth-first order.
/// `start_idx` itself is not included.  Each node is returned once,
/// even if the graph has cycles.
pub fn reachable_by(graph: &BioStableGraph,
                    start_idx: NodeIndex,
                    follow_pred: &FollowPred)
    -> Result<Vec<NodeIndex>>
{
    let mut queue = VecDeque::new();
    let mut seen_nodes = HashSet::new();

    let mut ret = vec![];

    if graph.node_weight(start_idx).is_none() {
        return Err(anyhow!("node not found: {:?}", start_idx));
    }

    queue.push_back(start_idx);
    seen_nodes.insert(start_idx);

    loop {
        let Some(current_idx) = queue.pop_front()
        else {
            break;
        };

        let mut outgoing: Vec<_> = graph.edges_directed(current_idx, Direction::Outgoing)
            .filter(|edge_ref| follow_pred(edge_ref.weight()))
            .map(|edge_ref| (edge_ref.id(), edge_ref.target()))
            .collect();

        // visit in edge creation order
        outgoing.sort();

        for (_, other_node_idx) in outgoing {
            if seen_nodes.contains(&other_node_idx) {
                continue;
            } else {
                seen_nodes.insert(other_node_idx);
            }

            ret.push(other_node_idx);
            queue.push_back(other_node_idx);
        }
    }

    Ok(ret)
}
