use serde::Serialize;
use uuid::Uuid;

/// Identifies a node within its owning graph.
///
/// Identity is positional: ids are handed out at graph-build time and stay
/// stable for the whole run.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The node's index in the owning graph.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The role a node plays in the simulation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    /// A plain terrain cell whose sugar can be foraged.
    Terrain,
    /// A colony, home to ants; its sugar is the colony's food stock.
    Colony,
}

/// A terrain cell holding a non-negative amount of sugar.
///
/// Colony nodes reuse the sugar field as their food stock and are otherwise
/// ordinary nodes: they connect to edges and take part in adjacency queries
/// like any other cell.
#[derive(Clone, Debug)]
pub struct Node {
    role: Role,
    sugar: u32,
}

impl Node {
    pub(crate) fn terrain() -> Node {
        Node {
            role: Role::Terrain,
            sugar: 0,
        }
    }

    // A fresh colony starts with an empty stock
    pub(crate) fn colony() -> Node {
        Node {
            role: Role::Colony,
            sugar: 0,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_colony(&self) -> bool {
        self.role == Role::Colony
    }

    /// The sugar held by this cell, or the stock if it is a colony.
    pub fn sugar(&self) -> u32 {
        self.sugar
    }

    /// Whether a colony has anything left for its ants to eat.
    pub fn has_stock(&self) -> bool {
        self.sugar > 0
    }

    pub(crate) fn set_sugar(&mut self, amount: u32) {
        self.sugar = amount;
    }

    pub(crate) fn add_sugar(&mut self, amount: u32) {
        self.sugar = self.sugar.saturating_add(amount);
    }

    pub(crate) fn decrease_sugar(&mut self) {
        self.sugar = self.sugar.saturating_sub(1);
    }

    pub(crate) fn top_up(&mut self, amount: u32) {
        self.add_sugar(amount);
    }

    pub(crate) fn consume(&mut self) {
        self.decrease_sugar();
    }
}

/// An undirected connection between two nodes carrying a pheromone trail.
#[derive(Clone, Debug)]
pub struct Edge {
    a: NodeId,
    b: NodeId,
    pheromones: u32,
}

impl Edge {
    pub(crate) fn new(a: NodeId, b: NodeId) -> Edge {
        Edge {
            a,
            b,
            pheromones: 0,
        }
    }

    /// The two endpoints, in construction order. The order carries no
    /// meaning: all queries treat the pair as unordered.
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.a, self.b)
    }

    pub fn pheromones(&self) -> u32 {
        self.pheromones
    }

    /// Whether this edge connects `a` and `b`, in either endpoint order.
    pub(crate) fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.a == a && self.b == b) || (self.a == b && self.b == a)
    }

    /// The endpoint opposite `node`, if `node` is one of the endpoints.
    pub(crate) fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.a == node {
            Some(self.b)
        } else if self.b == node {
            Some(self.a)
        } else {
            None
        }
    }

    pub(crate) fn raise(&mut self, amount: u32) {
        self.pheromones = self.pheromones.saturating_add(amount);
    }

    pub(crate) fn decay(&mut self) {
        self.pheromones = self.pheromones.saturating_sub(1);
    }
}

/// A foraging agent shuttling between its home colony and sugar sources.
///
/// A starved ant is tombstoned in place: its slot survives with
/// `alive == false` so the population keeps stable indices across ticks.
pub struct Ant {
    id: String,
    home: NodeId,
    current: NodeId,
    previous: NodeId,
    carrying: bool,
    alive: bool,
}

impl Ant {
    /// Creates a new ant resting at its home colony.
    pub fn new(home: NodeId) -> Ant {
        Ant {
            id: Uuid::new_v4().to_string(),
            home,
            current: home,
            previous: home,
            carrying: false,
            alive: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn home(&self) -> NodeId {
        self.home
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn previous(&self) -> NodeId {
        self.previous
    }

    pub fn carrying(&self) -> bool {
        self.carrying
    }

    pub fn alive(&self) -> bool {
        self.alive
    }

    pub fn is_at_home(&self) -> bool {
        self.current == self.home
    }

    pub(crate) fn move_to(&mut self, next: NodeId) {
        self.previous = self.current;
        self.current = next;
    }

    pub(crate) fn pick_up_sugar(&mut self) {
        self.carrying = true;
    }

    pub(crate) fn drop_sugar(&mut self) {
        self.carrying = false;
    }

    pub(crate) fn set_alive(&mut self, value: bool) {
        self.alive = value;
    }
}
