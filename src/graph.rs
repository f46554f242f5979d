use crate::entities::{Edge, Node, NodeId};
use crate::error::GraphError;
use crate::rng::Sampler;
use regex::Regex;

/// Sugar spawned by a graph tick, reported so the orchestrator can log it.
#[derive(Clone, Copy, Debug)]
pub struct SugarSpawn {
    pub node: NodeId,
    pub amount: u32,
}

/// The terrain the ants forage on: a fixed set of nodes and undirected
/// edges, with mutable sugar and pheromone state.
///
/// Topology never changes after construction, and parallel edges between
/// the same pair of nodes are rejected, so every pheromone query resolves
/// to exactly one edge.
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    colonies: Vec<NodeId>,
    sugar_probability: f64,
    sugar_average: f64,
}

impl Graph {
    /// Builds a `width` x `depth` lattice with 4-neighbor connectivity.
    ///
    /// Every node independently receives a Poisson draw of sugar with
    /// probability `sugar_probability`. Colonies are then placed on
    /// positions drawn uniformly at random, redrawing until a position not
    /// already holding a colony comes up; a placed colony starts with an
    /// empty stock regardless of what the cell held before.
    ///
    /// # Arguments
    /// * `width` - The number of columns in the lattice.
    /// * `depth` - The number of rows in the lattice.
    /// * `colony_count` - How many cells become colonies.
    /// * `sugar_probability` - The chance for a node to be seeded with sugar.
    /// * `sugar_average` - The mean of the Poisson sugar draw.
    /// * `rng` - The draw stream shared with the rest of the simulation.
    pub fn grid(
        width: usize,
        depth: usize,
        colony_count: usize,
        sugar_probability: f64,
        sugar_average: f64,
        rng: &mut Sampler,
    ) -> Result<Graph, GraphError> {
        if colony_count > width * depth {
            return Err(GraphError::TooManyColonies {
                colonies: colony_count,
                width,
                depth,
            });
        }

        let mut nodes = Vec::with_capacity(width * depth);
        for _ in 0..width * depth {
            let mut node = Node::terrain();
            if rng.chance(sugar_probability) {
                node.set_sugar(rng.poisson(sugar_average));
            }
            nodes.push(node);
        }

        let mut colonies = Vec::with_capacity(colony_count);
        while colonies.len() < colony_count {
            let column = rng.below(width);
            let row = rng.below(depth);
            let id = NodeId(column * depth + row);
            if nodes[id.index()].is_colony() {
                continue;
            }
            nodes[id.index()] = Node::colony();
            colonies.push(id);
        }

        // One edge per adjacent pair: right neighbor, then the neighbor
        // below, no wrapping
        let mut edges = Vec::new();
        for column in 0..width {
            for row in 0..depth {
                let here = NodeId(column * depth + row);
                if column + 1 < width {
                    edges.push(Edge::new(here, NodeId((column + 1) * depth + row)));
                }
                if row + 1 < depth {
                    edges.push(Edge::new(here, NodeId(column * depth + row + 1)));
                }
            }
        }

        let graph = Graph {
            nodes,
            edges,
            colonies,
            sugar_probability,
            sugar_average,
        };
        graph.check_degrees()?;
        Ok(graph)
    }

    /// Builds a graph from the line-oriented description format.
    ///
    /// Line 1 holds the total node count, line 2 the 1-based positions of
    /// the colonies, and every following line one `a b` edge pair. Blank
    /// lines are ignored. Reading the description from disk is the
    /// caller's job.
    ///
    /// # Arguments
    /// * `contents` - The description as a string.
    /// * `colony_count` - How many colonies the caller expects; must match line 2.
    /// * `sugar_probability` - The chance for a node to be seeded with sugar.
    /// * `sugar_average` - The mean of the Poisson sugar draw.
    /// * `rng` - The draw stream shared with the rest of the simulation.
    pub fn from_description(
        contents: &str,
        colony_count: usize,
        sugar_probability: f64,
        sugar_average: f64,
        rng: &mut Sampler,
    ) -> Result<Graph, GraphError> {
        let edge_format = Regex::new(r"^(\d+)\s+(\d+)$").unwrap();

        let mut lines = contents
            .lines()
            .enumerate()
            .map(|(number, line)| (number + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let node_count = match lines.next() {
            Some((number, line)) => parse_integer(number, line)?,
            None => {
                return Err(GraphError::TruncatedDescription {
                    expected: "a node count",
                })
            }
        };
        let mut nodes = vec![Node::terrain(); node_count];

        let (colony_line, colony_tokens) = match lines.next() {
            Some((number, line)) => (number, line),
            None => {
                return Err(GraphError::TruncatedDescription {
                    expected: "the colony positions",
                })
            }
        };

        // Colonies are assigned in description order: the first index on
        // the line becomes the first colony, and so on
        let mut colonies = Vec::new();
        for token in colony_tokens.split_whitespace() {
            let position = parse_integer(colony_line, token)?;
            let id = checked_index(colony_line, position, node_count)?;
            if nodes[id.index()].is_colony() {
                return Err(GraphError::DuplicateColony {
                    line: colony_line,
                    index: position,
                });
            }
            nodes[id.index()] = Node::colony();
            colonies.push(id);
        }

        if colonies.len() != colony_count {
            return Err(GraphError::ColonyCountMismatch {
                expected: colony_count,
                found: colonies.len(),
            });
        }

        let mut edges: Vec<Edge> = Vec::new();
        for (number, line) in lines {
            let captures = edge_format
                .captures(line)
                .ok_or_else(|| GraphError::InvalidEdge {
                    line: number,
                    found: line.to_string(),
                })?;
            let a_position = parse_integer(number, &captures[1])?;
            let b_position = parse_integer(number, &captures[2])?;

            if a_position == b_position {
                return Err(GraphError::SelfLoop {
                    line: number,
                    index: a_position,
                });
            }

            let a = checked_index(number, a_position, node_count)?;
            let b = checked_index(number, b_position, node_count)?;
            if edges.iter().any(|edge| edge.connects(a, b)) {
                return Err(GraphError::DuplicateEdge {
                    line: number,
                    a: a_position,
                    b: b_position,
                });
            }
            edges.push(Edge::new(a, b));
        }

        // Build-time seeding adds to whatever a node already holds,
        // colonies included; the per-tick spawn overwrites instead
        for node in &mut nodes {
            if rng.chance(sugar_probability) {
                node.add_sugar(rng.poisson(sugar_average));
            }
        }

        let graph = Graph {
            nodes,
            edges,
            colonies,
            sugar_probability,
            sugar_average,
        };
        graph.check_degrees()?;
        Ok(graph)
    }

    /// The pheromone level on the edge between `a` and `b`, in either
    /// endpoint order. Returns 0 if no such edge exists.
    pub fn pheromone_level(&self, a: NodeId, b: NodeId) -> u32 {
        // Linear scan over the edge list; fine for the graph sizes the
        // simulation runs on
        self.edges
            .iter()
            .find(|edge| edge.connects(a, b))
            .map_or(0, Edge::pheromones)
    }

    /// Raises the pheromone level on the edge between `a` and `b`.
    /// A missing edge is a no-op.
    pub fn raise_pheromones(&mut self, a: NodeId, b: NodeId, amount: u32) {
        if let Some(edge) = self.edges.iter_mut().find(|edge| edge.connects(a, b)) {
            edge.raise(amount);
        }
    }

    /// All nodes connected to `node` by exactly one edge, in
    /// edge-insertion order.
    pub fn adjacent_to(&self, node: NodeId) -> Vec<NodeId> {
        self.edges
            .iter()
            .filter_map(|edge| edge.other(node))
            .collect()
    }

    /// Runs one environmental step: every edge's pheromones decay by one
    /// unit, floored at zero, then sugar may spawn at one random edge
    /// endpoint with probability `sugar_probability`.
    pub fn tick(&mut self, rng: &mut Sampler) -> Option<SugarSpawn> {
        for edge in &mut self.edges {
            edge.decay();
        }

        if rng.chance(self.sugar_probability) {
            return Some(self.spawn_sugar(rng));
        }
        None
    }

    /// Read-only access to a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// The colony nodes, in placement or description order.
    pub fn colonies(&self) -> &[NodeId] {
        &self.colonies
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Read-only access to the edges, for display consumers that want to
    /// render pheromone trails.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    fn spawn_sugar(&mut self, rng: &mut Sampler) -> SugarSpawn {
        let index = rng.below(self.edges.len());
        let (a, b) = self.edges[index].endpoints();
        let node = if rng.chance(0.5) { a } else { b };
        let amount = rng.poisson(self.sugar_average);

        // The spawn overwrites whatever the node held before
        self.nodes[node.index()].set_sugar(amount);
        SugarSpawn { node, amount }
    }

    fn check_degrees(&self) -> Result<(), GraphError> {
        for index in 0..self.nodes.len() {
            let id = NodeId(index);
            if !self.edges.iter().any(|edge| edge.other(id).is_some()) {
                return Err(GraphError::IsolatedNode { index: index + 1 });
            }
        }
        Ok(())
    }
}

fn parse_integer(line: usize, token: &str) -> Result<usize, GraphError> {
    token.parse().map_err(|_| GraphError::InvalidInteger {
        line,
        found: token.to_string(),
    })
}

fn checked_index(line: usize, position: usize, nodes: usize) -> Result<NodeId, GraphError> {
    if position == 0 || position > nodes {
        return Err(GraphError::IndexOutOfRange {
            line,
            index: position,
            nodes,
        });
    }
    Ok(NodeId(position - 1))
}
