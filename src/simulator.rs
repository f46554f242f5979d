use crate::entities::{Ant, NodeId};
use crate::error::SimulationError;
use crate::graph::Graph;
use crate::replay::{create_replay_logger, ReplayLogger};
use crate::rng::Sampler;
use serde::Serialize;

/// The ant-colony simulation.
/// Main entry point for running the foraging loop.
pub struct Simulator {
    graph: Graph,
    ants: Vec<Ant>,
    sugar_capacity: u32,
    dropped_pheromones: u32,
    ticks: usize,
    rng: Sampler,
    replay_logger: Box<dyn ReplayLogger>,
}

/// A read-only snapshot of the simulation between ticks.
///
/// Display and telemetry consumers work off snapshots; they never touch
/// the live simulation state.
#[derive(Clone, Serialize)]
pub struct SimulationState {
    /// The number of ticks executed so far.
    pub ticks: usize,
    /// Every ant slot, dead ones included.
    pub ants: Vec<AntState>,
    /// Every colony with its current stock, in placement order.
    pub colonies: Vec<ColonyState>,
}

/// An ant as seen by display consumers.
#[derive(Clone, Serialize)]
pub struct AntState {
    /// The unique identifier of the ant.
    pub id: String,
    /// The node the ant currently occupies.
    pub node: usize,
    /// The node of the ant's home colony.
    pub home: usize,
    /// Whether the ant is hauling sugar home.
    pub carrying: bool,
    /// Whether the ant is still alive.
    pub alive: bool,
}

/// A colony as seen by display consumers.
#[derive(Clone, Serialize)]
pub struct ColonyState {
    /// The node the colony sits on.
    pub node: usize,
    /// The colony's sugar stock.
    pub stock: u32,
}

impl Simulator {
    /// Creates a new simulation.
    ///
    /// # Arguments
    /// * `graph` - The terrain the ants forage on.
    /// * `ants` - The population; every ant's home must be a colony of `graph`.
    /// * `sugar_capacity` - Units deposited into a colony per drop.
    /// * `dropped_pheromones` - Pheromone laid on every traversed edge.
    /// * `rng` - The draw stream; pass the sampler used to build the graph so a seeded run stays reproducible.
    /// * `replay_filename` - The filename to save the replay of the run to. If `None`, no replay will be saved.
    pub fn new(
        graph: Graph,
        ants: Vec<Ant>,
        sugar_capacity: u32,
        dropped_pheromones: u32,
        rng: Sampler,
        replay_filename: Option<String>,
    ) -> Simulator {
        let replay_logger = create_replay_logger(
            replay_filename,
            graph.node_count(),
            graph.colonies().iter().map(NodeId::index).collect(),
        );

        let mut simulator = Simulator {
            graph,
            ants,
            sugar_capacity,
            dropped_pheromones,
            ticks: 0,
            rng,
            replay_logger,
        };

        let spawns: Vec<(String, usize)> = simulator
            .ants
            .iter()
            .map(|ant| (ant.id().to_string(), ant.home().index()))
            .collect();
        for (id, home) in spawns {
            simulator.replay_logger.log_spawn_ant(0, id, home);
        }

        let live_ants = simulator.live_ants();
        let stocks = simulator.stocks();
        simulator.replay_logger.log_turn(0, live_ants, stocks);

        simulator
    }

    /// Runs the simulation for one unit of time.
    ///
    /// The phases run in a fixed order: the graph decays and may spawn
    /// sugar, every live ant moves one step, homecoming carriers deposit
    /// their load, and only then is hunger evaluated. Eating before
    /// dropping would starve every ant returning to an empty colony, and
    /// eating before moving would starve the whole population on the
    /// first tick, since every ant still sits at home until it moves.
    pub fn tick(&mut self) -> Result<(), SimulationError> {
        self.ticks += 1;

        if let Some(spawn) = self.graph.tick(&mut self.rng) {
            self.replay_logger
                .log_spawn_sugar(self.ticks, spawn.node.index(), spawn.amount);
        }

        self.move_ants()?;
        self.drop_sugar();
        self.eat_sugar();

        let live_ants = self.live_ants();
        let stocks = self.stocks();
        self.replay_logger.log_turn(self.ticks, live_ants, stocks);
        Ok(())
    }

    /// Runs the given number of ticks, saves the replay, and returns the
    /// final snapshot.
    pub fn run(&mut self, ticks: usize) -> Result<SimulationState, SimulationError> {
        for _ in 0..ticks {
            self.tick()?;
        }
        self.replay_logger.save();
        Ok(self.state())
    }

    /// A read-only snapshot of the current simulation state.
    pub fn state(&self) -> SimulationState {
        SimulationState {
            ticks: self.ticks,
            ants: self
                .ants
                .iter()
                .map(|ant| AntState {
                    id: ant.id().to_string(),
                    node: ant.current().index(),
                    home: ant.home().index(),
                    carrying: ant.carrying(),
                    alive: ant.alive(),
                })
                .collect(),
            colonies: self
                .graph
                .colonies()
                .iter()
                .map(|id| ColonyState {
                    node: id.index(),
                    stock: self.graph.node(*id).sugar(),
                })
                .collect(),
        }
    }

    /// Read-only access to the terrain.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Read-only access to the ant slots, dead ones included.
    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    fn move_ants(&mut self) -> Result<(), SimulationError> {
        for index in 0..self.ants.len() {
            if self.ants[index].alive() {
                self.move_ant(index)?;
            }
        }
        Ok(())
    }

    fn move_ant(&mut self, index: usize) -> Result<(), SimulationError> {
        let current = self.ants[index].current();
        let target = self.next_node(index)?;

        // Pheromone is laid on every traversed edge, the retreat after a
        // pickup included
        self.graph
            .raise_pheromones(current, target, self.dropped_pheromones);
        self.ants[index].move_to(target);

        let id = self.ants[index].id().to_string();
        self.replay_logger
            .log_move_ant(self.ticks, id, current.index(), target.index());
        Ok(())
    }

    fn next_node(&mut self, index: usize) -> Result<NodeId, SimulationError> {
        let current = self.ants[index].current();
        let previous = self.ants[index].previous();

        if self.should_pick_up(index) {
            self.graph.node_mut(current).decrease_sugar();
            self.ants[index].pick_up_sugar();

            let id = self.ants[index].id().to_string();
            self.replay_logger.log_pick_up(self.ticks, id, current.index());

            // Retrace one step toward home without consulting pheromones
            return Ok(previous);
        }

        let candidates = self.candidates(current, previous)?;
        Ok(self.choose(current, candidates))
    }

    fn should_pick_up(&self, index: usize) -> bool {
        let ant = &self.ants[index];
        !ant.carrying() && self.graph.node(ant.current()).sugar() > 0 && !ant.is_at_home()
    }

    /// The neighbors an ant may step to. The previous node is excluded to
    /// stop back-and-forth oscillation, except on an ant's very first move
    /// and at dead ends, where retreat is the only option.
    fn candidates(
        &self,
        current: NodeId,
        previous: NodeId,
    ) -> Result<Vec<NodeId>, SimulationError> {
        let adjacent = self.graph.adjacent_to(current);
        if adjacent.is_empty() {
            return Err(SimulationError::NoAdjacentNodes { node: current });
        }

        if current == previous || adjacent.len() == 1 {
            return Ok(adjacent);
        }
        Ok(adjacent
            .into_iter()
            .filter(|node| *node != previous)
            .collect())
    }

    fn choose(&mut self, current: NodeId, candidates: Vec<NodeId>) -> NodeId {
        if candidates.len() == 1 {
            return candidates[0];
        }

        // The +1 keeps zero-pheromone edges reachable, so the walk never
        // loses its exploration floor
        let mut cumulative = Vec::with_capacity(candidates.len());
        let mut total = 0;
        for node in &candidates {
            total += self.graph.pheromone_level(current, *node) as usize + 1;
            cumulative.push(total);
        }

        let draw = self.rng.below(total);
        for (index, bound) in cumulative.iter().enumerate().take(candidates.len() - 1) {
            if draw < *bound {
                return candidates[index];
            }
        }
        candidates[candidates.len() - 1]
    }

    fn drop_sugar(&mut self) {
        for index in 0..self.ants.len() {
            let ant = &self.ants[index];
            if !ant.alive() || !ant.is_at_home() || !ant.carrying() {
                continue;
            }

            let home = ant.home();
            self.ants[index].drop_sugar();
            self.graph.node_mut(home).top_up(self.sugar_capacity);

            let id = self.ants[index].id().to_string();
            self.replay_logger
                .log_deposit(self.ticks, id, home.index(), self.sugar_capacity);
        }
    }

    fn eat_sugar(&mut self) {
        for index in 0..self.ants.len() {
            let ant = &self.ants[index];
            if !ant.alive() || !ant.is_at_home() {
                continue;
            }

            let home = ant.home();
            if self.graph.node(home).has_stock() {
                self.graph.node_mut(home).consume();
            } else {
                self.ants[index].set_alive(false);

                let id = self.ants[index].id().to_string();
                self.replay_logger.log_starve(self.ticks, id, home.index());
            }
        }
    }

    fn live_ants(&self) -> usize {
        self.ants.iter().filter(|ant| ant.alive()).count()
    }

    fn stocks(&self) -> Vec<u32> {
        self.graph
            .colonies()
            .iter()
            .map(|id| self.graph.node(*id).sugar())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A three node line: colony - middle - far end. No random seeding, so
    // every move on it is forced and the walk is fully deterministic.
    fn line_graph(rng: &mut Sampler) -> Graph {
        Graph::from_description("3\n1\n1 2\n2 3", 1, 0.0, 0.0, rng).unwrap()
    }

    // Two nodes joined by a single edge, colony on the first.
    fn pair_graph(rng: &mut Sampler) -> Graph {
        Graph::from_description("2\n1\n1 2", 1, 0.0, 0.0, rng).unwrap()
    }

    // A center colony with three leaves around it.
    fn star_graph(rng: &mut Sampler) -> Graph {
        Graph::from_description("4\n1\n1 2\n1 3\n1 4", 1, 0.0, 0.0, rng).unwrap()
    }

    #[test]
    fn when_walking_a_line_graph_the_ant_cycles_between_the_ends() {
        let mut rng = Sampler::seeded(0);
        let mut graph = line_graph(&mut rng);
        graph.node_mut(NodeId(0)).top_up(100);

        let ants = vec![Ant::new(NodeId(0))];
        let mut simulator = Simulator::new(graph, ants, 10, 2, rng, None);

        // The exclusion of the previous node forces the cycle
        // home, middle, far end, middle, home, ...
        let expected = [1, 2, 1, 0, 1, 2, 1, 0];
        for position in expected {
            simulator.tick().unwrap();
            assert_eq!(simulator.ants()[0].current(), NodeId(position));
            assert!(simulator.ants()[0].alive());
        }

        // The ant was home twice and ate one unit each time
        assert_eq!(simulator.graph().node(NodeId(0)).sugar(), 98);
    }

    #[test]
    fn when_the_colony_has_no_stock_the_ant_starves_on_its_first_return_home() {
        let mut rng = Sampler::seeded(0);
        let graph = line_graph(&mut rng);

        let ants = vec![Ant::new(NodeId(0))];
        let mut simulator = Simulator::new(graph, ants, 10, 2, rng, None);

        // The move phase precedes the eat phase, so the ant leaves its
        // empty home on the first tick before hunger is evaluated
        for _ in 0..3 {
            simulator.tick().unwrap();
            assert!(simulator.ants()[0].alive());
        }

        // Tick 4 brings the ant back to the empty colony and it starves
        simulator.tick().unwrap();
        assert!(!simulator.ants()[0].alive());
        assert_eq!(simulator.ants()[0].current(), NodeId(0));
    }

    #[test]
    fn when_an_ant_is_dead_it_never_moves_or_eats_again() {
        let mut rng = Sampler::seeded(0);
        let graph = line_graph(&mut rng);

        let ants = vec![Ant::new(NodeId(0))];
        let mut simulator = Simulator::new(graph, ants, 10, 2, rng, None);

        for _ in 0..4 {
            simulator.tick().unwrap();
        }
        assert!(!simulator.ants()[0].alive());

        for _ in 0..4 {
            simulator.tick().unwrap();
            assert!(!simulator.ants()[0].alive());
            assert_eq!(simulator.ants()[0].current(), NodeId(0));
        }
    }

    #[test]
    fn when_an_ant_finds_sugar_away_from_home_it_picks_up_and_retraces() {
        let mut rng = Sampler::seeded(0);
        let mut graph = pair_graph(&mut rng);
        graph.node_mut(NodeId(0)).top_up(5);
        graph.node_mut(NodeId(1)).set_sugar(3);

        let ants = vec![Ant::new(NodeId(0))];
        let mut simulator = Simulator::new(graph, ants, 7, 2, rng, None);

        // Tick 1: the ant walks out to the sugar node
        simulator.tick().unwrap();
        assert_eq!(simulator.ants()[0].current(), NodeId(1));
        assert!(!simulator.ants()[0].carrying());
        assert_eq!(simulator.graph().node(NodeId(0)).sugar(), 5);

        // Tick 2: pickup, retrace home, deposit, eat
        simulator.tick().unwrap();
        assert_eq!(simulator.ants()[0].current(), NodeId(0));
        assert!(!simulator.ants()[0].carrying());
        assert!(simulator.ants()[0].alive());
        assert_eq!(simulator.graph().node(NodeId(1)).sugar(), 2);
        assert_eq!(simulator.graph().node(NodeId(0)).sugar(), 5 + 7 - 1);

        // Pheromone was laid on the way out and on the retreat, with one
        // decay in between: 0 + 2, - 1, + 2
        assert_eq!(simulator.graph().pheromone_level(NodeId(0), NodeId(1)), 3);
    }

    #[test]
    fn when_a_carrier_returns_to_an_empty_colony_the_deposit_lands_before_hunger() {
        let mut rng = Sampler::seeded(0);
        let mut graph = pair_graph(&mut rng);
        graph.node_mut(NodeId(1)).set_sugar(1);

        let ants = vec![Ant::new(NodeId(0))];
        let mut simulator = Simulator::new(graph, ants, 3, 2, rng, None);

        simulator.tick().unwrap();
        simulator.tick().unwrap();

        // The deposit tops the empty stock up to 3 before the eat phase
        // takes its unit, so the returning ant survives
        assert!(simulator.ants()[0].alive());
        assert_eq!(simulator.graph().node(NodeId(0)).sugar(), 2);
    }

    #[test]
    fn when_two_ants_come_home_to_one_unit_of_stock_the_later_slot_starves() {
        let mut rng = Sampler::seeded(0);
        let mut graph = pair_graph(&mut rng);
        graph.node_mut(NodeId(0)).top_up(1);

        let ants = vec![Ant::new(NodeId(0)), Ant::new(NodeId(0))];
        let mut simulator = Simulator::new(graph, ants, 10, 2, rng, None);

        // Both ants walk out together and come back together; the eat
        // phase runs by slot index, so the first ant gets the last unit
        simulator.tick().unwrap();
        assert_eq!(simulator.ants()[0].current(), NodeId(1));
        assert_eq!(simulator.ants()[1].current(), NodeId(1));

        simulator.tick().unwrap();
        assert!(simulator.ants()[0].alive());
        assert!(!simulator.ants()[1].alive());
        assert_eq!(simulator.graph().node(NodeId(0)).sugar(), 0);
    }

    #[test]
    fn when_a_dead_end_is_reached_the_move_back_is_forced_whatever_the_pheromones_say() {
        let mut rng = Sampler::seeded(0);
        let mut graph = line_graph(&mut rng);
        graph.node_mut(NodeId(0)).top_up(100);
        // Pile pheromone on the far edge; the walk on a line is still
        // fully forced by the exclusion rule and the dead ends
        graph.raise_pheromones(NodeId(1), NodeId(2), 50);

        let ants = vec![Ant::new(NodeId(0))];
        let mut simulator = Simulator::new(graph, ants, 10, 2, rng, None);

        let expected = [1, 2, 1, 0];
        for position in expected {
            simulator.tick().unwrap();
            assert_eq!(simulator.ants()[0].current(), NodeId(position));
        }
    }

    #[test]
    fn when_choosing_among_neighbors_the_previous_node_is_excluded() {
        let mut rng = Sampler::seeded(7);
        let mut graph = star_graph(&mut rng);
        graph.node_mut(NodeId(0)).top_up(100);

        let ants = vec![Ant::new(NodeId(0))];
        let mut simulator = Simulator::new(graph, ants, 10, 2, rng, None);

        // First move: all three leaves are candidates because the ant has
        // nowhere it came from yet
        simulator.tick().unwrap();
        let first_leaf = simulator.ants()[0].current();
        assert!([NodeId(1), NodeId(2), NodeId(3)].contains(&first_leaf));

        // Second move: the leaf is a dead end, retreat is forced
        simulator.tick().unwrap();
        assert_eq!(simulator.ants()[0].current(), NodeId(0));

        // Third move: the leaf the ant just came from is off the table
        simulator.tick().unwrap();
        let second_leaf = simulator.ants()[0].current();
        assert!([NodeId(1), NodeId(2), NodeId(3)].contains(&second_leaf));
        assert_ne!(second_leaf, first_leaf);
    }

    #[test]
    fn when_running_a_simulation_the_snapshot_reflects_the_population_and_stocks() {
        let mut rng = Sampler::seeded(0);
        let mut graph = line_graph(&mut rng);
        graph.node_mut(NodeId(0)).top_up(2);

        let ants = vec![Ant::new(NodeId(0))];
        let mut simulator = Simulator::new(graph, ants, 10, 2, rng, None);

        let state = simulator.run(1).unwrap();

        assert_eq!(state.ticks, 1);
        assert_eq!(state.ants.len(), 1);
        assert_eq!(state.ants[0].node, 1);
        assert_eq!(state.ants[0].home, 0);
        assert!(state.ants[0].alive);
        assert!(!state.ants[0].carrying);
        assert_eq!(state.colonies.len(), 1);
        assert_eq!(state.colonies[0].node, 0);
        assert_eq!(state.colonies[0].stock, 2);
    }

    #[test]
    fn when_sugar_is_everywhere_the_walk_keeps_the_values_non_negative() {
        // A busier setup with spawning enabled: whatever the draws do,
        // sugar and pheromones must stay non-negative and the positions
        // must stay inside the graph
        let mut rng = Sampler::seeded(99);
        let graph = Graph::grid(4, 4, 2, 0.5, 3.0, &mut rng).unwrap();
        let homes: Vec<NodeId> = graph.colonies().to_vec();

        let mut ants = Vec::new();
        for home in &homes {
            for _ in 0..3 {
                ants.push(Ant::new(*home));
            }
        }

        let mut simulator = Simulator::new(graph, ants, 5, 1, rng, None);
        for _ in 0..50 {
            simulator.tick().unwrap();
        }

        let graph = simulator.graph();
        for ant in simulator.ants() {
            assert!(ant.current().index() < graph.node_count());
            assert!(ant.previous().index() < graph.node_count());
        }
        assert!(simulator.live_ants() <= 6);
    }
}
