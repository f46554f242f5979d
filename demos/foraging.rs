use colony_engine::{Ant, Graph, NodeId, Sampler, Simulator};

fn main() {
    let mut rng = Sampler::seeded(42);
    let graph = match Graph::grid(8, 8, 2, 0.1, 4.0, &mut rng) {
        Ok(graph) => graph,
        Err(e) => panic!("Could not build the terrain: {}", e),
    };

    let homes: Vec<NodeId> = graph.colonies().to_vec();
    let mut ants = Vec::new();
    for home in &homes {
        for _ in 0..5 {
            ants.push(Ant::new(*home));
        }
    }

    let replay_filename = "/tmp/foraging_replay.json".to_string();
    let mut simulator = Simulator::new(graph, ants, 10, 2, rng, Some(replay_filename));

    match simulator.run(200) {
        Ok(state) => {
            println!("Ticks executed: {}", state.ticks);
            println!(
                "Live ants: {} of {}",
                state.ants.iter().filter(|ant| ant.alive).count(),
                state.ants.len()
            );
            for colony in &state.colonies {
                println!("Colony at node {}: stock = {}", colony.node, colony.stock);
            }
        }
        Err(e) => panic!("Simulation aborted: {}", e),
    }
}
