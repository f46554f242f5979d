use serde_json::json;
use std::{collections::HashMap, fs::File, io::BufWriter};

pub fn create_replay_logger(
    filename: Option<String>,
    nodes: usize,
    colonies: Vec<usize>,
) -> Box<dyn ReplayLogger> {
    match filename {
        None => Box::new(NoOpReplayLogger {}),
        Some(filename) => Box::new(JsonReplayLogger::new(filename, nodes, colonies)),
    }
}

pub trait ReplayLogger: Send + Sync {
    #[allow(unused_variables)]
    fn log_turn(&mut self, tick: usize, live_ants: usize, stocks: Vec<u32>) {}

    #[allow(unused_variables)]
    fn log_event(&mut self, tick: usize, event: Event) {}

    fn clear(&mut self) {}

    fn save(&self) {}

    fn log_spawn_ant(&mut self, tick: usize, id: String, home: usize) {
        self.log_event(
            tick,
            Event {
                event_type: EventType::SpawnAnt,
                ant: Some(id),
                node: Some(home),
                destination: None,
                amount: None,
            },
        );
    }

    fn log_spawn_sugar(&mut self, tick: usize, node: usize, amount: u32) {
        self.log_event(
            tick,
            Event {
                event_type: EventType::SpawnSugar,
                ant: None,
                node: Some(node),
                destination: None,
                amount: Some(amount),
            },
        );
    }

    fn log_move_ant(&mut self, tick: usize, id: String, from: usize, to: usize) {
        self.log_event(
            tick,
            Event {
                event_type: EventType::Move,
                ant: Some(id),
                node: Some(from),
                destination: Some(to),
                amount: None,
            },
        );
    }

    fn log_pick_up(&mut self, tick: usize, id: String, node: usize) {
        self.log_event(
            tick,
            Event {
                event_type: EventType::PickUp,
                ant: Some(id),
                node: Some(node),
                destination: None,
                amount: None,
            },
        );
    }

    fn log_deposit(&mut self, tick: usize, id: String, colony: usize, amount: u32) {
        self.log_event(
            tick,
            Event {
                event_type: EventType::Deposit,
                ant: Some(id),
                node: Some(colony),
                destination: None,
                amount: Some(amount),
            },
        );
    }

    fn log_starve(&mut self, tick: usize, id: String, colony: usize) {
        self.log_event(
            tick,
            Event {
                event_type: EventType::Starve,
                ant: Some(id),
                node: Some(colony),
                destination: None,
                amount: None,
            },
        );
    }
}

#[derive(serde::Serialize)]
enum EventType {
    SpawnAnt,
    SpawnSugar,
    Move,
    PickUp,
    Deposit,
    Starve,
}

#[derive(serde::Serialize)]
pub struct Event {
    event_type: EventType,
    ant: Option<String>,
    node: Option<usize>,
    destination: Option<usize>,
    amount: Option<u32>,
}

struct Turn {
    tick: usize,
    live_ants: usize,
    stocks: Vec<u32>,
}

struct NoOpReplayLogger;
impl ReplayLogger for NoOpReplayLogger {}

struct JsonReplayLogger {
    filename: String,
    nodes: usize,
    colonies: Vec<usize>,
    turns: Vec<Turn>,
    events: HashMap<usize, Vec<Event>>,
}

impl JsonReplayLogger {
    pub fn new(filename: String, nodes: usize, colonies: Vec<usize>) -> JsonReplayLogger {
        JsonReplayLogger {
            filename,
            nodes,
            colonies,
            turns: Vec::new(),
            events: HashMap::new(),
        }
    }
}

impl ReplayLogger for JsonReplayLogger {
    fn log_turn(&mut self, tick: usize, live_ants: usize, stocks: Vec<u32>) {
        self.turns.push(Turn {
            tick,
            live_ants,
            stocks,
        });
    }

    fn log_event(&mut self, tick: usize, event: Event) {
        self.events.entry(tick).or_default().push(event);
    }

    fn clear(&mut self) {
        self.turns.clear();
        self.events.clear();
    }

    fn save(&self) {
        let file = File::create(&self.filename).unwrap();
        let turns: Vec<_> = self
            .turns
            .iter()
            .map(|turn| {
                json!({
                    "tick": turn.tick,
                    "live_ants": turn.live_ants,
                    "stocks": turn.stocks,
                    "events": self.events.get(&turn.tick).unwrap_or(&Vec::new()),
                })
            })
            .collect();

        let data = json!({
            "nodes": self.nodes,
            "colonies": self.colonies,
            "turns": turns,
        });

        let mut writer = BufWriter::new(&file);
        serde_json::to_writer_pretty(&mut writer, &data).unwrap();
    }
}
