use clap::Parser;
use packman_ghost_core::constants::{
    GHOST_BASE_SPEED, GHOST_CAPTURE_POINTS, GHOST_EATEN_SPEED_MULTIPLIER, MODE_TIMELINE,
    PELLET_POINTS, PLAYER_BASE_SPEED, POWER_DURATION_MS, POWER_PELLET_POINTS, STARTING_LIVES,
    TICK_MS,
};
use packman_ghost_core::director::{DirectorOptions, GhostDirector};
use packman_ghost_core::events::GameEvent;
use packman_ghost_core::maze::{parse_tile_maze, Edible, MazeGraph, PlayerView, TileMaze, DEMO_LAYOUT};
use packman_ghost_core::rng::Rng;
use packman_ghost_core::types::{AgentId, Coord, GameVariant, GhostMode, NodeId, RoundStart};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

const COLLISION_DISTANCE: f32 = 0.6;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    variant: Option<String>,
    #[arg(long)]
    ghosts: Option<usize>,
    #[arg(long)]
    seconds: Option<u64>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    variant: GameVariant,
    ghosts: usize,
    seconds: u64,
    seed: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum EndReason {
    Timeout,
    GameOver,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    variant: GameVariant,
    ghosts: usize,
    seconds: u64,
    reason: EndReason,
    duration_ms: u64,
    score: i32,
    rounds_won: i32,
    lives_lost: i32,
    pellets_eaten: i32,
    power_pellets_eaten: i32,
    ghosts_captured: i32,
    decisions: usize,
    mode_changes: usize,
    reshuffles: usize,
    panics: usize,
    final_team: Vec<String>,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary {
    match_id: String,
    generated_at_iso: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenario_count: usize,
    anomaly_count: usize,
    average_score: i32,
    reason_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

// Random walk that only turns back at dead ends.
#[derive(Clone, Debug)]
struct Walker {
    node: NodeId,
    came_from: Option<NodeId>,
    target: Option<NodeId>,
    position: Coord,
    heading: Coord,
}

impl Walker {
    fn spawn(maze: &TileMaze) -> Self {
        Self {
            node: maze.player_spawn,
            came_from: None,
            target: None,
            position: maze.graph.position(maze.player_spawn),
            heading: Coord::ZERO,
        }
    }

    fn view(&self) -> PlayerView {
        PlayerView {
            position: self.position,
            heading: self.heading,
        }
    }

    fn advance(&mut self, maze: &TileMaze, rng: &mut Rng, dt_ms: u64) -> Option<NodeId> {
        let target = match self.target {
            Some(target) => target,
            None => {
                let open: Vec<NodeId> = maze
                    .graph
                    .neighbors(self.node)
                    .iter()
                    .copied()
                    .filter(|&node| node != maze.jail)
                    .collect();
                let forward: Vec<NodeId> = open
                    .iter()
                    .copied()
                    .filter(|&node| Some(node) != self.came_from)
                    .collect();
                let next = rng.pick(if forward.is_empty() { &open } else { &forward })?;
                self.target = Some(next);
                next
            }
        };
        let goal = maze.graph.position(target);
        self.heading = (goal - self.position).normalized().unwrap_or(self.heading);
        let (position, arrived) = move_toward(self.position, goal, travel(PLAYER_BASE_SPEED, dt_ms));
        self.position = position;
        if !arrived {
            return None;
        }
        self.came_from = Some(self.node);
        self.node = target;
        self.target = None;
        Some(target)
    }
}

fn main() {
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let run_started_at_ms = now_ms();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, run_started_at_ms));

    let Some(maze) = parse_tile_maze(&DEMO_LAYOUT) else {
        emit_log(
            "error",
            "maze_invalid",
            &match_id,
            None,
            None,
            None,
            json!({ "rows": DEMO_LAYOUT.len() }),
        );
        std::process::exit(2);
    };

    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "variant": scenario.variant,
                "ghosts": scenario.ghosts,
                "seconds": scenario.seconds,
            }),
        );
        let scenario_run = run_scenario(&scenario, &maze);

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({
                    "message": anomaly.message,
                }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        *reason_counts
            .entry(end_reason_key(scenario_run.result.reason))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.finished_tick),
            json!({
                "reason": scenario_run.result.reason,
                "durationMs": scenario_run.result.duration_ms,
                "score": scenario_run.result.score,
                "roundsWon": scenario_run.result.rounds_won,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&scenario_run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => emit_log(
                "error",
                "result_serialize_failed",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                None,
                json!({ "error": error.to_string() }),
            ),
        }
        scenario_results.push(scenario_run.result);
    }

    let run_finished_at_ms = now_ms();
    let summary = build_run_summary(
        match_id.clone(),
        run_started_at_ms,
        run_finished_at_ms,
        scenario_results,
        reason_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageScore": summary.average_score,
            "reasonCounts": summary.reason_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario, maze: &TileMaze) -> ScenarioRunResult {
    let home = maze.graph.position(maze.jail);
    let options = DirectorOptions {
        variant: scenario.variant,
        seed: scenario.seed,
        ..DirectorOptions::default()
    };
    let mut director = GhostDirector::new(options, scenario.ghosts, maze.jail, home);
    director.start_round(RoundStart::NewGame);
    let mut edibles = maze.edibles.clone();
    director.set_remaining(edibles.len());

    let mut player_rng = Rng::new(scenario.seed.wrapping_add(0x9e37_79b9));
    let mut player = Walker::spawn(maze);

    let mut score = 0;
    let mut lives = STARTING_LIVES;
    let mut rounds_won = 0;
    let mut lives_lost = 0;
    let mut pellets_eaten = 0;
    let mut power_pellets_eaten = 0;
    let mut ghosts_captured = 0;
    let mut decisions = 0usize;
    let mut mode_changes = 0usize;
    let mut round_mode_changes = 0usize;
    let mut reshuffles = 0usize;
    let mut panics = 0usize;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut reason = EndReason::Timeout;

    let total_ticks = scenario.seconds * 1_000 / TICK_MS;
    let mut tick = 0u64;
    while tick < total_ticks {
        tick += 1;

        if let Some(node) = player.advance(maze, &mut player_rng, TICK_MS) {
            let events = match edibles.remove(&node) {
                Some(Edible::Pellet) => {
                    pellets_eaten += 1;
                    score += PELLET_POINTS;
                    director.pellet_eaten(edibles.len())
                }
                Some(Edible::PowerPellet) => {
                    power_pellets_eaten += 1;
                    score += POWER_PELLET_POINTS;
                    director.power_pellet_eaten(POWER_DURATION_MS, edibles.len())
                }
                None => Vec::new(),
            };
            panics += count_panics(&events);
            if edibles.is_empty() {
                rounds_won += 1;
                reshuffles += director.start_round(RoundStart::Won).reshuffled.len();
                edibles = maze.edibles.clone();
                director.set_remaining(edibles.len());
                player = Walker::spawn(maze);
                round_mode_changes = 0;
                continue;
            }
        }

        let report = director.step(TICK_MS, &maze.graph, player.view());
        decisions += report.decisions.len();
        reshuffles += report.reshuffled.len();
        panics += count_panics(&report.events);
        for event in &report.events {
            if matches!(event, GameEvent::ModeChanged { .. }) {
                mode_changes += 1;
                round_mode_changes += 1;
            }
        }
        for decision in &report.decisions {
            if decision.to == maze.jail && director.mode(decision.agent) != Some(GhostMode::Eaten)
            {
                push_anomaly(
                    &mut anomalies,
                    &mut anomaly_records,
                    &mut anomaly_seen,
                    tick,
                    format!("ghost {} headed into the jail while hunting", decision.agent.0),
                );
            }
        }
        if round_mode_changes > MODE_TIMELINE.len() {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                tick,
                format!("timeline emitted {round_mode_changes} mode changes in one round"),
            );
        }

        move_ghosts(&mut director, maze, TICK_MS);

        let mut caught = false;
        for (agent, position, mode) in ghost_states(&director) {
            if position.distance(player.position) > COLLISION_DISTANCE {
                continue;
            }
            match mode {
                GhostMode::Frightened => {
                    if let Some(points) = director.ghost_captured(agent, GHOST_CAPTURE_POINTS) {
                        ghosts_captured += 1;
                        score += points;
                    }
                }
                GhostMode::Chase | GhostMode::Scatter => {
                    caught = true;
                    break;
                }
                GhostMode::Eaten => {}
            }
        }
        if caught {
            lives -= 1;
            lives_lost += 1;
            if lives <= 0 {
                reason = EndReason::GameOver;
                break;
            }
            director.start_round(RoundStart::Lost);
            director.set_remaining(edibles.len());
            player = Walker::spawn(maze);
            round_mode_changes = 0;
            continue;
        }

        for message in collect_tick_anomalies(&director, maze) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                tick,
                message,
            );
        }
    }

    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            variant: scenario.variant,
            ghosts: scenario.ghosts,
            seconds: scenario.seconds,
            reason,
            duration_ms: tick * TICK_MS,
            score,
            rounds_won,
            lives_lost,
            pellets_eaten,
            power_pellets_eaten,
            ghosts_captured,
            decisions,
            mode_changes,
            reshuffles,
            panics,
            final_team: director
                .ghosts()
                .iter()
                .map(|ghost| ghost.name().to_string())
                .collect(),
            anomalies,
        },
        anomaly_records,
        finished_tick: tick,
    }
}

fn ghost_states(director: &GhostDirector) -> Vec<(AgentId, Coord, GhostMode)> {
    director
        .ghosts()
        .iter()
        .map(|ghost| (ghost.id(), ghost.position(), ghost.mode()))
        .collect()
}

fn move_ghosts(director: &mut GhostDirector, maze: &TileMaze, dt_ms: u64) {
    let moving: Vec<(AgentId, Coord, NodeId, GhostMode)> = director
        .ghosts()
        .iter()
        .filter_map(|ghost| {
            ghost
                .target_node()
                .filter(|_| !ghost.is_awaiting_decision())
                .map(|target| (ghost.id(), ghost.position(), target, ghost.mode()))
        })
        .collect();
    for (agent, position, target, mode) in moving {
        let speed = if mode == GhostMode::Eaten {
            GHOST_BASE_SPEED * GHOST_EATEN_SPEED_MULTIPLIER
        } else {
            GHOST_BASE_SPEED
        };
        let goal = maze.graph.position(target);
        let (next, arrived) = move_toward(position, goal, travel(speed, dt_ms));
        if arrived {
            director.agent_arrived(agent, target, next);
        } else {
            director.set_agent_position(agent, next);
        }
    }
}

fn travel(speed: f32, dt_ms: u64) -> f32 {
    speed * dt_ms as f32 / 1000.0
}

fn move_toward(position: Coord, goal: Coord, distance: f32) -> (Coord, bool) {
    let delta = goal - position;
    let length = delta.length();
    if length <= distance {
        return (goal, true);
    }
    (position + delta * (distance / length), false)
}

fn count_panics(events: &[GameEvent]) -> usize {
    events
        .iter()
        .filter(|event| **event == GameEvent::PanicTriggered)
        .count()
}

fn collect_tick_anomalies(director: &GhostDirector, maze: &TileMaze) -> Vec<String> {
    let mut anomalies = Vec::new();
    let pellet_active = director.scheduler().pellet().active;

    for ghost in director.ghosts() {
        if ghost.mode() == GhostMode::Frightened && !pellet_active {
            anomalies.push(format!(
                "ghost {} frightened without an active pellet",
                ghost.id().0
            ));
        }
        if ghost.behavior().owner() != Some(ghost.id()) {
            anomalies.push(format!("ghost {} holds a foreign behavior", ghost.id().0));
        }
        if ghost.mode() == GhostMode::Eaten
            && ghost.current_node() == maze.jail
            && ghost.is_awaiting_decision()
        {
            anomalies.push(format!("ghost {} stayed eaten inside the jail", ghost.id().0));
        }
    }

    let pool = director.pool();
    if pool.is_locked() {
        for &archetype in pool.archetypes() {
            if pool.in_use(archetype) > 1 {
                anomalies.push(format!(
                    "locked pool issued {} {} times",
                    archetype.name(),
                    pool.in_use(archetype)
                ));
            }
        }
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = normalize_seed(cli.seed.unwrap_or_else(|| rand::random::<u32>() as u64));

    if cli.single || cli.variant.is_some() || cli.ghosts.is_some() || cli.seconds.is_some() {
        let variant = cli
            .variant
            .as_deref()
            .and_then(GameVariant::parse)
            .unwrap_or(GameVariant::Classic);
        let ghosts = cli.ghosts.unwrap_or(4).clamp(1, 16);
        return vec![Scenario {
            name: format!("custom-{}-{}", variant_key(variant), ghosts),
            variant,
            ghosts,
            seconds: cli.seconds.unwrap_or(180).clamp(10, 1_800),
            seed,
        }];
    }

    vec![
        Scenario {
            name: "classic-4".to_string(),
            variant: GameVariant::Classic,
            ghosts: 4,
            seconds: 120,
            seed,
        },
        Scenario {
            name: "extended-5".to_string(),
            variant: GameVariant::Extended,
            ghosts: 5,
            seconds: 180,
            seed: normalize_seed(seed as u64 + 1),
        },
        Scenario {
            name: "chaos-6".to_string(),
            variant: GameVariant::Chaos,
            ghosts: 6,
            seconds: 180,
            seed: normalize_seed(seed as u64 + 2),
        },
    ]
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn variant_key(variant: GameVariant) -> &'static str {
    match variant {
        GameVariant::Classic => "classic",
        GameVariant::Extended => "extended",
        GameVariant::Chaos => "chaos",
    }
}

fn end_reason_key(reason: EndReason) -> String {
    match reason {
        EndReason::Timeout => "timeout",
        EndReason::GameOver => "game_over",
    }
    .to_string()
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: u64) -> String {
    format!("ghosts-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    reason_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let total_score: i32 = scenarios.iter().map(|scenario| scenario.score).sum();
    let average_score = if scenario_count == 0 {
        0
    } else {
        total_score / scenario_count as i32
    };
    RunSummary {
        match_id,
        generated_at_iso: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        started_at_ms,
        finished_at_ms,
        scenario_count,
        anomaly_count,
        average_score,
        reason_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    match serde_json::to_string(&log_line) {
        Ok(line) => eprintln!("{line}"),
        Err(error) => eprintln!("[simulate] log serialize failed: {error}"),
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
