use std::collections::BTreeMap;

use crate::types::{Coord, NodeId};

pub trait MazeGraph {
    fn neighbors(&self, node: NodeId) -> &[NodeId];
    fn position(&self, node: NodeId) -> Coord;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerView {
    pub position: Coord,
    // Unit vector, zero while standing still.
    pub heading: Coord,
}

#[derive(Clone, Debug, Default)]
pub struct NavGraph {
    positions: Vec<Coord>,
    adjacency: Vec<Vec<NodeId>>,
}

impl NavGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, position: Coord) -> NodeId {
        self.positions.push(position);
        self.adjacency.push(Vec::new());
        NodeId(self.positions.len() - 1)
    }

    pub fn connect(&mut self, a: NodeId, b: NodeId) {
        if a == b || a.0 >= self.adjacency.len() || b.0 >= self.adjacency.len() {
            return;
        }
        if !self.adjacency[a.0].contains(&b) {
            self.adjacency[a.0].push(b);
        }
        if !self.adjacency[b.0].contains(&a) {
            self.adjacency[b.0].push(a);
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn nearest_node(&self, position: Coord) -> Option<NodeId> {
        self.positions
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.distance(position)
                    .partial_cmp(&b.distance(position))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(idx, _)| NodeId(idx))
    }
}

impl MazeGraph for NavGraph {
    fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.adjacency
            .get(node.0)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    fn position(&self, node: NodeId) -> Coord {
        self.positions.get(node.0).copied().unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edible {
    Pellet,
    PowerPellet,
}

#[derive(Clone, Debug)]
pub struct TileMaze {
    pub graph: NavGraph,
    pub jail: NodeId,
    pub player_spawn: NodeId,
    pub edibles: BTreeMap<NodeId, Edible>,
}

// `#` wall, `.` pellet, `o` power pellet, `G` jail, `P` player spawn.
// Tile (col, row) lands at (col - width/2, height/2 - row).
pub const DEMO_LAYOUT: [&str; 27] = [
    "#######################",
    "#o...................o#",
    "#.###.###.###.###.###.#",
    "#.###.###.###.###.###.#",
    "#.....................#",
    "#.###.###.###.###.###.#",
    "#.###.###.###.###.###.#",
    "#.....................#",
    "#.###.###.###.###.###.#",
    "#.###.###.###.###.###.#",
    "#.....................#",
    "#.###.###.###.###.###.#",
    "#.###.###.###.###.###.#",
    "#.......... ..........#",
    "#.###.###.#G#.###.###.#",
    "#.###.###.###.###.###.#",
    "#.....................#",
    "#.###.###.###.###.###.#",
    "#.###.###.###.###.###.#",
    "#..........P..........#",
    "#.###.###.###.###.###.#",
    "#.###.###.###.###.###.#",
    "#.....................#",
    "#.###.###.###.###.###.#",
    "#.###.###.###.###.###.#",
    "#o...................o#",
    "#######################",
];

fn is_open(tile: u8) -> bool {
    tile != b'#'
}

pub fn parse_tile_maze(rows: &[&str]) -> Option<TileMaze> {
    let height = rows.len() as i32;
    let width = rows.iter().map(|row| row.len()).max().unwrap_or(0) as i32;
    let mut graph = NavGraph::new();
    let mut by_cell: BTreeMap<(i32, i32), NodeId> = BTreeMap::new();
    let mut edibles = BTreeMap::new();
    let mut jail = None;
    let mut player_spawn = None;

    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, tile) in row.bytes().enumerate() {
            if !is_open(tile) {
                continue;
            }
            let (x, y) = (col_idx as i32, row_idx as i32);
            let node = graph.add_node(Coord::new(
                (x - width / 2) as f32,
                (height / 2 - y) as f32,
            ));
            by_cell.insert((x, y), node);
            match tile {
                b'.' => {
                    edibles.insert(node, Edible::Pellet);
                }
                b'o' => {
                    edibles.insert(node, Edible::PowerPellet);
                }
                b'G' => jail = Some(node),
                b'P' => player_spawn = Some(node),
                _ => {}
            }
        }
    }

    for (&(x, y), &node) in &by_cell {
        for neighbor in [(x + 1, y), (x, y + 1)] {
            if let Some(&other) = by_cell.get(&neighbor) {
                graph.connect(node, other);
            }
        }
    }

    Some(TileMaze {
        graph,
        jail: jail?,
        player_spawn: player_spawn?,
        edibles,
    })
}
