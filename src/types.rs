use std::ops::{Add, Mul, Sub};

use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Coord {
    pub x: f32,
    pub y: f32,
}

impl Coord {
    pub const ZERO: Coord = Coord::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Coord) -> f32 {
        (self - other).length()
    }

    pub fn normalized(self) -> Option<Coord> {
        let len = self.length();
        if len <= f32::EPSILON {
            return None;
        }
        Some(Coord::new(self.x / len, self.y / len))
    }

    pub fn dot(self, other: Coord) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn cos_angle_to(self, other: Coord) -> Option<f32> {
        let a = self.normalized()?;
        let b = other.normalized()?;
        Some(a.dot(b).clamp(-1.0, 1.0))
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Coord {
    type Output = Coord;

    fn mul(self, rhs: f32) -> Coord {
        Coord::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AgentId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Chase,
    Scatter,
    Frightened,
    Eaten,
}

impl GhostMode {
    pub fn is_timeline_mode(self) -> bool {
        matches!(self, GhostMode::Chase | GhostMode::Scatter)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_hex(self) -> String {
        let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Blinky,
    Pinky,
    Inky,
    Clyde,
    Sue,
    Funky,
    Spunky,
}

impl Archetype {
    pub const ALL: [Archetype; 7] = [
        Archetype::Blinky,
        Archetype::Pinky,
        Archetype::Inky,
        Archetype::Clyde,
        Archetype::Sue,
        Archetype::Funky,
        Archetype::Spunky,
    ];

    pub const CLASSIC: [Archetype; 4] = [
        Archetype::Blinky,
        Archetype::Pinky,
        Archetype::Inky,
        Archetype::Clyde,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Archetype::Blinky => "Blinky",
            Archetype::Pinky => "Pinky",
            Archetype::Inky => "Inky",
            Archetype::Clyde => "Clyde",
            Archetype::Sue => "Sue",
            Archetype::Funky => "Funky",
            Archetype::Spunky => "Spunky",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Archetype::Blinky => Color::rgb(1.0, 0.0, 0.0),
            Archetype::Pinky => Color::rgb(1.0, 184.0 / 255.0, 1.0),
            Archetype::Inky => Color::rgb(71.0 / 255.0, 185.0 / 255.0, 1.0),
            Archetype::Clyde => Color::rgb(1.0, 185.0 / 255.0, 81.0 / 255.0),
            Archetype::Sue => Color::rgb(0.6, 0.25, 0.85),
            Archetype::Funky => Color::rgb(0.2, 0.8, 0.35),
            Archetype::Spunky => Color::rgb(0.75, 0.75, 0.75),
        }
    }

    pub fn scatter_corner(self) -> Coord {
        match self {
            Archetype::Blinky => Coord::new(10.0, 10.5),
            Archetype::Pinky => Coord::new(-10.0, 10.5),
            Archetype::Inky => Coord::new(11.5, -14.0),
            Archetype::Clyde => Coord::new(-11.5, -14.0),
            Archetype::Sue => Coord::new(0.0, 12.5),
            Archetype::Funky => Coord::new(12.5, 0.0),
            Archetype::Spunky => Coord::new(-12.5, 0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameVariant {
    Classic,
    Extended,
    Chaos,
}

impl GameVariant {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "classic" => Some(Self::Classic),
            "extended" => Some(Self::Extended),
            "chaos" => Some(Self::Chaos),
            _ => None,
        }
    }

    pub fn archetypes(self) -> &'static [Archetype] {
        match self {
            GameVariant::Classic => &Archetype::CLASSIC,
            GameVariant::Extended | GameVariant::Chaos => &Archetype::ALL,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStart {
    NewGame,
    Won,
    Lost,
}
