/// All game entity types: plain data plus constructors.  Behaviour lives in
/// `compute`.

use glam::Vec2;

use crate::config::{EnemyConfig, PlayerConfig, TILE_SIZE};
use crate::geometry::Rect;

// ── Footprints ───────────────────────────────────────────────────────────────

pub const PLAYER_SIZE: i32 = TILE_SIZE / 2;
pub const ENEMY_SIZE: i32 = TILE_SIZE / 2;
pub const BOSS_SIZE: i32 = TILE_SIZE;
pub const COIN_SIZE: i32 = TILE_SIZE / 2;
pub const BULLET_SIZE: i32 = 8;
pub const DOOR_SIZE: i32 = TILE_SIZE;

// ── Identity ─────────────────────────────────────────────────────────────────

/// Registry handle.  Ids are never reused within a level, so a stale id
/// simply fails to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityTag {
    Enemy,
    Bullet,
    Coin,
    Door,
}

// ── Meta-progression ─────────────────────────────────────────────────────────

/// Shop upgrades bought during the current run.  Applied to every new
/// `Player`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerUpgrades {
    pub multishot_level: u32,
    pub has_homing: bool,
    pub health_level: i32,
}

// ── Player ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub rect: Rect,
    pub speed: i32,
    pub base_health: i32,
    pub health_bonus: i32,
    pub max_health: i32,
    /// Half-heart units.
    pub health: i32,
    pub multishot_level: u32,
    pub has_homing: bool,
    pub coins: u32,
    /// Timestamp (ms) of the last accepted shot.
    pub last_shot: Option<u64>,
    pub shot_delay: u64,
}

impl Player {
    pub fn new(center: (i32, i32), upgrades: &PlayerUpgrades, cfg: &PlayerConfig) -> Self {
        let max_health = cfg.base_health + upgrades.health_level;
        Player {
            rect: Rect::from_center(center.0, center.1, PLAYER_SIZE, PLAYER_SIZE),
            speed: cfg.speed,
            base_health: cfg.base_health,
            health_bonus: upgrades.health_level,
            max_health,
            health: max_health,
            multishot_level: upgrades.multishot_level,
            has_homing: upgrades.has_homing,
            coins: 0,
            last_shot: None,
            shot_delay: cfg.shot_delay_ms,
        }
    }

    /// One more half heart of capacity, and heal one half heart.
    pub fn add_health(&mut self) {
        self.health_bonus += 1;
        self.max_health = self.base_health + self.health_bonus;
        self.health = (self.health + 1).min(self.max_health);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

// ── Enemy ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub is_boss: bool,
    pub health: i32,
    pub speed: i32,
    pub stuck_timer: u32,
    /// Unit vector while random-walking out of a jam.
    pub stuck_direction: Option<Vec2>,
    pub last_position: Vec2,
    /// Enemy is inert until the clock reaches this (ms).
    pub activation_deadline: u64,
}

impl Enemy {
    pub fn new(center: (i32, i32), is_boss: bool, now: u64, cfg: &EnemyConfig) -> (Rect, Self) {
        let size = if is_boss { BOSS_SIZE } else { ENEMY_SIZE };
        let enemy = Enemy {
            is_boss,
            health: if is_boss { cfg.boss_health } else { cfg.health },
            speed: cfg.speed,
            stuck_timer: 0,
            stuck_direction: None,
            last_position: Vec2::new(center.0 as f32, center.1 as f32),
            activation_deadline: now + cfg.activation_delay_ms,
        };
        (Rect::from_center(center.0, center.1, size, size), enemy)
    }
}

// ── Projectiles ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub velocity: Vec2,
    pub homing: bool,
    /// Resolved through the registry each frame; dead or missing means
    /// "pick a new one".
    pub target: Option<EntityId>,
}

// ── Tagged entity ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    Enemy(Enemy),
    Bullet(Bullet),
    Coin,
    Door,
}

impl EntityKind {
    pub fn tag(&self) -> EntityTag {
        match self {
            EntityKind::Enemy(_) => EntityTag::Enemy,
            EntityKind::Bullet(_) => EntityTag::Bullet,
            EntityKind::Coin => EntityTag::Coin,
            EntityKind::Door => EntityTag::Door,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub rect: Rect,
    pub alive: bool,
    pub kind: EntityKind,
}

impl Entity {
    pub fn tag(&self) -> EntityTag {
        self.kind.tag()
    }

    pub fn as_enemy(&self) -> Option<&Enemy> {
        match &self.kind {
            EntityKind::Enemy(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_enemy_mut(&mut self) -> Option<&mut Enemy> {
        match &mut self.kind {
            EntityKind::Enemy(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_bullet_mut(&mut self) -> Option<&mut Bullet> {
        match &mut self.kind {
            EntityKind::Bullet(b) => Some(b),
            _ => None,
        }
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShootDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ShootDirection {
    pub fn vector(self) -> Vec2 {
        match self {
            ShootDirection::Up => Vec2::new(0.0, -1.0),
            ShootDirection::Down => Vec2::new(0.0, 1.0),
            ShootDirection::Left => Vec2::new(-1.0, 0.0),
            ShootDirection::Right => Vec2::new(1.0, 0.0),
        }
    }
}
