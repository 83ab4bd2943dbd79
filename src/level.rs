/// Per-level state: the generated dungeon, its colliders, the player and the
/// entity registry.  Built fresh for every level and handed to each
/// simulation phase by `&mut`.

use rand::Rng;
use tracing::info;

use crate::collision::CollisionWorld;
use crate::config::GameConfig;
use crate::dungeon::{self, Dungeon};
use crate::entities::{EntityId, EntityKind, EntityTag, Player, PlayerUpgrades};
use crate::geometry::Rect;
use crate::registry::EntityRegistry;
use crate::spawn::{spawn_coins, spawn_door, spawn_enemies, tile_center};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelStatus {
    Running,
    Complete,
    Dead,
}

/// What the renderer needs to know about a drawable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    Player,
    Enemy,
    Boss,
    Bullet,
    Coin,
    Door,
}

#[derive(Clone, Debug)]
pub struct LevelState {
    pub level: u32,
    pub dungeon: Dungeon,
    pub walls: CollisionWorld,
    pub player: Player,
    pub registry: EntityRegistry,
    pub door: EntityId,
    pub status: LevelStatus,
    pub config: GameConfig,
    pub frame: u64,
}

impl LevelState {
    /// Generate a dungeon and populate it.
    pub fn generate(
        level: u32,
        upgrades: &PlayerUpgrades,
        config: &GameConfig,
        now: u64,
        rng: &mut impl Rng,
    ) -> Self {
        let dungeon = dungeon::generate(&config.dungeon, rng);
        Self::populate(level, dungeon, upgrades, config, now, rng)
    }

    /// Place player, door, enemies and coins into an existing dungeon.
    pub fn populate(
        level: u32,
        dungeon: Dungeon,
        upgrades: &PlayerUpgrades,
        config: &GameConfig,
        now: u64,
        rng: &mut impl Rng,
    ) -> Self {
        let walls = CollisionWorld::from_grid(&dungeon.grid);
        let (sx, sy) = dungeon.spawn_room().center();
        let player = Player::new(tile_center(sx, sy), upgrades, &config.player);

        let mut registry = EntityRegistry::new();
        let door = spawn_door(&mut registry, dungeon.exit_room());
        let enemies = spawn_enemies(
            &mut registry,
            enemy_count(level),
            &dungeon.rooms,
            now,
            &config.enemy,
            rng,
        );
        let coins = spawn_coins(&mut registry, &dungeon.rooms, rng);
        let boss = enemies.iter().any(|id| {
            registry
                .get(*id)
                .and_then(|e| e.as_enemy())
                .map_or(false, |e| e.is_boss)
        });
        info!(
            level,
            rooms = dungeon.rooms.len(),
            enemies = enemies.len(),
            coins,
            boss,
            "level populated"
        );

        LevelState {
            level,
            dungeon,
            walls,
            player,
            registry,
            door,
            status: LevelStatus::Running,
            config: config.clone(),
            frame: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == LevelStatus::Running
    }

    pub fn door_rect(&self) -> Option<Rect> {
        self.registry.get(self.door).map(|e| e.rect)
    }

    pub fn enemies_left(&self) -> usize {
        self.registry.count(EntityTag::Enemy)
    }

    pub fn boss_alive(&self) -> bool {
        self.registry
            .iter_tag(EntityTag::Enemy)
            .any(|e| e.as_enemy().map_or(false, |en| en.is_boss))
    }

    /// Drawables in paint order: door, enemies, coins, bullets, player.
    pub fn snapshot(&self) -> Vec<(SpriteKind, Rect)> {
        let mut out = Vec::with_capacity(self.registry.len() + 1);
        for tag in [EntityTag::Door, EntityTag::Enemy, EntityTag::Coin, EntityTag::Bullet] {
            for e in self.registry.iter_tag(tag) {
                let kind = match &e.kind {
                    EntityKind::Door => SpriteKind::Door,
                    EntityKind::Enemy(en) if en.is_boss => SpriteKind::Boss,
                    EntityKind::Enemy(_) => SpriteKind::Enemy,
                    EntityKind::Coin => SpriteKind::Coin,
                    EntityKind::Bullet(_) => SpriteKind::Bullet,
                };
                out.push((kind, e.rect));
            }
        }
        out.push((SpriteKind::Player, self.player.rect));
        out
    }
}

/// Enemies per level.
pub fn enemy_count(level: u32) -> usize {
    level as usize + 2
}
