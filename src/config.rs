/// Tunables for a run.  `Default` reproduces the stock game; a RON file may
/// override any subset of fields.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ── Fixed layout ─────────────────────────────────────────────────────────────

pub const TILE_SIZE: i32 = 32;
pub const MAP_WIDTH: i32 = 25;
pub const MAP_HEIGHT: i32 = 18;
/// Band above the map reserved for the HUD.
pub const HUD_HEIGHT: i32 = 40;
pub const SCREEN_WIDTH: i32 = MAP_WIDTH * TILE_SIZE;
pub const SCREEN_HEIGHT: i32 = MAP_HEIGHT * TILE_SIZE + HUD_HEIGHT;
pub const FPS: u64 = 60;

// ── Sections ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    /// Placement attempts; rejected candidates are not retried.
    pub room_count: usize,
    pub room_min: i32,
    pub room_max: i32,
    pub corridor_width: i32,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        DungeonConfig {
            room_count: 5,
            room_min: 4,
            room_max: 8,
            corridor_width: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub speed: i32,
    /// Half-heart units.
    pub base_health: i32,
    pub shot_delay_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            speed: 4,
            base_health: 6,
            shot_delay_ms: 300,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub speed: i32,
    pub health: i32,
    pub boss_health: i32,
    pub contact_damage: i32,
    pub boss_contact_damage: i32,
    pub activation_delay_ms: u64,
    /// Frames without progress before the random walk kicks in.
    pub stuck_threshold: u32,
    /// Timer value forced when pursuit runs into a wall.
    pub blocked_stuck_timer: u32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        EnemyConfig {
            speed: 2,
            health: 1,
            boss_health: 10,
            contact_damage: 1,
            boss_contact_damage: 2,
            activation_delay_ms: 500,
            stuck_threshold: 5,
            blocked_stuck_timer: 30,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    pub speed: f32,
    pub multishot_step_deg: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        BulletConfig {
            speed: 10.0,
            multishot_step_deg: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopPrices {
    pub multishot_base: u32,
    pub multishot_step: u32,
    pub homing: u32,
    pub health: u32,
}

impl Default for ShopPrices {
    fn default() -> Self {
        ShopPrices {
            multishot_base: 5,
            multishot_step: 5,
            homing: 30,
            health: 10,
        }
    }
}

// ── Root ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub dungeon: DungeonConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub bullet: BulletConfig,
    pub shop: ShopPrices,
    pub frame_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            dungeon: DungeonConfig::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            bullet: BulletConfig::default(),
            shop: ShopPrices::default(),
            frame_ms: 1000 / FPS,
        }
    }
}

impl GameConfig {
    pub fn from_ron_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text, path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.dungeon;
        if d.room_count == 0 {
            return Err(ConfigError::Invalid("room_count must be at least 1".into()));
        }
        // Spawns keep off the room's outer ring, which needs three tiles.
        if d.room_min < 3 {
            return Err(ConfigError::Invalid(format!(
                "room_min {} leaves no interior, need at least 3",
                d.room_min
            )));
        }
        if d.room_min > d.room_max {
            return Err(ConfigError::Invalid(format!(
                "room size range {}..={} is empty",
                d.room_min, d.room_max
            )));
        }
        // Rooms keep a one-tile border on every side.
        if d.room_max > MAP_WIDTH - 2 || d.room_max > MAP_HEIGHT - 2 {
            return Err(ConfigError::Invalid(format!(
                "room_max {} does not fit a {}x{} map",
                d.room_max, MAP_WIDTH, MAP_HEIGHT
            )));
        }
        if d.corridor_width < 1 {
            return Err(ConfigError::Invalid("corridor_width must be at least 1".into()));
        }
        if self.player.base_health < 1 {
            return Err(ConfigError::Invalid("player.base_health must be positive".into()));
        }
        if self.enemy.health < 1 || self.enemy.boss_health < 1 {
            return Err(ConfigError::Invalid("enemy health must be positive".into()));
        }
        if !(self.bullet.speed > 0.0) {
            return Err(ConfigError::Invalid("bullet.speed must be positive".into()));
        }
        if self.frame_ms == 0 {
            return Err(ConfigError::Invalid("frame_ms must be positive".into()));
        }
        Ok(())
    }
}
