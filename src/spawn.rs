/// Spawn-point derivation from the room list.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::config::{EnemyConfig, HUD_HEIGHT, TILE_SIZE};
use crate::entities::{EntityId, EntityKind, Enemy, COIN_SIZE, DOOR_SIZE};
use crate::geometry::{Rect, Room};
use crate::registry::EntityRegistry;

/// Pixel center of a tile.
pub fn tile_center(tx: i32, ty: i32) -> (i32, i32) {
    (
        tx * TILE_SIZE + TILE_SIZE / 2,
        ty * TILE_SIZE + TILE_SIZE / 2 + HUD_HEIGHT,
    )
}

/// Uniform tile inside `room`, keeping off its outer ring.
pub fn random_interior_tile(room: &Room, rng: &mut impl Rng) -> (i32, i32) {
    let (x_lo, x_hi) = room.interior_x();
    let (y_lo, y_hi) = room.interior_y();
    (rng.gen_range(x_lo..=x_hi), rng.gen_range(y_lo..=y_hi))
}

/// Spawn `count` enemies in random rooms.
///
/// Only the final iteration can yield a boss, and only when the room it drew
/// happens to be the last room.  Rooms are compared by index, so a one-room
/// level still qualifies.
pub fn spawn_enemies(
    registry: &mut EntityRegistry,
    count: usize,
    rooms: &[Room],
    now: u64,
    cfg: &EnemyConfig,
    rng: &mut impl Rng,
) -> Vec<EntityId> {
    let mut spawned = Vec::with_capacity(count);
    if rooms.is_empty() {
        return spawned;
    }
    let last = rooms.len() - 1;
    let indices: Vec<usize> = (0..rooms.len()).collect();
    for i in 0..count {
        let room_index = match indices.choose(rng) {
            Some(&r) => r,
            None => break,
        };
        let (tx, ty) = random_interior_tile(&rooms[room_index], rng);
        let is_boss = i == count - 1 && room_index == last;
        let (rect, enemy) = Enemy::new(tile_center(tx, ty), is_boss, now, cfg);
        if is_boss {
            debug!(tx, ty, "boss spawned");
        }
        spawned.push(registry.spawn(rect, EntityKind::Enemy(enemy)));
    }
    spawned
}

/// One to three coins in every room except the first and the last.
pub fn spawn_coins(registry: &mut EntityRegistry, rooms: &[Room], rng: &mut impl Rng) -> usize {
    let mut spawned = 0;
    let inner = rooms.len().saturating_sub(1);
    for room in rooms.iter().take(inner).skip(1) {
        for _ in 0..rng.gen_range(1..=3) {
            let (tx, ty) = random_interior_tile(room, rng);
            spawn_coin(registry, tile_center(tx, ty));
            spawned += 1;
        }
    }
    spawned
}

pub fn spawn_coin(registry: &mut EntityRegistry, center: (i32, i32)) -> EntityId {
    let rect = Rect::from_center(center.0, center.1, COIN_SIZE, COIN_SIZE);
    registry.spawn(rect, EntityKind::Coin)
}

/// Door sits on the exit room's center tile.
pub fn spawn_door(registry: &mut EntityRegistry, exit: &Room) -> EntityId {
    let (cx, cy) = exit.center();
    let rect = Rect::new(cx * TILE_SIZE, cy * TILE_SIZE + HUD_HEIGHT, DOOR_SIZE, DOOR_SIZE);
    registry.spawn(rect, EntityKind::Door)
}
