/// Game-logic phases for one frame.
///
/// Every phase takes the `LevelState` by `&mut` and runs to completion; the
/// clock (`now`, milliseconds) and the RNG are injected by the caller so
/// tests can pin both.  `tick` runs the phases in their fixed order.

use glam::Vec2;
use rand::Rng;
use tracing::{debug, trace};

use crate::collision::CollisionWorld;
use crate::config::{EnemyConfig, HUD_HEIGHT, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::entities::{
    Bullet, Enemy, Entity, EntityId, EntityKind, EntityTag, Player, ShootDirection, BULLET_SIZE,
};
use crate::geometry::Rect;
use crate::level::{LevelState, LevelStatus};
use crate::registry::EntityRegistry;
use crate::spawn::spawn_coin;

/// Per-axis factor applied when moving diagonally.
pub const DIAGONAL_FACTOR: f32 = 0.7071;

// ── Input ────────────────────────────────────────────────────────────────────

/// Movement keys currently held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Everything the input source reports for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputFrame {
    pub movement: MoveKeys,
    /// Shoot key-downs in arrival order.
    pub shots: Vec<ShootDirection>,
}

/// Requested displacement for this frame.  Right wins over left and down
/// over up when both are held.
pub fn movement_delta(keys: MoveKeys, speed: i32) -> (f32, f32) {
    let speed = speed as f32;
    let mut dx = 0.0;
    let mut dy = 0.0;
    if keys.left {
        dx = -speed;
    }
    if keys.right {
        dx = speed;
    }
    if keys.up {
        dy = -speed;
    }
    if keys.down {
        dy = speed;
    }
    if dx != 0.0 && dy != 0.0 {
        dx *= DIAGONAL_FACTOR;
        dy *= DIAGONAL_FACTOR;
    }
    (dx, dy)
}

// ── Player ───────────────────────────────────────────────────────────────────

/// Move one axis at a time, undoing any axis that ends inside a wall.
pub fn move_player(player: &mut Player, walls: &CollisionWorld, dx: f32, dy: f32) {
    let step_x = dx as i32;
    if step_x != 0 {
        player.rect.translate(step_x, 0);
        if walls.solid_collision(&player.rect) {
            player.rect.translate(-step_x, 0);
        }
    }
    let step_y = dy as i32;
    if step_y != 0 {
        player.rect.translate(0, step_y);
        if walls.solid_collision(&player.rect) {
            player.rect.translate(0, -step_y);
        }
    }
}

/// Keep the player inside the playfield (below the HUD band).
pub fn clamp_player(player: &mut Player) {
    let r = &mut player.rect;
    if r.left() < 0 {
        r.x = 0;
    }
    if r.right() > SCREEN_WIDTH {
        r.x = SCREEN_WIDTH - r.w;
    }
    if r.top() < HUD_HEIGHT {
        r.y = HUD_HEIGHT;
    }
    if r.bottom() > SCREEN_HEIGHT {
        r.y = SCREEN_HEIGHT - r.h;
    }
}

/// Pick up every coin under the player.  Returns how many were taken.
pub fn collect_coins(state: &mut LevelState) -> u32 {
    let taken = state
        .registry
        .all_overlapping(&state.player.rect, EntityTag::Coin);
    for id in &taken {
        state.registry.kill(*id);
    }
    state.player.coins += taken.len() as u32;
    taken.len() as u32
}

/// Primary direction followed by `±step×i` pairs for `i in 1..=level`.
pub fn spread_directions(direction: Vec2, level: u32, step_deg: f32) -> Vec<Vec2> {
    let mut dirs = Vec::with_capacity(1 + 2 * level as usize);
    dirs.push(direction);
    for i in 1..=level {
        let angle = (step_deg * i as f32).to_radians();
        dirs.push(Vec2::from_angle(angle).rotate(direction));
        dirs.push(Vec2::from_angle(-angle).rotate(direction));
    }
    dirs
}

/// Fire along `direction` if the shot delay has elapsed.  A zero direction
/// is ignored.  Returns the number of bullets spawned.
pub fn player_shoot(state: &mut LevelState, direction: Vec2, now: u64) -> usize {
    if direction.length_squared() == 0.0 {
        return 0;
    }
    let player = &mut state.player;
    if let Some(last) = player.last_shot {
        if now.saturating_sub(last) < player.shot_delay {
            return 0;
        }
    }
    player.last_shot = Some(now);

    let (cx, cy) = player.rect.center();
    let homing = player.has_homing;
    let dirs = spread_directions(
        direction,
        player.multishot_level,
        state.config.bullet.multishot_step_deg,
    );
    for dir in &dirs {
        let bullet = Bullet {
            velocity: *dir * state.config.bullet.speed,
            homing,
            target: None,
        };
        state.registry.spawn(
            Rect::from_center(cx, cy, BULLET_SIZE, BULLET_SIZE),
            EntityKind::Bullet(bullet),
        );
    }
    trace!(count = dirs.len(), homing, "player fired");
    dirs.len()
}

// ── Bullets ──────────────────────────────────────────────────────────────────

/// Closest live enemy by squared center distance; the earliest spawned
/// wins a tie.
pub fn nearest_enemy(registry: &EntityRegistry, from: Vec2) -> Option<EntityId> {
    let mut best: Option<(EntityId, f32)> = None;
    for e in registry.iter_tag(EntityTag::Enemy) {
        let d = e.rect.center_vec().distance_squared(from);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((e.id, d));
        }
    }
    best.map(|(id, _)| id)
}

/// Fully outside the playfield.
fn off_screen(rect: &Rect) -> bool {
    rect.right() < 0 || rect.left() > SCREEN_WIDTH || rect.bottom() < HUD_HEIGHT || rect.top() > SCREEN_HEIGHT
}

/// Kill an enemy and leave a coin where it stood.
fn kill_enemy(registry: &mut EntityRegistry, id: EntityId) {
    if let Some(center) = registry.get(id).map(|e| e.rect.center()) {
        registry.kill(id);
        spawn_coin(registry, center);
    }
}

/// Take one hit off an enemy.  Returns `true` if it died.
pub fn damage_enemy(state: &mut LevelState, id: EntityId) -> bool {
    let dead = match state.registry.get_mut(id).and_then(Entity::as_enemy_mut) {
        Some(enemy) => {
            enemy.health -= 1;
            enemy.health <= 0
        }
        None => return false,
    };
    if dead {
        kill_enemy(&mut state.registry, id);
        state.player.coins += 1;
        debug!(?id, "enemy destroyed by bullet");
    }
    dead
}

pub fn update_bullets(state: &mut LevelState) {
    let speed = state.config.bullet.speed;
    for id in state.registry.ids(EntityTag::Bullet) {
        let (mut rect, mut bullet) = match state.registry.get(id) {
            Some(Entity {
                rect,
                kind: EntityKind::Bullet(b),
                ..
            }) => (*rect, b.clone()),
            _ => continue,
        };

        if bullet.homing {
            let here = rect.center_vec();
            if !bullet.target.map_or(false, |t| state.registry.is_alive(t)) {
                bullet.target = nearest_enemy(&state.registry, here);
            }
            if let Some(target) = bullet.target.and_then(|t| state.registry.get(t)) {
                let to_target = target.rect.center_vec() - here;
                if to_target.length_squared() != 0.0 {
                    bullet.velocity = to_target.normalize() * speed;
                }
            }
        }

        rect.translate(bullet.velocity.x as i32, bullet.velocity.y as i32);
        if let Some(e) = state.registry.get_mut(id) {
            e.rect = rect;
            if let Some(b) = e.as_bullet_mut() {
                *b = bullet;
            }
        }

        if off_screen(&rect) || state.walls.solid_collision(&rect) {
            state.registry.kill(id);
            continue;
        }
        if let Some(enemy_id) = state.registry.first_overlapping(&rect, EntityTag::Enemy) {
            damage_enemy(state, enemy_id);
            state.registry.kill(id);
        }
    }
}

// ── Enemies ──────────────────────────────────────────────────────────────────

/// Random unit vector with both components drawn from `[-1, 1]`.
pub fn random_direction(rng: &mut impl Rng) -> Vec2 {
    loop {
        let v = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
        if v.length_squared() > 1e-6 {
            return v.normalize();
        }
    }
}

/// Advance one enemy's AI.  Does not touch the player.
pub fn step_enemy(
    rect: &mut Rect,
    enemy: &mut Enemy,
    walls: &CollisionWorld,
    player_center: (i32, i32),
    cfg: &EnemyConfig,
    rng: &mut impl Rng,
) {
    let current = rect.center_vec();
    if current.distance(enemy.last_position) < 1.0 {
        enemy.stuck_timer += 1;
        if enemy.stuck_timer > cfg.stuck_threshold {
            enemy.stuck_direction = Some(random_direction(rng));
        }
    } else {
        enemy.stuck_timer = 0;
        enemy.stuck_direction = None;
    }
    enemy.last_position = current;

    let speed = enemy.speed as f32;
    if let Some(dir) = enemy.stuck_direction {
        let (sx, sy) = ((dir.x * speed) as i32, (dir.y * speed) as i32);
        rect.translate(sx, sy);
        if walls.solid_collision(rect) {
            rect.translate(-sx, -sy);
            enemy.stuck_direction = Some(random_direction(rng));
        }
    } else {
        let (cx, cy) = rect.center();
        let dx = (player_center.0 - cx) as f32;
        let dy = (player_center.1 - cy) as f32;
        let distance = (dx * dx + dy * dy).sqrt().max(1.0);
        let (sx, sy) = ((dx / distance * speed) as i32, (dy / distance * speed) as i32);
        rect.translate(sx, sy);
        if walls.solid_collision(rect) {
            rect.translate(-sx, -sy);
            enemy.stuck_timer = cfg.blocked_stuck_timer;
        }
    }
}

pub fn update_enemies(state: &mut LevelState, now: u64, rng: &mut impl Rng) {
    let cfg = state.config.enemy.clone();
    for id in state.registry.ids(EntityTag::Enemy) {
        let player_center = state.player.rect.center();
        let contact = {
            let Some(entity) = state.registry.get_mut(id) else {
                continue;
            };
            let Entity { rect, kind, .. } = entity;
            let EntityKind::Enemy(enemy) = kind else {
                continue;
            };
            if now < enemy.activation_deadline {
                continue;
            }
            step_enemy(rect, enemy, &state.walls, player_center, &cfg, rng);
            rect.intersects(&state.player.rect).then_some(enemy.is_boss)
        };

        if let Some(is_boss) = contact {
            let damage = if is_boss {
                cfg.boss_contact_damage
            } else {
                cfg.contact_damage
            };
            state.player.health = (state.player.health - damage).max(0);
            if !is_boss {
                kill_enemy(&mut state.registry, id);
            }
            debug!(?id, is_boss, health = state.player.health, "player hit");
        }
    }
}

// ── Completion ───────────────────────────────────────────────────────────────

pub fn reached_door(state: &LevelState) -> bool {
    state
        .door_rect()
        .map_or(false, |door| door.intersects(&state.player.rect))
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the level by one frame.  A level that is no longer running is
/// left untouched.
pub fn tick(state: &mut LevelState, input: &InputFrame, now: u64, rng: &mut impl Rng) -> LevelStatus {
    if !state.is_running() {
        return state.status;
    }
    state.frame += 1;

    // ── 1–2. Player movement ─────────────────────────────────────────────────
    let (dx, dy) = movement_delta(input.movement, state.player.speed);
    move_player(&mut state.player, &state.walls, dx, dy);
    clamp_player(&mut state.player);

    // ── 3. Pickups ───────────────────────────────────────────────────────────
    collect_coins(state);

    // ── 4. Shooting ──────────────────────────────────────────────────────────
    for dir in &input.shots {
        player_shoot(state, dir.vector(), now);
    }

    // ── 5. Bullets ───────────────────────────────────────────────────────────
    update_bullets(state);

    // ── 6. Enemies ───────────────────────────────────────────────────────────
    update_enemies(state, now, rng);

    // ── 7–8. Completion & terminal checks ────────────────────────────────────
    let at_door = reached_door(state);
    state.registry.prune();

    state.status = if state.player.is_dead() {
        LevelStatus::Dead
    } else if at_door {
        LevelStatus::Complete
    } else {
        LevelStatus::Running
    };
    trace!(
        frame = state.frame,
        entities = state.registry.len(),
        health = state.player.health,
        "tick"
    );
    state.status
}
