use dungeon_crawler::collision::CollisionWorld;
use dungeon_crawler::compute::*;
use dungeon_crawler::config::{EnemyConfig, GameConfig, HUD_HEIGHT, MAP_HEIGHT, MAP_WIDTH, TILE_SIZE};
use dungeon_crawler::dungeon::{Dungeon, Tile, TileGrid};
use dungeon_crawler::entities::*;
use dungeon_crawler::geometry::{Rect, Room};
use dungeon_crawler::level::{LevelState, LevelStatus, SpriteKind};
use dungeon_crawler::spawn::tile_center;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// One big open room; player at pixel (400, 344); door in the top-left
/// corner at tile (2, 2); no enemies, coins or bullets.
fn arena() -> LevelState {
    let mut grid = TileGrid::solid(MAP_WIDTH, MAP_HEIGHT);
    let room = Room::new(1, 1, MAP_WIDTH - 2, MAP_HEIGHT - 2);
    grid.carve_room(&room);
    let dungeon = Dungeon {
        grid,
        rooms: vec![room],
    };
    let mut state = LevelState::populate(
        1,
        dungeon,
        &PlayerUpgrades::default(),
        &GameConfig::default(),
        0,
        &mut seeded_rng(),
    );
    state.registry.clear();
    state.door = state.registry.spawn(
        Rect::new(2 * TILE_SIZE, 2 * TILE_SIZE + HUD_HEIGHT, DOOR_SIZE, DOOR_SIZE),
        EntityKind::Door,
    );
    state
}

fn spawn_enemy(state: &mut LevelState, center: (i32, i32), is_boss: bool) -> EntityId {
    let (rect, enemy) = Enemy::new(center, is_boss, 0, &state.config.enemy);
    state.registry.spawn(rect, EntityKind::Enemy(enemy))
}

fn spawn_bullet(state: &mut LevelState, center: (i32, i32), velocity: Vec2, homing: bool) -> EntityId {
    state.registry.spawn(
        Rect::from_center(center.0, center.1, BULLET_SIZE, BULLET_SIZE),
        EntityKind::Bullet(Bullet {
            velocity,
            homing,
            target: None,
        }),
    )
}

fn enemy(state: &LevelState, id: EntityId) -> Option<&Enemy> {
    state.registry.get(id).and_then(|e| e.as_enemy())
}

fn bullet(state: &LevelState, id: EntityId) -> Option<&Bullet> {
    match state.registry.get(id).map(|e| &e.kind) {
        Some(EntityKind::Bullet(b)) => Some(b),
        _ => None,
    }
}

fn held(up: bool, down: bool, left: bool, right: bool) -> MoveKeys {
    MoveKeys { up, down, left, right }
}

/// Well after every enemy's activation deadline.
const ACTIVE: u64 = 10_000;

// ── arena sanity ──────────────────────────────────────────────────────────────

#[test]
fn arena_player_starts_in_room_center() {
    let s = arena();
    assert_eq!(s.player.rect.center(), (400, 344));
    assert_eq!(s.player.health, 6);
    assert!(s.is_running());
}

// ── movement ──────────────────────────────────────────────────────────────────

#[test]
fn movement_delta_axial() {
    assert_eq!(movement_delta(held(false, false, true, false), 4), (-4.0, 0.0));
    assert_eq!(movement_delta(held(false, true, false, false), 4), (0.0, 4.0));
    assert_eq!(movement_delta(MoveKeys::default(), 4), (0.0, 0.0));
}

#[test]
fn movement_delta_opposite_keys_prefer_right_and_down() {
    let (dx, dy) = movement_delta(held(true, true, true, true), 4);
    assert!(dx > 0.0 && dy > 0.0);
    assert_eq!(movement_delta(held(true, true, false, false), 4), (0.0, 4.0));
}

#[test]
fn diagonal_is_not_faster_than_axial() {
    let mut s = arena();
    let start = s.player.rect;
    let input = InputFrame {
        movement: held(false, true, false, true),
        shots: Vec::new(),
    };
    tick(&mut s, &input, 0, &mut seeded_rng());
    let dx = (s.player.rect.x - start.x) as f32;
    let dy = (s.player.rect.y - start.y) as f32;
    assert!(dx > 0.0 && dy > 0.0);
    let diagonal = (dx * dx + dy * dy).sqrt();
    assert!(diagonal <= 4.0 + 1e-3, "diagonal step {} exceeds axial 4", diagonal);
}

#[test]
fn axial_step_equals_speed() {
    let mut s = arena();
    let start = s.player.rect;
    move_player(&mut s.player, &s.walls, 4.0, 0.0);
    assert_eq!(s.player.rect.x, start.x + 4);
    assert_eq!(s.player.rect.y, start.y);
}

#[test]
fn wall_blocks_x_but_y_slides() {
    let mut s = arena();
    // Flush against the left wall (tile column 0 covers pixels 0..32).
    s.player.rect = Rect::new(TILE_SIZE, 300, PLAYER_SIZE, PLAYER_SIZE);
    move_player(&mut s.player, &s.walls, -4.0, 4.0);
    assert_eq!(s.player.rect.x, TILE_SIZE);
    assert_eq!(s.player.rect.y, 304);
}

#[test]
fn wall_blocks_y_but_x_slides() {
    let mut s = arena();
    // Flush against the top wall row (row 0 covers pixels 40..72).
    s.player.rect = Rect::new(300, TILE_SIZE + HUD_HEIGHT, PLAYER_SIZE, PLAYER_SIZE);
    move_player(&mut s.player, &s.walls, 4.0, -4.0);
    assert_eq!(s.player.rect.x, 304);
    assert_eq!(s.player.rect.y, TILE_SIZE + HUD_HEIGHT);
}

#[test]
fn clamp_keeps_player_below_hud() {
    let mut s = arena();
    s.player.rect = Rect::new(-5, 10, PLAYER_SIZE, PLAYER_SIZE);
    clamp_player(&mut s.player);
    assert_eq!(s.player.rect.x, 0);
    assert_eq!(s.player.rect.y, HUD_HEIGHT);

    s.player.rect = Rect::new(900, 900, PLAYER_SIZE, PLAYER_SIZE);
    clamp_player(&mut s.player);
    assert_eq!(s.player.rect.right(), MAP_WIDTH * TILE_SIZE);
    assert_eq!(s.player.rect.bottom(), MAP_HEIGHT * TILE_SIZE + HUD_HEIGHT);
}

// ── pickups ───────────────────────────────────────────────────────────────────

#[test]
fn overlapping_coins_are_all_collected() {
    let mut s = arena();
    let (cx, cy) = s.player.rect.center();
    for dx in [-4, 0, 4] {
        s.registry.spawn(
            Rect::from_center(cx + dx, cy, COIN_SIZE, COIN_SIZE),
            EntityKind::Coin,
        );
    }
    s.registry
        .spawn(Rect::from_center(100, 100, COIN_SIZE, COIN_SIZE), EntityKind::Coin);

    assert_eq!(collect_coins(&mut s), 3);
    assert_eq!(s.player.coins, 3);
    assert_eq!(s.registry.count(EntityTag::Coin), 1);
}

// ── shooting ──────────────────────────────────────────────────────────────────

#[test]
fn zero_direction_is_ignored() {
    let mut s = arena();
    assert_eq!(player_shoot(&mut s, Vec2::ZERO, 1000), 0);
    assert_eq!(s.registry.count(EntityTag::Bullet), 0);
    assert_eq!(s.player.last_shot, None);
}

#[test]
fn shot_delay_rate_limits() {
    let mut s = arena();
    assert_eq!(player_shoot(&mut s, Vec2::X, 1000), 1);
    assert_eq!(player_shoot(&mut s, Vec2::X, 1299), 0);
    assert_eq!(player_shoot(&mut s, Vec2::X, 1300), 1);
    assert_eq!(s.registry.count(EntityTag::Bullet), 2);
}

#[test]
fn several_shoot_commands_in_one_frame_fire_once() {
    let mut s = arena();
    let input = InputFrame {
        movement: MoveKeys::default(),
        shots: vec![ShootDirection::Up, ShootDirection::Left],
    };
    tick(&mut s, &input, 1000, &mut seeded_rng());
    assert_eq!(s.registry.count(EntityTag::Bullet), 1);
}

#[test]
fn bullet_starts_at_player_center_with_speed_ten() {
    let mut s = arena();
    player_shoot(&mut s, ShootDirection::Up.vector(), 0);
    let b = s.registry.iter_tag(EntityTag::Bullet).next().expect("bullet");
    assert_eq!(b.rect.center(), s.player.rect.center());
    match &b.kind {
        EntityKind::Bullet(bullet) => assert_eq!(bullet.velocity, Vec2::new(0.0, -10.0)),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn multishot_fires_one_plus_two_n() {
    for level in 0..4 {
        let mut s = arena();
        s.player.multishot_level = level;
        let fired = player_shoot(&mut s, Vec2::X, 0);
        assert_eq!(fired, 1 + 2 * level as usize);
        assert_eq!(s.registry.count(EntityTag::Bullet), fired);
    }
}

#[test]
fn multishot_pairs_fan_out_in_ten_degree_steps() {
    let dirs = spread_directions(Vec2::X, 3, 10.0);
    let mut angles: Vec<i32> = dirs
        .iter()
        .map(|d| d.y.atan2(d.x).to_degrees().round() as i32)
        .collect();
    assert_eq!(angles[0], 0);
    angles.sort();
    assert_eq!(angles, vec![-30, -20, -10, 0, 10, 20, 30]);
    for d in &dirs {
        assert!((d.length() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn homing_flag_is_copied_to_every_bullet() {
    let mut s = arena();
    s.player.has_homing = true;
    s.player.multishot_level = 1;
    player_shoot(&mut s, Vec2::Y, 0);
    let all_homing = s.registry.iter_tag(EntityTag::Bullet).all(|e| match &e.kind {
        EntityKind::Bullet(b) => b.homing,
        _ => false,
    });
    assert!(all_homing);
}

// ── bullets ───────────────────────────────────────────────────────────────────

#[test]
fn bullet_moves_by_truncated_velocity() {
    let mut s = arena();
    let id = spawn_bullet(&mut s, (300, 200), Vec2::new(7.9, -2.5), false);
    update_bullets(&mut s);
    let r = s.registry.get(id).expect("bullet alive").rect;
    assert_eq!(r.center(), (307, 198));
}

#[test]
fn bullet_leaving_viewport_is_removed_same_frame() {
    let mut s = arena();
    let left = spawn_bullet(&mut s, (2, 300), Vec2::new(-10.0, 0.0), false);
    let up = spawn_bullet(&mut s, (300, HUD_HEIGHT + 2), Vec2::new(0.0, -10.0), false);
    update_bullets(&mut s);
    assert!(!s.registry.is_alive(left));
    assert!(!s.registry.is_alive(up));
}

#[test]
fn bullet_hitting_wall_does_not_damage_enemy_behind_it() {
    let mut s = arena();
    // Enemy overlapping the left wall column; bullet flies into both.
    let e = spawn_enemy(&mut s, (30, 300), false);
    let b = spawn_bullet(&mut s, (40, 300), Vec2::new(-10.0, 0.0), false);
    update_bullets(&mut s);
    assert!(!s.registry.is_alive(b));
    assert_eq!(enemy(&s, e).map(|en| en.health), Some(1));
    assert_eq!(s.player.coins, 0);
}

#[test]
fn killing_enemy_drops_exactly_one_coin() {
    let mut s = arena();
    let e = spawn_enemy(&mut s, (312, 344), false);
    // Two bullets land in the same frame: the second one finds nothing.
    let b1 = spawn_bullet(&mut s, (300, 344), Vec2::new(10.0, 0.0), false);
    let b2 = spawn_bullet(&mut s, (300, 346), Vec2::new(10.0, 0.0), false);
    update_bullets(&mut s);

    assert!(!s.registry.is_alive(e));
    assert!(!s.registry.is_alive(b1));
    assert!(s.registry.is_alive(b2));
    assert_eq!(s.registry.count(EntityTag::Enemy), 0);
    let coins: Vec<_> = s.registry.iter_tag(EntityTag::Coin).collect();
    assert_eq!(coins.len(), 1);
    assert_eq!(coins[0].rect.center(), (312, 344));
    assert_eq!(s.player.coins, 1);
}

#[test]
fn bullet_is_destroyed_even_when_enemy_survives() {
    let mut s = arena();
    let boss = spawn_enemy(&mut s, (312, 344), true);
    let b = spawn_bullet(&mut s, (290, 344), Vec2::new(10.0, 0.0), false);
    update_bullets(&mut s);
    assert!(!s.registry.is_alive(b));
    assert_eq!(enemy(&s, boss).map(|en| en.health), Some(9));
    assert_eq!(s.registry.count(EntityTag::Coin), 0);
}

#[test]
fn boss_dies_on_exactly_the_tenth_hit() {
    let mut s = arena();
    let boss = spawn_enemy(&mut s, (312, 344), true);
    for hit in 1..=10 {
        spawn_bullet(&mut s, (290, 344), Vec2::new(10.0, 0.0), false);
        update_bullets(&mut s);
        s.registry.prune();
        if hit < 10 {
            assert_eq!(enemy(&s, boss).map(|en| en.health), Some(10 - hit));
        }
    }
    assert!(!s.registry.is_alive(boss));
    assert_eq!(s.registry.count(EntityTag::Coin), 1);
    assert_eq!(s.player.coins, 1);
}

#[test]
fn nearest_enemy_uses_squared_distance_and_first_wins_ties() {
    let mut s = arena();
    assert_eq!(nearest_enemy(&s.registry, Vec2::new(300.0, 300.0)), None);
    let a = spawn_enemy(&mut s, (200, 300), false);
    let _b = spawn_enemy(&mut s, (400, 300), false);
    let c = spawn_enemy(&mut s, (300, 250), false);
    assert_eq!(nearest_enemy(&s.registry, Vec2::new(300.0, 300.0)), Some(c));
    s.registry.kill(c);
    // a and b are equidistant; a was spawned first.
    assert_eq!(nearest_enemy(&s.registry, Vec2::new(300.0, 300.0)), Some(a));
}

#[test]
fn homing_bullet_steers_toward_nearest_enemy() {
    let mut s = arena();
    let target = spawn_enemy(&mut s, (300, 150), false);
    let b = spawn_bullet(&mut s, (300, 300), Vec2::new(10.0, 0.0), true);
    update_bullets(&mut s);
    let bullet = bullet(&s, b).expect("bullet alive");
    assert_eq!(bullet.target, Some(target));
    assert!((bullet.velocity - Vec2::new(0.0, -10.0)).length() < 1e-4);
    assert_eq!(s.registry.get(b).map(|e| e.rect.center()), Some((300, 290)));
}

#[test]
fn homing_bullet_reacquires_after_target_dies() {
    let mut s = arena();
    let first = spawn_enemy(&mut s, (300, 150), false);
    let second = spawn_enemy(&mut s, (500, 300), false);
    let b = spawn_bullet(&mut s, (300, 300), Vec2::new(10.0, 0.0), true);
    update_bullets(&mut s);
    assert_eq!(bullet(&s, b).and_then(|x| x.target), Some(first));

    s.registry.kill(first);
    s.registry.prune();
    update_bullets(&mut s);
    let bullet = bullet(&s, b).expect("bullet alive");
    assert_eq!(bullet.target, Some(second));
    assert!(bullet.velocity.x > 9.0);
}

#[test]
fn homing_bullet_without_enemies_keeps_flying() {
    let mut s = arena();
    let b = spawn_bullet(&mut s, (300, 300), Vec2::new(0.0, 10.0), true);
    update_bullets(&mut s);
    let bullet = bullet(&s, b).expect("bullet alive");
    assert_eq!(bullet.target, None);
    assert_eq!(bullet.velocity, Vec2::new(0.0, 10.0));
}

// ── enemies ───────────────────────────────────────────────────────────────────

#[test]
fn enemy_is_inert_before_activation() {
    let mut s = arena();
    let center = s.player.rect.center();
    let e = spawn_enemy(&mut s, center, false);
    update_enemies(&mut s, 499, &mut seeded_rng());
    assert!(s.registry.is_alive(e));
    assert_eq!(s.player.health, 6);
}

#[test]
fn enemy_pursues_player() {
    let mut s = arena();
    let e = spawn_enemy(&mut s, (200, 344), false);
    update_enemies(&mut s, ACTIVE, &mut seeded_rng());
    assert_eq!(s.registry.get(e).map(|x| x.rect.center()), Some((202, 344)));
    assert_eq!(enemy(&s, e).map(|en| en.stuck_timer), Some(1));
}

#[test]
fn moving_enemy_resets_stuck_state() {
    let mut s = arena();
    let e = spawn_enemy(&mut s, (200, 344), false);
    let mut rng = seeded_rng();
    update_enemies(&mut s, ACTIVE, &mut rng);
    update_enemies(&mut s, ACTIVE, &mut rng);
    let en = enemy(&s, e).expect("alive");
    assert_eq!(en.stuck_timer, 0);
    assert_eq!(en.stuck_direction, None);
}

#[test]
fn blocked_pursuit_forces_random_walk_next_frame() {
    let s = arena();
    let cfg = s.config.enemy.clone();
    let (mut rect, mut en) = Enemy::new((40, 344), false, 0, &cfg);
    let mut rng = seeded_rng();

    // Player is on the far side of the left wall.
    step_enemy(&mut rect, &mut en, &s.walls, (10, 344), &cfg, &mut rng);
    assert_eq!(rect.center(), (40, 344));
    assert_eq!(en.stuck_timer, cfg.blocked_stuck_timer);
    assert_eq!(en.stuck_direction, None);

    step_enemy(&mut rect, &mut en, &s.walls, (10, 344), &cfg, &mut rng);
    let dir = en.stuck_direction.expect("random walk engaged");
    assert!((dir.length() - 1.0).abs() < 1e-5);
    assert!(!s.walls.solid_collision(&rect));
}

#[test]
fn random_walk_into_walls_reverts_and_picks_new_direction() {
    // A boss exactly filling a one-tile pocket can never move.
    let mut grid = TileGrid::solid(MAP_WIDTH, MAP_HEIGHT);
    grid.set(5, 5, Tile::Floor);
    let walls = CollisionWorld::from_grid(&grid);
    let cfg = EnemyConfig::default();
    let start = tile_center(5, 5);
    let (mut rect, mut en) = Enemy::new(start, true, 0, &cfg);
    let home = rect;
    let mut rng = seeded_rng();

    // Blocked pursuit primes the random walk.
    step_enemy(&mut rect, &mut en, &walls, (600, 400), &cfg, &mut rng);
    assert_eq!(rect, home);
    assert_eq!(en.stuck_timer, cfg.blocked_stuck_timer);

    let mut previous = en.stuck_direction;
    for _ in 0..20 {
        step_enemy(&mut rect, &mut en, &walls, (600, 400), &cfg, &mut rng);
        assert_eq!(rect, home);
        let dir = en.stuck_direction.expect("random walk engaged");
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert_ne!(Some(dir), previous);
        previous = Some(dir);
    }
}

#[test]
fn enemy_becomes_stuck_after_threshold() {
    let s = arena();
    let cfg = s.config.enemy.clone();
    let (mut rect, mut en) = Enemy::new((300, 300), false, 0, &cfg);
    let mut rng = seeded_rng();
    // Player on top of the enemy: pursuit never moves it.
    for frame in 1..=cfg.stuck_threshold {
        step_enemy(&mut rect, &mut en, &s.walls, (300, 300), &cfg, &mut rng);
        assert_eq!(en.stuck_timer, frame);
        assert_eq!(en.stuck_direction, None);
    }
    step_enemy(&mut rect, &mut en, &s.walls, (300, 300), &cfg, &mut rng);
    assert!(en.stuck_direction.is_some());
}

#[test]
fn random_direction_is_unit_length() {
    let mut rng = seeded_rng();
    for _ in 0..100 {
        assert!((random_direction(&mut rng).length() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn normal_enemy_contact_hurts_once_and_drops_coin() {
    let mut s = arena();
    let center = s.player.rect.center();
    let e = spawn_enemy(&mut s, center, false);
    update_enemies(&mut s, ACTIVE, &mut seeded_rng());
    assert_eq!(s.player.health, 5);
    assert!(!s.registry.is_alive(e));
    assert_eq!(s.registry.count(EntityTag::Coin), 1);
    // Contact kills do not pay out directly.
    assert_eq!(s.player.coins, 0);
}

#[test]
fn boss_contact_hurts_every_frame() {
    let mut s = arena();
    let center = s.player.rect.center();
    let boss = spawn_enemy(&mut s, center, true);
    let mut rng = seeded_rng();
    update_enemies(&mut s, ACTIVE, &mut rng);
    assert_eq!(s.player.health, 4);
    update_enemies(&mut s, ACTIVE, &mut rng);
    assert_eq!(s.player.health, 2);
    assert!(s.registry.is_alive(boss));
    assert_eq!(s.registry.count(EntityTag::Coin), 0);
}

// ── tick ──────────────────────────────────────────────────────────────────────

#[test]
fn tick_increments_frame_and_prunes() {
    let mut s = arena();
    spawn_bullet(&mut s, (2, 300), Vec2::new(-10.0, 0.0), false);
    tick(&mut s, &InputFrame::default(), 0, &mut seeded_rng());
    assert_eq!(s.frame, 1);
    assert_eq!(s.registry.len(), 1); // only the door remains
}

#[test]
fn last_half_heart_lost_ends_level_as_dead() {
    let mut s = arena();
    s.player.health = 1;
    let center = s.player.rect.center();
    spawn_enemy(&mut s, center, false);

    // Still inactive: nothing happens.
    let status = tick(&mut s, &InputFrame::default(), 100, &mut seeded_rng());
    assert_eq!(status, LevelStatus::Running);
    assert_eq!(s.player.health, 1);

    let status = tick(&mut s, &InputFrame::default(), ACTIVE, &mut seeded_rng());
    assert_eq!(s.player.health, 0);
    assert_eq!(status, LevelStatus::Dead);
}

#[test]
fn reaching_the_door_completes_the_level() {
    let mut s = arena();
    let door = s.door_rect().expect("door");
    s.player.rect = Rect::new(door.x + 8, door.y + 8, PLAYER_SIZE, PLAYER_SIZE);
    let status = tick(&mut s, &InputFrame::default(), 0, &mut seeded_rng());
    assert_eq!(status, LevelStatus::Complete);
}

#[test]
fn death_wins_over_door_in_the_same_frame() {
    let mut s = arena();
    let door = s.door_rect().expect("door");
    s.player.rect = Rect::new(door.x + 8, door.y + 8, PLAYER_SIZE, PLAYER_SIZE);
    s.player.health = 1;
    let center = s.player.rect.center();
    spawn_enemy(&mut s, center, false);
    let status = tick(&mut s, &InputFrame::default(), ACTIVE, &mut seeded_rng());
    assert_eq!(status, LevelStatus::Dead);
}

#[test]
fn finished_level_ignores_further_ticks() {
    let mut s = arena();
    s.player.health = 0;
    assert_eq!(tick(&mut s, &InputFrame::default(), 0, &mut seeded_rng()), LevelStatus::Dead);
    let frame = s.frame;
    let input = InputFrame {
        movement: held(false, false, false, true),
        shots: vec![ShootDirection::Right],
    };
    assert_eq!(tick(&mut s, &input, 0, &mut seeded_rng()), LevelStatus::Dead);
    assert_eq!(s.frame, frame);
    assert_eq!(s.registry.count(EntityTag::Bullet), 0);
}

// ── snapshot ──────────────────────────────────────────────────────────────────

#[test]
fn snapshot_lists_drawables_in_paint_order() {
    let mut s = arena();
    spawn_bullet(&mut s, (300, 300), Vec2::X, false);
    s.registry
        .spawn(Rect::from_center(200, 200, COIN_SIZE, COIN_SIZE), EntityKind::Coin);
    spawn_enemy(&mut s, (500, 300), true);
    spawn_enemy(&mut s, (520, 300), false);

    let kinds: Vec<SpriteKind> = s.snapshot().into_iter().map(|(k, _)| k).collect();
    assert_eq!(
        kinds,
        vec![
            SpriteKind::Door,
            SpriteKind::Boss,
            SpriteKind::Enemy,
            SpriteKind::Coin,
            SpriteKind::Bullet,
            SpriteKind::Player,
        ]
    );
    assert_eq!(s.enemies_left(), 2);
    assert!(s.boss_alive());
}
