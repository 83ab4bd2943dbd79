/// Procedural level generation: rooms carved out of solid rock and chained
/// together with L-shaped corridors.

use rand::Rng;
use tracing::{debug, warn};

use crate::config::{DungeonConfig, MAP_HEIGHT, MAP_WIDTH};
use crate::geometry::Room;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Floor,
}

// ── Tile grid ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Grid of the given size filled with walls.
    pub fn solid(width: i32, height: i32) -> Self {
        TileGrid {
            width,
            height,
            tiles: vec![Tile::Wall; (width.max(0) * height.max(0)) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    /// `None` outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<Tile> {
        self.index(x, y).map(|i| self.tiles[i])
    }

    pub fn is_floor(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == Some(Tile::Floor)
    }

    /// Writes outside the grid are dropped.
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i] = tile;
        }
    }

    /// All cells in column-major order, the order colliders are built in.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, Tile)> + '_ {
        (0..self.width)
            .flat_map(move |x| (0..self.height).map(move |y| (x, y)))
            .map(move |(x, y)| (x, y, self.tiles[(y * self.width + x) as usize]))
    }

    pub fn floor_count(&self) -> usize {
        self.tiles.iter().filter(|t| **t == Tile::Floor).count()
    }

    pub fn carve_room(&mut self, room: &Room) {
        for x in room.x1..room.x2 {
            for y in room.y1..room.y2 {
                self.set(x, y, Tile::Floor);
            }
        }
    }

    /// Floor across the inclusive column range `x1..=x2` (either order),
    /// `width` rows thick starting at row `y`.
    pub fn carve_h_corridor(&mut self, x1: i32, x2: i32, y: i32, width: i32) {
        for x in x1.min(x2)..=x1.max(x2) {
            for dy in 0..width {
                self.set(x, y + dy, Tile::Floor);
            }
        }
    }

    /// Floor across the inclusive row range `y1..=y2` (either order),
    /// `width` columns thick starting at column `x`.
    pub fn carve_v_corridor(&mut self, y1: i32, y2: i32, x: i32, width: i32) {
        for y in y1.min(y2)..=y1.max(y2) {
            for dx in 0..width {
                self.set(x + dx, y, Tile::Floor);
            }
        }
    }
}

// ── Generated level ──────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Dungeon {
    pub grid: TileGrid,
    /// In acceptance order.  Never empty.
    pub rooms: Vec<Room>,
}

impl Dungeon {
    pub fn spawn_room(&self) -> &Room {
        &self.rooms[0]
    }

    pub fn exit_room(&self) -> &Room {
        &self.rooms[self.rooms.len() - 1]
    }
}

/// Join two room centers with an L-shaped corridor.  `horizontal_first`
/// picks which leg starts at `from`.
pub fn connect_rooms(grid: &mut TileGrid, from: &Room, to: &Room, horizontal_first: bool, width: i32) {
    let (fx, fy) = from.center();
    let (tx, ty) = to.center();
    if horizontal_first {
        grid.carve_h_corridor(fx, tx, fy, width);
        grid.carve_v_corridor(fy, ty, tx, width);
    } else {
        grid.carve_v_corridor(fy, ty, fx, width);
        grid.carve_h_corridor(fx, tx, ty, width);
    }
}

/// Build a fresh `MAP_WIDTH x MAP_HEIGHT` level.
///
/// Makes `room_count` placement attempts.  A candidate overlapping an
/// already accepted room is dropped, so a level may end up with fewer rooms,
/// but the first attempt always succeeds.
pub fn generate(cfg: &DungeonConfig, rng: &mut impl Rng) -> Dungeon {
    let mut grid = TileGrid::solid(MAP_WIDTH, MAP_HEIGHT);
    let mut rooms: Vec<Room> = Vec::with_capacity(cfg.room_count);

    for attempt in 0..cfg.room_count.max(1) {
        let w = rng.gen_range(cfg.room_min..=cfg.room_max);
        let h = rng.gen_range(cfg.room_min..=cfg.room_max);
        let x = rng.gen_range(1..=(MAP_WIDTH - w - 1).max(1));
        let y = rng.gen_range(1..=(MAP_HEIGHT - h - 1).max(1));
        let candidate = Room::new(x, y, w, h);

        if rooms.iter().any(|r| r.intersects(&candidate)) {
            debug!(attempt, ?candidate, "room rejected: overlaps an accepted room");
            continue;
        }

        grid.carve_room(&candidate);
        if let Some(prev) = rooms.last() {
            let horizontal_first = rng.gen_bool(0.5);
            connect_rooms(&mut grid, prev, &candidate, horizontal_first, cfg.corridor_width);
        }
        rooms.push(candidate);
    }

    if rooms.len() < cfg.room_count {
        warn!(
            placed = rooms.len(),
            attempts = cfg.room_count,
            "dungeon generated with fewer rooms than attempted"
        );
    }
    debug!(rooms = rooms.len(), floor = grid.floor_count(), "dungeon generated");

    Dungeon { grid, rooms }
}
