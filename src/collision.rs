/// Static wall colliders for one level.
///
/// Every WALL tile becomes one tile-sized box, shifted down by the HUD band.
/// Queries only look at the tiles a box actually covers, which gives the same
/// answers as scanning every wall.

use crate::config::{HUD_HEIGHT, TILE_SIZE};
use crate::dungeon::{Tile, TileGrid};
use crate::geometry::Rect;

#[derive(Clone, Debug)]
pub struct CollisionWorld {
    width: i32,
    height: i32,
    solid: Vec<bool>,
    walls: Vec<Rect>,
}

impl CollisionWorld {
    pub fn from_grid(grid: &TileGrid) -> Self {
        let (width, height) = (grid.width(), grid.height());
        let mut solid = vec![false; (width * height) as usize];
        let mut walls = Vec::new();
        for (x, y, tile) in grid.cells() {
            if tile == Tile::Wall {
                solid[(y * width + x) as usize] = true;
                walls.push(wall_rect(x, y));
            }
        }
        CollisionWorld {
            width,
            height,
            solid,
            walls,
        }
    }

    /// Wall boxes in pixel space.
    pub fn walls(&self) -> &[Rect] {
        &self.walls
    }

    fn is_solid(&self, tx: i32, ty: i32) -> bool {
        if tx < 0 || ty < 0 || tx >= self.width || ty >= self.height {
            return false;
        }
        self.solid[(ty * self.width + tx) as usize]
    }

    /// Does `rect` overlap any wall?
    pub fn solid_collision(&self, rect: &Rect) -> bool {
        if rect.w <= 0 || rect.h <= 0 {
            return false;
        }
        let tx0 = rect.left().div_euclid(TILE_SIZE);
        let tx1 = (rect.right() - 1).div_euclid(TILE_SIZE);
        let ty0 = (rect.top() - HUD_HEIGHT).div_euclid(TILE_SIZE);
        let ty1 = (rect.bottom() - 1 - HUD_HEIGHT).div_euclid(TILE_SIZE);
        (tx0..=tx1).any(|tx| (ty0..=ty1).any(|ty| self.is_solid(tx, ty)))
    }
}

pub fn wall_rect(tx: i32, ty: i32) -> Rect {
    Rect::new(tx * TILE_SIZE, ty * TILE_SIZE + HUD_HEIGHT, TILE_SIZE, TILE_SIZE)
}

/// First item in `items` whose box overlaps `rect`.
pub fn any_collision<'a, T, I, F>(rect: &Rect, items: I, box_of: F) -> Option<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Rect,
    T: 'a,
{
    items.into_iter().find(|item| rect.intersects(&box_of(*item)))
}
