//! Terrain interface: tile grid, doors and pickups.
//!
//! The simulation consumes terrain through two queries: the tile kind at a
//! world position, and the solid rectangles near a body (static tiles in a
//! bounded neighborhood, plus closed doors and unopened chests). Level
//! authoring and persistence of layouts live outside the core.

use bincode::{Decode, Encode};
use duskhollow_physics::Aabb;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entities::Millis;

/// World-space size of one tile in pixels.
pub const TILE_SIZE: f32 = 50.0;

/// Tile neighborhood radius (in tiles) scanned for collision candidates.
const PROBE_RADIUS: i32 = 2;

/// Interactions must happen within this distance of the target.
const INTERACT_RANGE: f32 = 50.0;

/// Per-interactable cooldown so a held key does not spam toggles.
const INTERACT_COOLDOWN_MS: Millis = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum TileKind {
    Empty,
    Solid,
    /// Non-solid decoration/annotation tile.
    Marker,
}

/// A door: solid while closed, breakable, toggled by interaction.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Door {
    pub rect: Aabb,
    pub open: bool,
    pub broken: bool,
    pub hp: i32,
    last_interact: Option<Millis>,
}

impl Door {
    pub const MAX_HP: i32 = 30;

    pub fn new(rect: Aabb) -> Self {
        Self {
            rect,
            open: false,
            broken: false,
            hp: Self::MAX_HP,
            last_interact: None,
        }
    }

    /// A door blocks movement only while closed and unbroken.
    pub fn is_solid(&self) -> bool {
        !self.open && !self.broken
    }

    /// Returns true if this damage broke the door. A broken door stays
    /// open forever.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if self.broken {
            return false;
        }
        self.hp = (self.hp - amount).max(0);
        if self.hp == 0 {
            self.broken = true;
            self.open = true;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub enum PickupKind {
    /// Blocks movement until opened; yields a reward or an ambush.
    Chest,
    /// Walk-through; grants a permanent upgrade.
    Scroll,
}

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct Pickup {
    pub rect: Aabb,
    pub kind: PickupKind,
}

/// Result of an interact action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    /// Chest opened at this position (reward rolled by the caller).
    ChestOpened(Vec2),
    ScrollTaken,
    /// Door toggled; the payload is the new open state.
    DoorToggled(bool),
}

/// The level terrain: a tile grid plus doors and pickups.
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct TileMap {
    width: u32,
    height: u32,
    tiles: Vec<TileKind>,
    pub doors: Vec<Door>,
    pub pickups: Vec<Pickup>,
}

impl TileMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![TileKind::Empty; (width * height) as usize],
            doors: Vec::new(),
            pickups: Vec::new(),
        }
    }

    /// A map with a solid floor along the bottom row; the usual test layout.
    pub fn with_floor(width: u32, height: u32) -> Self {
        let mut map = Self::new(width, height);
        for x in 0..width {
            map.set_tile(x, height - 1, TileKind::Solid);
        }
        map
    }

    pub fn width_px(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    pub fn height_px(&self) -> f32 {
        self.height as f32 * TILE_SIZE
    }

    pub fn set_tile(&mut self, tile_x: u32, tile_y: u32, kind: TileKind) {
        if tile_x < self.width && tile_y < self.height {
            self.tiles[(tile_y * self.width + tile_x) as usize] = kind;
        }
    }

    /// Tile kind at a world position. Out-of-bounds reads as empty.
    pub fn tile_at(&self, world_x: f32, world_y: f32) -> TileKind {
        let tx = (world_x / TILE_SIZE).floor() as i64;
        let ty = (world_y / TILE_SIZE).floor() as i64;
        if tx < 0 || ty < 0 || tx >= self.width as i64 || ty >= self.height as i64 {
            return TileKind::Empty;
        }
        self.tiles[(ty as u32 * self.width + tx as u32) as usize]
    }

    /// Solid rectangles a body near `center` can collide with: solid tiles
    /// in a bounded neighborhood, closed doors and unopened chests.
    pub fn solid_rects_near(&self, center: Vec2) -> Vec<Aabb> {
        let gx = (center.x / TILE_SIZE).floor() as i32;
        let gy = (center.y / TILE_SIZE).floor() as i32;

        let mut rects = Vec::new();
        for dy in -PROBE_RADIUS..=PROBE_RADIUS {
            for dx in -PROBE_RADIUS..=PROBE_RADIUS {
                let (tx, ty) = (gx + dx, gy + dy);
                let world = Vec2::new(tx as f32 * TILE_SIZE, ty as f32 * TILE_SIZE);
                if self.tile_at(world.x, world.y) == TileKind::Solid {
                    rects.push(Aabb::new(world, Vec2::splat(TILE_SIZE)));
                }
            }
        }

        rects.extend(self.doors.iter().filter(|d| d.is_solid()).map(|d| d.rect));
        rects.extend(
            self.pickups
                .iter()
                .filter(|p| p.kind == PickupKind::Chest)
                .map(|p| p.rect),
        );
        rects
    }

    /// Try to interact at `pos`. Pickups take priority over doors.
    pub fn interact_at(&mut self, pos: Vec2, now: Millis) -> Option<Interaction> {
        if let Some(i) = self
            .pickups
            .iter()
            .position(|p| p.rect.center().distance(pos) <= INTERACT_RANGE)
        {
            let pickup = self.pickups.remove(i);
            return Some(match pickup.kind {
                PickupKind::Chest => Interaction::ChestOpened(pickup.rect.center()),
                PickupKind::Scroll => Interaction::ScrollTaken,
            });
        }

        for door in &mut self.doors {
            if door.broken || door.rect.center().distance(pos) > INTERACT_RANGE {
                continue;
            }
            if door
                .last_interact
                .is_some_and(|t| now.saturating_sub(t) < INTERACT_COOLDOWN_MS)
            {
                continue;
            }
            door.last_interact = Some(now);
            door.open = !door.open;
            return Some(Interaction::DoorToggled(door.open));
        }
        None
    }

    /// Apply damage to every unbroken door overlapping `rect` (a rolling
    /// player smashes doors). Returns how many doors broke.
    pub fn damage_doors_overlapping(&mut self, rect: &Aabb, amount: i32) -> u32 {
        let mut broken = 0;
        for door in &mut self.doors {
            if !door.broken && door.rect.overlaps(rect) && door.apply_damage(amount) {
                broken += 1;
            }
        }
        broken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_lookup_and_bounds() {
        let mut map = TileMap::new(10, 10);
        map.set_tile(3, 4, TileKind::Solid);

        assert_eq!(map.tile_at(3.5 * TILE_SIZE, 4.5 * TILE_SIZE), TileKind::Solid);
        assert_eq!(map.tile_at(0.0, 0.0), TileKind::Empty);
        assert_eq!(map.tile_at(-10.0, 0.0), TileKind::Empty);
        assert_eq!(map.tile_at(1e6, 1e6), TileKind::Empty);
    }

    #[test]
    fn neighborhood_is_bounded() {
        let mut map = TileMap::new(20, 20);
        // Solid tile right next to the probe center and one far away.
        map.set_tile(5, 5, TileKind::Solid);
        map.set_tile(15, 15, TileKind::Solid);

        let center = Vec2::new(5.5 * TILE_SIZE, 5.5 * TILE_SIZE);
        let rects = map.solid_rects_near(center);
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[0].pos, Vec2::new(5.0 * TILE_SIZE, 5.0 * TILE_SIZE));
    }

    #[test]
    fn closed_door_is_solid_open_is_not() {
        let mut map = TileMap::new(10, 10);
        let rect = Aabb::new(Vec2::new(100.0, 100.0), Vec2::new(TILE_SIZE, TILE_SIZE * 3.0));
        map.doors.push(Door::new(rect));

        let near = rect.center();
        assert_eq!(map.solid_rects_near(near).len(), 1);

        let toggled = map.interact_at(near, 1000);
        assert_eq!(toggled, Some(Interaction::DoorToggled(true)));
        assert!(map.solid_rects_near(near).is_empty());
    }

    #[test]
    fn door_toggle_respects_cooldown() {
        let mut map = TileMap::new(10, 10);
        let rect = Aabb::new(Vec2::new(100.0, 100.0), Vec2::new(TILE_SIZE, TILE_SIZE));
        map.doors.push(Door::new(rect));
        let near = rect.center();

        assert!(map.interact_at(near, 1000).is_some());
        assert!(map.interact_at(near, 1200).is_none());
        assert!(map.interact_at(near, 1500).is_some());
    }

    #[test]
    fn fresh_door_toggles_before_the_first_cooldown_elapses() {
        let mut map = TileMap::new(10, 10);
        let rect = Aabb::new(Vec2::new(100.0, 100.0), Vec2::new(TILE_SIZE, TILE_SIZE));
        map.doors.push(Door::new(rect));
        let near = rect.center();

        // A door nobody has touched yet has no cooldown running.
        assert_eq!(
            map.interact_at(near, 100),
            Some(Interaction::DoorToggled(true))
        );
        assert!(map.interact_at(near, 300).is_none());
    }

    #[test]
    fn broken_door_stays_open() {
        let mut door = Door::new(Aabb::new(Vec2::ZERO, Vec2::splat(TILE_SIZE)));

        assert!(!door.apply_damage(10));
        assert!(door.apply_damage(999));
        assert!(door.broken);
        assert!(door.open);
        assert!(!door.is_solid());

        // Further damage is a no-op, not a second break.
        assert!(!door.apply_damage(999));
    }

    #[test]
    fn chest_blocks_until_opened() {
        let mut map = TileMap::new(10, 10);
        let rect = Aabb::new(Vec2::new(200.0, 200.0), Vec2::new(40.0, 30.0));
        map.pickups.push(Pickup {
            rect,
            kind: PickupKind::Chest,
        });

        let near = rect.center();
        assert_eq!(map.solid_rects_near(near).len(), 1);

        let opened = map.interact_at(near, 100);
        assert!(matches!(opened, Some(Interaction::ChestOpened(_))));
        assert!(map.solid_rects_near(near).is_empty());
        assert!(map.interact_at(near, 200).is_none());
    }

    #[test]
    fn scroll_never_blocks() {
        let mut map = TileMap::new(10, 10);
        let rect = Aabb::new(Vec2::new(200.0, 200.0), Vec2::new(20.0, 30.0));
        map.pickups.push(Pickup {
            rect,
            kind: PickupKind::Scroll,
        });

        assert!(map.solid_rects_near(rect.center()).is_empty());
        assert_eq!(
            map.interact_at(rect.center(), 100),
            Some(Interaction::ScrollTaken)
        );
    }
}
