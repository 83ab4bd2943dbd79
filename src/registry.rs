/// Owns every non-player entity of a level.
///
/// Entities live in one `Vec` in creation order.  Killing an entity only
/// clears its `alive` flag; `prune` drops the dead ones at the end of a
/// frame.  By-kind views are derived from the tag on demand.

use crate::collision::any_collision;
use crate::entities::{Entity, EntityId, EntityKind, EntityTag};
use crate::geometry::Rect;

#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    next_id: u32,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, rect: Rect, kind: EntityKind) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(Entity {
            id,
            rect,
            alive: true,
            kind,
        });
        id
    }

    fn position(&self, id: EntityId) -> Option<usize> {
        // Ids are handed out in increasing order and pushed at the end.
        self.entities.binary_search_by_key(&id, |e| e.id).ok()
    }

    /// Live entity with this id.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.position(id)
            .map(|i| &self.entities[i])
            .filter(|e| e.alive)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        match self.position(id) {
            Some(i) if self.entities[i].alive => Some(&mut self.entities[i]),
            _ => None,
        }
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn kill(&mut self, id: EntityId) {
        if let Some(e) = self.get_mut(id) {
            e.alive = false;
        }
    }

    /// Remove dead entities.
    pub fn prune(&mut self) {
        self.entities.retain(|e| e.alive);
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Live entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.alive)
    }

    pub fn iter_tag(&self, tag: EntityTag) -> impl Iterator<Item = &Entity> {
        self.iter().filter(move |e| e.tag() == tag)
    }

    /// Snapshot of live ids of one kind.  Phase functions walk this list so
    /// they can mutate the registry while iterating.
    pub fn ids(&self, tag: EntityTag) -> Vec<EntityId> {
        self.iter_tag(tag).map(|e| e.id).collect()
    }

    pub fn count(&self, tag: EntityTag) -> usize {
        self.iter_tag(tag).count()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First live entity of `tag` overlapping `rect`.
    pub fn first_overlapping(&self, rect: &Rect, tag: EntityTag) -> Option<EntityId> {
        any_collision(rect, self.iter_tag(tag), |e: &Entity| e.rect).map(|e| e.id)
    }

    /// Every live entity of `tag` overlapping `rect`.
    pub fn all_overlapping(&self, rect: &Rect, tag: EntityTag) -> Vec<EntityId> {
        self.iter_tag(tag)
            .filter(|e| e.rect.intersects(rect))
            .map(|e| e.id)
            .collect()
    }
}
