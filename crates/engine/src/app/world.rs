use tracing::trace;

use super::entity::{Entity, EntityId};
use super::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Blocked,
    UnknownEntity,
}

impl MoveOutcome {
    pub fn moved(self) -> bool {
        matches!(self, MoveOutcome::Moved)
    }
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Insertion-ordered set of entities. Order is draw order for renderers and
/// iteration order for gravity; collision checks ignore it.
#[derive(Debug, Default)]
pub struct World {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = self.allocator.allocate();
        entity.assign_id(id);
        self.entities.push(entity);
        id
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.index_of(id)?;
        Some(self.entities.remove(index))
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn find(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id() == id)
    }

    pub fn find_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id() == id)
    }

    pub(crate) fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(Entity::id).collect()
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|entity| entity.id() == id)
    }

    pub fn is_area_free(&self, mover: EntityId, area: &Rect) -> bool {
        !self
            .entities
            .iter()
            .any(|other| other.id() != mover && other.is_solid() && other.bounds().overlaps(area))
    }

    pub fn move_unchecked(&mut self, id: EntityId, dx: f32, dy: f32) -> MoveOutcome {
        match self.find_mut(id) {
            Some(entity) => {
                entity.move_unchecked(dx, dy);
                MoveOutcome::Moved
            }
            None => MoveOutcome::UnknownEntity,
        }
    }

    /// All-or-nothing: a blocked move leaves the position untouched.
    pub fn move_checked(&mut self, id: EntityId, dx: f32, dy: f32) -> MoveOutcome {
        let Some(index) = self.index_of(id) else {
            return MoveOutcome::UnknownEntity;
        };
        let mover = &self.entities[index];
        if mover.is_solid() {
            let candidate = mover.bounds().translated(dx, dy);
            if !self.is_area_free(id, &candidate) {
                trace!(entity = id.0, dx, dy, "move_blocked");
                return MoveOutcome::Blocked;
            }
        }
        self.entities[index].move_unchecked(dx, dy);
        MoveOutcome::Moved
    }

    pub fn move_checked_x(&mut self, id: EntityId, dx: f32) -> MoveOutcome {
        self.move_checked(id, dx, 0.0)
    }

    pub fn move_checked_y(&mut self, id: EntityId, dy: f32) -> MoveOutcome {
        self.move_checked(id, 0.0, dy)
    }
}
