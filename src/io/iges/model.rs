use slotmap::{SecondaryMap, SlotMap};

use crate::error::{IgesError, Result};

use super::entity::Entity;

slotmap::new_key_type! {
    /// Identity of an entity within an [`IgesModel`].
    pub struct EntityId;
}

/// Arena owning every entity of one IGES file.
///
/// Entities are written in insertion order. Pointers are plain ids, so an
/// entity shared by several parents is emitted once.
#[derive(Debug, Default)]
pub struct IgesModel {
    entities: SlotMap<EntityId, Entity>,
    order: Vec<EntityId>,
}

impl IgesModel {
    /// Creates a new, empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entity and returns its ID.
    pub fn add(&mut self, entity: Entity) -> EntityId {
        let id = self.entities.insert(entity);
        self.order.push(id);
        id
    }

    /// Removes an entity. Pointers to it elsewhere become unresolved.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let removed = self.entities.remove(id)?;
        self.order.retain(|&k| k != id);
        Some(removed)
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entities in insertion (output) order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.entities.get(id).map(|e| (id, e)))
    }

    /// Directory-entry pointer of every entity: the `k`-th entity (1-based)
    /// starts on directory line `2k - 1`.
    #[must_use]
    pub fn directory_pointers(&self) -> SecondaryMap<EntityId, usize> {
        let mut pointers = SecondaryMap::new();
        for (k, (id, _)) in self.iter().enumerate() {
            pointers.insert(id, 2 * k + 1);
        }
        pointers
    }

    /// Checks that every pointer targets an entity of this model.
    ///
    /// # Errors
    ///
    /// Returns [`IgesError::UnresolvedReference`] for the first dangling
    /// pointer.
    pub fn validate(&self) -> Result<()> {
        for (_, entity) in self.iter() {
            if entity.references().any(|id| !self.contains(id)) {
                return Err(IgesError::UnresolvedReference {
                    entity_type: entity.entity_type.code(),
                }
                .into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::io::iges::entity::{EntityType, Param};

    fn point(x: f64) -> Entity {
        Entity::new(EntityType::Point, vec![Param::Real(x), Param::Real(0.0), Param::Real(0.0), Param::Int(0)])
    }

    #[test]
    fn pointers_follow_insertion_order() {
        let mut model = IgesModel::new();
        let a = model.add(point(0.0));
        let b = model.add(point(1.0));
        let c = model.add(point(2.0));
        let de = model.directory_pointers();
        assert_eq!((de[a], de[b], de[c]), (1, 3, 5));
        model.remove(b);
        let de = model.directory_pointers();
        assert_eq!((de[a], de[c]), (1, 3));
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn dangling_pointer_is_reported() {
        let mut model = IgesModel::new();
        let p = model.add(point(0.0));
        model.add(Entity::new(
            EntityType::CompositeCurve,
            vec![Param::Int(1), Param::Pointer(p)],
        ));
        assert!(model.validate().is_ok());
        model.remove(p);
        assert!(model.validate().is_err());
    }
}
