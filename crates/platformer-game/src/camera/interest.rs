//! Points of interest
//!
//! A zone owns its point and moves it around while the player is inside; the
//! camera only holds a weak reference, so a dropped zone can never leave a
//! dangling interest behind.

use std::sync::{Arc, Weak};

use glam::Vec3;
use parking_lot::RwLock;
use platformer_core::EntityId;

/// A world position the automatic camera tries to keep in view
#[derive(Debug)]
pub struct PointOfInterest {
    owner: EntityId,
    position: RwLock<Vec3>,
}

impl PointOfInterest {
    pub fn new(owner: EntityId, position: Vec3) -> Arc<Self> {
        Arc::new(Self {
            owner,
            position: RwLock::new(position),
        })
    }

    /// The zone that placed this point
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn position(&self) -> Vec3 {
        *self.position.read()
    }

    pub fn set_position(&self, position: Vec3) {
        *self.position.write() = position;
    }
}

/// The camera's single point-of-interest slot
#[derive(Debug, Default)]
pub(crate) struct InterestSlot {
    current: Option<Weak<PointOfInterest>>,
}

impl InterestSlot {
    pub fn get(&self) -> Option<Arc<PointOfInterest>> {
        self.current.as_ref().and_then(Weak::upgrade)
    }

    pub fn replace(&mut self, point: Option<&Arc<PointOfInterest>>) {
        self.current = point.map(Arc::downgrade);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_follows_point_lifetime() {
        let mut slot = InterestSlot::default();
        assert!(slot.get().is_none());

        let point = PointOfInterest::new(EntityId::new(), Vec3::new(1.0, 2.0, 3.0));
        slot.replace(Some(&point));
        assert_eq!(slot.get().map(|p| p.owner()), Some(point.owner()));

        point.set_position(Vec3::ZERO);
        assert_eq!(slot.get().map(|p| p.position()), Some(Vec3::ZERO));

        drop(point);
        assert!(slot.get().is_none());
    }
}
