use facet_crypto::ContentHasher;
use facet_types::{ComponentId, LaneId, Ref};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::object::{decode_json, encode_json, ObjectKind, StoredObject};

/// One component tracked by a lane.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneComponent {
    pub id: ComponentId,
    pub head: Ref,
}

/// Named alternate line holding its own per-component heads.
///
/// At most one entry per component identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    pub id: LaneId,
    #[serde(default)]
    pub components: Vec<LaneComponent>,
}

impl Lane {
    pub fn new(id: LaneId) -> Self {
        Self {
            id,
            components: Vec::new(),
        }
    }

    /// Ref a lane with this identity is stored under.
    pub fn identity_ref(id: &LaneId) -> Ref {
        ContentHasher::LANE.hash_identity(&id.to_string())
    }

    pub fn object_ref(&self) -> Ref {
        Self::identity_ref(&self.id)
    }

    pub fn get_component(&self, id: &ComponentId) -> Option<&LaneComponent> {
        self.components.iter().find(|c| c.id.is_same_component(id))
    }

    pub fn get_component_head(&self, id: &ComponentId) -> Option<Ref> {
        self.get_component(id).map(|c| c.head)
    }

    /// Insert an entry, replacing the head of an existing one.
    pub fn add_component(&mut self, id: ComponentId, head: Ref) {
        let id = id.without_version();
        match self.components.iter_mut().find(|c| c.id.is_same_component(&id)) {
            Some(existing) => existing.head = head,
            None => self.components.push(LaneComponent { id, head }),
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        encode_json(self.object_ref(), ObjectKind::Lane, self)
    }

    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        decode_json(obj, ObjectKind::Lane)
    }
}
