use facet_types::{ComponentId, Ref};
use serde::{Deserialize, Serialize};

use crate::component::ModelComponent;
use crate::error::StoreResult;
use crate::object::{decode_json, encode_json, ObjectKind, StoredObject};

/// Alias left behind when a component moves to another identity.
///
/// Occupies the slot of `id`; lookups follow it one hop to `target`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symlink {
    pub id: ComponentId,
    pub target: ComponentId,
}

impl Symlink {
    pub fn new(id: ComponentId, target: ComponentId) -> Self {
        Self {
            id: id.without_version(),
            target: target.without_version(),
        }
    }

    pub fn object_ref(&self) -> Ref {
        ModelComponent::identity_ref(&self.id)
    }

    /// Ref of the component this alias points at.
    pub fn target_ref(&self) -> Ref {
        ModelComponent::identity_ref(&self.target)
    }

    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        encode_json(self.object_ref(), ObjectKind::Symlink, self)
    }

    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        decode_json(obj, ObjectKind::Symlink)
    }
}
