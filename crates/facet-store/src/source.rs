use facet_crypto::ContentHasher;
use facet_types::Ref;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};

/// Raw file contents referenced by versions (files, dists, artifacts).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    pub contents: Vec<u8>,
}

impl Source {
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    /// Content-addressed ref of these bytes.
    pub fn id(&self) -> Ref {
        ContentHasher::SOURCE.hash(&self.contents)
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::content_addressed(self.contents.clone())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Source {
            return Err(StoreError::CorruptObject {
                id: obj.id,
                reason: format!("expected source, got {}", obj.kind),
            });
        }
        Ok(Self {
            contents: obj.data.clone(),
        })
    }
}
