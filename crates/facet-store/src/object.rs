use facet_crypto::ContentHasher;
use facet_types::Ref;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::component::ModelComponent;
use crate::error::{StoreError, StoreResult};
use crate::lane::Lane;
use crate::source::Source;
use crate::symlink::Symlink;
use crate::version::Version;

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ObjectKind {
    /// Raw file contents, addressed by content hash.
    Source,
    /// Immutable version node in a component's history.
    Version,
    /// Mutable per-component pointer object.
    Component,
    /// Immutable alias from one component identity to another.
    Symlink,
    /// Mutable per-lane pointer object.
    Lane,
}

impl ObjectKind {
    /// One-byte tag used by on-disk encodings.
    pub fn as_byte(&self) -> u8 {
        match self {
            Self::Source => 1,
            Self::Version => 2,
            Self::Component => 3,
            Self::Symlink => 4,
            Self::Lane => 5,
        }
    }

    /// Inverse of [`ObjectKind::as_byte`].
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Source),
            2 => Some(Self::Version),
            3 => Some(Self::Component),
            4 => Some(Self::Symlink),
            5 => Some(Self::Lane),
            _ => None,
        }
    }

    /// Whether the ref of this kind is the hash of its stored bytes.
    pub fn is_content_addressed(&self) -> bool {
        matches!(self, Self::Source)
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Version => write!(f, "version"),
            Self::Component => write!(f, "component"),
            Self::Symlink => write!(f, "symlink"),
            Self::Lane => write!(f, "lane"),
        }
    }
}

/// A stored object: ref + kind tag + serialized data + cached size.
///
/// `StoredObject` is the unit of storage. Pointer objects are addressed by
/// the hash of their identity rather than their bytes, so the ref travels
/// with the object instead of being recomputed by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// Address of this object.
    pub id: Ref,
    /// The type of this object.
    pub kind: ObjectKind,
    /// The serialized bytes of the object.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a stored object under an explicit ref.
    pub fn new(id: Ref, kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self {
            id,
            kind,
            data,
            size,
        }
    }

    /// Create a source object addressed by the hash of `data`.
    pub fn content_addressed(data: Vec<u8>) -> Self {
        let id = ContentHasher::SOURCE.hash(&data);
        Self::new(id, ObjectKind::Source, data)
    }

    /// Check the object may be written under its ref.
    ///
    /// Content-addressed kinds must hash to their ref; every kind must carry
    /// a non-null ref.
    pub fn verify(&self) -> StoreResult<()> {
        if self.id.is_null() {
            return Err(StoreError::NullRef);
        }
        if self.kind.is_content_addressed() {
            let computed = ContentHasher::SOURCE.hash(&self.data);
            if computed != self.id {
                return Err(StoreError::HashMismatch {
                    id: self.id,
                    expected: self.id.to_hex(),
                    computed: computed.to_hex(),
                });
            }
        }
        Ok(())
    }
}

/// Encode a JSON-backed object.
pub(crate) fn encode_json<T: Serialize>(
    id: Ref,
    kind: ObjectKind,
    value: &T,
) -> StoreResult<StoredObject> {
    let data = serde_json::to_vec(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(StoredObject::new(id, kind, data))
}

/// Decode a JSON-backed object, checking its kind tag first.
pub(crate) fn decode_json<T: DeserializeOwned>(
    obj: &StoredObject,
    expected: ObjectKind,
) -> StoreResult<T> {
    if obj.kind != expected {
        return Err(StoreError::CorruptObject {
            id: obj.id,
            reason: format!("expected {expected}, got {}", obj.kind),
        });
    }
    serde_json::from_slice(&obj.data).map_err(|e| StoreError::CorruptObject {
        id: obj.id,
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// ScopeObject
// ---------------------------------------------------------------------------

/// Any object a scope can hold, discriminated by kind.
#[derive(Clone, Debug, PartialEq)]
pub enum ScopeObject {
    Source(Source),
    Version(Version),
    Component(ModelComponent),
    Symlink(Symlink),
    Lane(Lane),
}

impl ScopeObject {
    /// The ref this object is stored under.
    pub fn id(&self) -> Ref {
        match self {
            Self::Source(source) => source.id(),
            Self::Version(version) => version.id,
            Self::Component(component) => component.object_ref(),
            Self::Symlink(symlink) => symlink.object_ref(),
            Self::Lane(lane) => lane.object_ref(),
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Source(_) => ObjectKind::Source,
            Self::Version(_) => ObjectKind::Version,
            Self::Component(_) => ObjectKind::Component,
            Self::Symlink(_) => ObjectKind::Symlink,
            Self::Lane(_) => ObjectKind::Lane,
        }
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        match self {
            Self::Source(source) => Ok(source.to_stored_object()),
            Self::Version(version) => version.to_stored_object(),
            Self::Component(component) => component.to_stored_object(),
            Self::Symlink(symlink) => symlink.to_stored_object(),
            Self::Lane(lane) => lane.to_stored_object(),
        }
    }

    /// Decode from a `StoredObject`, dispatching on its kind.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        Ok(match obj.kind {
            ObjectKind::Source => Self::Source(Source::from_stored_object(obj)?),
            ObjectKind::Version => Self::Version(Version::from_stored_object(obj)?),
            ObjectKind::Component => Self::Component(ModelComponent::from_stored_object(obj)?),
            ObjectKind::Symlink => Self::Symlink(Symlink::from_stored_object(obj)?),
            ObjectKind::Lane => Self::Lane(Lane::from_stored_object(obj)?),
        })
    }

    pub fn as_version(&self) -> Option<&Version> {
        match self {
            Self::Version(version) => Some(version),
            _ => None,
        }
    }

    pub fn into_version(self) -> Option<Version> {
        match self {
            Self::Version(version) => Some(version),
            _ => None,
        }
    }
}

impl From<Source> for ScopeObject {
    fn from(value: Source) -> Self {
        Self::Source(value)
    }
}

impl From<Version> for ScopeObject {
    fn from(value: Version) -> Self {
        Self::Version(value)
    }
}

impl From<ModelComponent> for ScopeObject {
    fn from(value: ModelComponent) -> Self {
        Self::Component(value)
    }
}

impl From<Symlink> for ScopeObject {
    fn from(value: Symlink) -> Self {
        Self::Symlink(value)
    }
}

impl From<Lane> for ScopeObject {
    fn from(value: Lane) -> Self {
        Self::Lane(value)
    }
}
