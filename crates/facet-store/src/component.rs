use std::collections::BTreeMap;

use facet_crypto::ContentHasher;
use facet_types::{is_hash, ComponentId, Ref};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::lane::Lane;
use crate::object::{decode_json, encode_json, ObjectKind, StoredObject};

/// Mutable pointer object describing one component's known history.
///
/// Stored under the hash of its identity (`scope/name`) and rewritten
/// wholesale on every update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelComponent {
    pub scope: Option<String>,
    pub name: String,
    /// Tag name to version ref.
    #[serde(default)]
    pub versions: BTreeMap<String, Ref>,
    /// Latest version on the main line.
    #[serde(default)]
    pub head: Option<Ref>,
    /// Head last known to the remote scope.
    #[serde(default)]
    pub remote_head: Option<Ref>,
    /// Set when the component holds versions not yet exported.
    #[serde(default)]
    pub local: bool,
    /// Lane head of the local side during a lane operation.
    #[serde(skip)]
    pub lane_head_local: Option<Ref>,
    /// Lane head of the remote side during a lane operation.
    #[serde(skip)]
    pub lane_head_remote: Option<Ref>,
}

impl ModelComponent {
    /// An empty component for `id`. The version part of `id` is ignored.
    pub fn new(id: &ComponentId) -> Self {
        Self {
            scope: id.scope.clone(),
            name: id.name.clone(),
            versions: BTreeMap::new(),
            head: None,
            remote_head: None,
            local: false,
            lane_head_local: None,
            lane_head_remote: None,
        }
    }

    /// Version-less identifier of this component.
    pub fn id(&self) -> ComponentId {
        ComponentId::new(self.scope.as_deref(), self.name.clone())
    }

    /// Ref a component with this identity is stored under.
    pub fn identity_ref(id: &ComponentId) -> Ref {
        ContentHasher::COMPONENT.hash_identity(&id.to_string_without_version())
    }

    pub fn object_ref(&self) -> Ref {
        Self::identity_ref(&self.id())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.versions.contains_key(tag)
    }

    pub fn has_head(&self) -> bool {
        self.head.is_some()
    }

    /// Nothing left to point at: no tags and no head.
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty() && self.head.is_none()
    }

    /// Resolve a label to a ref: a tag through the version map, a snap hash
    /// directly. Snap existence is the caller's concern.
    pub fn ref_for_label(&self, label: &str) -> Option<Ref> {
        if let Some(r) = self.versions.get(label) {
            return Some(*r);
        }
        if is_hash(label) {
            return Ref::from_hex(label).ok();
        }
        None
    }

    /// Label under which `r` is known: its tag if tagged, else its hex.
    pub fn label_for_ref(&self, r: &Ref) -> String {
        self.versions
            .iter()
            .find(|(_, v)| *v == r)
            .map(|(tag, _)| tag.clone())
            .unwrap_or_else(|| r.to_hex())
    }

    /// Remove a tag entry and return the ref it pointed at. A snap label
    /// returns its own ref and leaves the map unchanged.
    pub fn remove_version(&mut self, label: &str) -> Option<Ref> {
        if let Some(r) = self.versions.remove(label) {
            return Some(r);
        }
        if is_hash(label) {
            return Ref::from_hex(label).ok();
        }
        None
    }

    pub fn set_head(&mut self, head: Option<Ref>) {
        self.head = head;
    }

    /// Parent for a version about to be added, on `lane` or the main line.
    /// A component not yet on the lane branches off the main head.
    pub fn parent_for_new_version(&self, lane: Option<&Lane>) -> Option<Ref> {
        match lane {
            Some(lane) => self
                .lane_head_local
                .or_else(|| lane.get_component_head(&self.id()))
                .or(self.head),
            None => self.head,
        }
    }

    /// Record a new main-line version: advance head, record the tag if any.
    pub fn add_version(&mut self, version: Ref, tag: Option<&str>) {
        if let Some(tag) = tag {
            self.versions.insert(tag.to_string(), version);
        }
        self.head = Some(version);
        self.local = true;
    }

    /// Record a new version on `lane`. The main-line head is untouched.
    pub fn add_lane_version(&mut self, version: Ref, lane: &mut Lane) {
        lane.add_component(self.id(), version);
        self.lane_head_local = Some(version);
        self.local = true;
    }

    /// Holds versions the remote has not seen.
    pub fn is_locally_changed(&self) -> bool {
        self.local || (self.head.is_some() && self.head != self.remote_head)
    }

    /// Everything local is now on the remote.
    pub fn mark_exported(&mut self) {
        self.local = false;
        self.remote_head = self.head;
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        encode_json(self.object_ref(), ObjectKind::Component, self)
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        decode_json(obj, ObjectKind::Component)
    }
}
