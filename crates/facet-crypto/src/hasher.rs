use facet_types::Ref;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"facet-source-v1"`,
/// `"facet-version-v1"`) that is prepended to every hash computation. A
/// source file and a version with identical bytes therefore produce
/// different refs.
#[derive(Debug)]
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for raw file contents.
    pub const SOURCE: Self = Self {
        domain: "facet-source-v1",
    };
    /// Hasher for the canonical content of a version.
    pub const VERSION: Self = Self {
        domain: "facet-version-v1",
    };
    /// Hasher for component identities. Components and the symlinks that
    /// alias them share this domain so a symlink occupies the slot of the
    /// identity it replaces.
    pub const COMPONENT: Self = Self {
        domain: "facet-component-v1",
    };
    /// Hasher for lane identities.
    pub const LANE: Self = Self {
        domain: "facet-lane-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> Ref {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        Ref::from_hash(*hasher.finalize().as_bytes())
    }

    /// Hash an identity string (e.g. `acme/ui/button`).
    pub fn hash_identity(&self, identity: &str) -> Ref {
        self.hash(identity.as_bytes())
    }

    /// Hash a serializable value as JSON with domain separation.
    pub fn hash_json<T: serde::Serialize>(&self, value: &T) -> Result<Ref, HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        Ok(self.hash(&data))
    }

    /// Verify that data produces the expected ref.
    pub fn verify(&self, data: &[u8], expected: &Ref) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
