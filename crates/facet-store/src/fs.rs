use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use facet_types::Ref;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::ObjectStore;

/// Default zstd level for object payloads.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Header size: 1 byte kind + 4 bytes CRC.
const HEADER_SIZE: usize = 5;

/// One-file-per-object store rooted at a scope directory.
///
/// Layout: `<root>/objects/<first 2 hex>/<remaining 62 hex>`.
///
/// On-disk format of each file:
/// ```text
/// [1 byte: object kind]
/// [4 bytes: CRC32 of the uncompressed payload (little-endian u32)]
/// [N bytes: zstd-compressed payload]
/// ```
///
/// Writes land in a temp file in the target directory and are renamed into
/// place, so readers never observe a partial object.
#[derive(Debug)]
pub struct FsObjectStore {
    objects_dir: PathBuf,
    compression_level: i32,
}

impl FsObjectStore {
    /// Open (creating if needed) a store under `root`.
    pub fn open(root: impl AsRef<Path>, compression_level: i32) -> StoreResult<Self> {
        let objects_dir = root.as_ref().join("objects");
        fs::create_dir_all(&objects_dir)?;
        debug!(path = %objects_dir.display(), "opened object store");
        Ok(Self {
            objects_dir,
            compression_level,
        })
    }

    /// Path of the file holding `id`.
    pub fn object_path(&self, id: &Ref) -> PathBuf {
        let hex = id.to_hex();
        self.objects_dir.join(&hex[..2]).join(&hex[2..])
    }

    fn encode(&self, object: &StoredObject) -> StoreResult<Vec<u8>> {
        let compressed = zstd::encode_all(object.data.as_slice(), self.compression_level)
            .map_err(|e| StoreError::Serialization(format!("zstd compress: {e}")))?;
        let crc = crc32fast::hash(&object.data);
        let mut buf = Vec::with_capacity(HEADER_SIZE + compressed.len());
        buf.push(object.kind.as_byte());
        buf.extend_from_slice(&crc.to_le_bytes());
        buf.extend_from_slice(&compressed);
        Ok(buf)
    }

    fn decode(&self, id: &Ref, bytes: &[u8]) -> StoreResult<StoredObject> {
        let corrupt = |reason: String| {
            warn!(object = %id, %reason, "corrupt object file");
            StoreError::CorruptObject { id: *id, reason }
        };
        if bytes.len() < HEADER_SIZE {
            return Err(corrupt(format!("truncated header ({} bytes)", bytes.len())));
        }
        let kind = ObjectKind::from_byte(bytes[0])
            .ok_or_else(|| corrupt(format!("unknown kind byte {}", bytes[0])))?;
        let expected_crc = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        let data = zstd::decode_all(&bytes[HEADER_SIZE..])
            .map_err(|e| corrupt(format!("zstd decompress: {e}")))?;
        let actual_crc = crc32fast::hash(&data);
        if actual_crc != expected_crc {
            return Err(corrupt(format!(
                "CRC mismatch: expected {expected_crc:#010x}, got {actual_crc:#010x}"
            )));
        }
        Ok(StoredObject::new(*id, kind, data))
    }
}

impl ObjectStore for FsObjectStore {
    fn read(&self, id: &Ref) -> StoreResult<Option<StoredObject>> {
        let bytes = match fs::read(self.object_path(id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        self.decode(id, &bytes).map(Some)
    }

    fn write(&self, object: &StoredObject) -> StoreResult<Ref> {
        object.verify()?;
        let path = self.object_path(&object.id);
        let dir = path
            .parent()
            .ok_or_else(|| StoreError::Io(io::Error::other("object path has no parent")))?;
        fs::create_dir_all(dir)?;

        let encoded = self.encode(object)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&encoded)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(
            object = %object.id.short_hex(),
            kind = %object.kind,
            len = encoded.len(),
            "object written"
        );
        Ok(object.id)
    }

    fn exists(&self, id: &Ref) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }

    fn delete(&self, id: &Ref) -> StoreResult<bool> {
        match fs::remove_file(self.object_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ModelComponent;
    use crate::source::Source;
    use facet_types::ComponentId;

    fn temp_store() -> (tempfile::TempDir, FsObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::open(dir.path(), DEFAULT_COMPRESSION_LEVEL).unwrap();
        (dir, store)
    }

    #[test]
    fn write_and_read_back() {
        let (_dir, store) = temp_store();
        let obj = Source::new("export const a = 1;\n".repeat(50)).to_stored_object();
        let id = store.write(&obj).unwrap();
        assert!(store.exists(&id).unwrap());
        assert_eq!(store.read(&id).unwrap().unwrap(), obj);
    }

    #[test]
    fn layout_uses_two_char_fanout() {
        let (dir, store) = temp_store();
        let obj = Source::new("x").to_stored_object();
        store.write(&obj).unwrap();
        let hex = obj.id.to_hex();
        let expected = dir.path().join("objects").join(&hex[..2]).join(&hex[2..]);
        assert!(expected.is_file());
        assert_eq!(store.object_path(&obj.id), expected);
    }

    #[test]
    fn missing_object_is_none() {
        let (_dir, store) = temp_store();
        let id = Ref::from_bytes(b"missing");
        assert!(store.read(&id).unwrap().is_none());
        assert!(!store.exists(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
    }

    #[test]
    fn pointer_object_is_overwritten() {
        let (_dir, store) = temp_store();
        let mut component = ModelComponent::new(&ComponentId::new(Some("acme"), "button"));
        component.set_head(Some(Ref::from_hash([1; 32])));
        store.write(&component.to_stored_object().unwrap()).unwrap();
        component.set_head(Some(Ref::from_hash([2; 32])));
        let id = store.write(&component.to_stored_object().unwrap()).unwrap();

        let stored = store.read(&id).unwrap().unwrap();
        let decoded = ModelComponent::from_stored_object(&stored).unwrap();
        assert_eq!(decoded.head, Some(Ref::from_hash([2; 32])));
    }

    #[test]
    fn corrupted_file_is_reported() {
        let (_dir, store) = temp_store();
        let obj = Source::new("payload").to_stored_object();
        store.write(&obj).unwrap();

        let path = store.object_path(&obj.id);
        let mut bytes = fs::read(&path).unwrap();
        bytes[1] ^= 0xff;
        fs::write(&path, bytes).unwrap();

        assert!(matches!(
            store.read(&obj.id),
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn truncated_file_is_reported() {
        let (_dir, store) = temp_store();
        let obj = Source::new("payload").to_stored_object();
        store.write(&obj).unwrap();
        fs::write(store.object_path(&obj.id), [1u8, 0]).unwrap();
        assert!(matches!(
            store.read(&obj.id),
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn delete_removes_file() {
        let (_dir, store) = temp_store();
        let id = store.write(&Source::new("gone").to_stored_object()).unwrap();
        assert!(store.delete(&id).unwrap());
        assert!(!store.exists(&id).unwrap());
    }

    #[test]
    fn reopen_sees_existing_objects() {
        let dir = tempfile::tempdir().unwrap();
        let obj = Source::new("durable").to_stored_object();
        {
            let store = FsObjectStore::open(dir.path(), 1).unwrap();
            store.write(&obj).unwrap();
        }
        let store = FsObjectStore::open(dir.path(), 1).unwrap();
        assert_eq!(store.read(&obj.id).unwrap().unwrap(), obj);
    }
}
