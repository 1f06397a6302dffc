use facet_types::Ref;

use crate::error::StoreResult;
use crate::object::StoredObject;

/// Ref-keyed object store.
///
/// Implementations must satisfy these invariants:
/// - `write` rejects a null ref and a content-addressed object whose bytes
///   do not hash to its ref.
/// - Writing a pointer object (component, lane, symlink) under an existing
///   ref replaces it wholesale.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read an object by ref.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    /// Returns `Err` on I/O failure or data corruption.
    fn read(&self, id: &Ref) -> StoreResult<Option<StoredObject>>;

    /// Write an object under its ref and return the ref.
    fn write(&self, object: &StoredObject) -> StoreResult<Ref>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &Ref) -> StoreResult<bool>;

    /// Delete an object by ref. Returns `true` if the object existed.
    fn delete(&self, id: &Ref) -> StoreResult<bool>;

    /// Read multiple objects in a batch.
    ///
    /// Default implementation calls `read()` for each ref.
    fn read_batch(&self, ids: &[Ref]) -> StoreResult<Vec<Option<StoredObject>>> {
        ids.iter().map(|id| self.read(id)).collect()
    }

    /// Write multiple objects in a batch and return their refs.
    ///
    /// Default implementation calls `write()` for each object after checking
    /// every object first, so a bad object aborts before anything is written.
    fn write_batch(&self, objects: &[StoredObject]) -> StoreResult<Vec<Ref>> {
        for obj in objects {
            obj.verify()?;
        }
        objects.iter().map(|obj| self.write(obj)).collect()
    }

    /// Delete multiple objects. Returns how many existed.
    fn delete_batch(&self, ids: &[Ref]) -> StoreResult<usize> {
        let mut removed = 0;
        for id in ids {
            if self.delete(id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
