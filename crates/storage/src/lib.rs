//! Tenant media storage: the object-store seam, the media library built on
//! top of it, and presigned upload URLs.

pub mod bucket;
pub mod files;

pub use bucket::{MemoryBucket, ObjectStore, StoredObject};
pub use files::{FileKind, MediaLibrary, PresignedUpload, StorageFile};
