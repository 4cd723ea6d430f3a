use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::kv::KvStore;
use crate::kv_fs::FsKvStore;
use crate::kv_mem::MemKvStore;
use crate::options::StoreOptions;

pub enum Backend {
    Fs(PathBuf),
    Memory,
}

pub fn open_kv(backend: Backend, opts: &StoreOptions) -> Result<Arc<dyn KvStore>> {
    match backend {
        Backend::Fs(dir) => Ok(Arc::new(FsKvStore::open(&dir, opts)?)),
        Backend::Memory => Ok(Arc::new(MemKvStore::new())),
    }
}
