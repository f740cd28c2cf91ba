#![cfg(feature = "sled-support")]

use std::path::Path;

use arkv_result::Result;
use arkv_storage::kv::SledStore;

use kv_harness::{Persistence, run_crud_roundtrip, run_reopen_behavior};

fn make_sled(path: &Path) -> Result<SledStore> {
    SledStore::open(path)
}

#[test]
fn sled_crud_roundtrip() {
    run_crud_roundtrip::<SledStore, _>(make_sled);
}

#[test]
fn sled_reopen_behavior_is_persistent() {
    run_reopen_behavior::<SledStore, _>(make_sled, Persistence::Persistent);
}
