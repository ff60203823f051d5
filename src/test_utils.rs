use std::{
    collections::HashMap,
    env, fs,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use lazy_static::lazy_static;
use serde_json::Value;

use crate::storage::{self, UserStore};

lazy_static! {
    pub static ref TEST_DIR: &'static str = "userdir_test";
}

mod tests {
    use super::*;

    #[ctor::ctor]
    fn init() {
        let dir = env::temp_dir().join(*TEST_DIR);
        let _ = fs::remove_dir_all(&dir);
        println!("create userdir_test dir: {}", dir.to_string_lossy().into_owned());
        assert!(fs::create_dir(&dir).is_ok());
    }

    #[ctor::dtor]
    fn cleanup() {
        let dir = env::temp_dir().join(*TEST_DIR);
        let _ = fs::remove_dir_all(&dir);
    }
}

pub fn test_file_store(name: &str) -> Arc<dyn UserStore> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    let test_dir = env::temp_dir().join(format!("{}/{}-{}", *TEST_DIR, name, now).as_str());
    let dir = test_dir.to_string_lossy().into_owned();
    assert!(fs::create_dir(&test_dir).is_ok());

    println!("test store init, dir: {}", dir);

    let mut conf: HashMap<String, Value> = HashMap::new();
    conf.insert("path".to_string(), Value::String(dir));

    let store = storage::new_store("file", &conf);
    assert!(store.is_ok());

    store.unwrap()
}
