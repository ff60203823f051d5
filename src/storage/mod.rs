//! The `userdir::storage` module provides CRUD-by-id persistence for user
//! records behind a single trait, with a durable file-backed implementation
//! and an in-memory one selected by configuration.

use std::{collections::HashMap, sync::Arc};

use serde_json::Value;

use crate::{
    errors::UdError,
    users::{User, UserFields},
};

pub mod file;
pub mod memory;

pub trait UserStore: Send + Sync {
    //! This trait describes the general methods that a user store needs to implement.

    /// Persists a new user, assigning its id. Fails with a validation error
    /// when `fields` carries no name.
    fn create(&self, fields: &UserFields) -> Result<User, UdError>;
    fn get(&self, id: &str) -> Result<Option<User>, UdError>;
    fn list(&self) -> Result<Vec<User>, UdError>;
    /// Overwrites the record with `user.id`; callers check existence first.
    fn put(&self, user: &User) -> Result<(), UdError>;
    /// Removes and returns the record, `None` if the id was never there.
    fn delete(&self, id: &str) -> Result<Option<User>, UdError>;
}

pub fn new_store(t: &str, conf: &HashMap<String, Value>) -> Result<Arc<dyn UserStore>, UdError> {
    match t {
        "file" => {
            let store = file::FileStore::new(conf)?;
            Ok(Arc::new(store))
        }
        "mem" => Ok(Arc::new(memory::MemStore::new())),
        _ => Err(UdError::ErrStoreTypeInvalid),
    }
}
