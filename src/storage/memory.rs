use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        RwLock,
    },
};

use super::UserStore;
use crate::{
    errors::UdError,
    users::{User, UserFields},
};

/// Map-backed store for tests and single-process deployments. Ids are
/// sequential integers rendered as strings, starting at 1.
pub struct MemStore {
    users: RwLock<BTreeMap<u64, User>>,
    next_id: AtomicU64,
}

impl MemStore {
    pub fn new() -> Self {
        MemStore { users: RwLock::new(BTreeMap::new()), next_id: AtomicU64::new(1) }
    }
}

impl UserStore for MemStore {
    fn create(&self, fields: &UserFields) -> Result<User, UdError> {
        let name = match &fields.name {
            Some(name) => name.clone(),
            None => return Err(UdError::ErrUserValidation("missing required field 'name'".to_string())),
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let user = User { id: id.to_string(), name, email: fields.email.clone(), age: fields.age };

        self.users.write()?.insert(id, user.clone());
        Ok(user)
    }

    fn get(&self, id: &str) -> Result<Option<User>, UdError> {
        let Ok(id) = id.parse::<u64>() else { return Ok(None) };
        Ok(self.users.read()?.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<User>, UdError> {
        Ok(self.users.read()?.values().cloned().collect())
    }

    fn put(&self, user: &User) -> Result<(), UdError> {
        let id = user.id.parse::<u64>().map_err(|_| UdError::ErrStoreKeyInvalid)?;
        self.users.write()?.insert(id, user.clone());
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<Option<User>, UdError> {
        let Ok(id) = id.parse::<u64>() else { return Ok(None) };
        Ok(self.users.write()?.remove(&id))
    }
}
