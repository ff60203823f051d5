use std::{
    collections::HashMap,
    fs::{self, File},
    io::{self, Read, Write},
    path::PathBuf,
    sync::Mutex,
};

use serde_json::Value;

use super::UserStore;
use crate::{
    errors::UdError,
    users::{User, UserFields},
    util::generate_uuid,
};

/// Durable store keeping one JSON file per user under a configured
/// directory. Leaf files carry a `_` prefix so ids never collide with
/// anything the directory may grow later.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<i32>,
}

impl UserStore for FileStore {
    fn create(&self, fields: &UserFields) -> Result<User, UdError> {
        let name = match &fields.name {
            Some(name) => name.clone(),
            None => return Err(UdError::ErrUserValidation("missing required field 'name'".to_string())),
        };

        let user = User { id: generate_uuid(), name, email: fields.email.clone(), age: fields.age };
        self.write_user(&user)?;
        Ok(user)
    }

    fn get(&self, id: &str) -> Result<Option<User>, UdError> {
        let path = self.user_path(id)?;

        let _lock = self.lock.lock().unwrap();

        match File::open(&path) {
            Ok(mut file) => {
                let mut buffer = String::new();
                file.read_to_string(&mut buffer)?;
                let user: User = serde_json::from_str(&buffer)?;
                Ok(Some(user))
            }
            Err(err) => {
                if err.kind() == io::ErrorKind::NotFound {
                    Ok(None)
                } else {
                    Err(UdError::from(err))
                }
            }
        }
    }

    fn list(&self) -> Result<Vec<User>, UdError> {
        let _lock = self.lock.lock().unwrap();

        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut users: Vec<User> = vec![];
        let entries = fs::read_dir(&self.path)?;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with('_') {
                continue;
            }

            let mut buffer = String::new();
            File::open(entry.path())?.read_to_string(&mut buffer)?;
            users.push(serde_json::from_str(&buffer)?);
        }
        Ok(users)
    }

    fn put(&self, user: &User) -> Result<(), UdError> {
        self.write_user(user)
    }

    fn delete(&self, id: &str) -> Result<Option<User>, UdError> {
        let user = self.get(id)?;
        if user.is_none() {
            return Ok(None);
        }

        let path = self.user_path(id)?;
        let _lock = self.lock.lock().unwrap();
        if let Err(err) = fs::remove_file(&path) {
            if err.kind() == io::ErrorKind::NotFound {
                return Ok(None);
            } else {
                return Err(UdError::from(err));
            }
        }
        Ok(user)
    }
}

impl FileStore {
    pub fn new(conf: &HashMap<String, Value>) -> Result<Self, UdError> {
        match conf.get("path") {
            Some(path) => {
                let path = path.as_str();
                if path.is_none() {
                    return Err(UdError::ErrStoreConfigItemMissing);
                }

                Ok(FileStore { path: PathBuf::from(path.unwrap()), lock: Mutex::new(0) })
            }
            None => Err(UdError::ErrStoreConfigItemMissing),
        }
    }

    fn user_path(&self, id: &str) -> Result<PathBuf, UdError> {
        if id.is_empty() || id.contains('/') || id.contains('\\') {
            return Err(UdError::ErrStoreKeyInvalid);
        }

        Ok(self.path.join(format!("_{}", id)))
    }

    fn write_user(&self, user: &User) -> Result<(), UdError> {
        let path = self.user_path(&user.id)?;

        let _lock = self.lock.lock().unwrap();
        fs::create_dir_all(&self.path)?;
        let mut file = File::create(&path)?;
        let serialized = serde_json::to_string(user)?;
        file.write_all(serialized.as_bytes())?;
        Ok(())
    }
}
