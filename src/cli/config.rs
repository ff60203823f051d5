//! This module defines and handles the config file options for the userdir
//! application. For instance, the IP address and port for userdir to listen
//! on is handled in this module, as are the behavior switches of the user
//! API and the metrics collection interval.

use std::{collections::HashMap, fs, path::Path};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::UdError;

/// A struct that contains several configurable options of the userdir server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "validate_listener")]
    pub listener: HashMap<String, Listener>,
    #[serde(deserialize_with = "validate_storage")]
    pub storage: HashMap<String, Storage>,
    #[serde(default)]
    pub log_level: String,
    #[serde(default)]
    pub pid_file: String,
    #[serde(default)]
    pub work_dir: String,
    #[serde(default, deserialize_with = "parse_bool_string")]
    pub daemon: bool,
    #[serde(default)]
    pub daemon_user: String,
    #[serde(default)]
    pub daemon_group: String,
    #[serde(default = "default_collection_interval")]
    pub collection_interval: u64,
    #[serde(default, deserialize_with = "parse_bool_string")]
    pub strict_validation: bool,
    #[serde(default = "default_bool_true", deserialize_with = "parse_bool_string")]
    pub partial_update: bool,
    #[serde(default = "default_bool_true", deserialize_with = "parse_bool_string")]
    pub return_deleted_body: bool,
    #[serde(default, deserialize_with = "parse_bool_string")]
    pub instrument_exposition: bool,
}

fn default_collection_interval() -> u64 {
    5
}

/// A struct that contains several configurable options for networking stuffs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listener {
    #[serde(default)]
    pub ltype: String,
    #[serde(default = "default_listener_address")]
    pub address: String,
}

fn default_listener_address() -> String {
    "127.0.0.1:3000".to_string()
}

/// A struct that contains several configurable options for storage stuffs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storage {
    #[serde(default)]
    pub stype: String,
    #[serde(flatten)]
    pub config: HashMap<String, Value>,
}

static STORAGE_TYPE_KEYWORDS: &[&str] = &["file", "mem"];

fn default_bool_true() -> bool {
    true
}

fn parse_bool_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;
    match value {
        Value::Bool(b) => Ok(b),
        Value::String(s) => match s.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(serde::de::Error::custom("Invalid value for bool")),
        },
        _ => Err(serde::de::Error::custom("Invalid value for bool")),
    }
}

fn validate_storage<'de, D>(deserializer: D) -> Result<HashMap<String, Storage>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let storage: HashMap<String, Storage> = Deserialize::deserialize(deserializer)?;

    for key in storage.keys() {
        if !STORAGE_TYPE_KEYWORDS.contains(&key.as_str()) {
            return Err(serde::de::Error::custom("Invalid storage key"));
        }
    }

    Ok(storage)
}

fn validate_listener<'de, D>(deserializer: D) -> Result<HashMap<String, Listener>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let listeners: HashMap<String, Listener> = Deserialize::deserialize(deserializer)?;

    for key in listeners.keys() {
        if key != "tcp" {
            return Err(serde::de::Error::custom("Invalid listener key"));
        }
    }

    Ok(listeners)
}

impl Config {
    pub fn merge(&mut self, other: Config) {
        self.listener.extend(other.listener);
        self.storage.extend(other.storage);

        if !other.log_level.is_empty() {
            self.log_level = other.log_level;
        }

        if !other.pid_file.is_empty() {
            self.pid_file = other.pid_file;
        }

        if !other.work_dir.is_empty() {
            self.work_dir = other.work_dir;
        }
    }
}

pub fn load_config(path: &str) -> Result<Config, UdError> {
    let f = Path::new(path);
    if f.is_dir() {
        load_config_dir(path)
    } else if f.is_file() {
        load_config_file(path)
    } else {
        Err(UdError::ErrConfigPathInvalid)
    }
}

fn load_config_dir(dir: &str) -> Result<Config, UdError> {
    log::debug!("load_config_dir: {}", dir);
    let mut paths: Vec<String> = Vec::new();

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            if let Some(ext) = path.extension() {
                if ext == "hcl" || ext == "json" {
                    let filename = path.to_string_lossy().into_owned();
                    paths.push(filename);
                }
            }
        }
    }

    let mut result = None;

    for path in paths {
        log::debug!("load_config_dir path: {}", path);
        let config = load_config_file(&path)?;
        if result.is_none() {
            result = Some(config.clone());
        } else {
            result.as_mut().unwrap().merge(config);
        }
    }

    result.ok_or(UdError::ErrConfigLoadFailed)
}

fn load_config_file(path: &str) -> Result<Config, UdError> {
    log::debug!("load_config_file: {}", path);
    let file = fs::File::open(path)?;

    if path.ends_with(".hcl") {
        let mut config: Config = hcl::from_reader(file)?;
        set_config_type_field(&mut config)?;
        check_config(&config)?;
        Ok(config)
    } else if path.ends_with(".json") {
        let mut config: Config = serde_json::from_reader(file)?;
        set_config_type_field(&mut config)?;
        check_config(&config)?;
        Ok(config)
    } else {
        Err(UdError::ErrConfigPathInvalid)
    }
}

fn set_config_type_field(config: &mut Config) -> Result<(), UdError> {
    config.storage.iter_mut().for_each(|(key, value)| value.stype = key.clone());
    config.listener.iter_mut().for_each(|(key, value)| value.ltype = key.clone());
    Ok(())
}

fn check_config(config: &Config) -> Result<(), UdError> {
    if config.storage.len() != 1 {
        return Err(UdError::ErrConfigStorageNotFound);
    }

    if config.listener.len() != 1 {
        return Err(UdError::ErrConfigListenerNotFound);
    }

    Ok(())
}
