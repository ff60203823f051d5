use std::io;
use std::sync::{PoisonError, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UdError {
    #[error("User is invalid: {0}")]
    ErrUserValidation(String),
    #[error("User does not exist.")]
    ErrUserNotFound,
    #[error("Store configuration item is missing.")]
    ErrStoreConfigItemMissing,
    #[error("Store type is invalid.")]
    ErrStoreTypeInvalid,
    #[error("Store key is invalid.")]
    ErrStoreKeyInvalid,
    #[error("Metric is not registered.")]
    ErrMetricUnknown,
    #[error("Metric name is already registered.")]
    ErrMetricDuplicate,
    #[error("Metric label values do not match the declared label names.")]
    ErrMetricLabelArity,
    #[error("Config path is invalid.")]
    ErrConfigPathInvalid,
    #[error("Config can not be loaded.")]
    ErrConfigLoadFailed,
    #[error("Config storage entry not found.")]
    ErrConfigStorageNotFound,
    #[error("Config listener entry not found.")]
    ErrConfigListenerNotFound,
    #[error("Some IO error happened, {:?}", .source)]
    IO {
        #[from]
        source: io::Error
    },
    #[error("Some serde error happened, {:?}", .source)]
    Serde {
        #[from]
        source: serde_json::Error
    },
    #[error("Some hcl error happened, {:?}", .source)]
    Hcl {
        #[from]
        source: hcl::Error
    },
    #[error("RwLock was poisoned (reading)")]
    ErrRwLockReadPoison,
    #[error("RwLock was poisoned (writing)")]
    ErrRwLockWritePoison,
    #[error(transparent)]
    ErrOther (#[from] anyhow::Error),
    #[error("Unknown error.")]
    ErrUnknown,
}

impl PartialEq for UdError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (UdError::ErrUserNotFound, UdError::ErrUserNotFound)
            | (UdError::ErrStoreConfigItemMissing, UdError::ErrStoreConfigItemMissing)
            | (UdError::ErrStoreTypeInvalid, UdError::ErrStoreTypeInvalid)
            | (UdError::ErrStoreKeyInvalid, UdError::ErrStoreKeyInvalid)
            | (UdError::ErrMetricUnknown, UdError::ErrMetricUnknown)
            | (UdError::ErrMetricDuplicate, UdError::ErrMetricDuplicate)
            | (UdError::ErrMetricLabelArity, UdError::ErrMetricLabelArity)
            | (UdError::ErrConfigPathInvalid, UdError::ErrConfigPathInvalid)
            | (UdError::ErrConfigLoadFailed, UdError::ErrConfigLoadFailed)
            | (UdError::ErrConfigStorageNotFound, UdError::ErrConfigStorageNotFound)
            | (UdError::ErrConfigListenerNotFound, UdError::ErrConfigListenerNotFound)
            | (UdError::ErrRwLockReadPoison, UdError::ErrRwLockReadPoison)
            | (UdError::ErrRwLockWritePoison, UdError::ErrRwLockWritePoison)
            | (UdError::ErrUnknown, UdError::ErrUnknown)
            => true,
            (UdError::ErrUserValidation(a), UdError::ErrUserValidation(b)) => a == b,
            _ => false,
        }
    }
}

impl<T> From<PoisonError<RwLockWriteGuard<'_, T>>> for UdError {
    fn from(_: PoisonError<RwLockWriteGuard<'_, T>>) -> Self {
        UdError::ErrRwLockWritePoison
    }
}

impl<T> From<PoisonError<RwLockReadGuard<'_, T>>> for UdError {
    fn from(_: PoisonError<RwLockReadGuard<'_, T>>) -> Self {
        UdError::ErrRwLockReadPoison
    }
}
