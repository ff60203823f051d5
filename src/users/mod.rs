//! The `userdir::users` module defines the user record itself, payload
//! validation, and the manager that drives every CRUD operation against the
//! configured store while keeping the request counter exact.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::UdError;

pub mod manager;

/// A single directory entry. The id is assigned by the store at creation and
/// never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u64>,
}

/// Typed, id-less fields extracted from a request payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u64>,
}

/// Pulls the known fields out of a JSON body. `name` must be a non-empty
/// string whenever present. In strict mode unknown fields and ill-typed
/// optional fields are rejected; in permissive mode they are ignored.
pub fn parse_payload(body: Option<&Map<String, Value>>, strict: bool) -> Result<UserFields, UdError> {
    let mut fields = UserFields::default();
    let Some(body) = body else {
        return Ok(fields);
    };

    for (key, value) in body.iter() {
        match key.as_str() {
            "name" => match value.as_str() {
                Some(s) if !s.is_empty() => fields.name = Some(s.to_string()),
                Some(_) => return Err(UdError::ErrUserValidation("field 'name' must not be empty".to_string())),
                None => return Err(UdError::ErrUserValidation("field 'name' must be a string".to_string())),
            },
            "email" => match value.as_str() {
                Some(s) => fields.email = Some(s.to_string()),
                None if strict => {
                    return Err(UdError::ErrUserValidation("field 'email' must be a string".to_string()))
                }
                None => {}
            },
            "age" => match value.as_u64() {
                Some(n) => fields.age = Some(n),
                None if strict => {
                    return Err(UdError::ErrUserValidation(
                        "field 'age' must be a non-negative integer".to_string(),
                    ))
                }
                None => {}
            },
            other => {
                if strict {
                    return Err(UdError::ErrUserValidation(format!("unknown field '{}'", other)));
                }
            }
        }
    }

    Ok(fields)
}
