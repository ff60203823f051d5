use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::{
    errors::UdError,
    metrics::http_metrics::HttpMetrics,
    storage::UserStore,
    users::{parse_payload, User},
};

/// Route labels as recorded on the request counter. The id segment stays a
/// placeholder so every user shares one label combination per route.
pub const USERS_ROUTE: &str = "/users";
pub const USER_ROUTE: &str = "/users/:id";

/// Behavior switches covering the observed deployment variants.
#[derive(Debug, Clone)]
pub struct UserManagerOptions {
    pub strict_validation: bool,
    pub partial_update: bool,
    pub return_deleted_body: bool,
}

impl Default for UserManagerOptions {
    fn default() -> Self {
        Self { strict_validation: false, partial_update: true, return_deleted_body: true }
    }
}

/// Outcome of a user operation: the HTTP status to send and an optional JSON
/// body. The status here is always the one the counter was recorded with.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Option<Value>,
}

impl Reply {
    fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    fn error(status: u16, err: &UdError) -> Self {
        Self::new(status, Some(json!({ "error": err.to_string() })))
    }
}

/// Drives every CRUD operation: validate, hit the store, then record exactly
/// one counter observation carrying the actual outcome.
pub struct UserManager {
    store: Arc<dyn UserStore>,
    metrics: Arc<HttpMetrics>,
    opts: UserManagerOptions,
}

impl UserManager {
    pub fn new(store: Arc<dyn UserStore>, metrics: Arc<HttpMetrics>, opts: UserManagerOptions) -> Self {
        Self { store, metrics, opts }
    }

    pub fn create(&self, body: Option<&Map<String, Value>>) -> Result<Reply, UdError> {
        let reply = match self.try_create(body) {
            Ok(user) => Reply::new(201, Some(serde_json::to_value(&user)?)),
            Err(e) => Reply::error(400, &e),
        };

        self.metrics.observe_request("POST", USERS_ROUTE, reply.status)?;
        Ok(reply)
    }

    pub fn list(&self) -> Result<Reply, UdError> {
        let reply = match self.store.list() {
            Ok(users) => Reply::new(200, Some(serde_json::to_value(&users)?)),
            Err(e) => {
                log::error!("user store enumeration failed: {}", e);
                Reply::error(500, &e)
            }
        };

        self.metrics.observe_request("GET", USERS_ROUTE, reply.status)?;
        Ok(reply)
    }

    pub fn get(&self, id: &str) -> Result<Reply, UdError> {
        let reply = match self.store.get(id) {
            Ok(Some(user)) => Reply::new(200, Some(serde_json::to_value(&user)?)),
            Ok(None) => Reply::new(404, None),
            Err(e) => Reply::error(500, &e),
        };

        self.metrics.observe_request("GET", USER_ROUTE, reply.status)?;
        Ok(reply)
    }

    pub fn update(&self, id: &str, body: Option<&Map<String, Value>>) -> Result<Reply, UdError> {
        let reply = match self.try_update(id, body) {
            Ok(user) => Reply::new(200, Some(serde_json::to_value(&user)?)),
            Err(UdError::ErrUserNotFound) => Reply::new(404, None),
            Err(e) => Reply::error(400, &e),
        };

        self.metrics.observe_request("PUT", USER_ROUTE, reply.status)?;
        Ok(reply)
    }

    pub fn delete(&self, id: &str) -> Result<Reply, UdError> {
        let reply = match self.store.delete(id) {
            Ok(Some(user)) => {
                if self.opts.return_deleted_body {
                    Reply::new(200, Some(serde_json::to_value(&user)?))
                } else {
                    Reply::new(204, None)
                }
            }
            Ok(None) => Reply::new(404, None),
            Err(e) => Reply::error(500, &e),
        };

        self.metrics.observe_request("DELETE", USER_ROUTE, reply.status)?;
        Ok(reply)
    }

    fn try_create(&self, body: Option<&Map<String, Value>>) -> Result<User, UdError> {
        let fields = parse_payload(body, self.opts.strict_validation)?;
        if fields.name.is_none() {
            return Err(UdError::ErrUserValidation("missing required field 'name'".to_string()));
        }

        self.store.create(&fields)
    }

    fn try_update(&self, id: &str, body: Option<&Map<String, Value>>) -> Result<User, UdError> {
        let fields = parse_payload(body, self.opts.strict_validation)?;

        let Some(mut user) = self.store.get(id)? else {
            return Err(UdError::ErrUserNotFound);
        };

        if self.opts.partial_update {
            if let Some(name) = fields.name {
                user.name = name;
            }
            if let Some(email) = fields.email {
                user.email = Some(email);
            }
            if let Some(age) = fields.age {
                user.age = Some(age);
            }
        } else {
            let Some(name) = fields.name else {
                return Err(UdError::ErrUserValidation("missing required field 'name'".to_string()));
            };
            user.name = name;
            user.email = fields.email;
            user.age = fields.age;
        }

        self.store.put(&user)?;
        Ok(user)
    }
}
