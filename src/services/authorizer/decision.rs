//! Authorization decision: anonymous vs. credentialed path.
//!
//! Every failure on the credentialed path (malformed header, lookup error,
//! wrong secret) ends as [`Decision::Deny`]. The reason is logged for
//! operators and never returned to the caller.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::repos::error::RepoError;
use crate::repos::user_repo::UserLookup;
use crate::services::authorizer::credential::{decode_basic, extract_authorization};
use crate::services::authorizer::verifier::has_secret_key;

/// What the gateway tells us about the incoming request.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationRequest {
    pub http_method: String,
    pub path: String,
    // Copied verbatim into the policy of an Allow.
    pub resource: String,
    // In the order received; names keep their original casing.
    pub headers: Vec<(String, String)>,
}

/// Caller context attached to a credentialed Allow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub credits: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    // `identity` is None on the anonymous path.
    Allow {
        identity: Option<Identity>,
        resource: String,
    },
    Deny,
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }
}

#[derive(Clone)]
pub struct Authorizer {
    users: Arc<dyn UserLookup>,
}

impl Authorizer {
    pub fn new(users: Arc<dyn UserLookup>) -> Self {
        Self { users }
    }

    pub async fn authorize(&self, req: &AuthorizationRequest) -> Decision {
        match extract_authorization(&req.headers) {
            Some(header) => self.verify_credentials(header, req).await,
            None => verify_anonymous_access(req),
        }
    }

    async fn verify_credentials(&self, header: &str, req: &AuthorizationRequest) -> Decision {
        let credential = match decode_basic(header) {
            Ok(credential) => credential,
            Err(err) => {
                debug!(error = %err, method = %req.http_method, path = %req.path, "rejecting credential");
                return Decision::Deny;
            }
        };

        let record = match self.users.lookup(&credential.username).await {
            Ok(record) => record,
            Err(err) => {
                log_lookup_failure(&credential.username, &err);
                return Decision::Deny;
            }
        };

        if !has_secret_key(&record, &credential.secret) {
            info!(username = %credential.username, "secret key mismatch");
            return Decision::Deny;
        }

        debug!(username = %credential.username, credits = record.credits(), "authorized");
        Decision::Allow {
            identity: Some(Identity {
                user_id: credential.username,
                credits: record.credits(),
            }),
            resource: req.resource.clone(),
        }
    }
}

fn verify_anonymous_access(req: &AuthorizationRequest) -> Decision {
    if is_anonymous_access_allowed(&req.http_method, &req.path) {
        Decision::Allow {
            identity: None,
            resource: req.resource.clone(),
        }
    } else {
        debug!(method = %req.http_method, path = %req.path, "anonymous access denied");
        Decision::Deny
    }
}

// Only CORS preflight may go through without credentials, whatever the path.
fn is_anonymous_access_allowed(method: &str, _path: &str) -> bool {
    method == "OPTIONS"
}

fn log_lookup_failure(username: &str, err: &RepoError) {
    match err {
        RepoError::UserNotFound(_) | RepoError::AmbiguousUser { .. } => {
            warn!(username = %username, error = %err, "error when trying to authorize");
        }
        _ => {
            error!(username = %username, error = %err, "error when trying to authorize");
        }
    }
}
