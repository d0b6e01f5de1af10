pub mod credential;
pub mod decision;
pub mod verifier;

pub use decision::{AuthorizationRequest, Authorizer, Decision, Identity};
