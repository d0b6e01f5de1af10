pub mod authorize;
pub mod health;
pub mod me;
pub mod preflight;
