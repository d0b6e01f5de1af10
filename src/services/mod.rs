pub mod api_key;
pub mod authorizer;
pub mod cache;
