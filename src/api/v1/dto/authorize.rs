/*
 * Responsibility
 * - gateway から受け取る authorizer event と、返す policy の DTO
 * - service 層の AuthorizationRequest / Decision との変換
 */
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::services::authorizer::{AuthorizationRequest, Identity};

const PRINCIPAL_ID: &str = "user";
const INVOKE_ACTION: &str = "execute-api:Invoke";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeRequest {
    pub http_method: String,
    #[serde(default)]
    pub path: String,
    #[serde(alias = "methodArn")]
    pub resource_identifier: String,
    // Missing and `null` both mean "no headers". Document order is kept.
    #[serde(default, deserialize_with = "ordered_headers")]
    pub headers: Vec<(String, String)>,
}

fn ordered_headers<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct HeadersVisitor;

    impl<'de> Visitor<'de> for HeadersVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of header names to string values, or null")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut headers = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, String>()? {
                headers.push(entry);
            }
            Ok(headers)
        }
    }

    deserializer.deserialize_any(HeadersVisitor)
}

impl From<AuthorizeRequest> for AuthorizationRequest {
    fn from(req: AuthorizeRequest) -> Self {
        Self {
            http_method: req.http_method,
            path: req.path,
            resource: req.resource_identifier,
            headers: req.headers,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeResponse {
    pub principal_id: &'static str,
    pub policy: Policy,
    pub context: AuthorizerContext,
}

#[derive(Debug, Serialize)]
pub struct Policy {
    pub effect: &'static str,
    pub action: &'static str,
    pub resource: String,
}

/// Values the gateway forwards to downstream handlers.
#[derive(Debug, Default, Serialize)]
pub struct AuthorizerContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<i64>,
}

impl AuthorizeResponse {
    pub fn allow(identity: Option<Identity>, resource: String) -> Self {
        let context = identity
            .map(|id| AuthorizerContext {
                user_id: Some(id.user_id),
                credits: Some(id.credits),
            })
            .unwrap_or_default();

        Self {
            principal_id: PRINCIPAL_ID,
            policy: Policy {
                effect: "Allow",
                action: INVOKE_ACTION,
                resource,
            },
            context,
        }
    }
}
