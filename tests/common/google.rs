#![allow(dead_code)]

use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ACCESS_TOKEN: &str = "ya29.test-access";

pub fn token_uri(server: &MockServer) -> String {
    format!("{}/token", server.uri())
}

/// Token endpoint answering every `grant_type` with `ACCESS_TOKEN`.
pub async fn mount_token_endpoint(server: &MockServer, grant_type: &str) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(format!("grant_type={grant_type}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "Bearer",
            "expires_in": 3599,
        })))
        .mount(server)
        .await;
}

/// Token endpoint rejecting refresh grants with `invalid_grant`.
pub async fn mount_revoked_refresh(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked.",
        })))
        .mount(server)
        .await;
}

/// Single-page `datafeeds` and `datafeedstatuses` listings for a merchant.
pub async fn mount_merchant(server: &MockServer, merchant_id: &str, feeds: Value, statuses: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{merchant_id}/datafeeds")))
        .and(header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "resources": feeds })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/{merchant_id}/datafeedstatuses")))
        .and(header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "resources": statuses })))
        .mount(server)
        .await;
}

/// Metadata-server token endpoint.
pub async fn mount_metadata_token(server: &MockServer, scopes: &str) {
    Mock::given(method("GET"))
        .and(path("/computeMetadata/v1/instance/service-accounts/default/token"))
        .and(header("Metadata-Flavor", "Google"))
        .and(query_param("scopes", scopes))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "Bearer",
            "expires_in": 3599,
        })))
        .mount(server)
        .await;
}
