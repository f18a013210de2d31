//! Credential discovery, storage and refresh for the Content API.

pub mod ambient;
pub mod client_config;
pub mod credential;
pub mod flow;
pub mod redirect;
pub mod resolver;
pub mod secret;
pub mod service_account;
pub mod token_store;

pub use ambient::AmbientSources;
pub use client_config::ClientConfig;
pub use credential::{AccessToken, Credential, MetadataCredential, ServiceAccountCredential, UserCredential};
pub use flow::{AuthorizationFlow, LocalServerFlow};
pub use resolver::{CONTENT_API_SCOPE, CredentialKind, CredentialResolver, ResolvedCredential};
pub use secret::SecretString;
pub use service_account::ServiceAccountKey;
pub use token_store::{TokenRecord, TokenStore};
