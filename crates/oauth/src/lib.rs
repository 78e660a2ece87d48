//! OAuth client credential resolution for Scriptony features.
//!
//! A feature key ("drive", "auth") maps to the OAuth client id configured
//! for it. Client ids are public identifiers but are handled as
//! [`secrecy::Secret`] values anyway; only the fixed-length
//! [`client_id_preview`] ever leaves this crate for display.

pub mod error;
pub mod resolver;
pub mod sources;

pub use {
    resolver::{CLIENT_ID_PREVIEW_LEN, CredentialResolver, client_id_preview},
    sources::{
        CredentialSource, EnvCredentialSource, FileCredentialSource, HttpCredentialSource,
        client_id_env_var,
    },
};

pub use error::{Error, Result};
