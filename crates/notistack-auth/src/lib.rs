//! Request authentication for Notistack.
//!
//! Every control-plane and bucket-configuration request is resolved to the
//! account that owns it before any state is touched. An [`AuthBackend`] does
//! the resolution; three are provided:
//!
//! - [`DummyBackend`] maps every request to one fixed account.
//! - [`AccessKeyBackend`] reads the access key from the `Authorization`
//!   header (SigV2 or SigV4 style) or presigned query and looks up its
//!   account, without checking the signature.
//! - [`SigV4Backend`] verifies the SigV4 signature against the stored
//!   secret key.
//!
//! # Usage
//!
//! ```rust
//! use notistack_auth::{AuthBackend, DummyBackend};
//! use notistack_core::AccountId;
//!
//! let backend = DummyBackend::new(AccountId::default());
//! let (parts, _) = http::Request::new(()).into_parts();
//! assert_eq!(backend.authenticate(&parts, b"").unwrap().as_str(), "tester");
//! ```

pub mod access_key;
pub mod backend;
pub mod canonical;
pub mod credentials;
pub mod error;
pub mod sigv4;

pub use backend::{AccessKeyBackend, AuthBackend, DummyBackend, SigV4Backend, build_backend};
pub use credentials::{Credential, CredentialProvider, StaticCredentialProvider};
pub use error::AuthError;
pub use sigv4::{AuthResult, hash_payload, verify_sigv4};
