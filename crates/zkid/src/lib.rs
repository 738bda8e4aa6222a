//! Feige-Fiat-Shamir identification over Blum integers.
//!
//! A prover holding `k` secret quadratic residues modulo a Blum integer `n`
//! convinces a verifier holding only `n` and the matching inverse squares,
//! one commit/challenge/response round at a time. Each accepted round cuts
//! the chance of a successful forgery by `2^-k`.

pub mod config;
pub mod error;
pub mod key;
pub mod modulus;
pub mod protocol;
pub mod session;

pub use config::SessionConfig;
pub use error::ZkidError;
pub use key::{KeyPair, PrivateKey, PublicKey};
pub use modulus::BlumModulus;
pub use session::{Confidence, Orchestrator, SessionReport};

pub type Result<T> = std::result::Result<T, ZkidError>;
