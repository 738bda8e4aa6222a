pub mod error;
pub mod miller_rabin;
pub mod mod_int;
pub mod prime;
pub mod random;
pub mod time;

pub use error::CommonError;

pub type Result<T> = std::result::Result<T, CommonError>;
