//! Persistence module split across logical submodules. The user store owns
//! its database; the scripture library only ever reads the bundled ones.

mod connection;
mod error;
mod scripture;
mod user;

pub use connection::{data_dir, user_db_path};
pub use error::{StoreError, StoreResult};
pub use scripture::ScriptureLibrary;
pub use user::UserStore;
