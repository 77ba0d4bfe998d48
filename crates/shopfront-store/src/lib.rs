pub mod cart;
pub mod checkout;
pub mod error;
pub mod session;
pub mod storage;

pub use cart::{CartLine, CartStore};
pub use checkout::checkout;
pub use error::{StorageError, StoreError};
pub use session::{Session, SessionStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore, AUTH_TOKEN_KEY, USER_DATA_KEY};
