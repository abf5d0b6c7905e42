pub mod remote_user;

pub use remote_user::{remote_user_middleware, RemoteUser};
