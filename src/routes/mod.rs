mod auth;
mod index;
mod users;

pub use auth::{login, refresh, register, CredentialsRequest, TokenResponse};
pub use index::{health_check, index};
pub use users::{delete_user, get_current_user, get_user, list_users, update_user, UpdateUserRequest};
