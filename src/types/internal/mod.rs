// Internal types - never exposed over the API
pub mod audit;
pub mod context;
pub mod permission;
pub mod session;
pub mod user;

pub use permission::{Permission, PermissionKey};
pub use session::{Session, SessionCookie, SESSION_COOKIE_NAME};
pub use user::{AdminUser, CurrentUser, NewAdminUser};
