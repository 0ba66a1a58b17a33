//! Authentication and authorization: bearer tokens, confirmation codes,
//! and the access-policy predicates.

pub mod authentication;
pub mod confirmation;
pub mod permissions;
pub mod tokens;

pub use confirmation::ConfirmationCodeGenerator;
pub use permissions::{Access, DenyReason, Permission, PermissionContext};
pub use tokens::{Claims, JwtAuth};
