//! Name resolution.
//!
//! [`Resolver`] turns a [`Word`] at a cursor position into the symbol it
//! refers to, honoring scopes, module visibility, imports, and access
//! paths. The access-path walker lives in [`access_path`] and handles
//! dotted chains (`obj.field.method()`).

mod access_path;
mod name_resolver;
mod word;

pub use access_path::{FromDistinct, WalkState, Walker};
pub use name_resolver::{Limits, Resolver};
pub use word::{Word, WordSpan};
