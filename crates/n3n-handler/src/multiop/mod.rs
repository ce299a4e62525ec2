//! Resource + operation + field composition for integrations.
//!
//! An integration such as a key-value store exposes dozens of operations
//! (`string.get`, `hash.hset`, `list.lpush`, ...). Instead of one handler per
//! operation, it implements [`MultiOperationHandler`] once and is wrapped in
//! a [`MultiOperationNode`], which routes the generic execute call, applies
//! field defaults, resolves credentials and derives a single config schema.

mod catalog;
mod field;
mod node;
mod operation;
mod params;

pub use catalog::{Catalog, CatalogBuilder};
pub use field::{FieldDef, FieldKind};
pub use node::{MultiOperationHandler, MultiOperationNode};
pub use operation::{OperationDef, ResourceDef};
pub use params::{Credential, Params};
