//! Lazy composition of resource builders.
//!
//! Resources are declared as [`Builder`] values that do nothing until the
//! graph they form is attached to a [`Scope`] with [`join`]:
//!
//! - [`Builder::new`] / [`Builder::named`]: a factory run at most once per scope
//! - [`Builder::chain`]: a builder that depends on another's realized value
//! - [`combine`]: several independent builders merged into a [`Context`]
//! - [`wrap`]: adapt a plain function over realized values
//! - [`Builder::effect`]: a side effect run after its inputs are realized
//!
//! # Example
//!
//! ```
//! use purestack_lib::pure::{Builder, Context, Scope, combine, join};
//!
//! let role = Builder::named("Role", |_, id| Ok(format!("arn:aws:iam::role/{id}")));
//! let func = role.chain(|role| {
//!   let role = role.clone();
//!   Ok(Builder::named("Function", move |_, _| Ok(format!("func assumed by {role}"))))
//! });
//! let wiring = combine()
//!   .field("role", &role)
//!   .field("func", &func)
//!   .build()
//!   .effect(|_, ctx: &Context| Ok(ctx.len()));
//!
//! let mut scope = Scope::new("example");
//! assert_eq!(*join(&mut scope, &wiring).unwrap(), 2);
//! assert!(scope.contains("Role"));
//! assert!(scope.contains("Function"));
//! ```

mod builder;
mod context;
mod join;
mod node;
mod plan;
mod scope;
mod types;

pub use builder::{Builder, wrap};
pub use context::{Combine, Context, ContextError, combine};
pub use join::join;
pub use node::{BoxError, NodeId};
pub use scope::Scope;
pub use types::{JoinError, JoinStats};
