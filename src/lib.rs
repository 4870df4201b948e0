//! Hierarchical dependency injection with explicit provider records.
//!
//! An [`Injector`] maps [`Token`]s to lazily-created, memoized records and
//! optionally delegates to a parent injector, forming a scope hierarchy.
//! Providers declare how each token's value is produced: a fixed value, a
//! class constructor, a factory over resolved dependencies, an alias to
//! another token, or the constructible type itself. `multi` providers
//! accumulate an ordered sequence under one token instead of overwriting.
//!
//! Constructor parameters declared without an explicit `deps` list resolve
//! through a chain of [`ParameterHandler`]s. The handlers are themselves
//! injector-resolved values, so their behavior can be replaced by
//! registering a provider under the corresponding handler token.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use stratum_di::{
//!     arg, create_injector, token_of, Binding, Constructor, Dependency, InjectFlags,
//! };
//!
//! struct Config { url: String }
//! struct Database { config: Arc<Config> }
//!
//! let root = create_injector(
//!     vec![Binding::new(token_of::<Config>())
//!         .use_value(Config { url: "postgres://prod".into() })
//!         .into()],
//!     Some("root"),
//!     None,
//! )?;
//!
//! let request = create_injector(
//!     vec![Binding::new(token_of::<Database>())
//!         .construct(Constructor::new::<Database, _>(vec![], |args| {
//!             Ok(Database { config: arg::<Config>(args, 0)? })
//!         }))
//!         .deps(vec![Dependency::Token(token_of::<Config>())])
//!         .into()],
//!     Some("request"),
//!     Some(root),
//! )?;
//!
//! // Config lives in the root scope, Database in the request scope.
//! let db = request.get::<Database>()?;
//! assert_eq!(db.config.url, "postgres://prod");
//!
//! // Scope flags pin or redirect the search.
//! assert!(request
//!     .get_with::<Config>(&token_of::<Config>(), None, InjectFlags::SELF)
//!     .is_err());
//! # Ok::<(), stratum_di::DiError>(())
//! ```
//!
//! # Resolution semantics
//!
//! - Default flags are `SELF | PARENT`: local map first, then ancestors.
//! - Flags apply only at the originating injector; delegation resets them.
//! - A local record is terminal: its creation errors propagate, the parent
//!   is never consulted as a fallback for a failing record.
//! - Records memoize by value presence, so zero and empty values cache.
//! - Re-registering a bound token rewrites its record in place; every
//!   injector holding that record observes the new strategy.
//! - Cycles among providers fail with [`DiError::Cyclic`] and the full path.

mod dependency;
mod error;
mod flags;
mod handlers;
mod injector;
mod internal;
mod provider;
mod record;
mod registry;
mod token;

pub use error::{DiError, DiResult};
pub use flags::InjectFlags;
pub use handlers::{
    builtin_handler_providers, Modifier, NextHandler, ParamRequest, ParamSpec, ParameterHandler,
    DEFAULT_HANDLER, INJECT_HANDLER, OPTIONAL_HANDLER, SELF_HANDLER, SKIP_SELF_HANDLER,
};
pub use injector::{
    core_injector, create_injector, injector_factory, top_injector, Injector, InjectorFactory,
};
pub use provider::{
    arg, arg_opt, Binding, Constructor, DepOp, Dependency, FactoryFn, Provider,
};
pub use record::{AnyArc, Record, RecordFactory};
pub use token::{token_of, InjectionToken, Token};
