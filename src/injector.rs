//! The hierarchical injector: token → record container with parent fallback.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use crate::error::{DiError, DiResult};
use crate::flags::InjectFlags;
use crate::handlers::builtin_handler_providers;
use crate::internal::with_resolution_frame;
use crate::provider::Provider;
use crate::record::{AnyArc, Record};
use crate::registry::register_provider;
use crate::token::{token_of, InjectionToken, Token};

#[cfg(feature = "ahash")]
type RecordMap = HashMap<Token, Arc<Record>, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
type RecordMap = HashMap<Token, Arc<Record>>;

struct InjectorInner {
    name: Option<&'static str>,
    parent: Option<Injector>,
    records: Mutex<RecordMap>,
}

/// Hierarchical dependency-injection container.
///
/// An injector owns a token → [`Record`] map and optionally points at a
/// parent injector. Resolution looks in the local map first, then walks up
/// the parent chain, as directed by [`InjectFlags`]. Records are created
/// lazily on first `get` and cached for the injector's lifetime.
///
/// `Injector` is a cheap-clone handle; clones share the same record map.
/// Every injector binds [`Injector::token`] to itself, so components can
/// inject the current injector like any other dependency.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use stratum_di::{arg, create_injector, token_of, Binding, Constructor, Dependency, ParamSpec};
///
/// struct Config { url: String }
/// struct Database { config: Arc<Config> }
///
/// let injector = create_injector(
///     vec![
///         Binding::new(token_of::<Config>())
///             .use_value(Config { url: "postgres://localhost".into() })
///             .into(),
///         Binding::new(token_of::<Database>())
///             .construct(Constructor::new::<Database, _>(vec![], |args| {
///                 Ok(Database { config: arg::<Config>(args, 0)? })
///             }))
///             .deps(vec![Dependency::Token(token_of::<Config>())])
///             .into(),
///     ],
///     None,
///     None,
/// ).unwrap();
///
/// let db = injector.get::<Database>().unwrap();
/// assert_eq!(db.config.url, "postgres://localhost");
///
/// // Memoized: same instance on the second lookup.
/// let again = injector.get::<Database>().unwrap();
/// assert!(Arc::ptr_eq(&db, &again));
/// # let _ = ParamSpec::of::<Config>();
/// ```
pub struct Injector {
    inner: Arc<InjectorInner>,
}

impl Clone for Injector {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Injector {
    /// Builds an injector from a provider list, registering in order.
    pub fn new(
        providers: Vec<Provider>,
        name: Option<&'static str>,
        parent: Option<Injector>,
    ) -> DiResult<Injector> {
        let injector = Injector {
            inner: Arc::new(InjectorInner {
                name,
                parent,
                records: Mutex::new(RecordMap::default()),
            }),
        };
        injector.install_self_record();
        for provider in providers {
            register_provider(&injector, provider)?;
        }
        Ok(injector)
    }

    /// The token under which every injector binds itself.
    pub fn token() -> Token {
        token_of::<Injector>()
    }

    // The self record is Weak-backed and non-memoizing so the injector does
    // not keep itself alive through its own map.
    fn install_self_record(&self) {
        let name = std::any::type_name::<Injector>();
        let weak = self.downgrade();
        let record = Record::with_passthrough_factory(
            name,
            Arc::new(move || {
                let injector = weak.upgrade().ok_or(DiError::InjectorDropped(name))?;
                Ok(Arc::new(injector) as AnyArc)
            }),
        );
        self.insert_record(Self::token(), Arc::new(record));
    }

    /// Diagnostic name, if one was given at construction.
    pub fn name(&self) -> Option<&'static str> {
        self.inner.name
    }

    /// The parent injector, if any.
    pub fn parent(&self) -> Option<Injector> {
        self.inner.parent.clone()
    }

    /// True when both handles share the same underlying injector.
    pub fn ptr_eq(&self, other: &Injector) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Incrementally registers one more provider.
    ///
    /// A `multi` provider for an already-bound token augments the existing
    /// record (chaining the sequence); a non-multi one rewrites the existing
    /// record's strategy in place.
    pub fn register(&self, provider: impl Into<Provider>) -> DiResult<()> {
        register_provider(self, provider.into())
    }

    /// Core hierarchical lookup.
    ///
    /// With `SELF` set and a local record present, the record's creation is
    /// terminal: its value is returned and its errors propagate, the parent
    /// is never consulted. Otherwise, with `PARENT` set and a parent
    /// available, delegates upward with flags reset to
    /// [`InjectFlags::DEFAULT`]. Otherwise `OPTIONAL` substitutes `default`,
    /// and anything else fails with [`DiError::NotFound`].
    pub fn resolve(
        &self,
        token: &Token,
        default: Option<AnyArc>,
        flags: InjectFlags,
    ) -> DiResult<Option<AnyArc>> {
        if flags.contains(InjectFlags::SELF) {
            let record = self.inner.records.lock().unwrap().get(token).cloned();
            if let Some(record) = record {
                return with_resolution_frame(token, || record.create()).map(Some);
            }
        }
        if flags.contains(InjectFlags::PARENT) {
            if let Some(parent) = &self.inner.parent {
                return parent.resolve(token, default, InjectFlags::DEFAULT);
            }
        }
        if flags.contains(InjectFlags::OPTIONAL) {
            return Ok(default);
        }
        Err(DiError::NotFound(token.display_name()))
    }

    /// Resolves a concrete type bound under its own type token.
    pub fn get<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.get_token(&token_of::<T>())
    }

    /// Resolves `token` with default flags and downcasts to `T`.
    pub fn get_token<T: Send + Sync + 'static>(&self, token: &Token) -> DiResult<Arc<T>> {
        let value = self
            .resolve(token, None, InjectFlags::DEFAULT)?
            .ok_or(DiError::NotFound(token.display_name()))?;
        value
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(token.display_name()))
    }

    /// Resolves an explicit [`InjectionToken`], keeping its value type.
    pub fn get_injection<T: Send + Sync + 'static>(
        &self,
        token: &InjectionToken<T>,
    ) -> DiResult<Arc<T>> {
        self.get_token(&token.token())
    }

    /// Resolves with explicit flags and a typed default.
    ///
    /// Returns `Ok(None)` only when `OPTIONAL` is set, the token is
    /// unresolved, and no default was supplied.
    pub fn get_with<T: Send + Sync + 'static>(
        &self,
        token: &Token,
        default: Option<Arc<T>>,
        flags: InjectFlags,
    ) -> DiResult<Option<Arc<T>>> {
        let default = default.map(|d| d as AnyArc);
        match self.resolve(token, default, flags)? {
            Some(value) => value
                .downcast::<T>()
                .map(Some)
                .map_err(|_| DiError::TypeMismatch(token.display_name())),
            None => Ok(None),
        }
    }

    /// Resolves a multi-binding to its accumulated ordered sequence.
    pub fn get_all<T: Send + Sync + 'static>(&self, token: &Token) -> DiResult<Vec<Arc<T>>> {
        let value = self
            .resolve(token, None, InjectFlags::DEFAULT)?
            .ok_or(DiError::NotFound(token.display_name()))?;
        let sequence = value
            .downcast::<Vec<AnyArc>>()
            .map_err(|_| DiError::TypeMismatch(token.display_name()))?;
        sequence
            .iter()
            .map(|item| {
                item.clone()
                    .downcast::<T>()
                    .map_err(|_| DiError::TypeMismatch(token.display_name()))
            })
            .collect()
    }

    /// Looks up a record in this injector or any ancestor.
    pub(crate) fn find_record(&self, token: &Token) -> Option<Arc<Record>> {
        if let Some(record) = self.inner.records.lock().unwrap().get(token) {
            return Some(record.clone());
        }
        self.inner
            .parent
            .as_ref()
            .and_then(|parent| parent.find_record(token))
    }

    pub(crate) fn insert_record(&self, token: Token, record: Arc<Record>) {
        self.inner.records.lock().unwrap().insert(token, record);
    }

    pub(crate) fn downgrade(&self) -> WeakInjector {
        WeakInjector(Arc::downgrade(&self.inner))
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("name", &self.inner.name)
            .field("records", &self.inner.records.lock().unwrap().len())
            .field("has_parent", &self.inner.parent.is_some())
            .finish()
    }
}

/// Weak handle captured by record factories, so records never keep their
/// injector alive.
pub(crate) struct WeakInjector(Weak<InjectorInner>);

impl WeakInjector {
    pub(crate) fn upgrade(&self) -> Option<Injector> {
        self.0.upgrade().map(|inner| Injector { inner })
    }
}

/// Builds an injector from a provider list.
///
/// # Examples
///
/// ```rust
/// use stratum_di::{create_injector, token_of, Binding};
///
/// let parent = create_injector(
///     vec![Binding::new(token_of::<u32>()).use_value(7u32).into()],
///     Some("root"),
///     None,
/// ).unwrap();
/// let child = create_injector(vec![], Some("child"), Some(parent)).unwrap();
///
/// // Parent fallback with default flags.
/// assert_eq!(*child.get::<u32>().unwrap(), 7);
/// ```
pub fn create_injector(
    providers: Vec<Provider>,
    name: Option<&'static str>,
    parent: Option<Injector>,
) -> DiResult<Injector> {
    Injector::new(providers, name, parent)
}

/// A reusable recipe for building injectors over a fixed parent.
pub type InjectorFactory = Arc<dyn Fn(Vec<Provider>) -> DiResult<Injector> + Send + Sync>;

/// Root injector named `"top"` with no parent.
pub fn top_injector(providers: Vec<Provider>) -> DiResult<Injector> {
    Injector::new(providers, Some("top"), None)
}

/// Builds the parent once from `providers`, then returns a factory producing
/// siblings under it.
pub fn injector_factory(
    parent: InjectorFactory,
    name: &'static str,
    providers: Vec<Provider>,
) -> DiResult<InjectorFactory> {
    let parent_injector = parent(providers)?;
    Ok(Arc::new(move |all| {
        Injector::new(all, Some(name), Some(parent_injector.clone()))
    }))
}

/// Injector named `"core"` whose `"top"` parent carries the built-in
/// parameter handlers, so types registered without explicit `deps` resolve
/// through the handler chain.
///
/// # Examples
///
/// ```rust
/// use stratum_di::{core_injector, Constructor, ParamSpec, Provider};
///
/// struct Greeter;
/// struct App { _greeter: std::sync::Arc<Greeter> }
///
/// let injector = core_injector(vec![
///     Provider::Type(Constructor::new::<Greeter, _>(vec![], |_| Ok(Greeter))),
///     Provider::Type(Constructor::new::<App, _>(
///         vec![ParamSpec::of::<Greeter>()],
///         |args| Ok(App { _greeter: stratum_di::arg::<Greeter>(args, 0)? }),
///     )),
/// ]).unwrap();
///
/// assert!(injector.get::<App>().is_ok());
/// ```
pub fn core_injector(providers: Vec<Provider>) -> DiResult<Injector> {
    let top = top_injector(builtin_handler_providers())?;
    Injector::new(providers, Some("core"), Some(top))
}
