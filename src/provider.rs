//! Provider declarations: how a token's value gets produced.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::handlers::ParamSpec;
use crate::record::AnyArc;
use crate::token::{token_of, Token};

/// Positional-argument factory closure. Each slot is the resolved value of
/// the corresponding `deps` entry; optional dependencies resolve to `None`.
pub type FactoryFn = Arc<dyn Fn(&[Option<AnyArc>]) -> DiResult<AnyArc> + Send + Sync>;

/// Explicit constructor descriptor for a type.
///
/// The ordered [`ParamSpec`] list describes each constructor parameter, and
/// the build closure instantiates the type from the resolved arguments.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use stratum_di::{arg, Constructor, ParamSpec};
///
/// struct Config { port: u16 }
/// struct Server { config: Arc<Config> }
///
/// let ctor = Constructor::new::<Server, _>(
///     vec![ParamSpec::of::<Config>()],
///     |args| Ok(Server { config: arg::<Config>(args, 0)? }),
/// );
/// assert!(ctor.token().display_name().contains("Server"));
/// ```
#[derive(Clone)]
pub struct Constructor {
    token: Token,
    params: Vec<ParamSpec>,
    build: FactoryFn,
}

impl Constructor {
    /// Describes how to construct `T` from its resolved parameters.
    pub fn new<T, F>(params: Vec<ParamSpec>, build: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&[Option<AnyArc>]) -> DiResult<T> + Send + Sync + 'static,
    {
        Self {
            token: token_of::<T>(),
            params,
            build: Arc::new(move |args| Ok(Arc::new(build(args)?) as AnyArc)),
        }
    }

    /// The token this constructor produces (the type itself).
    pub fn token(&self) -> &Token {
        &self.token
    }

    pub(crate) fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub(crate) fn build(&self, args: &[Option<AnyArc>]) -> DiResult<AnyArc> {
        (self.build)(args)
    }
}

impl std::fmt::Debug for Constructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constructor")
            .field("token", &self.token)
            .field("params", &self.params.len())
            .finish()
    }
}

/// A single dependency-list entry: a token or a resolution modifier.
///
/// A dependency declared as an op list mixes exactly one effective token
/// with zero or more modifiers, in scan order.
#[derive(Debug, Clone)]
pub enum DepOp {
    /// Plain token entry.
    Token(Token),
    /// Suppress the not-found failure; the dependency resolves to `None`.
    Optional,
    /// OR the parent-search bit into the accumulated flags.
    SkipSelf,
    /// OR the self-search bit into the accumulated flags.
    SelfOnly,
    /// Explicit token override; beats plain token entries.
    Inject(Token),
}

/// A constructor or factory dependency: a bare token, or an ordered op list.
#[derive(Debug, Clone)]
pub enum Dependency {
    Token(Token),
    Ops(Vec<DepOp>),
}

impl From<Token> for Dependency {
    fn from(token: Token) -> Self {
        Dependency::Token(token)
    }
}

/// A fully spelled-out binding from a token to a construction strategy.
///
/// Mirrors the provider literal shapes: exactly one of `use_value`,
/// `use_class`, `use_factory`, `use_existing`, or `construct` must be set;
/// registering a binding with none of them fails with
/// [`DiError::UnknownProviderShape`].
///
/// # Examples
///
/// ```rust
/// use stratum_di::{create_injector, token_of, Binding};
///
/// struct Config { port: u16 }
///
/// let injector = create_injector(
///     vec![Binding::new(token_of::<Config>())
///         .use_value(Config { port: 8080 })
///         .into()],
///     None,
///     None,
/// ).unwrap();
/// assert_eq!(injector.get::<Config>().unwrap().port, 8080);
/// ```
#[derive(Clone)]
pub struct Binding {
    pub(crate) provide: Token,
    pub(crate) multi: bool,
    pub(crate) use_value: Option<AnyArc>,
    pub(crate) use_class: Option<Constructor>,
    pub(crate) use_factory: Option<FactoryFn>,
    pub(crate) use_existing: Option<Token>,
    pub(crate) construct: Option<Constructor>,
    pub(crate) deps: Option<Vec<Dependency>>,
}

impl Binding {
    pub fn new(provide: Token) -> Self {
        Self {
            provide,
            multi: false,
            use_value: None,
            use_class: None,
            use_factory: None,
            use_existing: None,
            construct: None,
            deps: None,
        }
    }

    /// The token this binding satisfies.
    pub fn provide(&self) -> &Token {
        &self.provide
    }

    /// Bind the token to a fixed value.
    pub fn use_value<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.use_value = Some(Arc::new(value) as AnyArc);
        self
    }

    /// Bind the token to an already type-erased value.
    pub fn use_value_arc(mut self, value: AnyArc) -> Self {
        self.use_value = Some(value);
        self
    }

    /// Bind the token to another type's constructor. Without an explicit
    /// `deps` list the constructor's own [`ParamSpec`]s drive resolution
    /// through the parameter-handler chain.
    pub fn use_class(mut self, ctor: Constructor) -> Self {
        self.use_class = Some(ctor);
        self
    }

    /// Bind the token to a factory invoked with the resolved `deps`.
    pub fn use_factory<T, F>(mut self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&[Option<AnyArc>]) -> DiResult<T> + Send + Sync + 'static,
    {
        self.use_factory = Some(Arc::new(move |args| Ok(Arc::new(factory(args)?) as AnyArc)));
        self
    }

    /// Alias: resolving this token re-queries `target` on every access.
    pub fn use_existing(mut self, target: Token) -> Self {
        self.use_existing = Some(target);
        self
    }

    /// Constructor-provider: the token is itself the constructible type.
    pub fn construct(mut self, ctor: Constructor) -> Self {
        self.construct = Some(ctor);
        self
    }

    /// Explicit dependency list for `use_class`, `use_factory`, `construct`.
    pub fn deps(mut self, deps: Vec<Dependency>) -> Self {
        self.deps = Some(deps);
        self
    }

    /// Accumulate into an ordered sequence instead of overwriting.
    pub fn multi(mut self) -> Self {
        self.multi = true;
        self
    }

    // Classifier predicates, checked in declaration order.

    pub fn is_use_value(&self) -> bool {
        self.use_value.is_some()
    }

    pub fn is_use_class(&self) -> bool {
        self.use_class.is_some()
    }

    pub fn is_use_factory(&self) -> bool {
        self.use_factory.is_some()
    }

    pub fn is_use_existing(&self) -> bool {
        self.use_existing.is_some()
    }

    pub fn is_constructor(&self) -> bool {
        self.construct.is_some()
    }

    /// Classifies the binding into exactly one shape, checked in declaration
    /// order.
    pub(crate) fn classify(&self) -> DiResult<Shape<'_>> {
        if let Some(value) = &self.use_value {
            Ok(Shape::Value(value))
        } else if let Some(ctor) = &self.use_class {
            Ok(Shape::Class(ctor))
        } else if let Some(factory) = &self.use_factory {
            Ok(Shape::Factory(factory))
        } else if let Some(target) = &self.use_existing {
            Ok(Shape::Existing(target))
        } else if let Some(ctor) = &self.construct {
            Ok(Shape::Ctor(ctor))
        } else {
            Err(DiError::UnknownProviderShape(self.provide.display_name()))
        }
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("provide", &self.provide)
            .field("multi", &self.multi)
            .field("value", &self.use_value.is_some())
            .field("class", &self.use_class.is_some())
            .field("factory", &self.use_factory.is_some())
            .field("existing", &self.use_existing)
            .field("construct", &self.construct.is_some())
            .finish()
    }
}

/// The classified shape of a [`Binding`].
pub(crate) enum Shape<'a> {
    Value(&'a AnyArc),
    Class(&'a Constructor),
    Factory(&'a FactoryFn),
    Existing(&'a Token),
    Ctor(&'a Constructor),
}

/// A provider declaration supplied to injector construction.
#[derive(Debug, Clone)]
pub enum Provider {
    /// Bare constructible type: token = the type itself.
    Type(Constructor),
    /// Fully spelled-out binding.
    Bind(Binding),
    /// Nested group, flattened recursively in order.
    Group(Vec<Provider>),
}

impl From<Constructor> for Provider {
    fn from(ctor: Constructor) -> Self {
        Provider::Type(ctor)
    }
}

impl From<Binding> for Provider {
    fn from(binding: Binding) -> Self {
        Provider::Bind(binding)
    }
}

impl From<Vec<Provider>> for Provider {
    fn from(group: Vec<Provider>) -> Self {
        Provider::Group(group)
    }
}

/// Downcasts the required argument at `index` in a factory or constructor
/// body.
pub fn arg<T: Send + Sync + 'static>(args: &[Option<AnyArc>], index: usize) -> DiResult<Arc<T>> {
    match args.get(index) {
        Some(Some(value)) => value
            .clone()
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>())),
        _ => Err(DiError::NotFound(std::any::type_name::<T>())),
    }
}

/// Downcasts the optional argument at `index`; `Ok(None)` when the dependency
/// was optional and unresolved.
pub fn arg_opt<T: Send + Sync + 'static>(
    args: &[Option<AnyArc>],
    index: usize,
) -> DiResult<Option<Arc<T>>> {
    match args.get(index) {
        Some(Some(value)) => value
            .clone()
            .downcast::<T>()
            .map(Some)
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>())),
        _ => Ok(None),
    }
}
