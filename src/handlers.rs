//! Parameter-handler chain for constructor parameters declared without an
//! explicit `deps` list.
//!
//! Each parameter carries an ordered modifier list ([`ParamSpec`]). The list,
//! with the implicit default-type handler appended innermost, is folded
//! right-to-left into a chain of handlers: the first modifier in the list is
//! the outermost wrapper, and the handler implementation for each modifier is
//! looked up in the injector at call time under its own token. Registering a
//! provider for one of those tokens therefore replaces the handler's
//! behavior: it rewrites the handler record in place, wherever in the
//! hierarchy that record lives.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::flags::InjectFlags;
use crate::injector::Injector;
use crate::provider::{Binding, Provider};
use crate::record::AnyArc;
use crate::token::{token_of, Token};

/// Handler token for the implicit default-type handler.
pub const DEFAULT_HANDLER: Token = Token::Tagged("stratum.handler.default");
/// Handler token for [`Modifier::Optional`].
pub const OPTIONAL_HANDLER: Token = Token::Tagged("stratum.handler.optional");
/// Handler token for [`Modifier::SkipSelf`].
pub const SKIP_SELF_HANDLER: Token = Token::Tagged("stratum.handler.skip_self");
/// Handler token for [`Modifier::SelfOnly`].
pub const SELF_HANDLER: Token = Token::Tagged("stratum.handler.self");
/// Handler token for [`Modifier::Inject`].
pub const INJECT_HANDLER: Token = Token::Tagged("stratum.handler.inject");

/// A resolution modifier applied to one constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    /// Substitute `None` when the inner chain fails.
    Optional,
    /// Start resolution at the parent injector.
    SkipSelf,
    /// Resolve in the current injector only.
    SelfOnly,
    /// Resolve the given token instead of the declared parameter type.
    Inject(Token),
}

impl Modifier {
    /// The token under which this modifier's handler is registered.
    pub fn handler_token(&self) -> Token {
        match self {
            Modifier::Optional => OPTIONAL_HANDLER,
            Modifier::SkipSelf => SKIP_SELF_HANDLER,
            Modifier::SelfOnly => SELF_HANDLER,
            Modifier::Inject(_) => INJECT_HANDLER,
        }
    }

    fn inject_token(&self) -> Option<&Token> {
        match self {
            Modifier::Inject(token) => Some(token),
            _ => None,
        }
    }
}

/// Ordered parameter descriptor: the declared type (used as the implicit
/// token) plus modifiers, outermost first.
///
/// # Examples
///
/// ```rust
/// use stratum_di::{ParamSpec, Modifier, token_of};
///
/// struct Logger;
///
/// // `Optional` wraps `Inject`: the inject handler resolves, the optional
/// // handler turns any failure into `None`.
/// let spec = ParamSpec::of::<Logger>()
///     .optional()
///     .inject(token_of::<Logger>());
/// assert_eq!(spec.modifiers()[0], Modifier::Optional);
/// ```
#[derive(Debug, Clone)]
pub struct ParamSpec {
    declared: Token,
    modifiers: Vec<Modifier>,
}

impl ParamSpec {
    /// Parameter declared as type `T`, no modifiers.
    pub fn of<T: 'static>() -> Self {
        Self::with_declared(token_of::<T>())
    }

    /// Parameter declared under an arbitrary token.
    pub fn with_declared(declared: Token) -> Self {
        Self {
            declared,
            modifiers: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.modifiers.push(Modifier::Optional);
        self
    }

    pub fn skip_self(mut self) -> Self {
        self.modifiers.push(Modifier::SkipSelf);
        self
    }

    pub fn self_only(mut self) -> Self {
        self.modifiers.push(Modifier::SelfOnly);
        self
    }

    pub fn inject(mut self, token: Token) -> Self {
        self.modifiers.push(Modifier::Inject(token));
        self
    }

    pub fn declared(&self) -> &Token {
        &self.declared
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }
}

/// Metadata handed to a handler: the parameter's declared token and, for
/// inject overrides, the token captured at declaration time.
#[derive(Debug, Clone)]
pub struct ParamRequest {
    pub declared: Token,
    pub token_arg: Option<Token>,
}

/// The inner continuation of a handler chain.
pub type NextHandler = Arc<dyn Fn(&Injector, Option<AnyArc>) -> DiResult<Option<AnyArc>> + Send + Sync>;

type HandlerFn =
    Box<dyn Fn(&Injector, &ParamRequest, NextHandler, Option<AnyArc>) -> DiResult<Option<AnyArc>> + Send + Sync>;

/// A parameter-resolution handler, stored in records like any other value.
///
/// A handler decides whether to resolve directly or delegate to `next` with
/// a possibly substituted default. Custom handlers registered under one of
/// the handler tokens replace the built-in behavior.
pub struct ParameterHandler {
    f: HandlerFn,
}

impl ParameterHandler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Injector, &ParamRequest, NextHandler, Option<AnyArc>) -> DiResult<Option<AnyArc>>
            + Send
            + Sync
            + 'static,
    {
        Self { f: Box::new(f) }
    }

    pub fn call(
        &self,
        injector: &Injector,
        request: &ParamRequest,
        next: NextHandler,
        default: Option<AnyArc>,
    ) -> DiResult<Option<AnyArc>> {
        (self.f)(injector, request, next, default)
    }
}

impl std::fmt::Debug for ParameterHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ParameterHandler")
    }
}

/// Resolves every parameter of a constructor through its handler chain.
pub(crate) fn resolve_parameters(
    injector: &Injector,
    params: &[ParamSpec],
) -> DiResult<Vec<Option<AnyArc>>> {
    params
        .iter()
        .map(|param| resolve_parameter(injector, param))
        .collect()
}

fn resolve_parameter(injector: &Injector, param: &ParamSpec) -> DiResult<Option<AnyArc>> {
    // Innermost seed: hand back whatever default reached it.
    let mut chain: NextHandler = Arc::new(|_, def| Ok(def));

    // Implicit default-type entry is the innermost fallback, then user
    // modifiers wrap it back-to-front so the first-listed one is outermost.
    chain = wrap(
        DEFAULT_HANDLER,
        ParamRequest {
            declared: param.declared.clone(),
            token_arg: None,
        },
        chain,
    );
    for modifier in param.modifiers.iter().rev() {
        let request = ParamRequest {
            declared: param.declared.clone(),
            token_arg: modifier.inject_token().cloned(),
        };
        chain = wrap(modifier.handler_token(), request, chain);
    }

    chain(injector, None)
}

fn wrap(handler_token: Token, request: ParamRequest, inner: NextHandler) -> NextHandler {
    Arc::new(move |injector: &Injector, default| {
        // Looked up against whichever injector the chain is currently
        // walking, so skip-self rebinds the rest of the chain to the parent.
        let handler = injector.get_token::<ParameterHandler>(&handler_token)?;
        handler.call(injector, &request, inner.clone(), default)
    })
}

/// The built-in handlers as ordinary providers.
///
/// [`core_injector`](crate::core_injector) registers these in the `"top"`
/// injector; custom setups can register them (or replacements) anywhere in
/// the hierarchy.
pub fn builtin_handler_providers() -> Vec<Provider> {
    vec![
        Binding::new(DEFAULT_HANDLER)
            .use_value(ParameterHandler::new(default_handler))
            .into(),
        Binding::new(OPTIONAL_HANDLER)
            .use_value(ParameterHandler::new(optional_handler))
            .into(),
        Binding::new(SKIP_SELF_HANDLER)
            .use_value(ParameterHandler::new(skip_self_handler))
            .into(),
        Binding::new(SELF_HANDLER)
            .use_value(ParameterHandler::new(self_handler))
            .into(),
        Binding::new(INJECT_HANDLER)
            .use_value(ParameterHandler::new(inject_handler))
            .into(),
    ]
}

/// Resolves the declared parameter type unless an outer handler already
/// produced a value, then forwards.
fn default_handler(
    injector: &Injector,
    request: &ParamRequest,
    next: NextHandler,
    default: Option<AnyArc>,
) -> DiResult<Option<AnyArc>> {
    if default.is_some() {
        return next(injector, default);
    }
    let value = injector.resolve(&request.declared, None, InjectFlags::DEFAULT)?;
    next(injector, value)
}

/// Converts any failure of the inner chain into a `None` substitution.
fn optional_handler(
    injector: &Injector,
    _request: &ParamRequest,
    next: NextHandler,
    default: Option<AnyArc>,
) -> DiResult<Option<AnyArc>> {
    match next(injector, default) {
        Ok(value) => Ok(value),
        Err(_) => Ok(None),
    }
}

/// Hands the rest of the chain to the parent injector.
fn skip_self_handler(
    injector: &Injector,
    request: &ParamRequest,
    next: NextHandler,
    default: Option<AnyArc>,
) -> DiResult<Option<AnyArc>> {
    match injector.parent() {
        Some(parent) => next(&parent, default),
        None => Err(DiError::ParentNotFound(request.declared.display_name())),
    }
}

/// Resolves the declared type in the current injector only, then forwards.
fn self_handler(
    injector: &Injector,
    request: &ParamRequest,
    next: NextHandler,
    default: Option<AnyArc>,
) -> DiResult<Option<AnyArc>> {
    if default.is_some() {
        return next(injector, default);
    }
    let value = injector.resolve(&request.declared, None, InjectFlags::SELF)?;
    next(injector, value)
}

/// Resolves the override token captured at declaration time, ignoring the
/// declared parameter type.
fn inject_handler(
    injector: &Injector,
    request: &ParamRequest,
    next: NextHandler,
    default: Option<AnyArc>,
) -> DiResult<Option<AnyArc>> {
    let token = request.token_arg.as_ref().unwrap_or(&request.declared);
    let value = injector.resolve(token, default.clone(), InjectFlags::DEFAULT)?;
    next(injector, value)
}
