//! Error types for the injector.

use std::fmt;

/// Resolution and registration errors.
///
/// Every failure in the crate is reported through this enum; nothing is
/// logged or swallowed except where the optional machinery explicitly
/// substitutes a default value.
///
/// # Examples
///
/// ```rust
/// use stratum_di::{create_injector, DiError};
///
/// #[derive(Debug)]
/// struct Missing;
///
/// let injector = create_injector(vec![], None, None).unwrap();
/// match injector.get::<Missing>() {
///     Err(DiError::NotFound(name)) => assert!(name.contains("Missing")),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// No record reachable for the token under the given scope flags.
    NotFound(&'static str),
    /// Skip-self resolution requested on an injector with no parent.
    ParentNotFound(&'static str),
    /// A binding matched none of the recognized provider shapes.
    UnknownProviderShape(&'static str),
    /// A record has neither a value nor a factory configured.
    RecordCreation(&'static str),
    /// A resolved value could not be downcast to the requested type.
    TypeMismatch(&'static str),
    /// Provider cycle detected during resolution (includes the path).
    Cyclic(Vec<&'static str>),
    /// Resolution recursed past the depth limit.
    DepthExceeded(usize),
    /// The injector backing a lazily-created record was dropped.
    InjectorDropped(&'static str),
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::NotFound(name) => write!(f, "No provider for token: {}", name),
            DiError::ParentNotFound(name) => {
                write!(f, "Skip-self resolution of {} but injector has no parent", name)
            }
            DiError::UnknownProviderShape(name) => {
                write!(f, "Unknown provider shape for token: {}", name)
            }
            DiError::RecordCreation(name) => {
                write!(f, "Record for {} has neither value nor factory", name)
            }
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::Cyclic(path) => {
                write!(f, "Cyclic dependency: {}", path.join(" -> "))
            }
            DiError::DepthExceeded(depth) => write!(f, "Max resolution depth {} exceeded", depth),
            DiError::InjectorDropped(name) => {
                write!(f, "Injector backing the record for {} was dropped", name)
            }
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for injector operations.
pub type DiResult<T> = Result<T, DiError>;
