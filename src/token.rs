//! Binding key types for the injector.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// Key under which a binding is stored in an [`Injector`](crate::Injector).
///
/// Tokens are compared by identity, never structurally: two tokens name the
/// same binding only when they carry the same `TypeId`, the same
/// [`InjectionToken`] id, or the same tag.
///
/// # Examples
///
/// ```rust
/// use stratum_di::{token_of, InjectionToken, Token};
///
/// struct Database;
///
/// // A type used as its own token
/// let ty = token_of::<Database>();
/// assert_eq!(ty, token_of::<Database>());
///
/// // Explicit tokens are identity-compared: same name, different tokens
/// let a: InjectionToken<u32> = InjectionToken::new("port");
/// let b: InjectionToken<u32> = InjectionToken::new("port");
/// assert_ne!(a.token(), b.token());
///
/// // Tags are nominal keys
/// assert_eq!(Token::Tagged("cfg"), Token::Tagged("cfg"));
/// ```
#[derive(Debug, Clone)]
pub enum Token {
    /// Concrete Rust type used as its own token, with name for diagnostics.
    Type(TypeId, &'static str),
    /// Explicit injection token created via [`InjectionToken::new`].
    Injection(u64, &'static str),
    /// String tag used as a nominal key.
    Tagged(&'static str),
}

impl Token {
    /// Human-readable name for diagnostics and error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Token::Type(_, name) => name,
            Token::Injection(_, name) => name,
            Token::Tagged(tag) => tag,
        }
    }
}

// Identity-only equality: the diagnostic name never participates.
impl PartialEq for Token {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Token::Type(a, _), Token::Type(b, _)) => a == b,
            (Token::Injection(a, _), Token::Injection(b, _)) => a == b,
            (Token::Tagged(a), Token::Tagged(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Token {}

impl std::hash::Hash for Token {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Token::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Token::Injection(id, _) => {
                1u8.hash(state);
                id.hash(state);
            }
            Token::Tagged(tag) => {
                2u8.hash(state);
                tag.hash(state);
            }
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Token for a concrete type `T`.
#[inline]
pub fn token_of<T: 'static>() -> Token {
    Token::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(0);

/// Explicit injection token carrying the value type it resolves to.
///
/// Useful when the same Rust type is bound under several distinct keys, or
/// when the binding key should not be a type at all (configuration values,
/// handler slots). Every `new` call mints a fresh identity.
///
/// # Examples
///
/// ```rust
/// use stratum_di::{create_injector, Binding, InjectionToken};
///
/// let port: InjectionToken<u16> = InjectionToken::new("http.port");
/// let injector = create_injector(
///     vec![Binding::new(port.token()).use_value(8080u16).into()],
///     None,
///     None,
/// ).unwrap();
///
/// assert_eq!(*injector.get_injection(&port).unwrap(), 8080);
/// ```
pub struct InjectionToken<T: ?Sized> {
    id: u64,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ?Sized> InjectionToken<T> {
    /// Creates a token with a fresh identity. The name is diagnostic only.
    pub fn new(name: &'static str) -> Self {
        Self {
            id: NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed),
            name,
            _marker: PhantomData,
        }
    }

    /// The untyped [`Token`] used as the map key.
    pub fn token(&self) -> Token {
        Token::Injection(self.id, self.name)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: ?Sized> fmt::Debug for InjectionToken<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionToken")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tokens_compare_by_type_id() {
        struct A;
        struct B;
        assert_eq!(token_of::<A>(), token_of::<A>());
        assert_ne!(token_of::<A>(), token_of::<B>());
    }

    #[test]
    fn injection_tokens_are_identity_keys() {
        let a: InjectionToken<String> = InjectionToken::new("same-name");
        let b: InjectionToken<String> = InjectionToken::new("same-name");
        assert_ne!(a.token(), b.token());
        assert_eq!(a.token(), a.token());
        assert_eq!(a.token().display_name(), "same-name");
    }

    #[test]
    fn variants_never_compare_equal() {
        struct A;
        assert_ne!(token_of::<A>(), Token::Tagged(std::any::type_name::<A>()));
    }
}
