//! Scope flags controlling hierarchical lookup.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bitset controlling where [`Injector::resolve`](crate::Injector::resolve)
/// searches for a token.
///
/// The default is `SELF | PARENT`: look in the local record map first, then
/// walk up the parent chain. `SELF` alone pins the lookup to the current
/// injector; `OPTIONAL` substitutes the supplied default instead of failing
/// with [`DiError::NotFound`](crate::DiError::NotFound).
///
/// Flags apply only at the originating injector: parent delegation always
/// resets them to [`DEFAULT`](InjectFlags::DEFAULT).
///
/// # Examples
///
/// ```rust
/// use stratum_di::InjectFlags;
///
/// let flags = InjectFlags::SELF | InjectFlags::OPTIONAL;
/// assert!(flags.contains(InjectFlags::SELF));
/// assert!(flags.contains(InjectFlags::OPTIONAL));
/// assert!(!flags.contains(InjectFlags::PARENT));
/// assert!(InjectFlags::DEFAULT.contains(InjectFlags::SELF | InjectFlags::PARENT));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InjectFlags(u8);

impl InjectFlags {
    /// Search the injector's own record map.
    pub const SELF: InjectFlags = InjectFlags(1);
    /// Fall back to the parent chain.
    pub const PARENT: InjectFlags = InjectFlags(1 << 1);
    /// Substitute the default value instead of failing when unresolved.
    pub const OPTIONAL: InjectFlags = InjectFlags(1 << 2);
    /// `SELF | PARENT`: ordinary resolution.
    pub const DEFAULT: InjectFlags = InjectFlags(1 | 1 << 1);

    /// True when every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: InjectFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for InjectFlags {
    type Output = InjectFlags;

    #[inline]
    fn bitor(self, rhs: InjectFlags) -> InjectFlags {
        InjectFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for InjectFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: InjectFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for InjectFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.contains(InjectFlags::SELF) {
            parts.push("SELF");
        }
        if self.contains(InjectFlags::PARENT) {
            parts.push("PARENT");
        }
        if self.contains(InjectFlags::OPTIONAL) {
            parts.push("OPTIONAL");
        }
        if parts.is_empty() {
            parts.push("NONE");
        }
        write!(f, "InjectFlags({})", parts.join(" | "))
    }
}
