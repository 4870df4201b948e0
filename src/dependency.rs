//! Dependency-list resolution for explicit `deps` declarations.

use crate::error::{DiError, DiResult};
use crate::flags::InjectFlags;
use crate::injector::Injector;
use crate::provider::{DepOp, Dependency};
use crate::record::AnyArc;
use crate::token::Token;

/// Resolves one declared dependency against an injector.
///
/// A bare token resolves with default flags. An op list is scanned in order:
/// modifier entries OR their flag into an accumulator initialized to
/// [`InjectFlags::DEFAULT`]; the effective token is the last plain token
/// scanned, except that an explicit [`DepOp::Inject`] override beats plain
/// entries (last override wins among several).
pub(crate) fn resolve_dependency(
    injector: &Injector,
    dep: &Dependency,
) -> DiResult<Option<AnyArc>> {
    match dep {
        Dependency::Token(token) => injector.resolve(token, None, InjectFlags::DEFAULT),
        Dependency::Ops(ops) => {
            let mut flags = InjectFlags::DEFAULT;
            let mut token: Option<&Token> = None;
            let mut explicit = false;
            for op in ops {
                match op {
                    DepOp::Optional => flags |= InjectFlags::OPTIONAL,
                    DepOp::SkipSelf => flags |= InjectFlags::PARENT,
                    DepOp::SelfOnly => flags |= InjectFlags::SELF,
                    DepOp::Inject(t) => {
                        token = Some(t);
                        explicit = true;
                    }
                    DepOp::Token(t) => {
                        if !explicit {
                            token = Some(t);
                        }
                    }
                }
            }
            let token = token.ok_or(DiError::NotFound("<dependency without a token>"))?;
            injector.resolve(token, None, flags)
        }
    }
}
