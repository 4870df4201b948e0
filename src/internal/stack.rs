//! Thread-local resolution stack: cycle and depth detection.
//!
//! Resolution is synchronous and call-stack bound, so a provider cycle would
//! otherwise recurse until the call stack is exhausted. Each record creation
//! pushes its token onto a thread-local stack; re-entering a token already on
//! the stack fails fast with the full path instead.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};
use crate::token::Token;

const MAX_DEPTH: usize = 256;

thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<Token>> = const { RefCell::new(Vec::new()) };
}

struct FrameGuard;

impl Drop for FrameGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Runs `f` with `token` on the resolution stack.
///
/// Fails with [`DiError::Cyclic`] when the token is already being resolved
/// on this thread, and [`DiError::DepthExceeded`] past `MAX_DEPTH` frames.
pub(crate) fn with_resolution_frame<T, F>(token: &Token, f: F) -> DiResult<T>
where
    F: FnOnce() -> DiResult<T>,
{
    RESOLUTION_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        if stack.iter().any(|t| t == token) {
            let mut path: Vec<&'static str> = stack.iter().map(|t| t.display_name()).collect();
            path.push(token.display_name());
            return Err(DiError::Cyclic(path));
        }
        if stack.len() >= MAX_DEPTH {
            return Err(DiError::DepthExceeded(stack.len()));
        }
        stack.push(token.clone());
        Ok(())
    })?;

    let _guard = FrameGuard;
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_pop_on_success_and_error() {
        let token = Token::Tagged("frame");
        with_resolution_frame(&token, || Ok(())).unwrap();
        let _: DiResult<()> = with_resolution_frame(&token, || Err(DiError::NotFound("x")));
        // Token fully popped both times, so a fresh frame succeeds.
        with_resolution_frame(&token, || Ok(())).unwrap();
    }

    #[test]
    fn reentering_a_token_reports_the_cycle_path() {
        let a = Token::Tagged("a");
        let b = Token::Tagged("b");
        let result: DiResult<()> = with_resolution_frame(&a, || {
            with_resolution_frame(&b, || with_resolution_frame(&a, || Ok(())))
        });
        match result {
            Err(DiError::Cyclic(path)) => assert_eq!(path, vec!["a", "b", "a"]),
            other => panic!("expected cycle, got {:?}", other),
        }
    }
}
