// src/handler.rs

//! Uniform event handler type.
//!
//! Every subscription holds a [`Handler`]: a boxed closure built once at
//! registration time that the router calls with no further arguments of
//! its own choosing. Whatever state the callback needs (extra arguments, a
//! shared object, a channel sender) is captured up front.
//!
//! Three factories cover the usual shapes:
//!
//! - [`Handler::new`] for a plain closure or free function,
//! - [`Handler::bind`] to fix arguments (a single value, a tuple, or a
//!   shared object) at registration time,
//! - [`Handler::with_event`] when the callback wants to see the event that
//!   matched.
//!
//! The callback may return `()`, `bool` or any `Result<T, E>` with a
//! displayable error. The router never looks at successful return values;
//! `false` and `Err(_)` are recorded as handler failures.

use std::fmt;

use crate::event::Event;

/// Outcome of one handler invocation, as seen by the router.
pub type HandlerResult = std::result::Result<(), String>;

/// Return types a handler callback may have.
pub trait HandlerOutput {
    fn into_outcome(self) -> HandlerResult;
}

impl HandlerOutput for () {
    fn into_outcome(self) -> HandlerResult {
        Ok(())
    }
}

impl HandlerOutput for bool {
    fn into_outcome(self) -> HandlerResult {
        if self {
            Ok(())
        } else {
            Err("handler returned false".to_string())
        }
    }
}

impl<T, E: fmt::Display> HandlerOutput for Result<T, E> {
    fn into_outcome(self) -> HandlerResult {
        self.map(|_| ()).map_err(|e| e.to_string())
    }
}

type BoxedCallback = Box<dyn FnMut(&Event) -> HandlerResult + Send>;

pub struct Handler {
    callback: BoxedCallback,
}

impl Handler {
    /// Wrap a zero-argument callback.
    pub fn new<F, R>(mut f: F) -> Self
    where
        F: FnMut() -> R + Send + 'static,
        R: HandlerOutput,
    {
        Self {
            callback: Box::new(move |_event| f().into_outcome()),
        }
    }

    /// Partially apply `f` to `state`.
    ///
    /// `state` lives inside the handler and is handed to `f` by mutable
    /// reference on every invocation. Use a tuple to bind several
    /// arguments, or an `Arc<Mutex<T>>` to call into a shared object.
    pub fn bind<S, F, R>(mut state: S, mut f: F) -> Self
    where
        S: Send + 'static,
        F: FnMut(&mut S) -> R + Send + 'static,
        R: HandlerOutput,
    {
        Self {
            callback: Box::new(move |_event| f(&mut state).into_outcome()),
        }
    }

    /// Wrap a callback that receives the matched event.
    pub fn with_event<F, R>(mut f: F) -> Self
    where
        F: FnMut(&Event) -> R + Send + 'static,
        R: HandlerOutput,
    {
        Self {
            callback: Box::new(move |event| f(event).into_outcome()),
        }
    }

    pub(crate) fn invoke(&mut self, event: &Event) -> HandlerResult {
        (self.callback)(event)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}
