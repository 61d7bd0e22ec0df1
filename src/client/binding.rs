//! Host context binding lifecycle
//!
//! A handle starts `Unbound`, binds its host context on the first control
//! call and caches it. Once `Released` it never binds again.

/// Binding state of a host context
pub enum Binding<C: ?Sized> {
    /// No context requested yet
    Unbound,
    /// Context bound and cached
    Bound(Box<C>),
    /// Handle was reset; control calls are rejected
    Released,
}

impl<C: ?Sized> Binding<C> {
    /// Bind with `create` if unbound; `None` once released
    pub fn ensure_bound<F>(&mut self, create: F) -> Option<&mut C>
    where
        F: FnOnce() -> Box<C>,
    {
        if let Binding::Unbound = self {
            *self = Binding::Bound(create());
        }

        match self {
            Binding::Bound(context) => Some(context.as_mut()),
            _ => None,
        }
    }

    /// Release the binding, returning the context if one was bound
    pub fn release(&mut self) -> Option<Box<C>> {
        match std::mem::replace(self, Binding::Released) {
            Binding::Bound(context) => Some(context),
            _ => None,
        }
    }

    /// Whether a context is currently bound
    pub fn is_bound(&self) -> bool {
        matches!(self, Binding::Bound(_))
    }

    /// Whether the handle was reset
    pub fn is_released(&self) -> bool {
        matches!(self, Binding::Released)
    }
}

impl<C: ?Sized> Default for Binding<C> {
    fn default() -> Self {
        Binding::Unbound
    }
}

impl<C: ?Sized> std::fmt::Debug for Binding<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self {
            Binding::Unbound => "Unbound",
            Binding::Bound(_) => "Bound",
            Binding::Released => "Released",
        };
        f.write_str(state)
    }
}
