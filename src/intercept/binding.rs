use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::Serialize;
use tracing::debug;

type BindingKey = (usize, &'static str);
type Liveness = Box<dyn Fn() -> bool + Send + Sync>;

/// An installed host -> decorator association.
///
/// Holds only weak references: the table never keeps a host or a decorator
/// alive, and a binding disappears once either is dropped.
struct Binding {
    method: &'static str,
    host_alive: Liveness,
    wrapped_addr: usize,
    /// `Weak<T>` for the capability type the binding was made for.
    wrapped: Box<dyn Any + Send + Sync>,
    wrapped_alive: Liveness,
    installed: bool,
}

impl Binding {
    fn is_live(&self) -> bool {
        self.installed && (self.host_alive)() && (self.wrapped_alive)()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingInfo {
    pub method: &'static str,
    pub installed: bool,
}

/// Binding table keyed by (host identity, method name).
#[derive(Default)]
pub struct BindingTable {
    bindings: Mutex<HashMap<BindingKey, Binding>>,
}

impl fmt::Debug for BindingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingTable").field("bindings", &self.infos()).finish()
    }
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the decorator for `host.method`, creating it with `wrap` only
    /// when no live one exists.
    ///
    /// Passing a decorator this table produced returns it unchanged, so a
    /// capability is never wrapped twice.
    pub fn bind<T, F>(&self, host: &Arc<T>, method: &'static str, wrap: F) -> Arc<T>
    where
        T: ?Sized + Send + Sync + 'static,
        F: FnOnce(Arc<T>) -> Arc<T>,
    {
        let host_addr = addr(host);
        let mut bindings = self.bindings.lock().unwrap_or_else(PoisonError::into_inner);
        bindings.retain(|_, binding| binding.is_live());

        if bindings
            .values()
            .any(|binding| binding.method == method && binding.wrapped_addr == host_addr)
        {
            debug!(method, "capability already instrumented");
            return Arc::clone(host);
        }

        let existing = bindings
            .get(&(host_addr, method))
            .and_then(|binding| binding.wrapped.downcast_ref::<Weak<T>>())
            .and_then(Weak::upgrade);
        if let Some(wrapped) = existing {
            debug!(method, "reusing existing binding");
            return wrapped;
        }

        let wrapped = wrap(Arc::clone(host));
        let host_weak = Arc::downgrade(host);
        let wrapped_weak = Arc::downgrade(&wrapped);
        let wrapped_probe = wrapped_weak.clone();
        bindings.insert(
            (host_addr, method),
            Binding {
                method,
                host_alive: Box::new(move || host_weak.strong_count() > 0),
                wrapped_addr: addr(&wrapped),
                wrapped: Box::new(wrapped_weak),
                wrapped_alive: Box::new(move || wrapped_probe.strong_count() > 0),
                installed: true,
            },
        );
        debug!(method, "binding installed");
        wrapped
    }

    /// Live bindings.
    pub fn infos(&self) -> Vec<BindingInfo> {
        let bindings = self.bindings.lock().unwrap_or_else(PoisonError::into_inner);
        let mut infos: Vec<BindingInfo> = bindings
            .values()
            .filter(|binding| binding.is_live())
            .map(|binding| BindingInfo {
                method: binding.method,
                installed: binding.installed,
            })
            .collect();
        infos.sort_by(|a, b| a.method.cmp(b.method));
        infos
    }

    pub fn len(&self) -> usize {
        self.infos().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn addr<T: ?Sized>(arc: &Arc<T>) -> usize {
    Arc::as_ptr(arc) as *const () as usize
}
