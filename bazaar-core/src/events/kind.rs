//! Event identity and the type-erased envelope carried by the bus.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A value that can travel on the [`EventBus`](super::EventBus).
///
/// Every concrete event type is its own routing key: subscribers name the
/// types they want and receive exactly the values emitted with those types.
///
/// `field` exposes named fields as strings for
/// [`match_fields`](super::options::match_fields). Names are the Rust field
/// names. Types that don't override it expose no fields.
pub trait Event: Any + Send + Sync + fmt::Debug {
    fn field(&self, name: &str) -> Option<String> {
        let _ = name;
        None
    }
}

/// Routing key of an event type.
///
/// Two kinds are equal exactly when they were built from the same type.
#[derive(Clone, Copy)]
pub struct Kind {
    id: TypeId,
    name: &'static str,
}

impl Kind {
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
        }
    }

    /// Fully qualified type name.
    pub fn type_name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path.
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for Kind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Kind {}

impl Hash for Kind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Kind").field(&self.name).finish()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Anything that names a set of kinds for a subscription.
pub trait IntoKinds {
    fn into_kinds(self) -> Vec<Kind>;
}

impl IntoKinds for Kind {
    fn into_kinds(self) -> Vec<Kind> {
        vec![self]
    }
}

impl<const N: usize> IntoKinds for [Kind; N] {
    fn into_kinds(self) -> Vec<Kind> {
        self.to_vec()
    }
}

impl IntoKinds for &[Kind] {
    fn into_kinds(self) -> Vec<Kind> {
        self.to_vec()
    }
}

impl IntoKinds for Vec<Kind> {
    fn into_kinds(self) -> Vec<Kind> {
        self
    }
}

type Erased = dyn Any + Send + Sync;

/// An emitted event, shared by every subscriber it was delivered to.
///
/// Cloning an envelope clones the handle, not the event.
#[derive(Clone)]
pub struct Envelope {
    kind: Kind,
    value: Arc<Erased>,
    field: fn(&Erased, &str) -> Option<String>,
    debug: fn(&Erased, &mut fmt::Formatter<'_>) -> fmt::Result,
}

impl Envelope {
    pub fn new<E: Event>(event: E) -> Self {
        Self {
            kind: Kind::of::<E>(),
            value: Arc::new(event),
            field: field_of::<E>,
            debug: debug_of::<E>,
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is<E: Event>(&self) -> bool {
        (*self.value).is::<E>()
    }

    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        (*self.value).downcast_ref::<E>()
    }

    /// Named field of the inner event, see [`Event::field`].
    pub fn field(&self, name: &str) -> Option<String> {
        (self.field)(&*self.value, name)
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.debug)(&*self.value, f)
    }
}

fn field_of<E: Event>(value: &Erased, name: &str) -> Option<String> {
    value.downcast_ref::<E>().and_then(|event| event.field(name))
}

fn debug_of<E: Event>(value: &Erased, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value.downcast_ref::<E>() {
        Some(event) => fmt::Debug::fmt(event, f),
        None => f.write_str("<unknown event>"),
    }
}
