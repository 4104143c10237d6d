//! Attached properties
//!
//! Values a parent element defines on its children (a dock side, a grid
//! cell, ...). Each node carries a small map keyed by [`AttachedKey`];
//! values are stored type-erased as an [`AttachedValue`] and read back
//! through [`AttachedType`].
//!
//! ```rust
//! use weft_layout::{AttachedKey, Invalidation};
//!
//! const ROW: AttachedKey = AttachedKey::new("Grid.Row", Invalidation::ParentLayout);
//! assert_eq!(ROW.name(), "Grid.Row");
//! ```

use smallvec::SmallVec;
use weft_core::{Color, Point, Size, Thickness};

use crate::property::Invalidation;

/// Identity and invalidation category of an attached property
#[derive(Clone, Copy, Debug)]
pub struct AttachedKey {
    name: &'static str,
    invalidation: Invalidation,
}

impl AttachedKey {
    pub const fn new(name: &'static str, invalidation: Invalidation) -> Self {
        Self { name, invalidation }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn invalidation(&self) -> Invalidation {
        self.invalidation
    }
}

impl PartialEq for AttachedKey {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for AttachedKey {}

/// Type-erased attached value
#[derive(Clone, Debug, PartialEq)]
pub enum AttachedValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Size(Size),
    Point(Point),
    Color(Color),
    Thickness(Thickness),
    Text(String),
}

/// Typed view of an [`AttachedValue`]
pub trait AttachedType: Sized {
    fn into_value(self) -> AttachedValue;
    fn from_value(value: &AttachedValue) -> Option<Self>;
}

macro_rules! attached_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl AttachedType for $ty {
                fn into_value(self) -> AttachedValue {
                    AttachedValue::$variant(self)
                }

                fn from_value(value: &AttachedValue) -> Option<Self> {
                    match value {
                        AttachedValue::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

attached_type! {
    bool => Bool,
    i64 => Int,
    f32 => Float,
    Size => Size,
    Point => Point,
    Color => Color,
    Thickness => Thickness,
    String => Text,
}

/// Per-node attached property storage
#[derive(Clone, Debug, Default)]
pub struct AttachedProperties {
    entries: SmallVec<[(AttachedKey, AttachedValue); 2]>,
}

impl AttachedProperties {
    pub fn get<T: AttachedType>(&self, key: AttachedKey) -> Option<T> {
        self.raw(key).and_then(T::from_value)
    }

    pub fn raw(&self, key: AttachedKey) -> Option<&AttachedValue> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Store a value; returns the key's category when the value changed
    pub fn set(&mut self, key: AttachedKey, value: AttachedValue) -> Option<Invalidation> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) if *existing == value => None,
            Some((_, existing)) => {
                *existing = value;
                Some(key.invalidation)
            }
            None => {
                self.entries.push((key, value));
                Some(key.invalidation)
            }
        }
    }

    pub fn remove(&mut self, key: AttachedKey) -> Option<Invalidation> {
        let index = self.entries.iter().position(|(k, _)| *k == key)?;
        self.entries.remove(index);
        Some(key.invalidation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
