//! Safe conversion of host values.
//!
//! [`ToSafe`] is the recursive conversion rule: every host value that can reach
//! a template goes through it. Structured host types opt in with [`Expose`],
//! listing the members a template may read. Members that are not listed do
//! not exist as far as templates are concerned, and methods never do.
//!
//! The [`expose!`](crate::expose!) macro writes both impls from a field list:
//!
//! ```rust
//! use template_sandbox::expose;
//!
//! struct Customer {
//!     name: String,
//!     email: String,
//!     password_hash: String,
//! }
//!
//! expose!(Customer { name, email });
//! ```

use crate::value::{SafeRecord, SafeValue};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use indexmap::IndexMap;
use log::debug;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt::Display;
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

/// Converts a host value into its template-visible form.
pub trait ToSafe {
    fn to_safe(&self) -> SafeValue;
}

/// A host type that exposes named, readable members to templates.
pub trait Expose {
    /// Name reported in diagnostics and used as the fallback display form.
    fn type_name(&self) -> &str;

    /// Hands every exposed member to `visitor`, in declaration order.
    fn visit_fields(&self, visitor: &mut dyn FieldVisitor);

    /// Display form used when the object exposes no members.
    fn display_name(&self) -> String {
        self.type_name().to_string()
    }
}

/// Receives the named members of an [`Expose`] type or the entries of a mapping.
pub trait FieldVisitor {
    fn visit(&mut self, name: &str, value: &dyn ToSafe);
}

/// Collects visited members into converted values.
#[derive(Debug, Default)]
pub(crate) struct FieldCollector {
    pub(crate) fields: IndexMap<String, SafeValue>,
}

impl FieldVisitor for FieldCollector {
    fn visit(&mut self, name: &str, value: &dyn ToSafe) {
        self.fields.insert(name.to_string(), value.to_safe());
    }
}

/// Converts an exposed object into a [`SafeRecord`], or into an opaque marker
/// when it has nothing readable.
pub fn record_of<T: Expose + ?Sized>(object: &T) -> SafeValue {
    let mut collector = FieldCollector::default();
    object.visit_fields(&mut collector);
    if collector.fields.is_empty() {
        debug!(
            "'{}' exposes no readable members, using its display form",
            object.type_name()
        );
        return SafeValue::Opaque(object.display_name());
    }
    SafeValue::Record(Arc::new(SafeRecord::new(object.type_name(), collector.fields)))
}

/// Admits any displayable value as its string form and nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opaque<T>(pub T);

impl<T: Display> ToSafe for Opaque<T> {
    fn to_safe(&self) -> SafeValue {
        SafeValue::Opaque(self.0.to_string())
    }
}

impl ToSafe for SafeValue {
    fn to_safe(&self) -> SafeValue {
        self.clone()
    }
}

impl ToSafe for serde_json::Value {
    fn to_safe(&self) -> SafeValue {
        SafeValue::from(self)
    }
}

impl ToSafe for () {
    fn to_safe(&self) -> SafeValue {
        SafeValue::Null
    }
}

impl ToSafe for bool {
    fn to_safe(&self) -> SafeValue {
        SafeValue::Bool(*self)
    }
}

macro_rules! lossless_int {
    ($($ty:ty),*) => {
        $(
            impl ToSafe for $ty {
                fn to_safe(&self) -> SafeValue {
                    SafeValue::Int(i64::from(*self))
                }
            }
        )*
    };
}

macro_rules! wide_int {
    ($($ty:ty),*) => {
        $(
            impl ToSafe for $ty {
                fn to_safe(&self) -> SafeValue {
                    match i64::try_from(*self) {
                        Ok(i) => SafeValue::Int(i),
                        Err(_) => SafeValue::Float(*self as f64),
                    }
                }
            }
        )*
    };
}

lossless_int!(i8, i16, i32, i64, u8, u16, u32);
wide_int!(isize, usize, u64, i128, u128);

impl ToSafe for f32 {
    fn to_safe(&self) -> SafeValue {
        SafeValue::Float(f64::from(*self))
    }
}

impl ToSafe for f64 {
    fn to_safe(&self) -> SafeValue {
        SafeValue::Float(*self)
    }
}

impl ToSafe for char {
    fn to_safe(&self) -> SafeValue {
        SafeValue::Str(self.to_string())
    }
}

impl ToSafe for str {
    fn to_safe(&self) -> SafeValue {
        SafeValue::Str(self.to_string())
    }
}

impl ToSafe for String {
    fn to_safe(&self) -> SafeValue {
        SafeValue::Str(self.clone())
    }
}

impl ToSafe for Cow<'_, str> {
    fn to_safe(&self) -> SafeValue {
        SafeValue::Str(self.to_string())
    }
}

impl<Tz: TimeZone> ToSafe for DateTime<Tz> {
    fn to_safe(&self) -> SafeValue {
        let offset: FixedOffset = self.offset().fix();
        SafeValue::DateTime(self.with_timezone(&offset))
    }
}

impl ToSafe for NaiveDateTime {
    fn to_safe(&self) -> SafeValue {
        SafeValue::DateTime(DateTime::from_naive_utc_and_offset(*self, Utc.fix()))
    }
}

impl ToSafe for NaiveDate {
    fn to_safe(&self) -> SafeValue {
        SafeValue::Date(*self)
    }
}

impl<T: ToSafe> ToSafe for Option<T> {
    fn to_safe(&self) -> SafeValue {
        match self {
            Some(value) => value.to_safe(),
            None => SafeValue::Null,
        }
    }
}

impl<T: ToSafe + ?Sized> ToSafe for &T {
    fn to_safe(&self) -> SafeValue {
        (**self).to_safe()
    }
}

impl<T: ToSafe + ?Sized> ToSafe for Box<T> {
    fn to_safe(&self) -> SafeValue {
        (**self).to_safe()
    }
}

impl<T: ToSafe + ?Sized> ToSafe for Rc<T> {
    fn to_safe(&self) -> SafeValue {
        (**self).to_safe()
    }
}

impl<T: ToSafe + ?Sized> ToSafe for Arc<T> {
    fn to_safe(&self) -> SafeValue {
        (**self).to_safe()
    }
}

impl ToSafe for dyn Expose + '_ {
    fn to_safe(&self) -> SafeValue {
        record_of(self)
    }
}

impl<T: ToSafe> ToSafe for [T] {
    fn to_safe(&self) -> SafeValue {
        SafeValue::Seq(self.iter().map(ToSafe::to_safe).collect())
    }
}

impl<T: ToSafe, const N: usize> ToSafe for [T; N] {
    fn to_safe(&self) -> SafeValue {
        self.as_slice().to_safe()
    }
}

impl<T: ToSafe> ToSafe for Vec<T> {
    fn to_safe(&self) -> SafeValue {
        self.as_slice().to_safe()
    }
}

impl<T: ToSafe> ToSafe for VecDeque<T> {
    fn to_safe(&self) -> SafeValue {
        SafeValue::Seq(self.iter().map(ToSafe::to_safe).collect())
    }
}

fn convert_entries<'a, V: ToSafe + 'a>(
    entries: impl Iterator<Item = (&'a String, &'a V)>,
) -> SafeValue {
    SafeValue::Map(entries.map(|(k, v)| (k.clone(), v.to_safe())).collect())
}

impl<V: ToSafe, S: BuildHasher> ToSafe for HashMap<String, V, S> {
    fn to_safe(&self) -> SafeValue {
        convert_entries(self.iter())
    }
}

impl<V: ToSafe> ToSafe for BTreeMap<String, V> {
    fn to_safe(&self) -> SafeValue {
        convert_entries(self.iter())
    }
}

impl<V: ToSafe, S: BuildHasher> ToSafe for IndexMap<String, V, S> {
    fn to_safe(&self) -> SafeValue {
        convert_entries(self.iter())
    }
}

/// Implements [`Expose`] and [`ToSafe`] for a struct from an explicit list of
/// readable fields. Each listed field must itself implement [`ToSafe`].
#[macro_export]
macro_rules! expose {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        impl $crate::expose::Expose for $ty {
            fn type_name(&self) -> &str {
                stringify!($ty)
            }

            #[allow(unused_variables)]
            fn visit_fields(&self, visitor: &mut dyn $crate::expose::FieldVisitor) {
                $( visitor.visit(stringify!($field), &self.$field); )*
            }
        }

        impl $crate::expose::ToSafe for $ty {
            fn to_safe(&self) -> $crate::value::SafeValue {
                $crate::expose::record_of(self)
            }
        }
    };
}
