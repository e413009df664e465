//! The data side of rendering: `Adapter` is the object-safe trait every
//! piece of bound data implements; `Value` is a ready-made dynamic tree for
//! callers who would rather build data with a literal than derive an
//! adapter for their own types.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::lambda::{Lambda, LambdaContext};
use crate::Error;

/// A piece of data bound into a template's context stack. Implement this
/// directly for application types that already have the shape Mustache
/// wants; reach for [`Value`] when the data is assembled dynamically.
///
/// Every method is given a default that suits a scalar leaf, so most
/// implementations only override `get_field` (records) or `iterate`
/// (sequences).
pub trait Adapter {
    /// Whether this value counts as present for `{{#x}}`/`{{^x}}` purposes.
    /// Mustache falsey values are `false`, `null`, `0`, the empty string,
    /// and the empty sequence/map.
    fn truthy(&self) -> bool {
        true
    }

    /// Writes this value's text form to `sink`, honoring `escape`. Records,
    /// sequences, and lambdas never reach this: the renderer only calls it
    /// on the leaf a path resolves to.
    fn interpolate(&self, sink: &mut dyn crate::sink::Sink, escape: crate::element::Escape) -> Result<(), Error>;

    /// Looks up a named field on this value. Returns `None` for scalars,
    /// sequences, and missing keys alike; the path resolver is what
    /// distinguishes "keep searching the stack" from "chain broken" based on
    /// whether this is the first path component.
    fn get_field<'a>(&'a self, name: &str) -> Option<&'a dyn Adapter> {
        let _ = name;
        None
    }

    /// Items a `{{#section}}` over this value should push onto the stack,
    /// one frame per item. The default treats any truthy scalar or record as
    /// a single-item sequence yielding itself, and any falsey value as
    /// empty: the usual Mustache rule that `{{#x}}` over a non-list value
    /// renders its body once against that value. Sequence types override
    /// this to yield their elements instead.
    fn iterate<'a>(&'a self) -> Box<dyn Iterator<Item = &'a dyn Adapter> + 'a> {
        if self.truthy() {
            Box::new(std::iter::once(self as &dyn Adapter))
        } else {
            Box::new(std::iter::empty())
        }
    }

    /// `Some` if this value is a callable lambda; the path resolver checks
    /// this before treating a resolved value as an ordinary field.
    fn lambda(&self) -> Option<&Lambda> {
        None
    }
}

macro_rules! impl_adapter_for_display {
    ($ty:ty, $truthy:expr) => {
        impl Adapter for $ty {
            fn truthy(&self) -> bool {
                #[allow(clippy::redundant_closure_call)]
                $truthy(self)
            }

            fn interpolate(
                &self,
                sink: &mut dyn crate::sink::Sink,
                escape: crate::element::Escape,
            ) -> Result<(), Error> {
                write_escaped(sink, &self.to_string(), escape)
            }
        }
    };
}

fn write_escaped(
    sink: &mut dyn crate::sink::Sink,
    text: &str,
    escape: crate::element::Escape,
) -> Result<(), Error> {
    match escape {
        crate::element::Escape::Escaped => {
            let mut escaping = crate::sink::EscapingSink::new(sink);
            crate::sink::Sink::write_str(&mut escaping, text)?;
        }
        crate::element::Escape::Unescaped => {
            crate::sink::Sink::write_str(sink, text)?;
        }
    }
    Ok(())
}

impl_adapter_for_display!(bool, |v: &bool| *v);
impl_adapter_for_display!(i8, |v: &i8| *v != 0);
impl_adapter_for_display!(i16, |v: &i16| *v != 0);
impl_adapter_for_display!(i32, |v: &i32| *v != 0);
impl_adapter_for_display!(i64, |v: &i64| *v != 0);
impl_adapter_for_display!(isize, |v: &isize| *v != 0);
impl_adapter_for_display!(u8, |v: &u8| *v != 0);
impl_adapter_for_display!(u16, |v: &u16| *v != 0);
impl_adapter_for_display!(u32, |v: &u32| *v != 0);
impl_adapter_for_display!(u64, |v: &u64| *v != 0);
impl_adapter_for_display!(usize, |v: &usize| *v != 0);

impl Adapter for f32 {
    fn truthy(&self) -> bool {
        *self != 0.0
    }

    fn interpolate(&self, sink: &mut dyn crate::sink::Sink, escape: crate::element::Escape) -> Result<(), Error> {
        write_escaped(sink, &format_float(*self as f64), escape)
    }
}

impl Adapter for f64 {
    fn truthy(&self) -> bool {
        *self != 0.0
    }

    fn interpolate(&self, sink: &mut dyn crate::sink::Sink, escape: crate::element::Escape) -> Result<(), Error> {
        write_escaped(sink, &format_float(*self), escape)
    }
}

/// `{n}` formats a whole float as `3` rather than `3.0`; Mustache templates
/// expect the latter, so a missing fractional part gets `.0` appended.
fn format_float(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') || text.contains('e') || text.contains("inf") || text.contains("NaN") {
        text
    } else {
        format!("{}.0", text)
    }
}

impl Adapter for str {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }

    fn interpolate(&self, sink: &mut dyn crate::sink::Sink, escape: crate::element::Escape) -> Result<(), Error> {
        write_escaped(sink, self, escape)
    }
}

impl Adapter for String {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }

    fn interpolate(&self, sink: &mut dyn crate::sink::Sink, escape: crate::element::Escape) -> Result<(), Error> {
        write_escaped(sink, self, escape)
    }
}

impl<T: Adapter> Adapter for Option<T> {
    fn truthy(&self) -> bool {
        self.as_ref().is_some_and(Adapter::truthy)
    }

    fn interpolate(&self, sink: &mut dyn crate::sink::Sink, escape: crate::element::Escape) -> Result<(), Error> {
        match self {
            Some(inner) => inner.interpolate(sink, escape),
            None => Ok(()),
        }
    }

    fn get_field<'a>(&'a self, name: &str) -> Option<&'a dyn Adapter> {
        self.as_ref().and_then(|inner| inner.get_field(name))
    }

    fn iterate<'a>(&'a self) -> Box<dyn Iterator<Item = &'a dyn Adapter> + 'a> {
        match self {
            Some(inner) => inner.iterate(),
            None => Box::new(std::iter::empty()),
        }
    }

    fn lambda(&self) -> Option<&Lambda> {
        self.as_ref().and_then(Adapter::lambda)
    }
}

impl<T: Adapter> Adapter for Vec<T> {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }

    fn interpolate(&self, _sink: &mut dyn crate::sink::Sink, _escape: crate::element::Escape) -> Result<(), Error> {
        Ok(())
    }

    fn iterate<'a>(&'a self) -> Box<dyn Iterator<Item = &'a dyn Adapter> + 'a> {
        Box::new(self.iter().map(|item| item as &dyn Adapter))
    }
}

impl<T: Adapter> Adapter for [T] {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }

    fn interpolate(&self, _sink: &mut dyn crate::sink::Sink, _escape: crate::element::Escape) -> Result<(), Error> {
        Ok(())
    }

    fn iterate<'a>(&'a self) -> Box<dyn Iterator<Item = &'a dyn Adapter> + 'a> {
        Box::new(self.iter().map(|item| item as &dyn Adapter))
    }
}

impl<T: Adapter> Adapter for HashMap<String, T> {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }

    fn interpolate(&self, _sink: &mut dyn crate::sink::Sink, _escape: crate::element::Escape) -> Result<(), Error> {
        Ok(())
    }

    fn get_field<'a>(&'a self, name: &str) -> Option<&'a dyn Adapter> {
        self.get(name).map(|v| v as &dyn Adapter)
    }
}

impl<T: Adapter> Adapter for BTreeMap<String, T> {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }

    fn interpolate(&self, _sink: &mut dyn crate::sink::Sink, _escape: crate::element::Escape) -> Result<(), Error> {
        Ok(())
    }

    fn get_field<'a>(&'a self, name: &str) -> Option<&'a dyn Adapter> {
        self.get(name).map(|v| v as &dyn Adapter)
    }
}

impl<T: Adapter + ?Sized> Adapter for &T {
    fn truthy(&self) -> bool {
        (**self).truthy()
    }

    fn interpolate(&self, sink: &mut dyn crate::sink::Sink, escape: crate::element::Escape) -> Result<(), Error> {
        (**self).interpolate(sink, escape)
    }

    fn get_field<'a>(&'a self, name: &str) -> Option<&'a dyn Adapter> {
        (**self).get_field(name)
    }

    fn iterate<'a>(&'a self) -> Box<dyn Iterator<Item = &'a dyn Adapter> + 'a> {
        (**self).iterate()
    }

    fn lambda(&self) -> Option<&Lambda> {
        (**self).lambda()
    }
}

/// A self-describing dynamic value tree for callers who'd rather build data
/// with a literal than implement [`Adapter`] on their own type.
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    /// A callable bound at this key, invoked instead of ordinary
    /// interpolation or section expansion.
    Lambda0(Lambda),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({:?})", b),
            Value::Integer(i) => write!(f, "Integer({:?})", i),
            Value::Float(n) => write!(f, "Float({:?})", n),
            Value::Text(s) => write!(f, "Text({:?})", s),
            Value::Array(items) => write!(f, "Array({:?})", items),
            Value::Object(fields) => write!(f, "Object({:?})", fields),
            Value::Lambda0(_) => write!(f, "Lambda0(..)"),
        }
    }
}

impl Value {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Value::Text(text.into())
    }

    pub fn lambda<F>(f: F) -> Self
    where
        F: Fn(&mut LambdaContext) -> Result<(), Error> + 'static,
    {
        Value::Lambda0(Lambda::new(f))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl Adapter for Value {
    fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(n) => *n != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(fields) => !fields.is_empty(),
            Value::Lambda0(_) => true,
        }
    }

    fn interpolate(&self, sink: &mut dyn crate::sink::Sink, escape: crate::element::Escape) -> Result<(), Error> {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write_escaped(sink, &b.to_string(), escape),
            Value::Integer(i) => write_escaped(sink, &i.to_string(), escape),
            Value::Float(n) => write_escaped(sink, &format_float(*n), escape),
            Value::Text(s) => write_escaped(sink, s, escape),
            Value::Array(_) | Value::Object(_) | Value::Lambda0(_) => Ok(()),
        }
    }

    fn get_field<'a>(&'a self, name: &str) -> Option<&'a dyn Adapter> {
        match self {
            Value::Object(fields) => fields.get(name).map(|v| v as &dyn Adapter),
            _ => None,
        }
    }

    fn iterate<'a>(&'a self) -> Box<dyn Iterator<Item = &'a dyn Adapter> + 'a> {
        match self {
            Value::Array(items) => Box::new(items.iter().map(|item| item as &dyn Adapter)),
            _ => {
                if self.truthy() {
                    Box::new(std::iter::once(self as &dyn Adapter))
                } else {
                    Box::new(std::iter::empty())
                }
            }
        }
    }

    fn lambda(&self) -> Option<&Lambda> {
        match self {
            Value::Lambda0(lambda) => Some(lambda),
            _ => None,
        }
    }
}
