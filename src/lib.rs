//! A Mustache 1.1 rendering core: parse a template once, then render it
//! against any number of caller-supplied data values.
//!
//! ```
//! use std::collections::BTreeMap;
//! use stache::{Template, Value};
//!
//! let template = Template::parse("Hello, {{subject}}!").unwrap();
//! let mut fields = BTreeMap::new();
//! fields.insert(String::from("subject"), Value::text("world"));
//! let data = Value::Object(fields);
//! assert_eq!(b"Hello, world!".to_vec(), template.render_alloc(&data).unwrap());
//! ```
//!
//! Three pieces matter to most callers:
//!
//! - [`Template`] parses template source into an element tree and renders
//!   it against anything implementing [`Adapter`].
//! - [`Adapter`] is the trait application data implements to bind into a
//!   template; [`Value`] is a ready-made dynamic tree for callers who'd
//!   rather build data with a literal.
//! - [`Partials`] supplies named sub-templates for `{{> name}}` tags.

pub mod context;
pub mod delimiters;
pub mod element;
pub mod error;
pub mod lambda;
pub mod partials;
pub mod path;
pub mod sink;
pub mod value;

mod parser;
mod render;
mod resolver;
mod template;

pub use context::Stack;
pub use delimiters::Delimiters;
pub use element::{Element, Escape};
pub use error::{Error, ParseError};
pub use lambda::{Lambda, LambdaContext};
pub use partials::{NoPartials, Partials};
pub use path::Path;
pub use sink::{BufferSink, EscapingSink, Sink, WriterSink};
pub use template::{
    render_from_file, render_from_file_alloc, render_from_string, render_from_string_alloc,
    Template,
};
pub use value::{Adapter, Value};
