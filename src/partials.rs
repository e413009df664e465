//! Lookup of `{{> name}}` partials.

/// A read-only source of partial templates by name.
pub trait Partials {
    /// Returns the raw (unparsed) source of the named partial, or `None`
    /// if it isn't registered. A missing partial renders as nothing.
    fn get(&self, name: &str) -> Option<&str>;
}

/// A partials source with nothing in it; every lookup misses.
pub struct NoPartials;

impl Partials for NoPartials {
    fn get(&self, _name: &str) -> Option<&str> {
        None
    }
}

impl Partials for std::collections::HashMap<String, String> {
    fn get(&self, name: &str) -> Option<&str> {
        std::collections::HashMap::get(self, name).map(String::as_str)
    }
}

impl Partials for std::collections::BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<&str> {
        std::collections::BTreeMap::get(self, name).map(String::as_str)
    }
}
