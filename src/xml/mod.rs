//! XML infrastructure: namespace handling and the mutable element tree.

pub mod element;
pub mod namespace;

pub use element::Element;
pub use namespace::{NamespaceContext, QualifiedName};
