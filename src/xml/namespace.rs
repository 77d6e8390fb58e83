//! Namespace handling for ODF XML elements.
//!
//! Namespace registration is carried as explicit per-element state
//! (`NamespaceContext`) and threaded through parsing and serialization;
//! there is no process-wide registry.

use phf::{Map, phf_map};
use std::collections::HashMap;

/// Style namespace
pub const STYLENS: &str = "urn:oasis:names:tc:opendocument:xmlns:style:1.0";

/// XSL-FO compatible namespace
pub const FONS: &str = "urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0";

/// Text namespace
pub const TEXTNS: &str = "urn:oasis:names:tc:opendocument:xmlns:text:1.0";

/// Drawing namespace
pub const DRAWNS: &str = "urn:oasis:names:tc:opendocument:xmlns:drawing:1.0";

/// SVG compatible namespace
pub const SVGNS: &str = "urn:oasis:names:tc:opendocument:xmlns:svg-compatible:1.0";

/// Office namespace
pub const OFFICENS: &str = "urn:oasis:names:tc:opendocument:xmlns:office:1.0";

/// XLink namespace
pub const XLINKNS: &str = "http://www.w3.org/1999/xlink";

/// MathML namespace
pub const MATHNS: &str = "http://www.w3.org/1998/Math/MathML";

/// Prefix to URI mapping (compile-time perfect hash map)
static PREFIX_TO_URI: Map<&'static str, &'static str> = phf_map! {
    "style" => STYLENS,
    "fo" => FONS,
    "text" => TEXTNS,
    "draw" => DRAWNS,
    "svg" => SVGNS,
    "office" => OFFICENS,
    "xlink" => XLINKNS,
    "math" => MATHNS,
};

/// Qualified name with namespace support
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    /// Namespace URI
    pub namespace_uri: Option<String>,
    /// Local name (without prefix)
    pub local_name: String,
    /// Full qualified name (with prefix if present)
    pub qualified_name: String,
}

impl QualifiedName {
    /// Parse a qualified name from a prefixed string, resolving the
    /// prefix against the well-known ODF table.
    pub fn from_string(name: &str) -> Self {
        Self::from_string_with_context(name, None)
    }

    /// Parse a qualified name, resolving prefixes and the default
    /// namespace against the given context first and the well-known
    /// table second.
    pub fn from_string_with_context(name: &str, context: Option<&NamespaceContext>) -> Self {
        if let Some(colon_pos) = name.find(':') {
            let prefix = &name[..colon_pos];
            let local_name = &name[colon_pos + 1..];

            let namespace_uri = context
                .and_then(|ctx| ctx.resolve_prefix(prefix))
                .map(|s| s.to_string())
                .or_else(|| PREFIX_TO_URI.get(prefix).map(|s| (*s).to_string()));

            Self {
                namespace_uri,
                local_name: local_name.to_string(),
                qualified_name: name.to_string(),
            }
        } else {
            let namespace_uri = context
                .and_then(|ctx| ctx.default_namespace())
                .map(|s| s.to_string());

            Self {
                namespace_uri,
                local_name: name.to_string(),
                qualified_name: name.to_string(),
            }
        }
    }

    /// Check if this name matches another qualified name.
    ///
    /// Names resolve equal when both namespace URIs are known and equal;
    /// when either side lacks a resolvable namespace, the comparison
    /// falls back to the local name so documents with unregistered
    /// prefixes still match.
    pub fn matches(&self, other: &QualifiedName) -> bool {
        if self.local_name != other.local_name {
            return false;
        }
        match (&self.namespace_uri, &other.namespace_uri) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        Self::from_string(name)
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.qualified_name)
    }
}

/// Namespace context for resolving prefixes to URIs
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    prefixes: HashMap<String, String>,
    /// Default namespace URI
    default_namespace: Option<String>,
}

impl NamespaceContext {
    /// Register a namespace declaration. `attr` is the raw attribute
    /// name (`xmlns` or `xmlns:prefix`).
    pub fn add_declaration(&mut self, attr: &str, uri: &str) {
        if attr == "xmlns" {
            self.default_namespace = Some(uri.to_string());
        } else if let Some(prefix) = attr.strip_prefix("xmlns:") {
            self.prefixes.insert(prefix.to_string(), uri.to_string());
        }
    }

    /// Resolve a prefix to a namespace URI
    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Parse a qualified name with this context
    pub fn parse_qualified_name(&self, name: &str) -> QualifiedName {
        QualifiedName::from_string_with_context(name, Some(self))
    }
}
