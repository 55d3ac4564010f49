//! Field references and logical-to-physical column mapping.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Separator between association names and the terminal field.
pub const PATH_SEPARATOR: char = '.';

/// A field reference, optionally qualified by an association.
///
/// `artist.agency.name` parses to field `name` with qualifier `agency`.
/// Only the immediate qualifier is used for the rendered column
/// (`agency.name`); the leading segments (`artist`) are kept as a
/// traversal hint for whatever maps entities to tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath {
    field: String,
    qualifier: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    traversal: Vec<String>,
}

impl FieldPath {
    /// An unqualified field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            qualifier: None,
            traversal: Vec::new(),
        }
    }

    /// A field owned by the association `qualifier`.
    pub fn qualified(qualifier: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            qualifier: Some(qualifier.into()),
            traversal: Vec::new(),
        }
    }

    /// Parse a dotted reference. Empty segments are ignored.
    pub fn parse(reference: &str) -> Self {
        let mut segments: Vec<&str> = reference
            .split(PATH_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        let field = segments.pop().unwrap_or_default().to_string();
        let qualifier = segments.pop().map(str::to_string);
        Self {
            field,
            qualifier,
            traversal: segments.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// Association names leading to the qualifier, outermost first.
    pub fn traversal(&self) -> &[String] {
        &self.traversal
    }

    pub fn is_qualified(&self) -> bool {
        self.qualifier.is_some()
    }

    /// `qualifier.field`, or `field` when unqualified.
    pub fn column(&self) -> String {
        self.column_named(&self.field)
    }

    /// Like [`column`](Self::column) but with a different terminal name,
    /// used once a mapper has resolved the physical column.
    pub fn column_named(&self, name: &str) -> String {
        match &self.qualifier {
            Some(q) => format!("{q}{PATH_SEPARATOR}{name}"),
            None => name.to_string(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hop in &self.traversal {
            write!(f, "{hop}{PATH_SEPARATOR}")?;
        }
        f.write_str(&self.column())
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        FieldPath::parse(s)
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        FieldPath::parse(&s)
    }
}

impl From<&FieldPath> for FieldPath {
    fn from(p: &FieldPath) -> Self {
        p.clone()
    }
}

/// Resolves a logical field to its physical column name.
///
/// Returning `None` means "no mapping": callers render the logical name
/// unchanged (or, for sorting, may drop the field).
pub trait ColumnMapper {
    fn column(&self, path: &FieldPath) -> Option<String>;

    /// Resolve a path without falling back from a qualified name to its
    /// bare field. ORDER BY mapping goes through this lookup, so a
    /// qualifier only survives when the mapper knows the qualified name.
    fn exact_column(&self, path: &FieldPath) -> Option<String> {
        self.column(path)
    }
}

impl<F> ColumnMapper for F
where
    F: Fn(&FieldPath) -> Option<String>,
{
    fn column(&self, path: &FieldPath) -> Option<String> {
        self(path)
    }
}

/// A lookup table from logical field names to physical column names.
///
/// Lookups try the qualified name (`agency.name`) first, then the bare
/// field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: HashMap<String, String>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping, builder style.
    pub fn with(mut self, logical: impl Into<String>, physical: impl Into<String>) -> Self {
        self.insert(logical, physical);
        self
    }

    pub fn insert(&mut self, logical: impl Into<String>, physical: impl Into<String>) {
        self.columns.insert(logical.into(), physical.into());
    }

    pub fn get(&self, logical: &str) -> Option<&str> {
        self.columns.get(logical).map(String::as_str)
    }

    pub fn contains(&self, logical: &str) -> bool {
        self.columns.contains_key(logical)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl ColumnMapper for ColumnMap {
    fn column(&self, path: &FieldPath) -> Option<String> {
        if path.is_qualified() {
            if let Some(physical) = self.columns.get(&path.column()) {
                return Some(physical.clone());
            }
        }
        self.columns.get(path.field()).cloned()
    }

    fn exact_column(&self, path: &FieldPath) -> Option<String> {
        self.columns.get(&path.column()).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Declare a typed set of field identifiers.
///
/// Each variant maps to a (possibly dotted) field reference and converts
/// into a [`FieldPath`], so specifications can be built without passing
/// bare strings around.
///
/// ```
/// folio_data::field_enum! {
///     pub enum ArtistField {
///         Name => "name",
///         Active => "active",
///         AgencyName => "agency.name",
///     }
/// }
///
/// let mut spec = folio_data::Specification::new();
/// spec.add_and((ArtistField::Active, true));
/// assert_eq!(spec.render(), "active = true");
/// assert_eq!(ArtistField::AgencyName.as_str(), "agency.name");
/// ```
#[macro_export]
macro_rules! field_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident => $path:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $variant ),*
        }

        impl $name {
            /// Every declared field, in declaration order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),* ];

            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $path ),*
                }
            }
        }

        impl ::core::convert::From<$name> for $crate::field::FieldPath {
            fn from(field: $name) -> Self {
                $crate::field::FieldPath::parse(field.as_str())
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_field() {
        let p = FieldPath::parse("name");
        assert_eq!(p.field(), "name");
        assert_eq!(p.qualifier(), None);
        assert_eq!(p.column(), "name");
    }

    #[test]
    fn parse_keeps_only_immediate_qualifier() {
        let p = FieldPath::parse("artist.agency.name");
        assert_eq!(p.field(), "name");
        assert_eq!(p.qualifier(), Some("agency"));
        assert_eq!(p.traversal(), ["artist".to_string()]);
        assert_eq!(p.column(), "agency.name");
        assert_eq!(p.to_string(), "artist.agency.name");
    }

    #[test]
    fn column_map_prefers_qualified_key() {
        let map = ColumnMap::new()
            .with("name", "artist_name")
            .with("agency.name", "agency_name");
        assert_eq!(
            map.column(&FieldPath::parse("agency.name")).as_deref(),
            Some("agency_name")
        );
        assert_eq!(
            map.column(&FieldPath::parse("label.name")).as_deref(),
            Some("artist_name")
        );
        assert_eq!(map.column(&FieldPath::parse("missing")), None);
    }

    #[test]
    fn exact_lookup_has_no_bare_fallback() {
        let map = ColumnMap::new()
            .with("name", "artist_name")
            .with("agency.name", "agency_name");
        assert_eq!(
            map.exact_column(&FieldPath::parse("artist.agency.name")).as_deref(),
            Some("agency_name")
        );
        assert_eq!(map.exact_column(&FieldPath::parse("label.name")), None);
        assert_eq!(map.exact_column(&FieldPath::parse("name")).as_deref(), Some("artist_name"));
    }

    #[test]
    fn closures_are_mappers() {
        let upper = |p: &FieldPath| Some(p.field().to_uppercase());
        assert_eq!(upper.column(&FieldPath::new("id")).as_deref(), Some("ID"));
    }

    field_enum! {
        enum TrackField {
            Title => "title",
            ArtistName => "artist.name",
        }
    }

    #[test]
    fn field_enum_converts_to_path() {
        let p: FieldPath = TrackField::ArtistName.into();
        assert_eq!(p, FieldPath::qualified("artist", "name"));
        assert_eq!(TrackField::ALL.len(), 2);
        assert_eq!(TrackField::Title.to_string(), "title");
    }
}
