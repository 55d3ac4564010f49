use crate::field::ColumnMap;

/// Trait describing how an entity is stored: its table, its columns and
/// the mapping from logical field names to physical columns.
///
/// Implemented manually; nothing in this crate populates entities from rows.
///
/// # Example
///
/// ```
/// use folio_data::{ColumnMapper, Entity, FieldPath};
///
/// struct Artist;
///
/// impl Entity for Artist {
///     fn table_name() -> &'static str { "artists" }
///     fn columns() -> &'static [&'static str] { &["id", "name", "created_at"] }
///     fn field_columns() -> &'static [(&'static str, &'static str)] {
///         &[("id", "id"), ("name", "name"), ("createdAt", "created_at")]
///     }
/// }
///
/// let map = Artist::column_map();
/// assert_eq!(map.column(&FieldPath::new("createdAt")).as_deref(), Some("created_at"));
/// ```
pub trait Entity: Send + Sync + 'static {
    fn table_name() -> &'static str;
    fn columns() -> &'static [&'static str];

    /// `(logical field, physical column)` pairs. Empty by default, which
    /// leaves every field unmapped.
    fn field_columns() -> &'static [(&'static str, &'static str)] {
        &[]
    }

    fn column_map() -> ColumnMap {
        Self::field_columns().iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{ColumnMapper, FieldPath};

    struct Tag;

    impl Entity for Tag {
        fn table_name() -> &'static str {
            "tags"
        }

        fn columns() -> &'static [&'static str] {
            &["id", "label"]
        }
    }

    #[test]
    fn default_field_columns_are_empty() {
        assert!(Tag::column_map().is_empty());
        assert_eq!(Tag::column_map().column(&FieldPath::new("label")), None);
    }
}
