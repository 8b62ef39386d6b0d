//! Declarative field tag parsing
//!
//! A tag is a sequence of `;`-terminated clauses:
//!
//! - `column:<name>;` overrides the column name
//! - `PRIMARY_KEY;` marks the primary key
//! - `-;` excludes the field from every generated statement
//!
//! Anything else is ignored.

/// Tag key for the column name override
pub const TAG_COLUMN_NAME: &str = "column";

/// Tag key marking the primary key
pub const TAG_PRIMARY_KEY: &str = "PRIMARY_KEY";

/// Tag key marking an ignored field
pub const TAG_IGNORE: &str = "-";

/// Metadata extracted from a field tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMeta {
    /// Column name override
    pub column: Option<String>,
    /// Field is the primary key
    pub primary_key: bool,
    /// Field is left out of SQL generation
    pub ignore: bool,
}

impl TagMeta {
    /// Check whether a recognized key is set
    pub fn contains(&self, key: &str) -> bool {
        match key {
            TAG_COLUMN_NAME => self.column.is_some(),
            TAG_PRIMARY_KEY => self.primary_key,
            TAG_IGNORE => self.ignore,
            _ => false,
        }
    }
}

/// Parse a raw tag string
///
/// # Example
///
/// ```
/// use swallow::model::tag::parse_tag;
///
/// let meta = parse_tag("column:user_id;PRIMARY_KEY;");
/// assert_eq!(meta.column.as_deref(), Some("user_id"));
/// assert!(meta.primary_key);
/// assert!(!meta.ignore);
/// ```
pub fn parse_tag(tag: &str) -> TagMeta {
    let mut meta = TagMeta::default();

    // text after the last ';' is an unterminated clause
    let terminated = match tag.rfind(';') {
        Some(end) => &tag[..end],
        None => return meta,
    };

    for clause in terminated.split(';').map(str::trim) {
        if let Some(name) = clause.strip_prefix("column:") {
            let name = name.trim();
            if meta.column.is_none() && !name.is_empty() {
                meta.column = Some(name.to_string());
            }
        } else if clause == TAG_PRIMARY_KEY {
            meta.primary_key = true;
        } else if clause == TAG_IGNORE {
            meta.ignore = true;
        }
    }

    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column() {
        let meta = parse_tag("column:insert_at;");
        assert_eq!(meta.column.as_deref(), Some("insert_at"));
        assert!(!meta.primary_key);
        assert!(!meta.ignore);
        assert!(meta.contains(TAG_COLUMN_NAME));
    }

    #[test]
    fn test_parse_flags() {
        let meta = parse_tag("PRIMARY_KEY;");
        assert!(meta.primary_key);
        assert!(meta.contains(TAG_PRIMARY_KEY));

        let meta = parse_tag("-;");
        assert!(meta.ignore);
        assert!(meta.contains(TAG_IGNORE));
    }

    #[test]
    fn test_parse_combined_any_order() {
        let meta = parse_tag("PRIMARY_KEY;column:id;");
        assert_eq!(meta.column.as_deref(), Some("id"));
        assert!(meta.primary_key);
    }

    #[test]
    fn test_first_column_wins() {
        let meta = parse_tag("column:a;column:b;");
        assert_eq!(meta.column.as_deref(), Some("a"));
    }

    #[test]
    fn test_unterminated_and_unknown_clauses_ignored() {
        assert_eq!(parse_tag(""), TagMeta::default());
        assert_eq!(parse_tag("column:name"), TagMeta::default());
        assert_eq!(parse_tag("PRIMARY_KEY"), TagMeta::default());

        let meta = parse_tag("json:name;size:255;-;");
        assert!(meta.ignore);
        assert_eq!(meta.column, None);
        assert!(!meta.contains("json"));
    }
}
