//! Tag indexing
//!
//! Builds lookup structures over an event's flat tag list once, so the
//! mapper can resolve "first value of tag X" and "all tags named Y" without
//! rescanning. Duplicate tags for the same logical name are common; lookups
//! always return the first match and never merge duplicates.

use std::collections::HashMap;

/// Index over an event's tags. Absent lookups return `None`/empty, never an
/// error.
pub struct TagIndex<'a> {
    tags: &'a [Vec<String>],
    by_name: HashMap<&'a str, Vec<usize>>,
}

impl<'a> TagIndex<'a> {
    pub fn new(tags: &'a [Vec<String>]) -> Self {
        let mut by_name: HashMap<&'a str, Vec<usize>> = HashMap::new();
        for (i, tag) in tags.iter().enumerate() {
            if let Some(name) = tag.first() {
                by_name.entry(name.as_str()).or_default().push(i);
            }
        }
        TagIndex { tags, by_name }
    }

    /// First tag whose name matches, if any.
    pub fn first_tag(&self, name: &str) -> Option<&'a [String]> {
        self.by_name
            .get(name)?
            .first()
            .map(|&i| self.tags[i].as_slice())
    }

    /// Second element of the first matching tag.
    pub fn first_value(&self, name: &str) -> Option<&'a str> {
        self.first_tag(name)?.get(1).map(String::as_str)
    }

    /// All tags with this name, preserving event order.
    pub fn all(&self, name: &str) -> Vec<&'a [String]> {
        self.by_name
            .get(name)
            .map(|idxs| idxs.iter().map(|&i| self.tags[i].as_slice()).collect())
            .unwrap_or_default()
    }

    /// First tag found across an ordered alias chain. Alias order is the
    /// priority order, not event order.
    pub fn first_tag_of(&self, aliases: &[&str]) -> Option<&'a [String]> {
        aliases.iter().find_map(|name| self.first_tag(name))
    }

    /// First value found across an ordered alias chain.
    pub fn first_value_of(&self, aliases: &[&str]) -> Option<&'a str> {
        aliases.iter().find_map(|name| self.first_value(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tags() -> Vec<Vec<String>> {
        vec![
            vec!["d".into(), "workout-1".into()],
            vec!["t".into(), "running".into()],
            vec!["distance".into(), "5.2".into(), "km".into()],
            vec!["t".into(), "outdoors".into()],
            vec!["distance".into(), "999".into()],
            vec![],
        ]
    }

    #[test]
    fn test_first_value_uses_first_duplicate() {
        let tags = tags();
        let index = TagIndex::new(&tags);
        assert_eq!(index.first_value("distance"), Some("5.2"));
    }

    #[test]
    fn test_all_preserves_order() {
        let tags = tags();
        let index = TagIndex::new(&tags);
        let t: Vec<&str> = index
            .all("t")
            .iter()
            .filter_map(|tag| tag.get(1).map(String::as_str))
            .collect();
        assert_eq!(t, vec!["running", "outdoors"]);
    }

    #[test]
    fn test_absent_lookups() {
        let tags = tags();
        let index = TagIndex::new(&tags);
        assert_eq!(index.first_value("missing"), None);
        assert!(index.all("missing").is_empty());
        // A tag with no value element
        assert_eq!(index.first_value("d"), Some("workout-1"));
        assert_eq!(index.first_tag("d").unwrap().len(), 2);
    }

    #[test]
    fn test_alias_chain_priority() {
        let tags = vec![
            vec!["dist".into(), "3.0".into()],
            vec!["distance".into(), "5.0".into()],
        ];
        let index = TagIndex::new(&tags);
        // "distance" outranks "dist" regardless of event order
        assert_eq!(
            index.first_value_of(&["distance", "total_distance", "dist"]),
            Some("5.0")
        );
    }
}
