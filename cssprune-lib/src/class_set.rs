use std::collections::BTreeSet;
use std::fmt;

/// A set of case-sensitive CSS class names.
///
/// Backed by an ordered set so listings come out sorted; membership is the only
/// operation the rule filter relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSet {
    classes: BTreeSet<String>,
}

impl ClassSet {
    pub fn new() -> Self {
        ClassSet {
            classes: BTreeSet::new(),
        }
    }

    /// Adds a class name. Returns `false` if it was already present.
    pub fn insert(&mut self, class_name: impl Into<String>) -> bool {
        self.classes.insert(class_name.into())
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.classes.contains(class_name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterates the class names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    /// Merges every class of `other` into this set.
    pub fn union_with(&mut self, other: ClassSet) {
        self.classes.extend(other.classes);
    }
}

impl<S: Into<String>> FromIterator<S> for ClassSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ClassSet {
            classes: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for ClassSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.classes.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for ClassSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ClassSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.iter()
    }
}

impl fmt::Display for ClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for class_name in &self.classes {
            writeln!(f, ".{}", class_name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse() {
        let set: ClassSet = ["a", "b", "a"].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("a"));
        assert!(set.contains("b"));
    }

    #[test]
    fn test_case_sensitive() {
        let set: ClassSet = ["Card"].into_iter().collect();
        assert!(set.contains("Card"));
        assert!(!set.contains("card"));
    }

    #[test]
    fn test_union_and_sorted_iteration() {
        let mut left: ClassSet = ["zeta", "alpha"].into_iter().collect();
        let right: ClassSet = ["beta", "alpha"].into_iter().collect();
        left.union_with(right);
        assert_eq!(left.iter().collect::<Vec<_>>(), vec!["alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_display_lists_one_selector_per_line() {
        let set: ClassSet = ["row", "col"].into_iter().collect();
        assert_eq!(set.to_string(), ".col\n.row\n");
    }
}
