use serde::Serialize;

/// Categories offered before any user-defined ones are recorded.
pub const DEFAULT_CATEGORIES: [&str; 7] = [
    "Food",
    "Transport",
    "Entertainment",
    "Bills",
    "Shopping",
    "Health",
    "Other",
];

/// Ordered set of known category names. Insertion order is preserved so the
/// numbered menu stays stable as new categories are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySet {
    names: Vec<String>,
}

impl CategorySet {
    /// An empty set, with no seed categories.
    pub fn empty() -> Self {
        Self { names: Vec::new() }
    }

    /// Register a category. Returns true if it was not already known.
    pub fn register(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Look up a category by its 1-based menu position.
    pub fn by_position(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|index| self.names.get(index))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for CategorySet {
    /// The seeded set.
    fn default() -> Self {
        let mut set = Self::empty();
        for name in DEFAULT_CATEGORIES {
            set.register(name);
        }
        set
    }
}

/// Capitalize the first letter of every word and lowercase the rest.
/// Example: "coffee shops" -> "Coffee Shops", "DIY" -> "Diy"
pub fn title_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut in_word = false;

    for c in input.chars() {
        if c.is_alphabetic() {
            if in_word {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(c);
            in_word = false;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seed() {
        let set = CategorySet::default();
        assert_eq!(set.len(), DEFAULT_CATEGORIES.len());
        assert_eq!(set.iter().next(), Some("Food"));
        assert!(set.contains("Other"));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut set = CategorySet::default();
        let before = set.len();

        assert!(set.register("Travel"));
        assert!(!set.register("Travel"));
        assert!(!set.register("Food"));

        assert_eq!(set.len(), before + 1);
        assert_eq!(set.iter().last(), Some("Travel"));
    }

    #[test]
    fn test_register_is_case_sensitive() {
        let mut set = CategorySet::empty();
        assert!(set.register("food"));
        assert!(set.register("Food"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_by_position() {
        let set = CategorySet::default();
        assert_eq!(set.by_position(1), Some("Food"));
        assert_eq!(set.by_position(7), Some("Other"));
        assert_eq!(set.by_position(0), None);
        assert_eq!(set.by_position(8), None);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("coffee shops"), "Coffee Shops");
        assert_eq!(title_case("DIY"), "Diy");
        assert_eq!(title_case("pet-care"), "Pet-Care");
        assert_eq!(title_case("x2y"), "X2Y");
        assert_eq!(title_case(""), "");
    }
}
