//! Cache keys.
//!
//! A key belongs to exactly one resource family. List keys carry their query
//! parameters as sorted `(name, value)` pairs, so two requests with the same
//! parameters in a different order hit the same entry. Identity is the pairs
//! themselves; the `name=value&` rendering is only for display.

use std::fmt;

use syllabus_core::{EntityId, ResourceType};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKeyKind {
    /// Sorted query parameters, possibly empty.
    List(Vec<(String, String)>),
    Detail(EntityId),
}

/// Key of one cached read result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    family: ResourceType,
    kind: CacheKeyKind,
}

impl CacheKey {
    /// Key for a list read with the given `(name, value)` parameters.
    pub fn list<I, K, V>(family: ResourceType, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: fmt::Display,
    {
        let mut pairs: Vec<(String, String)> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.to_string()))
            .collect();
        pairs.sort();

        Self {
            family,
            kind: CacheKeyKind::List(pairs),
        }
    }

    /// Key for a detail read of one record.
    pub fn detail(family: ResourceType, id: EntityId) -> Self {
        Self {
            family,
            kind: CacheKeyKind::Detail(id),
        }
    }

    pub fn family(&self) -> ResourceType {
        self.family
    }

    pub fn kind(&self) -> &CacheKeyKind {
        &self.kind
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, CacheKeyKind::List(_))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CacheKeyKind::List(params) => {
                write!(f, "{}:list:", self.family)?;
                for (name, value) in params {
                    write!(f, "{}={}&", name, value)?;
                }
                Ok(())
            }
            CacheKeyKind::Detail(id) => write!(f, "{}:{}", self.family, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_list_key_is_order_independent() {
        let a = CacheKey::list(
            ResourceType::Course,
            [("level", "beginner"), ("category", "Programming")],
        );
        let b = CacheKey::list(
            ResourceType::Course,
            [("category", "Programming"), ("level", "beginner")],
        );
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "course:list:category=Programming&level=beginner&");
    }

    #[test]
    fn test_detail_key_display() {
        let key = CacheKey::detail(ResourceType::Lesson, 12);
        assert_eq!(key.to_string(), "lesson:12");
        assert!(!key.is_list());
        assert_eq!(key.family(), ResourceType::Lesson);
    }

    #[test]
    fn test_empty_list_key() {
        let key = CacheKey::list(ResourceType::Course, Vec::<(&str, String)>::new());
        assert_eq!(key.kind(), &CacheKeyKind::List(Vec::new()));
        assert_eq!(key.to_string(), "course:list:");
    }

    #[test]
    fn test_separator_characters_in_values_do_not_collide() {
        let two_params = CacheKey::list(
            ResourceType::Course,
            [("category", "a"), ("level", "beginner")],
        );
        let one_param = CacheKey::list(ResourceType::Course, [("category", "a&level=beginner")]);
        assert_ne!(two_params, one_param);

        let split_left = CacheKey::list(ResourceType::Course, [("category", "x=y")]);
        let split_right = CacheKey::list(ResourceType::Course, [("category=x", "y")]);
        assert_ne!(split_left, split_right);
    }

    #[test]
    fn test_families_do_not_collide() {
        let course = CacheKey::detail(ResourceType::Course, 1);
        let lesson = CacheKey::detail(ResourceType::Lesson, 1);
        assert_ne!(course, lesson);
    }

    proptest! {
        #[test]
        fn prop_list_key_ignores_param_order(
            params in proptest::collection::btree_map("[a-z_]{1,8}", "[a-z0-9]{0,8}", 0..5)
        ) {
            let forward: Vec<(String, String)> =
                params.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            let mut reversed = forward.clone();
            reversed.reverse();

            prop_assert_eq!(
                CacheKey::list(ResourceType::Assignment, forward),
                CacheKey::list(ResourceType::Assignment, reversed)
            );
        }
    }
}
