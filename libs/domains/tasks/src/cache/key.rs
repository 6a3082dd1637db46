//! Cache key derivation.
//!
//! Keys are shared with other deployments of this API, so their spelling is
//! fixed: lists live under `TaskItems_` plus `""`, `"True"` or `"False"`,
//! single items under `taskItem_{id}`.

const LIST_PREFIX: &str = "TaskItems_";
const ITEM_PREFIX: &str = "taskItem_";

pub struct CacheKey;

impl CacheKey {
    /// Key for a list query with an optional completion filter.
    pub fn task_list(completed: Option<bool>) -> String {
        let filter = match completed {
            None => "",
            Some(true) => "True",
            Some(false) => "False",
        };
        format!("{}{}", LIST_PREFIX, filter)
    }

    pub fn task_item(id: i32) -> String {
        format!("{}{}", ITEM_PREFIX, id)
    }

    /// Keys dropped after an update or delete of `id`, in removal order.
    pub fn write_invalidation(id: i32) -> [String; 4] {
        [
            Self::task_item(id),
            Self::task_list(Some(true)),
            Self::task_list(Some(false)),
            Self::task_list(None),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_keys() {
        assert_eq!(CacheKey::task_list(None), "TaskItems_");
        assert_eq!(CacheKey::task_list(Some(true)), "TaskItems_True");
        assert_eq!(CacheKey::task_list(Some(false)), "TaskItems_False");
    }

    #[test]
    fn test_item_key() {
        assert_eq!(CacheKey::task_item(42), "taskItem_42");
    }

    #[test]
    fn test_write_invalidation_covers_item_and_every_list() {
        assert_eq!(
            CacheKey::write_invalidation(7),
            ["taskItem_7", "TaskItems_True", "TaskItems_False", "TaskItems_"]
        );
    }
}
