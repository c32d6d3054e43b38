//! Configuration access port trait.

/// Read-only access to sectioned key/value settings.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Returns `None` when the key is absent, `Some(Err(raw))` when present but not an integer.
    fn get_int(&self, section: &str, key: &str) -> Option<Result<i64, String>>;

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
}
