//! Configuration access port trait.

/// Read-only access to sectioned key/value configuration.
///
/// `get_bool` falls back to `default` when the key is absent or not a boolean;
/// numeric values are read through `get_string` so parse failures surface.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    fn get_string_or(&self, section: &str, key: &str, default: &str) -> String {
        self.get_string(section, key)
            .unwrap_or_else(|| default.to_string())
    }
}
