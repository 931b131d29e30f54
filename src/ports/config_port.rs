//! Configuration access port trait.

/// Raw key lookup; typing and validation live in `domain::config_validation`.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
