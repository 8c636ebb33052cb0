//! Reserved label keys.
//!
//! Every key shares the [`PREFIX`] namespace; values are plain strings and
//! booleans are rendered as `"true"`/`"false"`.

/// Namespace shared by every reserved key.
pub const PREFIX: &str = "crownlabs.polito.it/";

pub const MANAGED_BY: &str = "crownlabs.polito.it/managed-by";
pub const WORKSPACE: &str = "crownlabs.polito.it/workspace";
pub const TEMPLATE: &str = "crownlabs.polito.it/template";
pub const TENANT: &str = "crownlabs.polito.it/tenant";
pub const INSTANCE: &str = "crownlabs.polito.it/instance";
pub const PERSISTENT: &str = "crownlabs.polito.it/persistent";
pub const COMPONENT: &str = "crownlabs.polito.it/component";

/// Marks instances watched by the status-check driven auto-termination.
pub const TERMINATION_SELECTOR: &str = "crownlabs.polito.it/termination-selector";

/// Marks instances whose content must be submitted after termination.
pub const SUBMITTER_SELECTOR: &str = "crownlabs.polito.it/submitter-selector";

/// Value of [`MANAGED_BY`] on everything the instance controller owns.
pub const MANAGED_BY_INSTANCE: &str = "instance";

/// Renders a boolean label value.
pub fn bool_value(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Returns true if `key` belongs to the reserved namespace.
pub fn is_reserved(key: &str) -> bool {
    key.starts_with(PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_keys_share_prefix() {
        for key in [
            MANAGED_BY,
            WORKSPACE,
            TEMPLATE,
            TENANT,
            INSTANCE,
            PERSISTENT,
            COMPONENT,
            TERMINATION_SELECTOR,
            SUBMITTER_SELECTOR,
        ] {
            assert!(is_reserved(key), "{key} outside reserved namespace");
        }
        assert!(!is_reserved("user/key"));
    }

    #[test]
    fn test_bool_value() {
        assert_eq!(bool_value(true), "true");
        assert_eq!(bool_value(false), "false");
    }
}
