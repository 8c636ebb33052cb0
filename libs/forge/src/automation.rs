//! Automation policy for status-check driven auto-termination.

use labvt_model::InstanceCustomizationUrls;

use crate::keys;

/// Returns true if the instance should be watched for auto-termination.
///
/// Requires customization to be present with a non-empty status-check URL.
pub fn automation_enabled(customization_urls: Option<&InstanceCustomizationUrls>) -> bool {
    customization_urls
        .and_then(|urls| urls.status_check.as_deref())
        .is_some_and(|url| !url.is_empty())
}

/// Value proposed for the termination selector, if any.
///
/// `None` means the policy has no opinion and the key must be left as is.
pub fn termination_selector(
    customization_urls: Option<&InstanceCustomizationUrls>,
) -> Option<&'static str> {
    automation_enabled(customization_urls).then(|| keys::bool_value(true))
}
