//! Label sets for instances and the objects they own.

use labvt_model::{Instance, InstanceCustomizationUrls, Labels, Template};

use crate::{automation, keys};

/// Sets `key` to `value`, returning true if the set changed.
fn update_label(labels: &mut Labels, key: &str, value: &str) -> bool {
    if labels.get(key).map(String::as_str) == Some(value) {
        return false;
    }
    labels.insert(key.to_string(), value.to_string());
    true
}

/// Forge the labels of an instance from its template and customization.
///
/// Returns the new label set and whether it differs from `existing`. An
/// existing termination selector is never overwritten, whatever its value.
pub fn instance_labels(
    existing: Option<&Labels>,
    template: &Template,
    customization_urls: Option<&InstanceCustomizationUrls>,
) -> (Labels, bool) {
    let mut labels = existing.cloned().unwrap_or_default();
    let mut changed = false;

    changed |= update_label(&mut labels, keys::MANAGED_BY, keys::MANAGED_BY_INSTANCE);
    changed |= update_label(&mut labels, keys::WORKSPACE, &template.spec.workspace_ref.name);
    changed |= update_label(&mut labels, keys::TEMPLATE, &template.metadata.name);
    changed |= update_label(
        &mut labels,
        keys::PERSISTENT,
        keys::bool_value(template.is_persistent()),
    );

    if let Some(value) = automation::termination_selector(customization_urls) {
        if !labels.contains_key(keys::TERMINATION_SELECTOR) {
            labels.insert(keys::TERMINATION_SELECTOR.to_string(), value.to_string());
            changed = true;
        }
    }

    (labels, changed)
}

/// Forge the labels of an object owned by `instance`.
pub fn instance_object_labels(existing: Option<&Labels>, instance: &Instance) -> Labels {
    let mut labels = existing.cloned().unwrap_or_default();
    labels.insert(
        keys::MANAGED_BY.to_string(),
        keys::MANAGED_BY_INSTANCE.to_string(),
    );
    labels.extend(instance_selector_labels(instance));
    labels
}

/// Like [`instance_object_labels`], additionally tagging the object's role.
pub fn instance_component_labels(
    existing: Option<&Labels>,
    instance: &Instance,
    component: &str,
) -> Labels {
    let mut labels = instance_object_labels(existing, instance);
    labels.insert(keys::COMPONENT.to_string(), component.to_string());
    labels
}

/// Labels selecting the objects owned by `instance`.
pub fn instance_selector_labels(instance: &Instance) -> Labels {
    Labels::from([
        (keys::INSTANCE.to_string(), instance.metadata.name.clone()),
        (keys::TEMPLATE.to_string(), instance.spec.template.name.clone()),
        (keys::TENANT.to_string(), instance.spec.tenant.name.clone()),
    ])
}

/// Labels recorded when the submitter terminates an instance.
///
/// Disables automation and raises the submission marker, overwriting any
/// previous value of those two keys only.
pub fn instance_automation_labels_on_termination(existing: Option<&Labels>) -> Labels {
    let mut labels = existing.cloned().unwrap_or_default();
    labels.insert(
        keys::TERMINATION_SELECTOR.to_string(),
        keys::bool_value(false).to_string(),
    );
    labels.insert(
        keys::SUBMITTER_SELECTOR.to_string(),
        keys::bool_value(true).to_string(),
    );
    labels
}

/// Returns true if the label set marks an object owned by the instance controller.
pub fn is_instance_managed(labels: &Labels) -> bool {
    labels.get(keys::MANAGED_BY).map(String::as_str) == Some(keys::MANAGED_BY_INSTANCE)
}

/// Forge the labels of `instance` in place.
///
/// Returns true if the metadata changed and must be written back.
pub fn reconcile_instance_labels(instance: &mut Instance, template: &Template) -> bool {
    let (labels, changed) = instance_labels(
        instance.metadata.labels.as_ref(),
        template,
        instance.spec.customization_urls.as_ref(),
    );
    if changed {
        instance.metadata.labels = Some(labels);
    }
    changed
}

// =============================================================================
// Tests
// =============================================================================
