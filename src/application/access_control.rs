//! Ownership based access checks for payments and payment method configurations.
//!
//! Permissions come in an `.any` variant, granting the operation on every
//! entity, and an `.own` variant that only applies to entities the principal owns.

use super::methods::PaymentMethodConfiguration;
use crate::domain::access::Principal;
use crate::domain::payment::Payment;

const METHOD_CONFIGURATION_PERMISSION_PREFIX: &str = "payment.payment_method_configuration";
const PAYMENT_PERMISSION_PREFIX: &str = "payment.payment";

fn owner_access(prefix: &str, operation: &str, owner_id: u64, principal: &dyn Principal) -> bool {
    let permission = format!("{prefix}.{operation}");
    principal.has_permission(&format!("{permission}.any"))
        || (principal.has_permission(&format!("{permission}.own")) && principal.id() == owner_id)
}

/// Whether `principal` may perform `operation` on a method configuration.
///
/// `enable` and `disable` additionally require the configuration to be in the
/// opposite state, and both need `update` access. `duplicate` needs create
/// access for the configuration's plugin plus `view` access.
pub fn method_configuration_access(
    configuration: &PaymentMethodConfiguration,
    operation: &str,
    principal: &dyn Principal,
) -> bool {
    match operation {
        "enable" => {
            !configuration.enabled
                && method_configuration_access(configuration, "update", principal)
        }
        "disable" => {
            configuration.enabled
                && method_configuration_access(configuration, "update", principal)
        }
        "duplicate" => {
            method_configuration_create_access(&configuration.plugin_id, principal)
                && method_configuration_access(configuration, "view", principal)
        }
        _ => owner_access(
            METHOD_CONFIGURATION_PERMISSION_PREFIX,
            operation,
            configuration.owner_id,
            principal,
        ),
    }
}

pub fn method_configuration_create_access(plugin_id: &str, principal: &dyn Principal) -> bool {
    principal.has_permission(&format!(
        "{METHOD_CONFIGURATION_PERMISSION_PREFIX}.create.{plugin_id}"
    ))
}

pub fn payment_access(payment: &Payment, operation: &str, principal: &dyn Principal) -> bool {
    owner_access(PAYMENT_PERMISSION_PREFIX, operation, payment.owner_id, principal)
}
