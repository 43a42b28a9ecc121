use super::cache::GenerationCache;
use super::catalog::{PENDING, StatusCatalog};
use crate::domain::method::{PaymentMethodDefinition, SupportedCurrencies};
use crate::domain::payment::Payment;
use crate::domain::ports::{Clock, PaymentMethod};
use crate::domain::status::StatusKind;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

pub const BASIC_PLUGIN_ID: &str = "payment_basic";
pub const UNAVAILABLE_PLUGIN_ID: &str = "payment_unavailable";

/// A payment method as configured by a site administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodConfiguration {
    pub id: String,
    #[serde(default = "default_plugin_id")]
    pub plugin_id: String,
    pub label: String,
    #[serde(default)]
    pub brand_label: Option<String>,
    #[serde(default)]
    pub owner_id: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub message_text: String,
    #[serde(default)]
    pub interruptive: bool,
    #[serde(default = "default_execute_status_id")]
    pub execute_status_id: StatusKind,
    #[serde(default)]
    pub supported_currencies: SupportedCurrencies,
}

fn default_plugin_id() -> String {
    BASIC_PLUGIN_ID.to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_execute_status_id() -> StatusKind {
    StatusKind::new(PENDING)
}

impl PaymentMethodConfiguration {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            plugin_id: default_plugin_id(),
            label: label.to_string(),
            brand_label: None,
            owner_id: 0,
            enabled: true,
            message_text: String::new(),
            interruptive: false,
            execute_status_id: default_execute_status_id(),
            supported_currencies: SupportedCurrencies::All,
        }
    }

    fn derive_definition(&self) -> PaymentMethodDefinition {
        let label = match &self.brand_label {
            Some(brand) if !brand.is_empty() => brand.clone(),
            _ => self.label.clone(),
        };
        PaymentMethodDefinition {
            id: self.id.clone(),
            plugin_id: self.plugin_id.clone(),
            label,
            active: self.enabled,
            interruptive: self.interruptive,
            supported_currencies: self.supported_currencies.clone(),
            execute_status_id: self.execute_status_id.clone(),
        }
    }
}

/// Collaborators handed to plugin constructors.
#[derive(Clone)]
pub struct PluginContext {
    pub catalog: Arc<StatusCatalog>,
    pub clock: Arc<dyn Clock>,
}

pub type PluginConstructor =
    Box<dyn Fn(PaymentMethodDefinition, &PluginContext) -> Arc<dyn PaymentMethod> + Send + Sync>;

fn basic_method(
    definition: PaymentMethodDefinition,
    context: &PluginContext,
) -> Arc<dyn PaymentMethod> {
    Arc::new(BasicPaymentMethod::new(definition, context.clone()))
}

/// Holds method configurations and turns them into executable methods.
pub struct PaymentMethodManager {
    configurations: RwLock<BTreeMap<String, PaymentMethodConfiguration>>,
    definitions: GenerationCache<BTreeMap<String, PaymentMethodDefinition>>,
    plugins: HashMap<String, PluginConstructor>,
    context: PluginContext,
}

impl PaymentMethodManager {
    /// Creates a manager that knows the built-in `payment_basic` plugin.
    pub fn new(catalog: Arc<StatusCatalog>, clock: Arc<dyn Clock>) -> Self {
        let mut manager = Self {
            configurations: RwLock::new(BTreeMap::new()),
            definitions: GenerationCache::new(),
            plugins: HashMap::new(),
            context: PluginContext { catalog, clock },
        };
        manager.register_plugin(BASIC_PLUGIN_ID, Box::new(basic_method));
        manager
    }

    pub fn register_plugin(&mut self, plugin_id: &str, constructor: PluginConstructor) {
        self.plugins.insert(plugin_id.to_string(), constructor);
        self.definitions.invalidate();
    }

    pub fn save_configuration(&self, configuration: PaymentMethodConfiguration) {
        let mut configurations = self.configurations.write().unwrap_or_else(|e| e.into_inner());
        configurations.insert(configuration.id.clone(), configuration);
        self.definitions.invalidate();
    }

    pub fn delete_configuration(&self, id: &str) -> Option<PaymentMethodConfiguration> {
        let mut configurations = self.configurations.write().unwrap_or_else(|e| e.into_inner());
        let removed = configurations.remove(id);
        if removed.is_some() {
            self.definitions.invalidate();
        }
        removed
    }

    pub fn configuration(&self, id: &str) -> Option<PaymentMethodConfiguration> {
        let configurations = self.configurations.read().unwrap_or_else(|e| e.into_inner());
        configurations.get(id).cloned()
    }

    /// Method definitions keyed by configuration id.
    pub fn definitions(&self) -> Result<Arc<BTreeMap<String, PaymentMethodDefinition>>> {
        self.definitions.get_or_rebuild(|| {
            let configurations = self.configurations.read().unwrap_or_else(|e| e.into_inner());
            Ok(configurations
                .values()
                .map(|configuration| (configuration.id.clone(), configuration.derive_definition()))
                .collect())
        })
    }

    /// Labels of all methods keyed by id, for selection lists.
    pub fn options(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .definitions()?
            .values()
            .map(|definition| (definition.id.clone(), definition.label.clone()))
            .collect())
    }

    pub fn create_instance(&self, id: &str) -> Result<Arc<dyn PaymentMethod>> {
        let definitions = self.definitions()?;
        let definition = definitions
            .get(id)
            .cloned()
            .ok_or_else(|| PaymentError::UnknownPaymentMethod(id.to_string()))?;
        match self.plugins.get(&definition.plugin_id) {
            Some(constructor) => Ok(constructor(definition, &self.context)),
            None => {
                tracing::warn!(
                    method = id,
                    plugin = %definition.plugin_id,
                    "Unknown payment method plugin, falling back to {}",
                    UNAVAILABLE_PLUGIN_ID
                );
                Ok(Arc::new(UnavailablePaymentMethod::new(definition)))
            }
        }
    }
}

/// Executes payments by setting a configured status.
pub struct BasicPaymentMethod {
    definition: PaymentMethodDefinition,
    context: PluginContext,
}

impl BasicPaymentMethod {
    pub fn new(definition: PaymentMethodDefinition, context: PluginContext) -> Self {
        Self {
            definition,
            context,
        }
    }
}

#[async_trait]
impl PaymentMethod for BasicPaymentMethod {
    fn definition(&self) -> &PaymentMethodDefinition {
        &self.definition
    }

    async fn do_execute_payment(&self, payment: &mut Payment) -> Result<()> {
        let status = self.definition.execute_status_id.clone();
        self.context.catalog.hierarchy()?.definition(&status)?;
        payment.set_status(status, self.context.clock.now());
        tracing::info!(
            payment_id = ?payment.id,
            method = %self.definition.id,
            status = %self.definition.execute_status_id,
            "Executed payment"
        );
        Ok(())
    }
}

/// Stands in for a method whose plugin is not installed. Never active.
pub struct UnavailablePaymentMethod {
    definition: PaymentMethodDefinition,
}

impl UnavailablePaymentMethod {
    pub fn new(mut definition: PaymentMethodDefinition) -> Self {
        definition.plugin_id = UNAVAILABLE_PLUGIN_ID.to_string();
        definition.active = false;
        Self { definition }
    }
}

#[async_trait]
impl PaymentMethod for UnavailablePaymentMethod {
    fn definition(&self) -> &PaymentMethodDefinition {
        &self.definition
    }

    async fn do_execute_payment(&self, _payment: &mut Payment) -> Result<()> {
        Err(PaymentError::MethodUnavailable(self.definition.id.clone()))
    }
}
