use std::sync::Arc;

use futures::Stream;
use tracing::{debug, info};

use crate::config::ContactsConfig;
use crate::contract::client::ContactsApi;
use crate::domain::account::AccountService;
use crate::domain::events::ContactListEvent;
use crate::domain::ports::{
    AuthClient, DocumentStore, ImageProcessor, ImageSource, PreferencesStore,
};
use crate::domain::service::ContactsService;
use crate::domain::view_model::ContactListViewModel;
use crate::gateways::local::ContactsLocalClient;
use crate::infra::events::{BroadcastEventPublisher, EventBroadcaster};
use crate::infra::image::{FileImageSource, ImagePipeline};
use crate::infra::memory::{InMemoryAuthClient, InMemoryDocumentStore, InMemoryPreferences};

/// Adapters the module is wired to.
#[derive(Clone)]
pub struct Backends {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<dyn AuthClient>,
    pub prefs: Arc<dyn PreferencesStore>,
    pub camera: Arc<dyn ImageSource>,
    pub images: Arc<dyn ImageProcessor>,
}

impl Backends {
    /// Fresh in-process backends; see [`InMemoryBackends`] to keep the concrete handles.
    pub fn in_memory(config: &ContactsConfig) -> Self {
        InMemoryBackends::new().backends(config)
    }
}

/// Concrete in-process adapters, for callers that need their extra controls
/// (offline switch, picture file selection).
#[derive(Clone, Default)]
pub struct InMemoryBackends {
    pub store: Arc<InMemoryDocumentStore>,
    pub auth: Arc<InMemoryAuthClient>,
    pub prefs: Arc<InMemoryPreferences>,
    pub camera: Arc<FileImageSource>,
}

impl InMemoryBackends {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backends(&self, config: &ContactsConfig) -> Backends {
        Backends {
            store: self.store.clone(),
            auth: self.auth.clone(),
            prefs: self.prefs.clone(),
            camera: self.camera.clone(),
            images: Arc::new(ImagePipeline::new(config.jpeg_quality)),
        }
    }
}

/// The contacts module: view model, domain services and the local client,
/// wired to one set of backends.
pub struct ContactsModule {
    config: ContactsConfig,
    events: EventBroadcaster<ContactListEvent>,
    view_model: Arc<ContactListViewModel>,
    contacts: Arc<ContactsService>,
    account: Arc<AccountService>,
}

impl ContactsModule {
    pub fn new(config: ContactsConfig, backends: Backends) -> Self {
        info!("Initializing contacts module");
        debug!(
            "Loaded contacts config: locale={:?}, collection={}, max_image_dimension={}",
            config.locale, config.contacts_collection, config.max_image_dimension
        );

        let events = EventBroadcaster::new(config.event_buffer);
        let publisher = Arc::new(BroadcastEventPublisher::new(events.clone()));
        let view_model = Arc::new(ContactListViewModel::new(
            backends.store.clone(),
            publisher,
            config.contacts_collection.clone(),
        ));
        let contacts = Arc::new(ContactsService::new(
            backends.store.clone(),
            backends.auth.clone(),
            backends.images,
            backends.camera,
            view_model.clone(),
            config.service_config(),
        ));
        let account = Arc::new(AccountService::new(
            backends.auth,
            backends.store,
            backends.prefs,
            contacts.clone(),
        ));

        info!("Contacts module ready");
        Self {
            config,
            events,
            view_model,
            contacts,
            account,
        }
    }

    /// Build from the raw `modules.contacts` config value.
    pub fn from_module_value(
        value: Option<&serde_json::Value>,
        backends: Backends,
    ) -> anyhow::Result<Self> {
        let config = ContactsConfig::from_module_value(value)?;
        Ok(Self::new(config, backends))
    }

    pub fn config(&self) -> &ContactsConfig {
        &self.config
    }

    pub fn view_model(&self) -> &Arc<ContactListViewModel> {
        &self.view_model
    }

    pub fn contacts(&self) -> &Arc<ContactsService> {
        &self.contacts
    }

    pub fn account(&self) -> &Arc<AccountService> {
        &self.account
    }

    /// In-process client for other crates.
    pub fn client(&self) -> Arc<dyn ContactsApi> {
        Arc::new(ContactsLocalClient::new(self.contacts.clone()))
    }

    /// View-model change notifications emitted after this call.
    pub fn subscribe_events(&self) -> impl Stream<Item = ContactListEvent> {
        self.events.subscribe_stream()
    }
}
