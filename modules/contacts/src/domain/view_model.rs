use std::sync::{Arc, Weak};

use arc_swap::{ArcSwap, ArcSwapOption};
use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::contract::model::Contact;
use crate::domain::events::ContactListEvent;
use crate::domain::filter::filtered_contacts;
use crate::domain::mapper::{contact_from_document, FIELD_OWNER_ID};
use crate::domain::ports::{
    Document, DocumentStore, EventPublisher, FieldFilter, Snapshot, SnapshotListener,
    SubscriptionHandle,
};

/// Local view state of the signed-in user's contact list.
///
/// Writers (`attach_to_user`, realtime deliveries, `set_contacts`,
/// `set_display_name`) are serialized by one lock. Readers never block: the
/// contact collection and the display name are published by atomic swap, so a
/// reader always observes a complete collection.
///
/// Every attachment bumps a generation counter. Realtime callbacks carry the
/// generation they were registered with and are dropped once it is stale.
pub struct ContactListViewModel {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn DocumentStore>,
    events: Arc<dyn EventPublisher<ContactListEvent>>,
    collection: String,
    contacts: ArcSwap<Vec<Contact>>,
    display_name: ArcSwap<String>,
    search_query: ArcSwap<String>,
    last_feed_error: ArcSwapOption<String>,
    session: Mutex<Session>,
}

#[derive(Default)]
struct Session {
    generation: u64,
    /// Bumped on every swap of the contact collection.
    revision: u64,
    owner_id: Option<String>,
    subscription: Option<SubscriptionHandle>,
}

/// State a one-shot query was started from.
///
/// A query result is only applied if neither the attachment nor the
/// collection changed while the query was in flight, so an older result can
/// never overwrite a newer realtime snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
    revision: u64,
}

impl ContactListViewModel {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        events: Arc<dyn EventPublisher<ContactListEvent>>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                events,
                collection: collection.into(),
                contacts: ArcSwap::from_pointee(Vec::new()),
                display_name: ArcSwap::from_pointee(String::new()),
                search_query: ArcSwap::from_pointee(String::new()),
                last_feed_error: ArcSwapOption::empty(),
                session: Mutex::new(Session::default()),
            }),
        }
    }

    // --- reads ---

    pub fn contacts(&self) -> Arc<Vec<Contact>> {
        self.inner.contacts.load_full()
    }

    pub fn display_name(&self) -> Arc<String> {
        self.inner.display_name.load_full()
    }

    pub fn search_query(&self) -> Arc<String> {
        self.inner.search_query.load_full()
    }

    /// Contacts matching `query`, derived from the current collection on every call.
    pub fn filtered_contacts(&self, query: &str) -> Vec<Contact> {
        filtered_contacts(&self.contacts(), query)
    }

    /// Contacts matching the live search query.
    pub fn visible_contacts(&self) -> Vec<Contact> {
        let query = self.search_query();
        self.filtered_contacts(&query)
    }

    pub fn owner_id(&self) -> Option<String> {
        self.inner.session.lock().owner_id.clone()
    }

    pub fn generation(&self) -> u64 {
        self.inner.session.lock().generation
    }

    /// Generation and owner of the current attachment, `None` when signed out.
    pub fn attachment(&self) -> Option<(u64, String)> {
        let s = self.inner.session.lock();
        s.owner_id.clone().map(|owner| (s.generation, owner))
    }

    /// Ticket for a one-shot refresh of the attached owner's contacts.
    pub fn refresh_ticket(&self) -> Option<(RefreshTicket, String)> {
        let s = self.inner.session.lock();
        s.owner_id.clone().map(|owner| {
            (
                RefreshTicket {
                    generation: s.generation,
                    revision: s.revision,
                },
                owner,
            )
        })
    }

    pub fn has_subscription(&self) -> bool {
        self.inner.session.lock().subscription.is_some()
    }

    /// Last realtime error of the current attachment, cleared by the next good snapshot.
    pub fn last_feed_error(&self) -> Option<Arc<String>> {
        self.inner.last_feed_error.load_full()
    }

    // --- writes ---

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.inner.search_query.store(Arc::new(query.into()));
    }

    /// Switch the view model to `user_id`, or to the signed-out state for
    /// `None`/empty.
    ///
    /// The previous subscription is released and the collection cleared before
    /// the new subscription is opened. Setup does not block: snapshots arrive
    /// through the store callback.
    #[instrument(name = "contacts.view_model.attach", skip(self))]
    pub fn attach_to_user(&self, user_id: Option<&str>) {
        let owner = user_id.filter(|id| !id.is_empty()).map(str::to_owned);

        let (generation, previous) = {
            let mut s = self.inner.session.lock();
            s.generation += 1;
            s.revision += 1;
            s.owner_id = owner.clone();
            self.inner.contacts.store(Arc::new(Vec::new()));
            self.inner.last_feed_error.store(None);
            (s.generation, s.subscription.take())
        };

        if let Some(handle) = previous {
            debug!(subscription = handle.id(), "Releasing previous subscription");
            self.inner.store.unsubscribe(handle);
        }

        self.inner.events.publish(&ContactListEvent::Attached {
            owner_id: owner.clone(),
            generation,
            at: Utc::now(),
        });

        let Some(owner) = owner else {
            info!("Detached, contact list cleared");
            return;
        };

        let listener = Inner::listener(Arc::downgrade(&self.inner), generation);
        let filter = FieldFilter::eq(FIELD_OWNER_ID, owner);
        match self
            .inner
            .store
            .subscribe(&self.inner.collection, filter, listener)
        {
            Ok(handle) => {
                let mut s = self.inner.session.lock();
                if s.generation == generation {
                    s.subscription = Some(handle);
                    info!(generation, subscription = handle.id(), "Attached to contacts feed");
                } else {
                    // Superseded while subscribing.
                    drop(s);
                    self.inner.store.unsubscribe(handle);
                }
            }
            Err(e) => {
                warn!("Could not open contacts feed: {}", e);
                self.inner.report_feed_error(generation, e.to_string());
            }
        }
    }

    /// Equivalent to `attach_to_user(None)`.
    pub fn detach(&self) {
        self.attach_to_user(None);
    }

    /// Apply a realtime delivery registered under `generation`.
    pub fn on_snapshot(&self, generation: u64, snapshot: Snapshot) {
        self.inner.apply_snapshot(generation, snapshot);
    }

    /// Replace the collection directly (e.g. after a one-shot query).
    /// Contacts of other owners are discarded.
    pub fn set_contacts(&self, contacts: Vec<Contact>) {
        let mut s = self.inner.session.lock();
        let generation = s.generation;
        let count = self.inner.replace(&mut s, contacts);
        drop(s);
        self.inner.publish_replaced(generation, count);
    }

    /// Like [`set_contacts`](Self::set_contacts) but only if nothing changed
    /// since `ticket` was taken. Returns whether the list was applied.
    pub fn apply_refresh(&self, ticket: RefreshTicket, contacts: Vec<Contact>) -> bool {
        let mut s = self.inner.session.lock();
        if s.generation != ticket.generation || s.revision != ticket.revision {
            debug!(
                generation = ticket.generation,
                current = s.generation,
                "Dropping stale query result"
            );
            return false;
        }
        let count = self.inner.replace(&mut s, contacts);
        drop(s);
        self.inner.publish_replaced(ticket.generation, count);
        true
    }

    pub fn set_display_name(&self, name: impl Into<String>) {
        let name = name.into();
        let changed = {
            let _s = self.inner.session.lock();
            let changed = **self.inner.display_name.load() != name;
            self.inner.display_name.store(Arc::new(name));
            changed
        };
        if changed {
            self.inner
                .events
                .publish(&ContactListEvent::DisplayNameChanged { at: Utc::now() });
        }
    }
}

impl Inner {
    fn listener(weak: Weak<Inner>, generation: u64) -> SnapshotListener {
        Arc::new(move |snapshot| {
            if let Some(inner) = weak.upgrade() {
                inner.apply_snapshot(generation, snapshot);
            }
        })
    }

    fn apply_snapshot(&self, generation: u64, snapshot: Snapshot) {
        let mut s = self.session.lock();
        if s.generation != generation {
            debug!(generation, current = s.generation, "Dropping stale snapshot");
            return;
        }
        match snapshot {
            Err(e) => {
                let message = e.to_string();
                self.last_feed_error.store(Some(Arc::new(message.clone())));
                drop(s);
                warn!(generation, "Contacts feed failed, keeping current list: {}", message);
                self.publish_feed_error(generation, message);
            }
            Ok(documents) => {
                let Some(owner) = s.owner_id.as_deref() else {
                    return;
                };
                let contacts = map_documents(owner, documents);
                let count = contacts.len();
                debug!(generation, count, "Applying snapshot");
                s.revision += 1;
                self.contacts.store(Arc::new(contacts));
                self.last_feed_error.store(None);
                drop(s);
                self.publish_replaced(generation, count);
            }
        }
    }

    /// Swap in `contacts`, keeping only the attached owner's entries.
    /// The caller holds the session lock. Returns the number kept.
    fn replace(&self, s: &mut Session, contacts: Vec<Contact>) -> usize {
        s.revision += 1;
        let kept = match s.owner_id.as_deref() {
            Some(owner) => {
                let total = contacts.len();
                let kept: Vec<Contact> =
                    contacts.into_iter().filter(|c| c.owner_id == owner).collect();
                if kept.len() != total {
                    warn!(dropped = total - kept.len(), "Discarding contacts of another owner");
                }
                kept
            }
            None => Vec::new(),
        };
        let count = kept.len();
        self.contacts.store(Arc::new(kept));
        count
    }

    fn publish_replaced(&self, generation: u64, count: usize) {
        self.events.publish(&ContactListEvent::ContactsReplaced {
            count,
            generation,
            at: Utc::now(),
        });
    }

    /// Record a feed failure of `generation` unless a newer attachment exists.
    fn report_feed_error(&self, generation: u64, message: String) {
        let s = self.session.lock();
        if s.generation != generation {
            debug!(generation, current = s.generation, "Dropping stale feed error");
            return;
        }
        self.last_feed_error.store(Some(Arc::new(message.clone())));
        drop(s);
        self.publish_feed_error(generation, message);
    }

    fn publish_feed_error(&self, generation: u64, message: String) {
        self.events.publish(&ContactListEvent::FeedError {
            message,
            generation,
            at: Utc::now(),
        });
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.session.get_mut().subscription.take() {
            self.store.unsubscribe(handle);
        }
    }
}

fn map_documents(owner: &str, documents: Vec<Document>) -> Vec<Contact> {
    documents
        .iter()
        .filter_map(|doc| {
            let contact = contact_from_document(doc);
            if contact.is_none() {
                warn!(document = %doc.id, "Skipping malformed contact document");
            }
            contact
        })
        .filter(|c| {
            let own = c.owner_id == owner;
            if !own {
                warn!(document = %c.id, "Skipping contact of another owner");
            }
            own
        })
        .collect()
}
