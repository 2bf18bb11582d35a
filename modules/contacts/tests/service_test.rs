//! Contact CRUD through the domain service against the in-memory backends.

mod common;

use std::io::{Cursor, Write};
use std::sync::Arc;

use common::*;
use contacts::contract::model::{ContactDraft, UserProfile};
use contacts::domain::error::DomainError;
use contacts::domain::messages::{Locale, Messages};
use contacts::domain::ports::{AuthClient, DocumentStore, ImageError, ImageProcessor};
use contacts::domain::service::{ContactsService, ServiceConfig};
use contacts::domain::view_model::ContactListViewModel;
use contacts::infra::image::{FileImageSource, ImagePipeline};
use contacts::infra::memory::{InMemoryAuthClient, InMemoryDocumentStore};
use image::{DynamicImage, ImageFormat};
use serde_json::json;
use tracing_test::traced_test;

struct Harness {
    store: Arc<InMemoryDocumentStore>,
    auth: Arc<InMemoryAuthClient>,
    camera: Arc<FileImageSource>,
    vm: Arc<ContactListViewModel>,
    service: ContactsService,
    uid: String,
}

fn build(store: Arc<InMemoryDocumentStore>, images: Arc<dyn ImageProcessor>) -> Harness {
    let auth = Arc::new(InMemoryAuthClient::new());
    let camera = Arc::new(FileImageSource::new());
    let vm = Arc::new(ContactListViewModel::new(
        store.clone(),
        Arc::new(RecordingPublisher::default()),
        CONTACTS,
    ));
    let service = ContactsService::new(
        store.clone(),
        auth.clone(),
        images,
        camera.clone(),
        vm.clone(),
        ServiceConfig::default(),
    );
    Harness {
        store,
        auth,
        camera,
        vm,
        service,
        uid: String::new(),
    }
}

/// Signed in as a@x.com and attached.
async fn signed_in() -> Harness {
    let mut h = build(
        Arc::new(InMemoryDocumentStore::new()),
        Arc::new(ImagePipeline::default()),
    );
    let user = h.auth.sign_up("a@x.com", "secret1").await.unwrap();
    h.vm.attach_to_user(Some(&user.uid));
    h.uid = user.uid;
    h
}

fn draft(name: &str, phone: &str, email: &str) -> ContactDraft {
    ContactDraft {
        name: name.into(),
        phone: phone.into(),
        email: email.into(),
        image: None,
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn msgs() -> Messages {
    Messages::new(Locale::En)
}

#[tokio::test]
async fn save_requires_signed_in_user() {
    let h = build(
        Arc::new(InMemoryDocumentStore::new()),
        Arc::new(ImagePipeline::default()),
    );
    let err = h
        .service
        .save_contact(None, draft("Ana", "5512345678", "a@x.com"))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::not_signed_in(msgs().not_signed_in()));
}

#[tokio::test]
async fn invalid_drafts_are_rejected_before_writing() {
    let h = signed_in().await;
    let cases = [
        (draft("", "5512345678", "a@x.com"), msgs().incomplete_contact()),
        (draft("Ana", "5512345678", "9a@x.com"), msgs().invalid_email()),
        (draft("Ana", "55-1234", "a@x.com"), msgs().invalid_phone()),
    ];
    for (d, expected) in cases {
        let err = h.service.save_contact(None, d).await.unwrap_err();
        assert_eq!(err, DomainError::validation(expected));
    }
    assert!(h.store.documents(CONTACTS).is_empty());
}

#[traced_test]
#[tokio::test]
async fn new_contact_is_stored_and_listed() {
    let h = signed_in().await;

    let saved = h
        .service
        .save_contact(None, draft("Ana", "5512345678", "a@x.com"))
        .await
        .unwrap();

    assert!(!saved.id.is_empty());
    assert_eq!(saved.image_warning, None);
    let docs = h.store.documents(CONTACTS);
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].get_str("ownerId"), Some(h.uid.as_str()));
    assert_eq!(docs[0].get_str("imageData"), Some(""));
    assert_eq!(names(&h.vm.contacts()), vec!["Ana"]);
    assert_eq!(h.vm.contacts()[0].id, saved.id);
    assert!(logs_contain("Created contact"));
}

#[tokio::test]
async fn picture_is_resized_and_stored_inline() {
    let h = signed_in().await;
    let mut d = draft("Ana", "5512345678", "a@x.com");
    d.image = Some(png(800, 400));

    let saved = h.service.save_contact(None, d).await.unwrap();
    assert_eq!(saved.image_warning, None);

    let contact = h.service.load_contact(&saved.id).await.unwrap();
    assert!(contact.has_image());
    let bytes = h.service.contact_image(&contact).unwrap();
    let stored = image::load_from_memory(&bytes).unwrap();
    assert_eq!((stored.width(), stored.height()), (500, 250));
}

#[tokio::test]
async fn unusable_picture_saves_without_it() {
    let h = signed_in().await;
    let mut d = draft("Ana", "5512345678", "a@x.com");
    d.image = Some(b"not a picture".to_vec());

    let saved = h.service.save_contact(None, d).await.unwrap();

    assert_eq!(
        saved.image_warning.as_deref(),
        Some(msgs().image_unusable())
    );
    let contact = h.service.load_contact(&saved.id).await.unwrap();
    assert!(!contact.has_image());
    assert_eq!(h.service.contact_image(&contact), None);
}

#[tokio::test]
async fn edit_keeps_stored_picture_when_none_given() {
    let h = signed_in().await;
    let mut d = draft("Ana", "5512345678", "a@x.com");
    d.image = Some(png(64, 64));
    let saved = h.service.save_contact(None, d).await.unwrap();
    let before = h.service.load_contact(&saved.id).await.unwrap();

    h.service
        .save_contact(Some(&saved.id), draft("Ana María", "5587654321", "ana@x.com"))
        .await
        .unwrap();

    let after = h.service.load_contact(&saved.id).await.unwrap();
    assert_eq!(after.name, "Ana María");
    assert_eq!(after.phone, "5587654321");
    assert_eq!(after.image_data, before.image_data);
    assert_eq!(h.store.documents(CONTACTS).len(), 1);
    assert_eq!(names(&h.vm.contacts()), vec!["Ana María"]);
}

#[tokio::test]
async fn contacts_of_other_users_cannot_be_touched() {
    let h = signed_in().await;
    let foreign = h
        .store
        .add_document(
            CONTACTS,
            fields(json!({"name": "Eve", "phone": "5500000000", "email": "e@x.com", "ownerId": "someone-else"})),
        )
        .await
        .unwrap();

    let err = h.service.load_contact(&foreign).await.unwrap_err();
    assert!(matches!(err, DomainError::ContactNotFound { .. }));

    let err = h
        .service
        .save_contact(Some(&foreign), draft("Mine", "5512345678", "m@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ContactNotFound { .. }));

    let err = h.service.delete_contact(&foreign).await.unwrap_err();
    assert!(matches!(err, DomainError::ContactNotFound { .. }));

    let stored = h.store.get_document(CONTACTS, &foreign).await.unwrap().unwrap();
    assert_eq!(stored.get_str("name"), Some("Eve"));
    assert!(h.vm.contacts().is_empty());
}

#[tokio::test]
async fn missing_contact_is_not_found() {
    let h = signed_in().await;
    let err = h.service.load_contact("nope").await.unwrap_err();
    assert_eq!(
        err,
        DomainError::contact_not_found("nope", msgs().contact_not_found())
    );
}

#[tokio::test]
async fn delete_removes_contact_from_store_and_list() {
    let h = signed_in().await;
    let ana = h
        .service
        .save_contact(None, draft("Ana", "5512345678", "a@x.com"))
        .await
        .unwrap();
    h.service
        .save_contact(None, draft("Bruno", "5588889999", "b@x.com"))
        .await
        .unwrap();

    h.service.delete_contact(&ana.id).await.unwrap();

    assert_eq!(h.store.documents(CONTACTS).len(), 1);
    assert_eq!(names(&h.vm.contacts()), vec!["Bruno"]);
}

#[tokio::test]
async fn store_failure_leaves_local_state_untouched() {
    let h = signed_in().await;
    let ana = h
        .service
        .save_contact(None, draft("Ana", "5512345678", "a@x.com"))
        .await
        .unwrap();

    h.store.set_offline(true);
    let err = h.service.delete_contact(&ana.id).await.unwrap_err();

    assert!(matches!(err, DomainError::Store { .. }));
    assert!(err.to_string().starts_with("Something went wrong"));
    assert_eq!(names(&h.vm.contacts()), vec!["Ana"]);
    assert!(h.vm.last_feed_error().is_some());
}

#[tokio::test]
async fn refresh_reloads_attached_owner() {
    let h = signed_in().await;
    h.store
        .add_document(
            CONTACTS,
            fields(json!({"name": "Ana", "phone": "5512345678", "email": "a@x.com", "ownerId": h.uid.clone()})),
        )
        .await
        .unwrap();

    h.service.refresh_contacts().await.unwrap();
    assert_eq!(names(&h.vm.contacts()), vec!["Ana"]);
}

#[tokio::test]
async fn refresh_is_a_noop_when_detached() {
    let h = build(
        Arc::new(InMemoryDocumentStore::new()),
        Arc::new(ImagePipeline::default()),
    );
    h.service.refresh_contacts().await.unwrap();
    assert!(h.vm.contacts().is_empty());
}

#[tokio::test]
async fn refresh_superseded_by_user_switch_is_dropped() {
    let store = FakeDocumentStore::new();
    store.set_query_result(three_docs("a"));
    let vm = Arc::new(ContactListViewModel::new(
        store.clone(),
        Arc::new(RecordingPublisher::default()),
        CONTACTS,
    ));
    let service = ContactsService::new(
        store.clone(),
        Arc::new(InMemoryAuthClient::new()),
        Arc::new(ImagePipeline::default()),
        Arc::new(FileImageSource::new()),
        vm.clone(),
        ServiceConfig::default(),
    );
    vm.attach_to_user(Some("a"));
    let switch = Arc::downgrade(&vm);
    store.before_query_returns(move || {
        if let Some(vm) = switch.upgrade() {
            vm.attach_to_user(Some("b"));
        }
    });

    service.refresh_contacts().await.unwrap();

    assert_eq!(vm.owner_id().as_deref(), Some("b"));
    assert!(vm.contacts().is_empty());
}

#[tokio::test]
async fn display_name_defaults_when_record_missing() {
    let h = signed_in().await;
    assert_eq!(h.service.load_display_name().await.unwrap().display_name, "User");
    assert_eq!(h.vm.display_name().as_str(), "User");

    h.store
        .set_document("users", &h.uid, fields(json!({"displayName": "Ana"})))
        .await
        .unwrap();
    assert_eq!(
        h.service.load_display_name().await.unwrap(),
        UserProfile {
            display_name: "Ana".into()
        }
    );
    assert_eq!(h.vm.display_name().as_str(), "Ana");
}

#[tokio::test]
async fn capture_reads_selected_picture() {
    let h = signed_in().await;
    let err = h.service.capture_contact_image().await.unwrap_err();
    assert_eq!(err, DomainError::image(msgs().capture_failed()));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&png(10, 10)).unwrap();
    h.camera.point_at(Some(file.path().to_path_buf()));

    let bytes = h.service.capture_contact_image().await.unwrap();
    assert_eq!(bytes, png(10, 10));
}

struct BrokenProcessor;

impl ImageProcessor for BrokenProcessor {
    fn correct_orientation(&self, _bytes: &[u8]) -> Result<Vec<u8>, ImageError> {
        Err(ImageError::PermissionDenied)
    }

    fn resize(&self, bytes: &[u8], _max: u32) -> Result<Vec<u8>, ImageError> {
        Ok(bytes.to_vec())
    }

    fn encode_inline(&self, _bytes: &[u8]) -> String {
        String::new()
    }

    fn decode_inline(&self, _data: &str) -> Result<Vec<u8>, ImageError> {
        Err(ImageError::Decode("broken".into()))
    }
}

#[tokio::test]
async fn image_permission_problem_is_a_warning() {
    let mut h = build(
        Arc::new(InMemoryDocumentStore::new()),
        Arc::new(BrokenProcessor),
    );
    let user = h.auth.sign_up("a@x.com", "secret1").await.unwrap();
    h.vm.attach_to_user(Some(&user.uid));
    h.uid = user.uid;

    let mut d = draft("Ana", "5512345678", "a@x.com");
    d.image = Some(png(4, 4));
    let saved = h.service.save_contact(None, d).await.unwrap();

    assert!(saved.image_warning.is_some());
    assert_eq!(h.store.documents(CONTACTS).len(), 1);
}
