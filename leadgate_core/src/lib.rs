//! leadgate core library: contact sync logic shared by the server and CLI.
//!
//! The pipeline per inbound webhook event is normalize -> resolve ->
//! reconcile -> apply; everything here is CRM-agnostic behind the
//! [`crm::CrmContacts`] trait.

#![forbid(unsafe_code)]

pub mod crm;
pub mod error;
pub mod models;
pub mod normalize;
pub mod o11y;
pub mod reconcile;
pub mod signature;
pub mod source;
pub mod sync;

pub use crm::{resolve, CrmContact, CrmContacts, MemoryCrm};
pub use error::{Error, Result};
pub use models::{Action, AuditRecord, ContactIntent, PropertyMap, RemoteContact, SyncReport};
pub use normalize::normalize;
pub use reconcile::{creation_properties, reconcile};
pub use signature::{sign_body, verify_if_configured, verify_signature, SignatureConfig};
pub use source::SourceSystem;
pub use sync::SyncEngine;
