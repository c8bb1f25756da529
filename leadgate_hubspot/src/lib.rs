//! HubSpot CRM v3 client implementing the `CrmContacts` seam.

#![forbid(unsafe_code)]

pub mod client;

pub use client::HubSpotClient;
