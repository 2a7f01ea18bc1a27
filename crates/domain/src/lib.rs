//! # roomhub-domain
//!
//! Pure domain model for the roomhub device registry.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Users** and the per-request **Identity**
//! - Define **Rooms** (ownership boundaries) and their aggregated **views**
//! - Define **Devices** (analog, digital, smart) and their **Values** (readings)
//! - Define the **ownership policy** deciding who may do what
//! - Define **Tokens** and installation **Settings**
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod policy;
pub mod room;
pub mod room_view;
pub mod settings;
pub mod token;
pub mod user;
pub mod value;
