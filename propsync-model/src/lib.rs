//! Core model for propsync.
//!
//! Defines the types every propsync crate depends on:
//! - [`DocumentReference`], [`ObjectReference`], [`ObjectPropertyReference`],
//!   [`AttachmentReference`]: typed targets inside a multi-wiki store
//! - [`Document`] / [`XObject`]: the mutable document handle a store hands out
//! - [`ConfigEntry`] / [`ConfigValue`]: externally supplied key/value input
//!
//! Stores, fetchers and the updater only exchange these types; none of them
//! knows how another one persists or resolves anything.

mod document;
mod reference;
mod value;

pub use document::{AttachmentInfo, Document, Revision, XObject};
pub use reference::{
    AttachmentReference, ClassReference, DocumentReference, ObjectPropertyReference,
    ObjectReference, ReferenceError,
};
pub use value::{ConfigEntry, ConfigValue};
