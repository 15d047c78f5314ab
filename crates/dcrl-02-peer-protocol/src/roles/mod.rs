//! Role handlers, layered by composition: an authority wraps a participant,
//! which wraps an observer. Each layer overrides what it adds and delegates
//! the rest inward.

pub mod authority;
pub mod observer;
pub mod participant;

pub use authority::AuthorityHandler;
pub use observer::{ObserverHandler, ObserverSettings, RoleContext};
pub use participant::ParticipantHandler;
