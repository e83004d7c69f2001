//! Interaction record model.
//!
//! A [`Connection`] is one trigger→action pair read off a screen node by the
//! document walker. Only `NODE` and `OVERLAY` actions with a destination
//! become graph edges; see [`Connection::destination`].

pub mod connection;

pub use connection::{
    Action, ActionType, Connection, ConnectionView, Easing, OverlaySettings, Transition, Trigger,
    TriggerType,
};
