//! Hand-off from the national digital-identity provider.
//!
//! The provider hosts the sign-in widget and the authorization endpoint;
//! this module only assembles the widget's init payload, interprets the
//! redirect-back parameters, and exchanges the authorization code for
//! identity claims through the relying-party backend.

pub mod exchange;
pub mod handoff;
pub mod widget;

pub use exchange::{
    ClaimsExchangeRequest, ClaimsExchanger, HttpClaimsExchanger, IdentityClaims, IdentityError,
};
pub use handoff::{resolve, CallbackParams, HandoffState};
pub use widget::SignInWidgetPayload;
