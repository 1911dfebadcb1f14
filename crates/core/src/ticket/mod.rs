//! Tickets: types, state machine, storage and explicit membership.

mod error;
mod membership;
mod store;
mod types;

pub use error::TicketError;
pub use membership::MembershipRegistry;
pub use store::{MemoryTicketStore, TicketStore, TicketStoreError};
pub use types::{
    channel_name_for, FormField, RequestForm, ServiceRequest, Ticket, TicketState, TicketType,
    UnknownTicketType,
};
