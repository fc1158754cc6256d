//! Dispatcher trait definition.
//!
//! The outbound side of the conversation: plain text replies and interactive
//! button menus. Implementations live in chatrelay-infra (e.g.,
//! `WhatsAppDispatcher`).

use chatrelay_types::error::DeliveryError;
use chatrelay_types::message::ButtonMenu;
use chatrelay_types::session::SenderId;

/// Sends messages back to a sender.
///
/// Delivery is fire-and-forget from the conversation's point of view: callers
/// log a [`DeliveryError`] and move on, they never retry.
pub trait Dispatcher: Send + Sync {
    /// Send a plain text message.
    fn send_text(
        &self,
        to: &SenderId,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), DeliveryError>> + Send;

    /// Send an interactive reply-button message.
    fn send_button_menu(
        &self,
        to: &SenderId,
        menu: &ButtonMenu,
    ) -> impl std::future::Future<Output = Result<(), DeliveryError>> + Send;
}
