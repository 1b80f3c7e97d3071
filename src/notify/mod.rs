//! Message delivery: the [`Notifier`] contract, the authorized user set, the
//! [`Broadcaster`] and outbound text helpers.

mod broadcast;
mod notifier;
mod text;
mod users;

pub use broadcast::Broadcaster;
pub use notifier::{ChatId, EditOutcome, MessageId, Notifier, NotifierRef};
pub use text::{ELLIPSIS, escape_html, truncate};
pub use users::AuthorizedUsers;
