//! Domain entities - core business objects

mod account;
mod notification;

pub use account::{Account, AccountPatch, CodeChange, NewAccount};
pub use notification::{DeliveryReport, Notification, NotificationKind};
