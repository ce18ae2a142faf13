mod controller;
mod view;
mod worker;

pub use view::{Notification, NotificationKind, Region};
pub use worker::{spawn, SessionCommand, SessionHandle, ViewUpdate};
