//! High-level mail services.

mod mail;

pub use mail::{
    Folder, MailSession, Message, folder_from_path, message_from_fetch, take_recent,
};
