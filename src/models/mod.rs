pub mod contact;
pub mod favorite;
pub mod notification;
pub mod push;
pub mod reading_history;
pub mod response;
pub mod settings;
pub mod story;
pub mod user;
