mod mail;

pub use mail::MailConfig;
