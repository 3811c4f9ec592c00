pub mod dispatch_service;
pub mod mailing_service;
pub mod message_service;
pub mod recipient_service;
pub mod user_service;
