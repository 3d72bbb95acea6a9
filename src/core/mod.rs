pub mod chat;
pub mod twilio;
pub mod twiml;
