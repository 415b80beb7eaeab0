pub mod clock;
pub mod console_notifier;
pub mod desktop_notifier;
pub mod fake_fetcher;
pub mod http_fetcher;
pub mod memory_store;
pub mod twilio_notifier;
