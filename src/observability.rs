use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("cxchat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("cxchat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("cxchat.client.request_duration_seconds");

pub(crate) static CHAT_TURNS: Counter = Counter::new("cxchat.chat.turns");
pub(crate) static CHAT_FAILED_TURNS: Counter = Counter::new("cxchat.chat.failed_turns");
pub(crate) static CHAT_EMPTY_REPLIES: Counter = Counter::new("cxchat.chat.empty_replies");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&CHAT_TURNS);
    collector.register_counter(&CHAT_FAILED_TURNS);
    collector.register_counter(&CHAT_EMPTY_REPLIES);
}
