// Public modules
pub mod agent_path;
pub mod detect_intent_request;
pub mod detect_intent_response;
pub mod query_input;
pub mod query_result;
pub mod response_message;

// Re-exports
pub use agent_path::AgentPath;
pub use detect_intent_request::DetectIntentRequest;
pub use detect_intent_response::DetectIntentResponse;
pub use query_input::{QueryInput, TextInput};
pub use query_result::{Intent, Match, Page, QueryResult};
pub use response_message::{ResponseMessage, ResponseText};
