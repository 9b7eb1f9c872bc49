pub mod resolver;
pub mod session;

pub use resolver::resolve_spoken_answer;
pub use session::VoiceSession;
