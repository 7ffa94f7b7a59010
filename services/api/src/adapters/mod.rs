pub mod chat_llm;
pub mod guide_llm;
pub mod kv;

pub use chat_llm::OpenAiChatAdapter;
pub use guide_llm::OpenAiGuideAdapter;
pub use kv::FileKvAdapter;
