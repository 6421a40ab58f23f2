mod client;

pub use client::OpenAiCompatibleClient;
