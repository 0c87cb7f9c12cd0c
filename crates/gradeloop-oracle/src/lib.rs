mod openai;
mod oracle;
mod retry;
mod scripted;

pub use openai::{OpenAiConfig, OpenAiOracle};
pub use oracle::{OracleError, OracleRequest, TextOracle};
pub use retry::RetryPolicy;
pub use scripted::ScriptedOracle;
