/// Broker list used when `-b` is not given.
pub const DEFAULT_BROKERS: &str = "localhost:9092";

/// A single topic configuration override, built once from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigChangeRequest {
    pub topic: String,
    pub key: String,
    pub value: String,
    pub brokers: String,
}

impl ConfigChangeRequest {
    pub fn new(
        topic: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
        brokers: Option<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            key: key.into(),
            value: value.into(),
            brokers: brokers.unwrap_or_else(|| DEFAULT_BROKERS.to_string()),
        }
    }
}
