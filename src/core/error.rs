use thiserror::Error;

#[derive(Error, Debug)]
pub enum GleanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No value stored for '{identifier}' in ping '{ping}'")]
    NoValue { identifier: String, ping: String },

    #[error("Failed to decode stored value: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Test-only operation invoked outside of testing mode")]
    NotInTestingMode,

    #[error("Test context belongs to a different Glean instance")]
    ForeignTestContext,

    #[error("Cannot drain the dispatcher from one of its own tasks")]
    DrainFromDispatcher,

    #[error("Dispatcher has been shut down")]
    DispatcherShutdown,

    #[error("Channel send error")]
    ChannelSend,

    #[error("Channel receive error")]
    ChannelReceive,

    #[error("Invalid metric handle: {0}")]
    InvalidHandle(u64),

    #[error("Native store error: {0}")]
    Native(String),
}

/// Result type alias for Glean operations
pub type Result<T> = std::result::Result<T, GleanError>;

impl GleanError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new native store error
    pub fn native<S: Into<String>>(msg: S) -> Self {
        Self::Native(msg.into())
    }

    /// Creates a new no-value error for a metric and ping
    pub fn no_value<I: Into<String>, P: Into<String>>(identifier: I, ping: P) -> Self {
        Self::NoValue {
            identifier: identifier.into(),
            ping: ping.into(),
        }
    }

    /// Returns true if a test query found nothing stored
    pub fn is_no_value(&self) -> bool {
        matches!(self, Self::NoValue { .. })
    }

    /// Returns true for programming errors around test-only operations
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Self::NotInTestingMode | Self::ForeignTestContext | Self::DrainFromDispatcher
        )
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::NoValue { .. } => "no_value",
            Self::Decode(_) => "serialization",
            Self::NotInTestingMode | Self::ForeignTestContext | Self::DrainFromDispatcher => {
                "misuse"
            },
            Self::DispatcherShutdown | Self::ChannelSend | Self::ChannelReceive => "dispatcher",
            Self::InvalidHandle(_) | Self::Native(_) => "native",
        }
    }
}
