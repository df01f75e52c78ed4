use crate::tokens::DEFAULT_CHANNEL;

/// Selects which tokens lookahead can see.
///
/// The filter is a type parameter of the stream, so the unfiltered stream
/// pays nothing for the channel logic.
pub trait ChannelFilter {
    /// Channel visible to lookahead; `None` sees every token
    fn channel(&self) -> Option<i32>;
}

/// Every buffered token is visible
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllChannels;

impl ChannelFilter for AllChannels {
    fn channel(&self) -> Option<i32> {
        None
    }
}

/// Only tokens on one channel are visible. EOF is visible on every channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnChannel(pub i32);

impl Default for OnChannel {
    fn default() -> Self {
        OnChannel(DEFAULT_CHANNEL)
    }
}

impl ChannelFilter for OnChannel {
    fn channel(&self) -> Option<i32> {
        Some(self.0)
    }
}
