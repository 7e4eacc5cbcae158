pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{Res, Void};

// Traits.

/// Generic "chat" trait that message sources/sinks must implement.
///
/// The pipeline itself never talks to a chat platform; front ends use this
/// trait to pull raw channel text in and push rendered reports back out.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Fetch up to `limit` recent message texts from a channel.
    ///
    /// Messages are returned in the order the platform hands them over
    /// (Slack: newest first) with no reordering.
    async fn fetch_messages(&self, channel_id: &str, limit: u16) -> Res<Vec<String>>;

    /// Post a message to a channel, optionally threaded under `thread_ts`.
    async fn post_message(&self, channel_id: &str, text: &str, thread_ts: Option<&str>) -> Void;

    /// Start the realtime listener and block until it shuts down.
    async fn start(&self) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
