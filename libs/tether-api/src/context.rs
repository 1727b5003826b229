use tokio_util::sync::CancellationToken;

use crate::config::Options;

/// Per-call conversion context: options plus a cancellation token.
///
/// Cloning is cheap and clones share the token, so a caller can keep one
/// handle and cancel a conversion running elsewhere.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    options: Options,
}

impl Context {
    pub fn new(options: Options) -> Self {
        Self {
            token: CancellationToken::new(),
            options,
        }
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
