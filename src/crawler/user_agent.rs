//! Round-robin user-agent provider

use std::sync::atomic::{AtomicUsize, Ordering};

/// Desktop browser user agents rotated across requests
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36",
];

/// Hands out user agents in a fixed cycle
///
/// The rotation index is shared by every clone-free reference, so concurrent
/// workers advance the same cycle.
#[derive(Debug)]
pub struct UserAgentRotator {
    agents: Vec<String>,
    next: AtomicUsize,
}

impl UserAgentRotator {
    /// Creates a rotator over the given agents; an empty list falls back to the defaults
    pub fn new(agents: Vec<String>) -> Self {
        let agents = if agents.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|a| a.to_string()).collect()
        } else {
            agents
        };

        Self {
            agents,
            next: AtomicUsize::new(0),
        }
    }

    /// Returns the next agent in the cycle
    pub fn next_agent(&self) -> &str {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.agents.len();
        &self.agents[index]
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for UserAgentRotator {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
