/// A message for the screen-reader live region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// Increases with every message so repeats of the same text are distinct
    pub seq: u64,
    pub message: String,
}

/// Single-slot announcement channel: only the most recent message is kept.
#[derive(Debug, Clone, Default)]
pub struct Announcer {
    current: Option<Announcement>,
    next_seq: u64,
}

impl Announcer {
    pub fn announce(&mut self, message: impl Into<String>) {
        self.next_seq += 1;
        self.current = Some(Announcement {
            seq: self.next_seq,
            message: message.into(),
        });
    }

    /// Peek at the pending message
    pub fn current(&self) -> Option<&Announcement> {
        self.current.as_ref()
    }

    /// Consume the pending message
    pub fn take(&mut self) -> Option<Announcement> {
        self.current.take()
    }
}
