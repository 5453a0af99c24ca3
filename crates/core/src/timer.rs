/// Elapsed exam time in whole seconds, starting at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElapsedTimer {
    seconds: u64,
}

impl ElapsedTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances by one second and returns the new count.
    pub fn tick(&mut self) -> u64 {
        self.seconds = self.seconds.saturating_add(1);
        self.seconds
    }

    #[must_use]
    pub fn seconds(&self) -> u64 {
        self.seconds
    }
}

/// Formats seconds as zero-padded `HH:MM:SS`; hours widen past 99.
#[must_use]
pub fn format_hms(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}
