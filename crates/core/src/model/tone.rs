/// Colour band used when rendering scores and the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Success,
    Warning,
    Danger,
}

impl Tone {
    /// Band for time left: above half is `Success`, above a quarter `Warning`.
    #[must_use]
    pub fn for_remaining(remaining_secs: u32, total_secs: u32) -> Self {
        if total_secs == 0 {
            return Self::Danger;
        }
        let percentage = f64::from(remaining_secs) / f64::from(total_secs) * 100.0;
        if percentage > 50.0 {
            Self::Success
        } else if percentage > 25.0 {
            Self::Warning
        } else {
            Self::Danger
        }
    }

    /// Band for a graded score: 80 and up is `Success`, 60 and up `Warning`.
    #[must_use]
    pub fn for_score(percentage: f64) -> Self {
        if percentage >= 80.0 {
            Self::Success
        } else if percentage >= 60.0 {
            Self::Warning
        } else {
            Self::Danger
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}
