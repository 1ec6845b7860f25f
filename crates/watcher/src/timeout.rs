//! How long a poll may wait for the first event

use std::time::Duration;

/// Bound on the readiness wait of a poll
///
/// Only the wait for the *first* readiness signal is bounded; once data is
/// flowing the drain never blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Block until an event arrives
    #[default]
    Indefinite,
    /// Do not block at all
    Immediate,
    /// Block at most this long
    After(Duration),
}

impl Timeout {
    /// Interpret a timeout given in seconds
    ///
    /// Negative, NaN and infinite values block indefinitely, zero does not
    /// block. Otherwise the value is split into whole seconds and
    /// `1_000_000 * (t - floor(t))` microseconds.
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() || secs < 0.0 {
            return Timeout::Indefinite;
        }
        if secs == 0.0 {
            return Timeout::Immediate;
        }

        let whole = secs.floor();
        let micros = (1_000_000.0 * (secs - whole)) as u32;
        Timeout::After(Duration::new(whole as u64, micros * 1_000))
    }

    /// Duration to wait, `None` meaning forever
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Timeout::Indefinite => None,
            Timeout::Immediate => Some(Duration::ZERO),
            Timeout::After(d) => Some(*d),
        }
    }

    /// Timeout argument for `ppoll`, null meaning forever
    ///
    /// Sub-microsecond precision is dropped, like a `timeval` would.
    pub(crate) fn to_timespec(self) -> Option<libc::timespec> {
        self.duration().map(|d| libc::timespec {
            tv_sec: libc::time_t::try_from(d.as_secs()).unwrap_or(libc::time_t::MAX),
            tv_nsec: (d.subsec_micros() * 1_000) as libc::c_long,
        })
    }
}

impl From<Duration> for Timeout {
    fn from(d: Duration) -> Self {
        if d.is_zero() {
            Timeout::Immediate
        } else {
            Timeout::After(d)
        }
    }
}

impl From<Option<Duration>> for Timeout {
    fn from(d: Option<Duration>) -> Self {
        d.map_or(Timeout::Indefinite, Timeout::from)
    }
}

impl From<f64> for Timeout {
    fn from(secs: f64) -> Self {
        Timeout::from_secs_f64(secs)
    }
}

impl From<Option<f64>> for Timeout {
    fn from(secs: Option<f64>) -> Self {
        secs.map_or(Timeout::Indefinite, Timeout::from_secs_f64)
    }
}
