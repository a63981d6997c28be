//! Infrastructure implementation of the `Clock` port.

use chrono::{Local, NaiveDateTime};

use crate::application::ports::Clock;

/// Local wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
