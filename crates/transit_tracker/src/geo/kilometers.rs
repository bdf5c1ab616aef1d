use std::ops::Div;

use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::geo::kmh::Kmh;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct Kilometers(f64);

impl Kilometers {
    pub fn new(value: f64) -> Self {
        Kilometers(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Div<Kmh> for Kilometers {
    type Output = SignedDuration;

    /// Saturates at [`SignedDuration::MAX`] when the travel time does not fit.
    fn div(self, speed: Kmh) -> SignedDuration {
        let seconds = self.0 * 3600.0 / speed.value();
        SignedDuration::try_from_secs_f64(seconds).unwrap_or(SignedDuration::MAX)
    }
}
