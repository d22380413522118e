//! Causal technical indicators over closing-price vectors.
//!
//! Every function returns a vector the same length as its input. Positions
//! that do not yet have enough history hold `f64::NAN`; callers decide
//! whether to drop or keep those rows.

pub mod trend {
    pub mod ma;
    pub mod macd;
}

pub mod oscillator {
    pub mod rsi;
}

pub mod volatility {
    pub mod bollinger_bands;
    pub mod volatility;
}

pub mod momentum {
    pub mod momentum;
}

pub use momentum::momentum::{momentum, rate_of_change};
pub use oscillator::rsi::{RsiOutput, rsi};
pub use trend::ma::{exponential_moving_average, moving_average};
pub use trend::macd::{MacdOutput, macd};
pub use volatility::bollinger_bands::{BollingerBandsOutput, bollinger_bands};
pub use volatility::volatility::rolling_std;
