//! Technical indicators computed from daily price history
//!
//! All series functions return one output per input bar so results can be
//! zipped back onto dates.

pub mod kdj;
pub mod macd;
pub mod performance;

pub use kdj::{KdjPoint, KdjValues, kdj};
pub use macd::{MacdPoint, MacdValues, ema, macd};
pub use performance::{Performance, performance};
