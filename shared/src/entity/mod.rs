mod candlesticks;
pub mod exchange_info;

pub use candlesticks::{
    candlesticks_15m, candlesticks_1d, candlesticks_1h, candlesticks_1m, candlesticks_4h,
    candlesticks_5m,
};
