mod log;
mod order;

pub use log::RawLog;
pub use order::{OrderSide, TradeRole, TxType};
