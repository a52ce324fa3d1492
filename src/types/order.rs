use std::fmt;

/// Side of the order, as encoded in the order context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Role of the order transaction within a matched trade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TradeRole {
    Buyer,
    Seller,
}

/// Transaction type tag, the first byte of an exchange transaction input.
///
/// Tags outside of the fixed table are kept as [`TxType::Unknown`] with the raw value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TxType {
    Session,
    Transfer,
    TokenTransfer,
    New,
    Cancel,
    CancelAll,
    Modify,
    StopOrder,
    Invalid,
    Unknown(u8),
}

impl TryFrom<u8> for OrderSide {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OrderSide::Buy),
            1 => Ok(OrderSide::Sell),
            other => Err(other),
        }
    }
}

impl OrderSide {
    pub fn name(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl TradeRole {
    pub fn name(&self) -> &'static str {
        match self {
            TradeRole::Buyer => "buyer",
            TradeRole::Seller => "seller",
        }
    }
}

impl From<u8> for TxType {
    fn from(value: u8) -> Self {
        match value {
            0x01 => TxType::Session,
            0x02 => TxType::Transfer,
            0x11 => TxType::TokenTransfer,
            0x21 => TxType::New,
            0x22 => TxType::Cancel,
            0x23 => TxType::CancelAll,
            0x24 => TxType::Modify,
            0x25 => TxType::StopOrder,
            0xff => TxType::Invalid,
            other => TxType::Unknown(other),
        }
    }
}

impl From<TxType> for u8 {
    fn from(value: TxType) -> Self {
        match value {
            TxType::Session => 0x01,
            TxType::Transfer => 0x02,
            TxType::TokenTransfer => 0x11,
            TxType::New => 0x21,
            TxType::Cancel => 0x22,
            TxType::CancelAll => 0x23,
            TxType::Modify => 0x24,
            TxType::StopOrder => 0x25,
            TxType::Invalid => 0xff,
            TxType::Unknown(tag) => tag,
        }
    }
}

impl TxType {
    pub fn name(&self) -> &'static str {
        match self {
            TxType::Session => "SESSION",
            TxType::Transfer => "TRANSFER",
            TxType::TokenTransfer => "TOKEN_TRANSFER",
            TxType::New => "NEW",
            TxType::Cancel => "CANCEL",
            TxType::CancelAll => "CANCEL_ALL",
            TxType::Modify => "MODIFY",
            TxType::StopOrder => "STOP_ORDER",
            TxType::Invalid => "INVALID",
            TxType::Unknown(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxType::Unknown(tag) => write!(f, "UNKNOWN(0x{tag:02x})"),
            known => f.write_str(known.name()),
        }
    }
}
