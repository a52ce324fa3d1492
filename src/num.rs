use alloy::primitives::U256;
use fastnum::{
    UD256, bint,
    decimal::{Context, RoundingMode, UnsignedDecimal},
};

/// Number of decimals between wei and ether.
pub const ETHER_DECIMALS: u8 = 18;

/// Fixed-point to decimal converter.
#[derive(Clone, Copy, Debug, Default)]
pub struct Converter {
    decimals: i32,
}

impl Converter {
    pub const fn new(decimals: u8) -> Self {
        Self {
            decimals: decimals as i32,
        }
    }

    /// Wei to ether converter.
    pub const fn ether() -> Self {
        Self::new(ETHER_DECIMALS)
    }

    pub fn from_unsigned(&self, value: U256) -> UD256 {
        // U256 and UD256 digits share the same 4-limb width, so the conversion is lossless
        let unscaled =
            bint::UInt::<4>::from_le_slice(value.as_le_slice()).unwrap_or(bint::UInt::<4>::ZERO);
        UnsignedDecimal::<4>::from_parts(
            unscaled,
            -self.decimals,
            Context::default().with_rounding_mode(RoundingMode::Floor),
        )
    }

    pub fn to_unsigned(&self, value: UD256) -> U256 {
        let rescaled = value.rescale(self.decimals as i16);
        U256::from_le_slice(rescaled.digits().to_radix_le(256).as_slice())
    }
}

/// Formats an ether amount in plain notation, without trailing fractional
/// zeros and keeping at least one fractional digit (`3` renders as `3.0`,
/// one wei as `0.000000000000000001`).
pub fn format_decimal(value: UD256) -> String {
    let decimals = ETHER_DECIMALS as usize;
    let units = Converter::ether().to_unsigned(value).to_string();
    let units = format!("{units:0>width$}", width = decimals + 1);
    let (int, frac) = units.split_at(units.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{int}.0")
    } else {
        format!("{int}.{frac}")
    }
}
