// TCS3414CS registers

#![allow(nonstandard_style)]
pub const REG_CTL: u8 = 0x80;  // control: power, ADC enable, ADC valid, interrupt flag
pub const REG_TIMING: u8 = 0x81;  // integration mode and parameter
pub const REG_INT: u8 = 0x82;  // interrupt control
pub const REG_INT_SOURCE: u8 = 0x83;  // channel compared against the thresholds
pub const REG_ID: u8 = 0x84;  // part number (high nibble) and revision (low nibble)
pub const REG_GAIN: u8 = 0x87;  // analog gain and prescaler
pub const REG_LOW_THRESH_LOW_BYTE: u8 = 0x88;
pub const REG_LOW_THRESH_HIGH_BYTE: u8 = 0x89;
pub const REG_HIGH_THRESH_LOW_BYTE: u8 = 0x8A;
pub const REG_HIGH_THRESH_HIGH_BYTE: u8 = 0x8B;
pub const REG_BLOCK_READ: u8 = 0xCF;  // 8 bytes at 0xD0 - 0xD7, green, red, blue, clear, little endian
pub const REG_GREEN_LOW: u8 = 0xD0;
pub const REG_GREEN_HIGH: u8 = 0xD1;
pub const REG_RED_LOW: u8 = 0xD2;
pub const REG_RED_HIGH: u8 = 0xD3;
pub const REG_BLUE_LOW: u8 = 0xD4;
pub const REG_BLUE_HIGH: u8 = 0xD5;
pub const REG_CLEAR_LOW: u8 = 0xD6;
pub const REG_CLEAR_HIGH: u8 = 0xD7;
pub const CTL_DAT_INITIATE: u8 = 0x03;  // power on + ADC enable
pub const CLR_INT: u8 = 0xE0;  // special function command, clears a pending interrupt

// Timing register
pub const SYNC_EDGE: u8 = 0x40;
pub const INTEG_MODE_FREE: u8 = 0x00;
pub const INTEG_MODE_MANUAL: u8 = 0x10;
pub const INTEG_MODE_SYN_SINGLE: u8 = 0x20;
pub const INTEG_MODE_SYN_MULTI: u8 = 0x30;

pub const INTEG_PARAM_PULSE_COUNT1: u8 = 0x00;
pub const INTEG_PARAM_PULSE_COUNT2: u8 = 0x01;
pub const INTEG_PARAM_PULSE_COUNT4: u8 = 0x02;
pub const INTEG_PARAM_PULSE_COUNT8: u8 = 0x03;

// Interrupt control register
pub const INTR_STOP: u8 = 40;  // decimal in the part description, kept as is
pub const INTR_DISABLE: u8 = 0x00;
pub const INTR_LEVEL: u8 = 0x10;
pub const INTR_PERSIST_EVERY: u8 = 0x00;
pub const INTR_PERSIST_SINGLE: u8 = 0x01;

// Interrupt source register
pub const INT_SOURCE_GREEN: u8 = 0x00;
pub const INT_SOURCE_RED: u8 = 0x01;
pub const INT_SOURCE_BLUE: u8 = 0x10;
pub const INT_SOURCE_CLEAR: u8 = 0x03;

// Gain register
pub const GAIN_1: u8 = 0x00;
pub const GAIN_4: u8 = 0x10;
pub const GAIN_16: u8 = 0x20;
pub const GAIN_64: u8 = 0x30;
pub const PRESCALER_1: u8 = 0x00;
pub const PRESCALER_2: u8 = 0x01;
pub const PRESCALER_4: u8 = 0x02;
pub const PRESCALER_8: u8 = 0x03;
pub const PRESCALER_16: u8 = 0x04;
pub const PRESCALER_32: u8 = 0x05;
pub const PRESCALER_64: u8 = 0x06;

/// settling time after each configuration write, in ms
pub const INIT_SETTLE_MS: u32 = 100;

/// number of bytes returned by a block read of all four channels
pub const BLOCK_READ_LEN: usize = 8;

/// longest payload accepted by a block write
pub const MAX_BLOCK_LEN: usize = 8;

#[repr(u8)]
/// TCS3414CS I2C device address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceAddress {
    /// the only address the part answers on
    #[default]
    Default = 0x39,
}

impl From<DeviceAddress> for u8 {
    fn from(value: DeviceAddress) -> Self {
        match value {
            DeviceAddress::Default => 0x39,
        }
    }
}
