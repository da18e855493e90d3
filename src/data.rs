use bitfield::bitfield;
use const_builder::ConstBuilder;

use crate::constants::{
    BLOCK_READ_LEN, GAIN_1, GAIN_16, GAIN_4, GAIN_64, INIT_SETTLE_MS, INTEG_MODE_FREE,
    INTEG_MODE_MANUAL, INTEG_MODE_SYN_MULTI, INTEG_MODE_SYN_SINGLE, INTEG_PARAM_PULSE_COUNT1,
    INTEG_PARAM_PULSE_COUNT2, INTEG_PARAM_PULSE_COUNT4, INTEG_PARAM_PULSE_COUNT8, INTR_DISABLE,
    INTR_LEVEL, INTR_PERSIST_EVERY, INTR_PERSIST_SINGLE, INTR_STOP, INT_SOURCE_BLUE,
    INT_SOURCE_CLEAR, INT_SOURCE_GREEN, INT_SOURCE_RED, PRESCALER_1, PRESCALER_16, PRESCALER_2,
    PRESCALER_32, PRESCALER_4, PRESCALER_64, PRESCALER_8, SYNC_EDGE,
};

/// A color measurement from the sensor, raw ADC counts per channel.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Measurements {
    pub green: u16,
    pub red: u16,
    pub blue: u16,
    /// unfiltered photodiode
    pub clear: u16,
}

impl Measurements {
    /// decode a block read buffer: green, red, blue, clear, each low byte then high byte.
    /// Returns None when fewer than 8 bytes are available.
    pub fn decode(raw: &[u8]) -> Option<Self> {
        if raw.len() < BLOCK_READ_LEN {
            return None;
        }
        let channel = |i: usize| u16::from_le_bytes([raw[2 * i], raw[2 * i + 1]]);
        Some(Measurements {
            green: channel(0),
            red: channel(1),
            blue: channel(2),
            clear: channel(3),
        })
    }
}

/// content of the ID register
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PartId {
    /// 0x1 for the TCS3413/14/15/16 family
    pub part_number: u8,
    pub revision: u8,
}

impl From<u8> for PartId {
    fn from(v: u8) -> Self {
        PartId {
            part_number: v >> 4,
            revision: v & 0x0f,
        }
    }
}

/// Integration mode, TIMING bits 5,4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum IntegrationMode {
    /// integrate continuously, interval set by the integration parameter
    #[default]
    FreeRunning = INTEG_MODE_FREE,
    /// integrate while ADC_EN is set
    Manual = INTEG_MODE_MANUAL,
    /// integrate over the given number of SYNC pulses, once
    SyncSingle = INTEG_MODE_SYN_SINGLE,
    /// integrate over the given number of SYNC pulses, repeatedly
    SyncMulti = INTEG_MODE_SYN_MULTI,
}

impl From<u8> for IntegrationMode {
    // value already shifted down to bits 1,0
    fn from(v: u8) -> Self {
        match v & 0x03 {
            0x00 => Self::FreeRunning,
            0x01 => Self::Manual,
            0x02 => Self::SyncSingle,
            _ => Self::SyncMulti,
        }
    }
}

/// Integration parameter, TIMING bits 3..0. Meaning depends on the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum IntegrationParam {
    #[default]
    PulseCount1 = INTEG_PARAM_PULSE_COUNT1,
    PulseCount2 = INTEG_PARAM_PULSE_COUNT2,
    PulseCount4 = INTEG_PARAM_PULSE_COUNT4,
    PulseCount8 = INTEG_PARAM_PULSE_COUNT8,
}

/// Interrupt output control, INT bits 6..4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum InterruptLevel {
    Disabled = INTR_DISABLE,
    #[default]
    Level = INTR_LEVEL,
    Stop = INTR_STOP,
}

/// Interrupt persistence, INT bits 3..0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum InterruptPersistence {
    /// every ADC cycle generates an interrupt
    #[default]
    EveryCycle = INTR_PERSIST_EVERY,
    /// a single value outside the thresholds
    Single = INTR_PERSIST_SINGLE,
}

/// Channel compared against the interrupt thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum InterruptSource {
    #[default]
    Green = INT_SOURCE_GREEN,
    Red = INT_SOURCE_RED,
    Blue = INT_SOURCE_BLUE,
    Clear = INT_SOURCE_CLEAR,
}

/// Analog gain, GAIN bits 5,4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum AnalogGain {
    #[default]
    X1 = GAIN_1,
    X4 = GAIN_4,
    X16 = GAIN_16,
    X64 = GAIN_64,
}

impl From<u8> for AnalogGain {
    // value already shifted down to bits 1,0
    fn from(v: u8) -> Self {
        match v & 0x03 {
            0x00 => Self::X1,
            0x01 => Self::X4,
            0x02 => Self::X16,
            _ => Self::X64,
        }
    }
}

/// Prescaler divider, GAIN bits 2..0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Prescaler {
    Div1 = PRESCALER_1,
    Div2 = PRESCALER_2,
    #[default]
    Div4 = PRESCALER_4,
    Div8 = PRESCALER_8,
    Div16 = PRESCALER_16,
    Div32 = PRESCALER_32,
    Div64 = PRESCALER_64,
}

bitfield! {
    /// TCS3414CS CTL register
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Control(u8);
    impl Debug;

    pub bool, get_power, set_power: 0;
    pub bool, get_adc_enable, set_adc_enable: 1;
    pub bool, get_adc_valid, _: 4;  // a full integration cycle has completed
    pub bool, get_interrupt, _: 5;  // interrupt pending, cleared with CLR_INT
}

bitfield! {
    /// TCS3414CS TIMING register
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Timing(u8);
    impl Debug;

    pub bool, get_sync_edge, set_sync_edge: 6;
    pub u8, into IntegrationMode, get_integration_mode, _: 5, 4;
    pub u8, get_integration_param, set_integration_param: 3, 0;
}

bitfield! {
    /// TCS3414CS INT (interrupt control) register
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct InterruptControl(u8);
    impl Debug;

    pub bool, get_stop, _: 6;
    pub bool, get_level_enabled, _: 4;
    pub u8, get_persistence, _: 3, 0;
}

bitfield! {
    /// TCS3414CS GAIN register
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct GainReg(u8);
    impl Debug;

    pub u8, into AnalogGain, get_gain, _: 5, 4;
    pub u8, get_prescaler, _: 2, 0;
}

/// configuration registers as read back from the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterSnapshot {
    pub control: Control,
    pub timing: Timing,
    pub interrupt_control: InterruptControl,
    pub interrupt_source: u8,
    pub gain: GainReg,
}

/// Sensor configuration written by `initialize_with`.
/// The default is free running integration, green interrupt source, level interrupt on
/// every cycle, gain x1 with prescaler /4 and 100 ms settling after each write.
/// `Tcs3414Configuration::builder()` is a const builder, so a configuration can be
/// composed in a `const { }` block.
#[derive(ConstBuilder, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tcs3414Configuration {
    #[builder(default = IntegrationMode::FreeRunning)]
    pub integration_mode: IntegrationMode,
    #[builder(default = IntegrationParam::PulseCount1)]
    pub integration_param: IntegrationParam,
    #[builder(default = false)]
    pub sync_edge: bool,
    #[builder(default = InterruptSource::Green)]
    pub interrupt_source: InterruptSource,
    #[builder(default = InterruptLevel::Level)]
    pub interrupt_level: InterruptLevel,
    #[builder(default = InterruptPersistence::EveryCycle)]
    pub interrupt_persistence: InterruptPersistence,
    #[builder(default = AnalogGain::X1)]
    pub gain: AnalogGain,
    #[builder(default = Prescaler::Div4)]
    pub prescaler: Prescaler,
    /// delay after each configuration write, ms
    #[builder(default = INIT_SETTLE_MS)]
    pub settle_ms: u32,
}

impl Default for Tcs3414Configuration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Tcs3414Configuration {
    pub const DEFAULT: Self = Tcs3414Configuration {
        integration_mode: IntegrationMode::FreeRunning,
        integration_param: IntegrationParam::PulseCount1,
        sync_edge: false,
        interrupt_source: InterruptSource::Green,
        interrupt_level: InterruptLevel::Level,
        interrupt_persistence: InterruptPersistence::EveryCycle,
        gain: AnalogGain::X1,
        prescaler: Prescaler::Div4,
        settle_ms: INIT_SETTLE_MS,
    };

    pub const fn timing_byte(&self) -> u8 {
        let sync = if self.sync_edge { SYNC_EDGE } else { 0 };
        self.integration_mode as u8 | self.integration_param as u8 | sync
    }

    pub const fn interrupt_source_byte(&self) -> u8 {
        self.interrupt_source as u8
    }

    pub const fn interrupt_control_byte(&self) -> u8 {
        self.interrupt_level as u8 | self.interrupt_persistence as u8
    }

    pub const fn gain_byte(&self) -> u8 {
        self.gain as u8 | self.prescaler as u8
    }
}
