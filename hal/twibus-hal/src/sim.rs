//! Simulated TWI peripheral
//!
//! [`SimTwi`] implements [`TwiRegisters`] in memory so the protocol layer
//! can be exercised on the host. It models the control/status/data
//! registers of a master, a configurable completion latency, and a set of
//! register-file slaves. Every bus-level action is appended to an event
//! log that tests can inspect.
//!
//! The simulation panics where real hardware would hang: waiting on the
//! completion flag when no phase is in flight never returns on silicon.

use heapless::Vec;

use crate::address::Address;
use crate::config::Prescaler;
use crate::registers::{Ack, Control, TwiRegisters};
use crate::status::Status;

/// Maximum number of simulated slaves on one bus
pub const MAX_SLAVES: usize = 4;

/// Capacity of the event log
pub const EVENT_CAPACITY: usize = 1024;

/// Value read from the bus when no slave drives SDA (pulled high)
pub const IDLE_BYTE: u8 = 0xFF;

/// Bus-level event observed by the simulated peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    /// Start or repeated start condition
    Start,
    /// Stop condition
    Stop,
    /// Address byte (7-bit address and R/W bit)
    Address(u8),
    /// Data byte transmitted by the master
    Write(u8),
    /// Data byte received by the master and the acknowledge it returned
    Read(u8, Ack),
}

/// Register-file slave
///
/// The first byte of a write phase selects the register pointer; further
/// bytes are stored at the pointer. Reads return bytes from the pointer.
/// The pointer auto-increments and wraps at 256.
#[derive(Debug, Clone)]
pub struct SimSlave {
    address: Address,
    memory: [u8; 256],
    pointer: u8,
    pointer_selected: bool,
}

impl SimSlave {
    /// Create a slave with zeroed memory
    pub fn new(address: Address) -> Self {
        Self {
            address,
            memory: [0; 256],
            pointer: 0,
            pointer_selected: false,
        }
    }

    /// Preload memory starting at `register`
    pub fn with_memory(mut self, register: u8, bytes: &[u8]) -> Self {
        for (offset, &byte) in bytes.iter().enumerate() {
            self.memory[register.wrapping_add(offset as u8) as usize] = byte;
        }
        self
    }

    /// Slave address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Register memory
    pub fn memory(&self) -> &[u8; 256] {
        &self.memory
    }

    /// Current register pointer
    pub fn pointer(&self) -> u8 {
        self.pointer
    }

    fn begin_write(&mut self) {
        self.pointer_selected = false;
    }

    fn receive(&mut self, byte: u8) {
        if self.pointer_selected {
            self.memory[self.pointer as usize] = byte;
            self.pointer = self.pointer.wrapping_add(1);
        } else {
            self.pointer = byte;
            self.pointer_selected = true;
        }
    }

    fn transmit(&mut self) -> u8 {
        let byte = self.memory[self.pointer as usize];
        self.pointer = self.pointer.wrapping_add(1);
        byte
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Addressing,
    /// Master transmitting; `None` when no slave answered
    Transmit(Option<usize>),
    /// Master receiving; `None` when no slave answered
    Receive(Option<usize>),
}

/// In-memory TWI master peripheral
#[derive(Debug)]
pub struct SimTwi {
    control: u8,
    status: u8,
    prescaler: Prescaler,
    divisor: u8,
    data: u8,
    latency: u8,
    pending_polls: u8,
    in_flight: bool,
    bus_active: bool,
    phase: Phase,
    polls: u32,
    slaves: Vec<SimSlave, MAX_SLAVES>,
    events: Vec<BusEvent, EVENT_CAPACITY>,
}

impl Default for SimTwi {
    fn default() -> Self {
        Self::new()
    }
}

impl SimTwi {
    /// Create a disabled peripheral with an empty bus
    pub fn new() -> Self {
        Self {
            control: 0,
            status: Status::NoInfo.code(),
            prescaler: Prescaler::Div1,
            divisor: 0,
            data: 0,
            latency: 0,
            pending_polls: 0,
            in_flight: false,
            bus_active: false,
            phase: Phase::Idle,
            polls: 0,
            slaves: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Number of polls the completion flag stays low after each phase starts
    pub fn with_latency(mut self, polls: u8) -> Self {
        self.latency = polls;
        self
    }

    /// Attach a slave to the bus
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_SLAVES`] are attached.
    pub fn with_slave(mut self, slave: SimSlave) -> Self {
        self.add_slave(slave);
        self
    }

    /// Attach a slave to the bus
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_SLAVES`] are attached.
    pub fn add_slave(&mut self, slave: SimSlave) {
        if self.slaves.push(slave).is_err() {
            panic!("simulated bus is full");
        }
    }

    /// Look up an attached slave
    pub fn slave(&self, address: Address) -> Option<&SimSlave> {
        self.slaves.iter().find(|s| s.address == address)
    }

    /// Events recorded so far
    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    /// Forget recorded events
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Number of start conditions (including repeated starts) recorded
    pub fn starts(&self) -> usize {
        self.count(|e| matches!(e, BusEvent::Start))
    }

    /// Number of stop conditions recorded
    pub fn stops(&self) -> usize {
        self.count(|e| matches!(e, BusEvent::Stop))
    }

    fn count(&self, pred: impl Fn(&BusEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    /// Raw control register
    pub fn control(&self) -> Control {
        Control::from_bits(self.control)
    }

    /// Whether the peripheral enable bit is set
    pub fn is_enabled(&self) -> bool {
        self.control().contains(Control::ENABLE)
    }

    /// Whether the bus is between a start and a stop
    pub fn is_bus_active(&self) -> bool {
        self.bus_active
    }

    /// Selected prescaler
    pub fn prescaler(&self) -> Prescaler {
        self.prescaler
    }

    /// Bit-rate divisor register
    pub fn rate_divisor(&self) -> u8 {
        self.divisor
    }

    /// Total completion-flag polls performed
    pub fn polls(&self) -> u32 {
        self.polls
    }

    fn record(&mut self, event: BusEvent) {
        if self.events.push(event).is_err() {
            panic!("simulated event log overflow");
        }
    }

    fn launch(&mut self, status: Status) {
        self.status = status.code();
        self.in_flight = true;
        self.pending_polls = self.latency;
    }

    fn find_slave(&self, byte: u8) -> Option<usize> {
        let address = byte >> 1;
        self.slaves
            .iter()
            .position(|s| s.address.value() == address)
    }

    fn execute(&mut self, command: Control) {
        if command.contains(Control::STOP) {
            self.record(BusEvent::Stop);
            self.bus_active = false;
            self.phase = Phase::Idle;
            self.status = Status::NoInfo.code();
            // Hardware clears the stop bit once the condition is on the bus
            self.control &= !Control::STOP.bits();
        }

        if command.contains(Control::START) {
            let status = if self.bus_active {
                Status::RepeatedStartSent
            } else {
                Status::StartSent
            };
            self.record(BusEvent::Start);
            self.bus_active = true;
            self.phase = Phase::Addressing;
            self.launch(status);
            return;
        }

        if command.contains(Control::STOP) {
            return;
        }

        match self.phase {
            Phase::Idle => {
                // Nothing to shift; the completion flag never asserts
                self.status = Status::BusError.code();
            }
            Phase::Addressing => {
                let byte = self.data;
                self.record(BusEvent::Address(byte));
                let slave = self.find_slave(byte);
                let read = byte & 1 == 1;
                if let Some(index) = slave {
                    if !read {
                        self.slaves[index].begin_write();
                    }
                }
                let status = match (read, slave.is_some()) {
                    (false, true) => Status::AddressWriteAck,
                    (false, false) => Status::AddressWriteNack,
                    (true, true) => Status::AddressReadAck,
                    (true, false) => Status::AddressReadNack,
                };
                self.phase = if read {
                    Phase::Receive(slave)
                } else {
                    Phase::Transmit(slave)
                };
                self.launch(status);
            }
            Phase::Transmit(slave) => {
                let byte = self.data;
                self.record(BusEvent::Write(byte));
                let status = match slave {
                    Some(index) => {
                        self.slaves[index].receive(byte);
                        Status::DataSentAck
                    }
                    None => Status::DataSentNack,
                };
                self.launch(status);
            }
            Phase::Receive(slave) => {
                let byte = match slave {
                    Some(index) => self.slaves[index].transmit(),
                    None => IDLE_BYTE,
                };
                let ack = Ack::from(command.contains(Control::ENABLE_ACK));
                self.data = byte;
                self.record(BusEvent::Read(byte, ack));
                let status = if ack.is_ack() {
                    Status::DataReceivedAck
                } else {
                    Status::DataReceivedNack
                };
                self.launch(status);
            }
        }
    }
}

impl TwiRegisters for SimTwi {
    fn write_control(&mut self, control: Control) {
        // Writing one to the completion flag clears it
        self.control = control.difference(Control::INTERRUPT).bits();
        if control.contains(Control::ENABLE) && control.contains(Control::INTERRUPT) {
            self.in_flight = false;
            self.execute(control);
        }
    }

    fn set_control_bit(&mut self, bit: Control) {
        self.control |= bit.difference(Control::INTERRUPT).bits();
    }

    fn clear_control_bit(&mut self, bit: Control) {
        self.control &= !bit.bits();
    }

    fn is_asserted(&mut self, flag: Control) -> bool {
        if flag.contains(Control::INTERRUPT) && self.in_flight {
            self.polls += 1;
            if self.pending_polls > 0 {
                self.pending_polls -= 1;
                return false;
            }
            self.in_flight = false;
            self.control |= Control::INTERRUPT.bits();
        }
        self.control().contains(flag)
    }

    fn wait_until_asserted(&mut self, flag: Control) {
        loop {
            if self.is_asserted(flag) {
                return;
            }
            if !self.in_flight {
                panic!("simulated TWI would hang waiting for {:?}", flag);
            }
        }
    }

    fn read_data(&mut self) -> u8 {
        self.data
    }

    fn write_data(&mut self, byte: u8) {
        self.data = byte;
    }

    fn status(&mut self) -> u8 {
        self.status & 0xF8
    }

    fn set_prescaler(&mut self, prescaler: Prescaler) {
        self.prescaler = prescaler;
    }

    fn set_rate_divisor(&mut self, divisor: u8) {
        self.divisor = divisor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EEPROM: Address = Address::const_new(0x50);

    fn launch(sim: &mut SimTwi, extra: Control) {
        sim.write_control(Control::INTERRUPT | Control::ENABLE | extra);
    }

    #[test]
    fn test_latency_delays_completion() {
        let mut sim = SimTwi::new().with_latency(3);
        launch(&mut sim, Control::START);

        assert!(!sim.is_asserted(Control::INTERRUPT));
        assert!(!sim.is_asserted(Control::INTERRUPT));
        assert!(!sim.is_asserted(Control::INTERRUPT));
        assert!(sim.is_asserted(Control::INTERRUPT));
        assert_eq!(sim.polls(), 4);
        assert_eq!(sim.status(), Status::StartSent.code());
    }

    #[test]
    fn test_repeated_start_status() {
        let mut sim = SimTwi::new();
        launch(&mut sim, Control::START);
        sim.wait_until_asserted(Control::INTERRUPT);
        launch(&mut sim, Control::START);
        sim.wait_until_asserted(Control::INTERRUPT);
        assert_eq!(sim.status(), Status::RepeatedStartSent.code());
        assert_eq!(sim.starts(), 2);
    }

    #[test]
    fn test_absent_slave_nacks_address() {
        let mut sim = SimTwi::new();
        launch(&mut sim, Control::START);
        sim.wait_until_asserted(Control::INTERRUPT);
        sim.write_data(0x42 << 1);
        launch(&mut sim, Control::empty());
        sim.wait_until_asserted(Control::INTERRUPT);
        assert_eq!(sim.status(), Status::AddressWriteNack.code());
    }

    #[test]
    fn test_register_file_slave() {
        let mut sim = SimTwi::new().with_slave(SimSlave::new(EEPROM));

        launch(&mut sim, Control::START);
        sim.wait_until_asserted(Control::INTERRUPT);
        for byte in [EEPROM.write_byte(), 0x10, 0xAA, 0xBB] {
            sim.write_data(byte);
            launch(&mut sim, Control::empty());
            sim.wait_until_asserted(Control::INTERRUPT);
        }
        launch(&mut sim, Control::STOP);

        let slave = sim.slave(EEPROM).unwrap();
        assert_eq!(slave.memory()[0x10], 0xAA);
        assert_eq!(slave.memory()[0x11], 0xBB);
        assert_eq!(slave.pointer(), 0x12);
        assert!(!sim.is_bus_active());
    }

    #[test]
    fn test_read_records_ack() {
        let slave = SimSlave::new(EEPROM).with_memory(0, &[0x11, 0x22]);
        let mut sim = SimTwi::new().with_slave(slave);

        launch(&mut sim, Control::START);
        sim.wait_until_asserted(Control::INTERRUPT);
        sim.write_data(EEPROM.read_byte());
        launch(&mut sim, Control::empty());
        sim.wait_until_asserted(Control::INTERRUPT);
        launch(&mut sim, Control::ENABLE_ACK);
        sim.wait_until_asserted(Control::INTERRUPT);
        assert_eq!(sim.read_data(), 0x11);
        launch(&mut sim, Control::empty());
        sim.wait_until_asserted(Control::INTERRUPT);
        assert_eq!(sim.read_data(), 0x22);
        assert_eq!(sim.status(), Status::DataReceivedNack.code());

        assert_eq!(
            &sim.events()[2..],
            &[BusEvent::Read(0x11, Ack::Ack), BusEvent::Read(0x22, Ack::Nack)]
        );
    }

    #[test]
    #[should_panic(expected = "would hang")]
    fn test_wait_without_phase_hangs() {
        let mut sim = SimTwi::new();
        sim.set_control_bit(Control::ENABLE);
        sim.wait_until_asserted(Control::INTERRUPT);
    }

    #[test]
    fn test_disabled_peripheral_ignores_commands() {
        let mut sim = SimTwi::new();
        sim.write_control(Control::INTERRUPT | Control::START);
        assert!(sim.events().is_empty());
        assert!(!sim.is_enabled());
    }
}
