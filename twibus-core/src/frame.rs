//! Control words and phase bookkeeping shared by both front ends

use embedded_hal::i2c::Operation;
use twibus_hal::{Ack, Control, Direction};

/// Launch a (repeated) start condition
pub(crate) const START: Control = Control::INTERRUPT
    .union(Control::ENABLE)
    .union(Control::START);

/// Launch a stop condition
pub(crate) const STOP: Control = Control::INTERRUPT
    .union(Control::ENABLE)
    .union(Control::STOP);

/// Shift the data register out, or shift a byte in and NACK it
pub(crate) const TRANSFER: Control = Control::INTERRUPT.union(Control::ENABLE);

/// Control word receiving one byte with the given acknowledge
pub(crate) const fn receive(ack: Ack) -> Control {
    match ack {
        Ack::Ack => TRANSFER.union(Control::ENABLE_ACK),
        Ack::Nack => TRANSFER,
    }
}

pub(crate) fn is_read(op: &Operation<'_>) -> bool {
    matches!(op, Operation::Read(_))
}

/// Whether a new address phase is needed before `ops[index]`
pub(crate) fn starts_phase(ops: &[Operation<'_>], index: usize) -> bool {
    index == 0 || is_read(&ops[index - 1]) != is_read(&ops[index])
}

/// Whether the read phase running through the operation before `rest`
/// receives no further bytes, so its final byte must be NACKed
pub(crate) fn read_phase_ends(rest: &[Operation<'_>]) -> bool {
    rest.iter()
        .take_while(|op| is_read(op))
        .all(|op| matches!(op, Operation::Read(buf) if buf.is_empty()))
}

/// Framing around one operation of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Step {
    /// Address phase to open (start or repeated start) before the operation
    pub open: Option<Direction>,
    /// Whether the operation's final byte closes its read phase
    pub ends_phase: bool,
}

impl Step {
    /// Acknowledge for byte `index` of `count` received by this operation
    pub(crate) fn ack(&self, index: usize, count: usize) -> Ack {
        if self.ends_phase {
            Ack::for_index(index, count)
        } else {
            Ack::Ack
        }
    }
}

/// Plan the framing of `ops[index]`; shared by both front ends
pub(crate) fn step(ops: &[Operation<'_>], index: usize) -> Step {
    let direction = if is_read(&ops[index]) {
        Direction::Read
    } else {
        Direction::Write
    };
    Step {
        open: starts_phase(ops, index).then_some(direction),
        ends_phase: read_phase_ends(&ops[index + 1..]),
    }
}
