//! Bus-level properties of the transaction layer, checked against the
//! simulated peripheral.

use embassy_futures::block_on;
use embedded_hal::i2c::Operation;
use proptest::prelude::*;
use twibus_core::{Ack, Address, AsyncTwi, I2cConfig, Twi};
use twibus_hal::sim::{BusEvent, SimSlave, SimTwi, IDLE_BYTE};

fn twi(sim: SimTwi) -> Twi<SimTwi> {
    let mut twi = Twi::new(sim);
    twi.init(&I2cConfig::STANDARD).unwrap();
    twi
}

fn address() -> impl Strategy<Value = Address> {
    (0u8..=0x7F).prop_map(Address::const_new)
}

fn reads(events: &[BusEvent]) -> Vec<Ack> {
    events
        .iter()
        .filter_map(|e| match e {
            BusEvent::Read(_, ack) => Some(*ack),
            _ => None,
        })
        .collect()
}

/// Buffers for a plan of `(is_read, len)` operations
fn buffers(plan: &[(bool, usize)]) -> Vec<Vec<u8>> {
    plan.iter()
        .enumerate()
        .map(|(i, &(_, len))| vec![i as u8; len])
        .collect()
}

fn operations<'a>(plan: &[(bool, usize)], buffers: &'a mut [Vec<u8>]) -> Vec<Operation<'a>> {
    plan.iter()
        .zip(buffers.iter_mut())
        .map(|(&(read, _), buf)| {
            if read {
                Operation::Read(buf)
            } else {
                Operation::Write(buf)
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn test_write_burst_frames_data_in_order(
        addr in address(),
        data in prop::collection::vec(any::<u8>(), 1..64),
        latency in 0u8..4,
    ) {
        let mut bus = twi(SimTwi::new().with_latency(latency));
        bus.write_burst(addr, &data);
        let sim = bus.release();

        let mut expected = vec![BusEvent::Start, BusEvent::Address(addr.value() << 1)];
        expected.extend(data.iter().map(|&b| BusEvent::Write(b)));
        expected.push(BusEvent::Stop);
        prop_assert_eq!(sim.events(), expected.as_slice());
    }

    #[test]
    fn test_read_burst_acks_all_but_last(
        addr in address(),
        count in 1usize..64,
        attached in any::<bool>(),
    ) {
        let mut sim = SimTwi::new().with_latency(1);
        if attached {
            sim.add_slave(SimSlave::new(addr));
        }
        let mut bus = twi(sim);
        let mut buf = vec![0u8; count];
        bus.read_burst(addr, &mut buf);
        let sim = bus.release();

        let events = sim.events();
        prop_assert_eq!(events[0], BusEvent::Start);
        prop_assert_eq!(events[1], BusEvent::Address((addr.value() << 1) | 1));
        prop_assert_eq!(*events.last().unwrap(), BusEvent::Stop);
        prop_assert_eq!(sim.starts(), 1);
        prop_assert_eq!(sim.stops(), 1);

        let mut expected = vec![Ack::Ack; count - 1];
        expected.push(Ack::Nack);
        prop_assert_eq!(reads(events), expected);
    }

    #[test]
    fn test_write_then_read_holds_the_bus(
        addr in address(),
        tx in prop::collection::vec(any::<u8>(), 0..16),
        rx_count in 0usize..16,
    ) {
        let mut bus = twi(SimTwi::new());
        let mut rx = vec![0u8; rx_count];
        bus.write_then_read(addr, &tx, &mut rx);
        let sim = bus.release();
        let events = sim.events();

        prop_assert_eq!(sim.starts(), 2);
        prop_assert_eq!(sim.stops(), 1);
        prop_assert_eq!(*events.last().unwrap(), BusEvent::Stop);

        // Whole write phase precedes the repeated start
        let restart = events.iter().rposition(|e| *e == BusEvent::Start).unwrap();
        prop_assert_eq!(restart, 2 + tx.len());
        let written: Vec<u8> = events[..restart]
            .iter()
            .filter_map(|e| match e {
                BusEvent::Write(b) => Some(*b),
                _ => None,
            })
            .collect();
        prop_assert_eq!(written, tx);
        prop_assert_eq!(events[restart + 1], BusEvent::Address((addr.value() << 1) | 1));

        let acks = reads(events);
        prop_assert_eq!(acks.len(), rx_count);
        if let Some((last, rest)) = acks.split_last() {
            prop_assert_eq!(*last, Ack::Nack);
            prop_assert!(rest.iter().all(|a| *a == Ack::Ack));
        }
    }

    #[test]
    fn test_async_framing_matches_blocking(
        addr in address(),
        tx in prop::collection::vec(any::<u8>(), 0..8),
        rx_count in 0usize..8,
        latency in 0u8..3,
    ) {
        let mut blocking = twi(SimTwi::new().with_latency(latency));
        let mut rx = vec![0u8; rx_count];
        blocking.write_then_read(addr, &tx, &mut rx);

        let mut nonblocking = AsyncTwi::new(SimTwi::new().with_latency(latency));
        nonblocking.init(&I2cConfig::STANDARD).unwrap();
        let mut rx_async = vec![0u8; rx_count];
        block_on(nonblocking.write_then_read(addr, &tx, &mut rx_async));

        let blocking = blocking.release();
        let nonblocking = nonblocking.release();
        prop_assert_eq!(blocking.events(), nonblocking.events());
        prop_assert_eq!(rx, rx_async);
    }

    #[test]
    fn test_async_transaction_matches_blocking(
        addr in address(),
        plan in prop::collection::vec((any::<bool>(), 0usize..4), 0..6),
    ) {
        let slave = SimSlave::new(addr).with_memory(0, &[0x11, 0x22, 0x33, 0x44]);

        let mut blocking = twi(SimTwi::new().with_slave(slave.clone()));
        let mut blocking_bufs = buffers(&plan);
        blocking.transaction(addr, &mut operations(&plan, &mut blocking_bufs));

        let mut nonblocking = AsyncTwi::new(SimTwi::new().with_latency(1).with_slave(slave));
        nonblocking.init(&I2cConfig::STANDARD).unwrap();
        let mut async_bufs = buffers(&plan);
        block_on(nonblocking.transaction(addr, &mut operations(&plan, &mut async_bufs)));

        let blocking = blocking.release();
        let nonblocking = nonblocking.release();
        prop_assert_eq!(blocking.events(), nonblocking.events());
        prop_assert_eq!(blocking_bufs, async_bufs);
        if !plan.is_empty() {
            prop_assert_eq!(blocking.stops(), 1);
        }
    }
}

#[test]
fn test_empty_transfers_still_frame_the_address() {
    let addr = Address::const_new(0x27);
    let mut bus = twi(SimTwi::new());

    bus.write_burst(addr, &[]);
    bus.read_burst(addr, &mut []);

    let sim = bus.release();
    assert_eq!(
        sim.events(),
        &[
            BusEvent::Start,
            BusEvent::Address(0x4E),
            BusEvent::Stop,
            BusEvent::Start,
            BusEvent::Address(0x4F),
            BusEvent::Stop,
        ]
    );
}

#[test]
fn test_single_byte_read_nacks_immediately() {
    let addr = Address::const_new(0x48);
    let slave = SimSlave::new(addr).with_memory(0, &[0x1F]);
    let mut bus = twi(SimTwi::new().with_slave(slave));
    let mut buf = [0u8; 1];
    bus.read_burst(addr, &mut buf);

    assert_eq!(buf, [0x1F]);
    let sim = bus.release();
    assert_eq!(reads(sim.events()), vec![Ack::Nack]);
}

#[test]
fn test_register_read_round_trip() {
    let addr = Address::const_new(0x50);
    let slave = SimSlave::new(addr).with_memory(0x10, &[0xAA, 0xBB]);
    let mut bus = twi(SimTwi::new().with_slave(slave));
    let mut buf = [0u8; 2];
    bus.write_then_read(addr, &[0x10], &mut buf);

    assert_eq!(buf, [0xAA, 0xBB]);
}

#[test]
fn test_written_bytes_read_back() {
    let addr = Address::const_new(0x50);
    let mut bus = twi(SimTwi::new().with_slave(SimSlave::new(addr)));

    bus.write_burst(addr, &[0x40, 0xDE, 0xAD, 0xBE, 0xEF]);
    let mut buf = [0u8; 4];
    bus.write_then_read(addr, &[0x40], &mut buf);

    assert_eq!(buf, [0xDE, 0xAD, 0xBE, 0xEF]);
}

#[test]
fn test_absent_slave_reads_idle_bus() {
    let mut bus = twi(SimTwi::new());
    let mut buf = [0u8; 3];
    bus.read_burst(Address::const_new(0x33), &mut buf);

    // No error surfaces; the released bus reads high
    assert_eq!(buf, [IDLE_BYTE; 3]);
}

#[test]
fn test_initialize_twice_matches_once() {
    let mut once = Twi::new(SimTwi::new());
    once.init(&I2cConfig::STANDARD).unwrap();
    let mut twice = Twi::new(SimTwi::new());
    twice.init(&I2cConfig::STANDARD).unwrap();
    twice.init(&I2cConfig::STANDARD).unwrap();

    let (once, twice) = (once.release(), twice.release());
    assert!(twice.is_enabled());
    assert_eq!(once.control(), twice.control());
    assert_eq!(once.prescaler(), twice.prescaler());
    assert_eq!(once.rate_divisor(), twice.rate_divisor());
}

#[test]
fn test_reinitialize_with_new_rate_replaces_old() {
    let mut bus = Twi::new(SimTwi::new());
    bus.init(&I2cConfig::FAST).unwrap();
    bus.init(&I2cConfig::STANDARD).unwrap();

    assert_eq!(bus.regs_mut().rate_divisor(), 72);
}
