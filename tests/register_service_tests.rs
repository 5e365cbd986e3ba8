//! Integration tests for the register binding and the persisting service

use greenhouse_rio::ActuatorDriver;
use greenhouse_rio::{
    hal::{MockOutput, MockPositionSensor, MockStore},
    registers::{self, coil, holding, RegisterLink},
    HBridge, LightPositionManager, LightPositionService, LightState, PositionRecord,
    RegisterImage, RegisterMap, ServiceError,
};

type Manager = LightPositionManager<MockPositionSensor, HBridge<MockOutput, MockOutput, MockOutput>>;
type Service = LightPositionService<
    MockPositionSensor,
    HBridge<MockOutput, MockOutput, MockOutput>,
    MockStore,
>;

fn manager() -> Manager {
    LightPositionManager::from_lines(
        MockPositionSensor::new(),
        MockOutput::new("In1"),
        MockOutput::new("In2"),
        MockOutput::new("EnA"),
    )
    .unwrap()
}

fn service(store: MockStore) -> Service {
    LightPositionService::new(manager(), store)
}

// ============================================================================
// Register Link
// ============================================================================

#[test]
fn apply_copies_host_commands() {
    let mut m = manager();
    let mut regs = RegisterImage::new();
    regs.set_coil(coil::CALIBRATION_MODE, false);
    regs.set_coil(coil::MOVE_TOP, true);
    regs.set_holding(holding::SETPOINT, 65);

    let mut link = RegisterLink::new();
    assert!(!link.apply(&regs, &mut m));

    assert!(!m.calibration_mode());
    assert_eq!(m.sp(), 65);
}

#[test]
fn publish_writes_readings() {
    let mut m = manager();
    m.set_max_pulses(34_115);
    m.set_raw_position(20_000);

    let mut regs = RegisterImage::new();
    RegisterLink::new().publish(&m, &mut regs);

    assert_eq!(regs.holding(holding::POSITION), 414);
    assert_eq!(registers::read_i32(&regs, holding::RAW_POSITION), 20_000);
    assert_eq!(registers::read_i32(&regs, holding::MAX_PULSES), 34_115);
    assert_eq!(regs.holding(holding::STATE), LightState::Idle.code());
    assert!(!regs.coil(coil::AT_TOP));
    assert!(!regs.coil(coil::AT_BOTTOM));
}

#[test]
fn teach_coil_fires_on_rising_edge_only() {
    let mut m = manager();
    let mut regs = RegisterImage::new();
    let mut link = RegisterLink::new();

    assert!(!link.apply(&regs, &mut m));
    regs.set_coil(coil::SAVE_MAX, true);
    assert!(link.apply(&regs, &mut m));
    assert!(!link.apply(&regs, &mut m));

    regs.set_coil(coil::SAVE_MAX, false);
    assert!(!link.apply(&regs, &mut m));
}

#[test]
fn teach_coil_left_on_at_boot_is_ignored() {
    let mut m = manager();
    let mut regs = RegisterImage::new();
    regs.set_coil(coil::SAVE_MAX, true);

    let mut link = RegisterLink::new();
    assert!(!link.apply(&regs, &mut m));
    assert!(!link.apply(&regs, &mut m));
}

// ============================================================================
// Service
// ============================================================================

#[test]
fn calibration_jog_persists_on_stop_then_teaches_max() {
    let mut svc = service(MockStore::new());
    let mut regs = RegisterImage::new();
    regs.set_coil(coil::CALIBRATION_MODE, true);
    regs.set_coil(coil::MOVE_BOTTOM, true);
    regs.set_holding(holding::SETPOINT, 50);

    svc.manager_mut().sensor_mut().queue_counts(&[100, 200, 200]);

    svc.poll(0, &mut regs).unwrap();
    assert_eq!(svc.manager().state(), LightState::Lowering);
    svc.poll(150, &mut regs).unwrap();
    assert_eq!(svc.store().saves, 0);

    let outcome = svc.poll(300, &mut regs).unwrap();
    assert_eq!(outcome.stopped(), Some(LightState::IdleAtBottom));
    assert_eq!(svc.store().saves, 1);
    assert_eq!(
        svc.store().record(),
        Some(PositionRecord {
            max_pulses: 34_115,
            raw_position: 200,
            setpoint: 50,
        })
    );
    assert!(regs.coil(coil::AT_BOTTOM));
    assert_eq!(regs.holding(holding::STATE), LightState::IdleAtBottom.code());

    // Host teaches the current count as full travel
    regs.set_coil(coil::MOVE_BOTTOM, false);
    regs.set_coil(coil::SAVE_MAX, true);
    svc.poll(310, &mut regs).unwrap();

    assert_eq!(svc.manager().max_pulses(), 200);
    assert_eq!(svc.store().saves, 2);
    assert_eq!(svc.store().record().map(|r| r.max_pulses), Some(200));
    assert_eq!(registers::read_i32(&regs, holding::MAX_PULSES), 200);
    assert_eq!(regs.holding(holding::POSITION), 0);
}

#[test]
fn restore_loads_saved_record() {
    let record = PositionRecord {
        max_pulses: 2000,
        raw_position: 500,
        setpoint: 30,
    };
    let mut svc = service(MockStore::with_record(record));

    assert_eq!(svc.restore(), Ok(true));
    assert_eq!(svc.manager().max_pulses(), 2000);
    assert_eq!(svc.manager().raw_pv(), 500);
    assert_eq!(svc.manager().sp(), 30);
    assert_eq!(svc.manager().pv(), 75.0);
    assert_eq!(svc.manager().sensor().count, 500);
}

#[test]
fn restored_settings_survive_first_poll() {
    let record = PositionRecord {
        max_pulses: 2000,
        raw_position: 500,
        setpoint: 75,
    };
    let mut svc = service(MockStore::with_record(record));
    svc.restore().unwrap();

    let mut regs = RegisterImage::new();
    svc.poll(0, &mut regs).unwrap();

    assert_eq!(svc.manager().sp(), 75);
    assert!(svc.manager().calibration_mode());
    assert_eq!(svc.manager().state(), LightState::Idle);
    assert!(svc.manager().actuator().lines().is_released());
    assert_eq!(regs.holding(holding::SETPOINT), 75);
    assert!(regs.coil(coil::CALIBRATION_MODE));

    // Later host writes still take effect
    regs.set_holding(holding::SETPOINT, 40);
    svc.poll(150, &mut regs).unwrap();
    assert_eq!(svc.manager().sp(), 40);

    svc.persist().unwrap();
    assert_eq!(svc.store().record().map(|r| r.setpoint), Some(40));
}

#[test]
fn default_settings_survive_first_poll() {
    let mut svc = service(MockStore::new());
    let mut regs = RegisterImage::new();
    svc.poll(0, &mut regs).unwrap();

    assert_eq!(svc.manager().sp(), 50);
    assert!(svc.manager().calibration_mode());
    assert_eq!(svc.manager().state(), LightState::Idle);
}

#[test]
fn teach_ignored_outside_calibration_mode() {
    let mut svc = service(MockStore::new());
    svc.manager_mut().set_calibration_mode(false);
    svc.manager_mut().set_raw_position(17_000);

    let mut regs = RegisterImage::new();
    svc.poll(0, &mut regs).unwrap();

    regs.set_coil(coil::SAVE_MAX, true);
    svc.poll(10, &mut regs).unwrap();

    assert_eq!(svc.manager().max_pulses(), 34_115);
    assert_eq!(svc.store().saves, 0);
    assert_eq!(registers::read_i32(&regs, holding::MAX_PULSES), 34_115);
}

#[test]
fn restore_without_record_keeps_defaults() {
    let mut svc = service(MockStore::new());

    assert_eq!(svc.restore(), Ok(false));
    assert_eq!(svc.manager().max_pulses(), 34_115);
    assert_eq!(svc.manager().sp(), 50);
}

#[test]
fn store_failure_still_publishes() {
    let mut svc = service(MockStore::new());
    svc.store_mut().fail_saves = true;
    svc.manager_mut().set_calibration_mode(false);
    svc.manager_mut().set_setpoint(0);

    // Automatic mode, SP 0: drives down from the top
    let mut regs = RegisterImage::new();
    svc.poll(0, &mut regs).unwrap();
    assert_eq!(svc.manager().state(), LightState::Lowering);

    // Stall latches the bottom; the stop save fails
    assert_eq!(svc.poll(150, &mut regs), Err(ServiceError::Store(())));
    assert!(regs.coil(coil::AT_BOTTOM));
    assert_eq!(registers::read_i32(&regs, holding::RAW_POSITION), 34_115);
    assert_eq!(regs.holding(holding::STATE), LightState::IdleAtBottom.code());
}

#[test]
fn persist_writes_current_record() {
    let mut svc = service(MockStore::new());
    svc.manager_mut().set_raw_position(1234);
    svc.manager_mut().set_setpoint(80);

    svc.persist().unwrap();
    let (_, store) = svc.into_parts();
    assert_eq!(
        store.record(),
        Some(PositionRecord {
            max_pulses: 34_115,
            raw_position: 1234,
            setpoint: 80,
        })
    );
}
