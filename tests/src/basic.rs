use resident::{
    ChronoId, ChronoTable, DuplicateId, IntId, Link, Resource, ResourceTable, StringId,
    TableConfig,
};
use std::ffi::CStr;

#[derive(Resource)]
pub struct Device {
    id: StringId<'static>,
    link: Link<Device>,
    volts: f64,
}

#[derive(Resource)]
pub struct Event {
    id: ChronoId,
    link: Link<Event>,
    payload: u64,
}

#[derive(Resource)]
pub struct Channel {
    id: IntId<u32>,
    link: Link<Channel>,
}

fn device(name: &'static [u8], volts: f64) -> Box<Device> {
    Box::new(Device {
        id: StringId::borrowed(CStr::from_bytes_with_nul(name).unwrap()),
        link: Link::new(),
        volts,
    })
}

#[test]
fn process_database_test() {
    let mut devices: ResourceTable<Device> = ResourceTable::new().unwrap();
    let mut heater = device(b"pv:heater:setpoint\0", 12.5);
    let mut fan = device(b"pv:fan:speed\0", 3.3);
    unsafe {
        devices.add(&mut *heater).unwrap();
        devices.add(&mut *fan).unwrap();
    }
    assert_eq!(devices.len(), 2);

    let probe = StringId::borrowed(CStr::from_bytes_with_nul(b"pv:heater:setpoint\0").unwrap());
    assert_eq!(devices.lookup(&probe).unwrap().volts, 12.5);

    let mut intruder = device(b"pv:fan:speed\0", 0.0);
    assert_eq!(unsafe { devices.add(&mut *intruder) }, Err(DuplicateId));
    assert_eq!(devices.len(), 2);

    let removed = devices.remove(&probe).unwrap();
    assert_eq!(removed.volts, 12.5);
    assert_eq!(devices.len(), 1);
    devices.verify();
}

#[test]
fn chronological_events_test() {
    let mut events: ChronoTable<Event> = ChronoTable::new().unwrap();
    let mut recs: Vec<Box<Event>> = (0..10u64)
        .map(|payload| {
            Box::new(Event {
                id: ChronoId::default(),
                link: Link::new(),
                payload,
            })
        })
        .collect();
    let mut last = 0;
    for rec in recs.iter_mut() {
        let id = unsafe { events.add(&mut **rec) };
        assert!(id.value() > last);
        last = id.value();
    }
    assert_eq!(events.len(), 10);
    assert_eq!(events.lookup(&ChronoId::new(3)).unwrap().payload, 2);
    assert!(events.remove(&ChronoId::new(3)).is_some());
    assert!(events.lookup(&ChronoId::new(3)).is_none());
    events.verify();
}

#[test]
fn growth_under_load_test() {
    let config = TableConfig::with_initial_index_bits(5);
    let mut channels: ResourceTable<Channel> = ResourceTable::with_config(&config).unwrap();
    let mut recs: Vec<Box<Channel>> = (0..1000u32)
        .map(|n| {
            Box::new(Channel {
                id: IntId::new(n * 7919),
                link: Link::new(),
            })
        })
        .collect();
    for rec in recs.iter_mut() {
        unsafe {
            channels.add(&mut **rec).unwrap();
        }
    }
    assert_eq!(channels.len(), 1000);
    // The strictly-greater split threshold keeps the table one bucket shy of
    // the record count.
    assert_eq!(channels.bucket_count(), 999);
    for n in 0..1000u32 {
        assert!(channels.lookup(&IntId::new(n * 7919)).is_some());
    }
    assert_eq!(channels.iter().count(), 1000);
    channels.verify();
}
