//! In-memory backend, driver and client doubles for unit tests.

use std::sync::atomic::{AtomicU8, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::{
    ChannelId, EventMask, IrqReturn, KcsBmcClient, KcsBmcDevice, KcsBmcDeviceOps, KcsBmcDriver,
    KcsError, KcsIoReg,
};

pub(crate) const IOREG: KcsIoReg = KcsIoReg {
    idr: 0,
    odr: 1,
    str: 2,
};

/// Register file and interrupt mask shared between a device and the test.
#[derive(Default)]
pub(crate) struct MockRegs {
    pub regs: Mutex<[u8; 4]>,
    pub mask: AtomicU8,
    pub mask_updates: AtomicUsize,
}

impl MockRegs {
    pub fn mask(&self) -> EventMask {
        EventMask::from_bits_truncate(self.mask.load(Ordering::SeqCst))
    }

    pub fn reg(&self, offset: u32) -> u8 {
        self.regs.lock().unwrap()[offset as usize]
    }

    pub fn set_reg(&self, offset: u32, value: u8) {
        self.regs.lock().unwrap()[offset as usize] = value;
    }
}

pub(crate) struct MockBackend(pub Arc<MockRegs>);

impl KcsBmcDeviceOps for MockBackend {
    fn irq_mask_update(&self, mask: EventMask, events: EventMask) {
        let cur = self.0.mask.load(Ordering::SeqCst);
        let next = (cur & !mask.bits()) | (events.bits() & mask.bits());
        self.0.mask.store(next, Ordering::SeqCst);
        self.0.mask_updates.fetch_add(1, Ordering::SeqCst);
    }

    fn io_inputb(&self, reg: u32) -> u8 {
        self.0.reg(reg)
    }

    fn io_outputb(&self, reg: u32, data: u8) {
        self.0.set_reg(reg, data);
    }

    fn io_updateb(&self, reg: u32, mask: u8, data: u8) {
        let mut regs = self.0.regs.lock().unwrap();
        let cur = regs[reg as usize];
        regs[reg as usize] = (cur & !mask) | (data & mask);
    }
}

pub(crate) fn mock_device(channel: u32) -> (Arc<KcsBmcDevice>, Arc<MockRegs>) {
    let regs = Arc::new(MockRegs::default());
    let dev = KcsBmcDevice::new(
        ChannelId::new(channel),
        IOREG,
        Box::new(MockBackend(Arc::clone(&regs))),
    );
    (Arc::new(dev), regs)
}

/// Driver that records every notification it receives.
pub(crate) struct MockDriver {
    name: &'static str,
    pub added: Mutex<Vec<u32>>,
    pub removed: Mutex<Vec<u32>>,
    fail_add: Option<KcsError>,
    fail_remove: Option<KcsError>,
}

impl MockDriver {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            added: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            fail_add: None,
            fail_remove: None,
        }
    }

    pub fn failing_add(name: &'static str, err: KcsError) -> Self {
        Self {
            fail_add: Some(err),
            ..Self::new(name)
        }
    }

    pub fn failing_remove(name: &'static str, err: KcsError) -> Self {
        Self {
            fail_remove: Some(err),
            ..Self::new(name)
        }
    }

    pub fn added(&self) -> Vec<u32> {
        self.added.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<u32> {
        self.removed.lock().unwrap().clone()
    }
}

impl KcsBmcDriver for MockDriver {
    fn name(&self) -> &str {
        self.name
    }

    fn add_device(&self, device: &Arc<KcsBmcDevice>) -> Result<(), KcsError> {
        self.added.lock().unwrap().push(device.channel().as_u32());
        self.fail_add.map_or(Ok(()), Err)
    }

    fn remove_device(&self, device: &Arc<KcsBmcDevice>) -> Result<(), KcsError> {
        self.removed.lock().unwrap().push(device.channel().as_u32());
        self.fail_remove.map_or(Ok(()), Err)
    }
}

/// Client that counts interrupts and remembers which channel raised them.
pub(crate) struct MockClient {
    pub events: AtomicUsize,
    pub last_channel: AtomicU32,
    reply: IrqReturn,
}

impl MockClient {
    pub fn new() -> Self {
        Self::replying(IrqReturn::Handled)
    }

    pub fn replying(reply: IrqReturn) -> Self {
        Self {
            events: AtomicUsize::new(0),
            last_channel: AtomicU32::new(u32::MAX),
            reply,
        }
    }

    pub fn events(&self) -> usize {
        self.events.load(Ordering::SeqCst)
    }
}

impl KcsBmcClient for MockClient {
    fn event(&self, device: &KcsBmcDevice) -> IrqReturn {
        self.events.fetch_add(1, Ordering::SeqCst);
        self.last_channel
            .store(device.channel().as_u32(), Ordering::SeqCst);
        self.reply
    }
}

/// Returns the client both as its concrete type (for inspection) and as the
/// trait object the device API takes.
pub(crate) fn mock_client() -> (Arc<MockClient>, Arc<dyn KcsBmcClient>) {
    let client = Arc::new(MockClient::new());
    let dyn_client: Arc<dyn KcsBmcClient> = client.clone();
    (client, dyn_client)
}
