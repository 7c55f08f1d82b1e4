//! Loopback engine and register file for unit tests.

use std::sync::{Arc, Mutex};

use crate::{
    AddrSpace, DetectError, RegSize, ResultError, SiIoAccess, SiSmIo, SiStateMachine,
    SmDescriptor, SmResult, StartError,
};

pub(crate) const MAX_MSG: usize = 16;

/// Register file indexed by byte offset, remembering the width of the last
/// access.
#[derive(Default)]
pub(crate) struct RegFile {
    regs: Mutex<[u64; 32]>,
    last_size: Mutex<Option<RegSize>>,
}

impl RegFile {
    pub fn get(&self, offset: u64) -> u64 {
        self.regs.lock().unwrap()[offset as usize]
    }

    pub fn set(&self, offset: u64, value: u64) {
        self.regs.lock().unwrap()[offset as usize] = value;
    }

    pub fn last_size(&self) -> Option<RegSize> {
        *self.last_size.lock().unwrap()
    }
}

fn width_mask(size: RegSize) -> u64 {
    match size {
        RegSize::Eight => u64::MAX,
        _ => (1 << (size.bytes() * 8)) - 1,
    }
}

impl SiIoAccess for RegFile {
    fn input(&self, offset: u64, size: RegSize) -> u64 {
        *self.last_size.lock().unwrap() = Some(size);
        self.get(offset) & width_mask(size)
    }

    fn output(&self, offset: u64, size: RegSize, value: u64) {
        *self.last_size.lock().unwrap() = Some(size);
        self.set(offset, value & width_mask(size));
    }
}

pub(crate) fn test_io() -> SiSmIo {
    SiSmIo {
        addr_space: AddrSpace::Port,
        addr_data: 0xCA2,
        regspacing: 1,
        regsize: RegSize::One,
        regshift: 0,
        io: Arc::new(RegFile::default()),
    }
}

enum Phase {
    Idle,
    Writing(usize),
    Complete,
}

/// Engine that pushes each request byte through data register 0 and
/// returns what it reads back as the response.
pub(crate) struct Loopback {
    io: Option<SiSmIo>,
    request: Vec<u8>,
    response: Vec<u8>,
    phase: Phase,
}

pub(crate) static LOOPBACK: SmDescriptor = SmDescriptor {
    version: "loopback-1.0",
    size: core::mem::size_of::<Loopback>,
    create: create_loopback,
};

fn create_loopback() -> Box<dyn SiStateMachine> {
    Box::new(Loopback::new())
}

impl Loopback {
    fn new() -> Self {
        Self {
            io: None,
            request: Vec::new(),
            response: Vec::new(),
            phase: Phase::Idle,
        }
    }
}

impl SiStateMachine for Loopback {
    fn version(&self) -> &'static str {
        LOOPBACK.version
    }

    fn init_data(&mut self, io: SiSmIo) -> u64 {
        let size = io.io_size(2);
        self.io = Some(io);
        self.phase = Phase::Idle;
        size
    }

    fn start_transaction(&mut self, request: &[u8]) -> Result<(), StartError> {
        if !matches!(self.phase, Phase::Idle) {
            return Err(StartError::Busy);
        }
        if request.is_empty() || request.len() > MAX_MSG {
            return Err(StartError::InvalidSize);
        }
        self.request = request.to_vec();
        self.response.clear();
        self.phase = Phase::Writing(0);
        Ok(())
    }

    fn event(&mut self, _elapsed_us: u64) -> SmResult {
        match self.phase {
            Phase::Idle => SmResult::Idle,
            Phase::Complete => SmResult::TransactionComplete,
            Phase::Writing(i) => {
                let Some(io) = self.io.as_ref() else {
                    return SmResult::Hosed;
                };
                io.write_reg(0, self.request[i]);
                self.response.push(io.read_reg(0));
                if i + 1 == self.request.len() {
                    self.phase = Phase::Complete;
                    SmResult::TransactionComplete
                } else {
                    self.phase = Phase::Writing(i + 1);
                    if i % 2 == 0 {
                        SmResult::CallWithDelay
                    } else {
                        SmResult::CallWithoutDelay
                    }
                }
            }
        }
    }

    fn get_result(&mut self, buf: &mut [u8]) -> Result<usize, ResultError> {
        if !matches!(self.phase, Phase::Complete) {
            return Err(ResultError::NoResult);
        }
        let len = self.response.len();
        if buf.len() < len {
            return Err(ResultError::BufferTooSmall);
        }
        buf[..len].copy_from_slice(&self.response);
        self.phase = Phase::Idle;
        Ok(len)
    }

    fn detect(&mut self) -> Result<(), DetectError> {
        self.io.as_ref().map(|_| ()).ok_or(DetectError::NotPresent)
    }

    fn cleanup(&mut self) {
        self.io = None;
        self.phase = Phase::Idle;
    }
}
