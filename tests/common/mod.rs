use blocking_cache::cache::{Cache, TickInputs};
use blocking_cache::message::{CacheReq, CacheResp, MemReq, MemResp, ReqType};

/// A `Vec<u8>`-backed memory double standing in for the downstream memory
/// controller, which is out of scope for this crate.
pub struct MockMemory {
    data: Vec<u8>,
    latency: u32,
    pending: Option<(MemReq, u32)>,
    pub memreqs: Vec<MemReq>,
}

impl MockMemory {
    pub fn new(size: usize) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let _ = tracing_subscriber::fmt::try_init();
        Self {
            data: vec![0; size],
            latency: 1,
            pending: None,
            memreqs: Vec::new(),
        }
    }

    pub fn seed(&mut self, addr: u64, len: usize, value: u64) {
        let bytes = value.to_le_bytes();
        self.data[addr as usize..addr as usize + len].copy_from_slice(&bytes[..len]);
    }

    pub fn read_word(&self, addr: u64, len: usize) -> u64 {
        let mut bytes = [0u8; 8];
        bytes[..len].copy_from_slice(&self.data[addr as usize..addr as usize + len]);
        u64::from_le_bytes(bytes)
    }

    fn build_resp(&self, req: &MemReq) -> MemResp {
        let data = if req.req_type.is_amo() {
            u128::from(self.read_word(req.addr, req.len as usize) as u32)
        } else {
            let len = req.len as usize;
            let mut buf = [0u8; 16];
            buf[..len].copy_from_slice(&self.data[req.addr as usize..req.addr as usize + len]);
            u128::from_le_bytes(buf)
        };
        MemResp {
            req_type: req.req_type,
            opaque: req.opaque,
            data,
        }
    }

    fn apply_write(&mut self, req: &MemReq) {
        let bytes = req.data.to_le_bytes();
        for i in 0..req.len as usize {
            if req.req_type.is_amo() || req.wr_mask & (1 << i) != 0 {
                self.data[req.addr as usize + i] = bytes[i];
            }
        }
    }

    /// Ages any outstanding fetch by one tick, then accepts a freshly issued
    /// `memreq` (if any): reads/AMOs become pending for `latency` ticks,
    /// writes (evicts, AMO writebacks) are applied immediately with no
    /// response expected.
    pub fn step(&mut self, memreq: Option<MemReq>) -> Option<MemResp> {
        let resolved = if let Some((req, remaining)) = self.pending {
            if remaining <= 1 {
                self.pending = None;
                Some(self.build_resp(&req))
            } else {
                self.pending = Some((req, remaining - 1));
                None
            }
        } else {
            None
        };

        if let Some(req) = memreq {
            self.memreqs.push(req);
            if req.req_type == ReqType::Read || req.req_type.is_amo() {
                self.pending = Some((req, self.latency));
            } else {
                self.apply_write(&req);
            }
        }
        resolved
    }
}

/// Runs the cache's cold-start `INIT` walk to completion.
pub fn warm_up(cache: &mut Cache) {
    loop {
        let outputs = cache
            .tick(TickInputs {
                cachereq: None,
                memresp: None,
                memreq_rdy: true,
                cacheresp_rdy: true,
            })
            .expect("cache fault");
        if outputs.cachereq_rdy {
            return;
        }
    }
}

/// Drives `cache` and `mem` together: offers `req` until accepted, then
/// keeps ticking (feeding memresps back in as they mature) until a
/// `cacheresp` comes back.
pub fn drive_request(cache: &mut Cache, mem: &mut MockMemory, req: CacheReq) -> CacheResp {
    let mut to_send = Some(req);
    let mut memresp = None;
    loop {
        let outputs = cache
            .tick(TickInputs {
                cachereq: to_send,
                memresp,
                memreq_rdy: true,
                cacheresp_rdy: true,
            })
            .expect("cache fault");
        if outputs.cachereq_rdy {
            to_send = None;
        }
        memresp = mem.step(outputs.memreq);
        if let Some(resp) = outputs.cacheresp {
            return resp;
        }
    }
}
