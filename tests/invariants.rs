//! Property tests checking the pipelined cache against the golden
//! [`blocking_cache::reference::ReferenceModel`] for randomized request
//! sequences, plus the response-count/order and no-spurious-traffic
//! invariants directly.

mod common;

use blocking_cache::cache::Cache;
use blocking_cache::config::CacheParams;
use blocking_cache::message::{CacheReq, ReqType, RespTest};
use blocking_cache::reference::ReferenceModel;
use common::{drive_request, warm_up, MockMemory};
use proptest::prelude::*;

/// Word-aligned addresses within the default `size=32B` configuration,
/// picked to force repeated conflicts across both lines.
fn addr_strategy() -> impl Strategy<Value = u64> {
    (0u64..8).prop_map(|word| word * 4)
}

fn amo_kind_strategy() -> impl Strategy<Value = ReqType> {
    prop::sample::select(vec![
        ReqType::AmoAdd,
        ReqType::AmoAnd,
        ReqType::AmoOr,
        ReqType::AmoSwap,
        ReqType::AmoMin,
        ReqType::AmoMinu,
        ReqType::AmoMax,
        ReqType::AmoMaxu,
        ReqType::AmoXor,
    ])
}

#[derive(Debug, Clone, Copy)]
enum OpKind {
    Read,
    Write(u32),
    Amo(ReqType, u32),
}

fn op_strategy() -> impl Strategy<Value = (OpKind, u64)> {
    prop_oneof![
        addr_strategy().prop_map(|addr| (OpKind::Read, addr)),
        (addr_strategy(), any::<u32>()).prop_map(|(addr, data)| (OpKind::Write(data), addr)),
        (addr_strategy(), amo_kind_strategy(), any::<u32>())
            .prop_map(|(addr, op, data)| (OpKind::Amo(op, data), addr)),
    ]
}

proptest! {
    /// For any sequence of reads/writes/AMOs, the cache returns the same
    /// data a byte-accurate write-through model would, even though the
    /// cache itself evicts, refills, and goes through miss round-trips the
    /// reference model never does.
    #[test]
    fn matches_reference_model_on_reads(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let params = CacheParams::default();
        let mut cache = Cache::new(params);
        warm_up(&mut cache);
        let mut mem = MockMemory::new(64);
        let mut golden = ReferenceModel::new(&params);

        for (i, (op, addr)) in ops.into_iter().enumerate() {
            let opaque = i as u32;
            match op {
                OpKind::Read => {
                    let req = CacheReq { req_type: ReqType::Read, opaque, addr, len: 0, data: 0 };
                    let resp = drive_request(&mut cache, &mut mem, req);
                    let expected = golden.apply(req);
                    prop_assert_eq!(resp.data, expected.data);
                }
                OpKind::Write(data) => {
                    let req = CacheReq { req_type: ReqType::Write, opaque, addr, len: 0, data: u64::from(data) };
                    drive_request(&mut cache, &mut mem, req);
                    golden.apply(req);
                }
                OpKind::Amo(req_type, data) => {
                    let req = CacheReq { req_type, opaque, addr, len: 0, data: u64::from(data) };
                    let resp = drive_request(&mut cache, &mut mem, req);
                    let expected = golden.apply(req);
                    prop_assert_eq!(resp.data, expected.data, "pre-op value must match the golden model");
                    prop_assert_eq!(resp.test, RespTest::AmoHit);
                }
            }
        }
    }

    /// Responses come back in request order, each echoing its own opaque,
    /// regardless of how many intervening misses/evictions occurred.
    #[test]
    fn response_opaques_are_in_request_order(addrs in prop::collection::vec(addr_strategy(), 1..40)) {
        let mut cache = Cache::new(CacheParams::default());
        warm_up(&mut cache);
        let mut mem = MockMemory::new(64);

        for (i, addr) in addrs.into_iter().enumerate() {
            let opaque = i as u32;
            let req = CacheReq { req_type: ReqType::Read, opaque, addr, len: 0, data: 0 };
            let resp = drive_request(&mut cache, &mut mem, req);
            prop_assert_eq!(resp.opaque, opaque);
        }
    }

    /// Once a line is resident, repeating the same read never produces
    /// further memory traffic.
    #[test]
    fn repeated_hit_never_generates_memory_traffic(addr in addr_strategy(), repeats in 2usize..10) {
        let mut cache = Cache::new(CacheParams::default());
        warm_up(&mut cache);
        let mut mem = MockMemory::new(64);

        drive_request(&mut cache, &mut mem, CacheReq { req_type: ReqType::Read, opaque: 0, addr, len: 0, data: 0 });
        let memreqs_after_fill = mem.memreqs.len();

        for i in 0..repeats {
            let resp = drive_request(&mut cache, &mut mem, CacheReq {
                req_type: ReqType::Read,
                opaque: (i + 1) as u32,
                addr,
                len: 0,
                data: 0,
            });
            prop_assert_eq!(resp.test, RespTest::Hit);
        }
        prop_assert_eq!(mem.memreqs.len(), memreqs_after_fill);
    }
}
