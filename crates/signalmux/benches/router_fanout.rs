// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Router fan-out throughput across a handful of subscribers.

use criterion::{criterion_group, criterion_main, Criterion};
use signalmux::{compile, OverflowPolicy, PacketPool, Router, SubscriberHandle};

fn build_router(pool: &PacketPool) -> (Router, Vec<SubscriberHandle>) {
    let router = Router::new();
    let handles = vec![
        router.register("catch-all", compile("TRUE").unwrap(), pool.capacity(), OverflowPolicy::Block),
        router.register("by-type", compile("Type == 'TEST'").unwrap(), pool.capacity(), OverflowPolicy::Block),
        router.register("by-severity", compile("Severity < 5").unwrap(), pool.capacity(), OverflowPolicy::Block),
    ];
    (router, handles)
}

fn bench_fanout(c: &mut Criterion) {
    let pool = PacketPool::new(256);
    let (router, handles) = build_router(&pool);

    c.bench_function("router_route_one_carrier", |b| {
        b.iter(|| {
            let carrier = pool.acquire().unwrap();
            carrier.with_message(|m| {
                m.message_type = Some("TEST".into());
                m.severity = Some(3);
            });
            router.route(&carrier);
            for handle in &handles {
                while let Ok(delivered) = handle.inbox().try_recv() {
                    delivered.recycle();
                }
            }
        });
    });
}

criterion_group!(router_benches, bench_fanout);
criterion_main!(router_benches);
