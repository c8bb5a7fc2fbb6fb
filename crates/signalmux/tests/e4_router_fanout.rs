// SPDX-License-Identifier: Apache-2.0 OR MIT

//! E4: a message matching three subscribers is delivered to all three,
//! and the carrier's outstanding count reaches zero only once every
//! subscriber has released it.

use signalmux::{compile, OverflowPolicy, PacketPool, Router};

#[test]
fn delivers_to_every_matching_subscriber_and_conserves_the_carrier() {
    let pool = PacketPool::new(1);
    let router = Router::new();

    let low_severity = router.register("low-severity", compile("Severity < 5").unwrap(), 4, OverflowPolicy::Block);
    let exact_type = router.register("exact-type", compile("Type == 'X'").unwrap(), 4, OverflowPolicy::Block);
    let catch_all = router.register("catch-all", compile("TRUE").unwrap(), 4, OverflowPolicy::Block);

    let carrier = pool.acquire().unwrap();
    carrier.with_message(|m| {
        m.message_type = Some("X".into());
        m.severity = Some(3);
    });

    router.route(&carrier);
    assert_eq!(carrier.outstanding(), 3);
    assert_eq!(pool.available(), 0);

    let a = low_severity.inbox().try_recv().unwrap();
    let b = exact_type.inbox().try_recv().unwrap();
    let c = catch_all.inbox().try_recv().unwrap();

    a.recycle();
    assert_eq!(pool.available(), 0);
    b.recycle();
    assert_eq!(pool.available(), 0);
    c.recycle();
    assert_eq!(pool.available(), 1);
}
