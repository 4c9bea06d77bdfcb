//! Dot-level semantics: context compaction, observed-remove, the
//! single-dot kernel, and the read-only replica policy.

use delta_crdt_types::*;

#[test]
fn context_contains_and_gaps() {
    let mut ctx = DotContext::new();
    ctx.insert(Dot::new(1, 1));
    ctx.insert(Dot::new(1, 4));

    assert!(ctx.contains(Dot::new(1, 1)));
    assert!(!ctx.contains(Dot::new(1, 2)));
    assert!(!ctx.contains(Dot::new(1, 3)));
    assert!(ctx.contains(Dot::new(1, 4)));
    assert!(!ctx.contains(Dot::new(2, 1)));
}

#[test]
fn context_compaction_folds_out_of_order_inserts() {
    let mut ctx = DotContext::new();
    ctx.insert(Dot::new(1, 2));
    ctx.insert(Dot::new(1, 3));
    ctx.insert(Dot::new(1, 1));

    // The whole run collapsed into the dense prefix: one dense entry, no
    // gaps.
    assert_eq!(ctx.max_contiguous(1), 3);
    assert_eq!(
        ctx.to_tokens(),
        vec![
            Token::Count(2),
            Token::Count(2),
            Token::Scalar(Scalar::Replica(1)),
            Token::Scalar(Scalar::Seq(3)),
            Token::Count(0),
        ]
    );
}

#[test]
fn context_next_dot_skips_observed_seqs() {
    let mut ctx = DotContext::new();
    assert_eq!(ctx.next_dot(1), Dot::new(1, 1));
    assert_eq!(ctx.next_dot(1), Dot::new(1, 2));

    ctx.insert(Dot::new(1, 4));
    // 3 is the smallest unobserved seq; 4 stays a gap until 3 arrives.
    assert_eq!(ctx.next_dot(1), Dot::new(1, 3));
    assert_eq!(ctx.max_contiguous(1), 4);
    assert_eq!(ctx.next_dot(1), Dot::new(1, 5));
}

#[test]
fn context_converge_reports_growth_only() {
    let mut a = DotContext::new();
    a.insert(Dot::new(1, 1));
    a.insert(Dot::new(1, 2));

    let mut b = DotContext::new();
    b.insert(Dot::new(1, 1));
    b.insert(Dot::new(2, 7));

    assert!(a.converge(&b));
    assert!(a.contains(Dot::new(2, 7)));
    // Second delivery carries nothing new.
    assert!(!a.converge(&b));

    // b's dense prefix is strictly behind a's for replica 1.
    assert!(b.converge(&a));
    assert_eq!(b.max_contiguous(1), 2);
}

#[test]
fn context_dots_enumerates_prefix_and_gaps() {
    let mut ctx = DotContext::new();
    ctx.insert(Dot::new(1, 1));
    ctx.insert(Dot::new(1, 2));
    ctx.insert(Dot::new(2, 5));

    let dots: Vec<Dot> = ctx.dots().collect();
    assert_eq!(
        dots,
        vec![Dot::new(1, 1), Dot::new(1, 2), Dot::new(2, 5)]
    );
}

#[test]
fn kernel_observed_remove() {
    let mut a = DotKernel::<String>::new(1);
    let mut b = DotKernel::<String>::new(2);

    let addition = a.insert("x".to_string());
    b.converge(&addition);

    let removal = b.remove_value(&"x".to_string());
    a.converge(&removal);

    // a's map is empty but the dot's causal existence is retained.
    assert!(a.is_empty());
    assert!(a.context().contains(Dot::new(1, 1)));

    // A stale copy of the addition cannot resurrect the value.
    assert!(!a.converge(&addition));
    assert!(a.is_empty());
}

#[test]
fn kernel_concurrent_readd_survives_remove() {
    let mut a = DotKernel::<String>::new(1);
    let mut b = DotKernel::<String>::new(2);

    b.converge(&a.insert("x".to_string()));

    // b removes (1,1); a concurrently inserts again, minting (1,2).
    let removal = b.remove_value(&"x".to_string());
    a.insert("x".to_string());

    a.converge(&removal);
    b.converge(&a);

    // (1,2) is not in the remover's context, so the element remains.
    assert_eq!(a.values().collect::<Vec<_>>(), vec![&"x".to_string()]);
    assert_eq!(a, b);
}

#[test]
fn kernel_remove_by_key_equality() {
    let mut kernel = DotKernel::<(u8, &str)>::new(1);
    kernel.insert((1, "one"));
    kernel.insert((2, "two"));
    kernel.insert((1, "uno"));

    // Remove by the key component only, ignoring the payload field.
    let delta = kernel.remove_by(&(1, ""), |probe, held| probe.0 == held.0);
    assert_eq!(kernel.values().collect::<Vec<_>>(), vec![&(2, "two")]);
    assert_eq!(delta.context().max_contiguous(1), 1);
    assert!(delta.context().contains(Dot::new(1, 3)));
}

#[test]
fn kernel_value_immutable_per_dot() {
    let mut a = DotKernel::<u32>::new(1);
    a.insert(10);
    let dots: Vec<Dot> = a.entries().map(|(dot, _)| dot).collect();

    // Mutation is add-new-dot, never rewrite-in-place.
    a.insert(20);
    let after: Vec<Dot> = a.entries().map(|(dot, _)| dot).collect();
    assert_eq!(after[0], dots[0]);
    assert_eq!(after.len(), 2);
}

#[test]
fn single_kernel_set_supersedes_own_dot() {
    let mut a = DotKernelSingle::<String>::new(1);
    let first = a.set("v1".to_string());
    a.set("v2".to_string());

    let entries: Vec<(Dot, &String)> = a.entries().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, Dot::new(1, 2));
    assert_eq!(entries[0].1, &"v2".to_string());
    assert!(a.context().contains(Dot::new(1, 1)));
    assert!(a.context().contains(Dot::new(1, 2)));

    // A replica that saw only the first write converges to the second from
    // the delta alone.
    let mut b = DotKernelSingle::<String>::new(2);
    b.converge(&first);
    b.converge(&a);
    let entries: Vec<(Dot, &String)> = b.entries().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, Dot::new(1, 2));
    assert_eq!(entries[0].1, &"v2".to_string());
}

#[test]
fn single_kernel_keeps_one_dot_per_replica() {
    let mut a = DotKernelSingle::<String>::new(1);
    let mut b = DotKernelSingle::<String>::new(2);

    a.set("from-a".to_string());
    b.set("from-b".to_string());
    a.converge(&b);

    // Concurrent writers each keep their one candidate.
    assert_eq!(a.entries().count(), 2);

    a.set("winner".to_string());
    b.converge(&a);
    assert_eq!(b.entries().count(), 2);
    assert_eq!(b.entries().map(|(dot, _)| dot).max(), Some(Dot::new(2, 1)));
}

#[test]
fn read_only_replica_mutators_are_noops() {
    let mut counter = GCounter::<u64>::new(READ_ONLY_REPLICA);
    let delta = counter.increment_by(5);
    assert_eq!(counter.value(), 0);
    assert!(delta.is_empty());

    let mut pn = PNCounter::<u64>::new(READ_ONLY_REPLICA);
    pn.increment_by(5);
    pn.decrement_by(2);
    assert_eq!(pn.value(), 0);

    let mut set = ORSet::<String>::new(READ_ONLY_REPLICA);
    let delta = set.insert("x".to_string());
    assert!(set.is_empty());
    assert!(delta.is_empty());

    let mut kernel = DotKernel::<u32>::new(READ_ONLY_REPLICA);
    assert!(kernel.insert(1).is_empty());
    assert!(kernel.remove_all().is_empty());

    let mut register = LWWRegister::<u32>::new(READ_ONLY_REPLICA);
    register.set(1);
    assert_eq!(register.get(), None);
}

#[test]
fn read_only_replica_receives_merges() {
    let mut writer = ORSet::<String>::new(1);
    writer.insert("payload".to_string());

    let mut observer = ORSet::<String>::new(READ_ONLY_REPLICA);
    assert!(observer.converge(&writer));
    assert!(observer.contains(&"payload".to_string()));
}
