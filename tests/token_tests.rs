//! Token round-trips for every CRDT type and rejection of malformed
//! streams.

use delta_crdt_types::*;

/// Round-trips `state` through the token stream and checks that nothing was
/// gained or lost: the copy is equal, and a merge in either direction
/// reports no change.
fn assert_token_round_trip<C>(state: &C)
where
    C: Causal + Clone + PartialEq + std::fmt::Debug,
{
    let mut copy = C::from_tokens(state.to_tokens()).expect("round trip");
    assert_eq!(&copy, state);
    assert!(!copy.converge(state));
    let mut original = state.clone();
    assert!(!original.converge(&copy));
    assert_eq!(&original, state);
}

#[test]
fn round_trip_gcounter() {
    let mut a = GCounter::<u64>::new(1);
    let mut b = GCounter::<u64>::new(2);
    a.increment_by(1);
    b.increment_by(2);
    a.converge(&b);

    assert_token_round_trip(&a);
    assert_eq!(GCounter::<u64>::from_tokens(a.to_tokens()).unwrap().replica(), 1);
    assert!(GCounter::<u64>::from_tokens(a.to_tokens())
        .unwrap()
        .state_eq(&a));
}

#[test]
fn round_trip_empty_states() {
    assert_token_round_trip(&GCounter::<u64>::new(1));
    assert_token_round_trip(&PNCounter::<u64>::new(1));
    assert_token_round_trip(&ORSet::<String>::new(1));
    assert_token_round_trip(&MVRegister::<String>::new(1));
    assert_token_round_trip(&LWWRegister::<String>::new(1));
    assert_token_round_trip(&ORMap::<String, String>::new(1));
    assert_token_round_trip(&CCounter::<u64>::new(1));
}

#[test]
fn round_trip_pncounter() {
    let mut a = PNCounter::<u64>::new(1);
    let mut b = PNCounter::<u64>::new(2);
    a.increment_by(5);
    b.decrement_by(2);
    a.converge(&b);

    assert_token_round_trip(&a);
    assert_eq!(PNCounter::<u64>::from_tokens(a.to_tokens()).unwrap().value(), 3);
}

#[test]
fn round_trip_orset_with_removals() {
    let mut a = ORSet::<String>::new(1);
    let mut b = ORSet::<String>::new(2);
    a.insert("kept".to_string());
    a.insert("dropped".to_string());
    a.remove(&"dropped".to_string());
    b.insert("other".to_string());
    a.converge(&b);

    // The context still remembers the removed dot; the round trip must
    // preserve it or stale re-additions would resurrect.
    assert_token_round_trip(&a);
    let copy = ORSet::<String>::from_tokens(a.to_tokens()).unwrap();
    assert!(copy.context().contains(Dot::new(1, 2)));
    assert!(!copy.contains(&"dropped".to_string()));
}

#[test]
fn round_trip_registers() {
    let mut mv = MVRegister::<String>::new(1);
    let mut mv2 = MVRegister::<String>::new(2);
    mv.set("left".to_string());
    mv2.set("right".to_string());
    mv.converge(&mv2);
    assert_token_round_trip(&mv);

    let mut lww = LWWRegister::<String>::new(1);
    lww.set("v1".to_string());
    lww.set("v2".to_string());
    assert_token_round_trip(&lww);
    let copy = LWWRegister::<String>::from_tokens(lww.to_tokens()).unwrap();
    assert_eq!(copy.get(), Some(&"v2".to_string()));
}

#[test]
fn round_trip_ormap_and_ccounter() {
    let mut map = ORMap::<String, u64>::new(1);
    map.insert("k".to_string(), 1);
    map.insert("k".to_string(), 2);
    map.remove(&"gone".to_string());
    assert_token_round_trip(&map);

    let mut counter = CCounter::<u64>::new(1);
    counter.increment_by(9);
    counter.increment_by(1);
    assert_token_round_trip(&counter);
    assert_eq!(CCounter::<u64>::from_tokens(counter.to_tokens()).unwrap().value(), 10);
}

#[test]
fn round_trip_dot_context() {
    let mut ctx = DotContext::new();
    ctx.insert(Dot::new(1, 1));
    ctx.insert(Dot::new(1, 2));
    ctx.insert(Dot::new(2, 5));

    let mut copy = DotContext::from_tokens(ctx.to_tokens()).unwrap();
    assert_eq!(copy, ctx);
    assert!(!copy.converge(&ctx));
}

fn sample_tokens() -> Vec<Token<Scalar<u64>>> {
    let mut a = GCounter::<u64>::new(1);
    let mut b = GCounter::<u64>::new(2);
    a.increment_by(1);
    b.increment_by(2);
    a.converge(&b);
    a.to_tokens()
}

fn expect_malformed(result: Result<GCounter<u64>, CrdtError>) {
    assert!(matches!(result, Err(CrdtError::MalformedTokens(_))));
}

#[test]
fn reject_truncated_stream() {
    let mut tokens = sample_tokens();
    tokens.pop();
    expect_malformed(GCounter::from_tokens(tokens));

    expect_malformed(GCounter::from_tokens(Vec::new()));
}

#[test]
fn reject_wrong_leading_count() {
    let mut tokens = sample_tokens();
    tokens[0] = Token::Count(5);
    expect_malformed(GCounter::from_tokens(tokens));
}

#[test]
fn reject_wrong_group_arity() {
    let mut tokens = sample_tokens();
    // The data group of two entries announces 4 scalars; 5 has the wrong
    // parity for a pair sequence.
    assert_eq!(tokens[2], Token::Count(4));
    tokens[2] = Token::Count(5);
    expect_malformed(GCounter::from_tokens(tokens));
}

#[test]
fn reject_wrong_scalar_variant() {
    let mut tokens = sample_tokens();
    // A seq where the schema expects a per-replica count.
    tokens[4] = Token::Scalar(Scalar::Seq(1));
    expect_malformed(GCounter::from_tokens(tokens));

    let mut tokens = sample_tokens();
    // A count where the schema expects the owner's replica id.
    tokens[1] = Token::Count(7);
    expect_malformed(GCounter::from_tokens(tokens));
}

#[test]
fn reject_trailing_tokens() {
    let mut tokens = sample_tokens();
    tokens.push(Token::Count(0));
    expect_malformed(GCounter::from_tokens(tokens));
}

#[test]
fn reject_kernel_dot_outside_context() {
    // A hand-built kernel stream whose map holds a dot the context never
    // observed.
    let tokens: Vec<Token<Scalar<String>>> = vec![
        Token::Count(3),
        Token::Scalar(Scalar::Replica(1)),
        Token::Count(3),
        Token::Scalar(Scalar::Replica(1)),
        Token::Scalar(Scalar::Seq(2)),
        Token::Scalar(Scalar::Value("x".to_string())),
        Token::Count(2),
        Token::Count(2),
        Token::Scalar(Scalar::Replica(1)),
        Token::Scalar(Scalar::Seq(1)),
        Token::Count(0),
    ];
    assert!(matches!(
        DotKernel::<String>::from_tokens(tokens),
        Err(CrdtError::MalformedTokens(_))
    ));
}

#[test]
fn reject_malformed_context_stream() {
    let mut ctx = DotContext::new();
    ctx.insert(Dot::new(1, 3));
    let mut tokens = ctx.to_tokens();
    // Gap group counts must pair replicas with seqs.
    let last = tokens.len() - 3;
    assert_eq!(tokens[last], Token::Count(2));
    tokens[last] = Token::Count(3);
    assert!(matches!(
        DotContext::from_tokens(tokens),
        Err(CrdtError::MalformedTokens(_))
    ));
}
