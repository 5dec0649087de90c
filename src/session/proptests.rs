//! Property-based tests for the session store
//!
//! Arbitrary sequences of store operations must keep the transcript
//! append-only and the pending flag consistent with the last accepted call.

use super::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    AppendUser(String),
    BeginPending,
    ResolveAnswer(String),
    ResolveError(String),
    ResolveUser(String),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop_oneof![
            "[a-zA-Z ?]{1,30}".prop_map(String::from),
            "[ \t\n]{0,4}".prop_map(String::from),
        ]
        .prop_map(Op::AppendUser),
        Just(Op::BeginPending),
        "[a-zA-Z ]{1,30}".prop_map(Op::ResolveAnswer),
        "[a-zA-Z ]{1,30}".prop_map(Op::ResolveError),
        "[a-zA-Z ]{1,30}".prop_map(Op::ResolveUser),
    ]
}

fn apply(session: &mut Session, op: Op) -> bool {
    match op {
        Op::AppendUser(text) => session.append_user(&text).is_ok(),
        Op::BeginPending => session.begin_pending().is_ok(),
        Op::ResolveAnswer(text) => session.resolve(Exchange::assistant(text)).is_ok(),
        Op::ResolveError(text) => session.resolve(Exchange::error(text)).is_ok(),
        Op::ResolveUser(text) => session.resolve(Exchange::user(text)).is_ok(),
    }
}

proptest! {
    #[test]
    fn prop_transcript_is_append_only(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let (tx, _rx) = broadcast::channel(256);
        let mut session = Session::new(tx);

        for op in ops {
            let before = session.transcript().to_vec();
            apply(&mut session, op);
            let after = session.transcript();
            prop_assert!(after.len() >= before.len());
            prop_assert_eq!(&after[..before.len()], &before[..]);
        }
    }

    #[test]
    fn prop_refused_operations_change_nothing(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let (tx, mut rx) = broadcast::channel(256);
        let mut session = Session::new(tx);

        for op in ops {
            let before = session.snapshot();
            if !apply(&mut session, op) {
                prop_assert_eq!(session.snapshot(), before);
                prop_assert!(rx.try_recv().is_err());
            }
            while rx.try_recv().is_ok() {}
        }
    }

    #[test]
    fn prop_each_pending_closed_by_one_answer(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let (tx, _rx) = broadcast::channel(256);
        let mut session = Session::new(tx);
        let mut begun = 0usize;
        let mut resolved = 0usize;

        for op in ops {
            let kind = match &op {
                Op::BeginPending => Some(true),
                Op::ResolveAnswer(_) | Op::ResolveError(_) | Op::ResolveUser(_) => Some(false),
                Op::AppendUser(_) => None,
            };
            if apply(&mut session, op) {
                match kind {
                    Some(true) => begun += 1,
                    Some(false) => resolved += 1,
                    None => {}
                }
            }
            prop_assert!(begun == resolved || begun == resolved + 1);
            prop_assert_eq!(session.is_pending(), begun == resolved + 1);
        }
    }
}
