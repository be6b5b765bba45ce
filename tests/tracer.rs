//! Tests for traced chains.

use std::sync::Arc;

use lazy_chain::{
    Chain, ChainEvent, ChainExt, ChainKind, ConstantChain, EventCollector, ForkIsolation,
    MarkovChain, NoopTracer, SimpleChain, StatefulChain,
};

#[tokio::test]
async fn test_traced_steps() {
    let collector = Arc::new(EventCollector::new());
    let mut chain = MarkovChain::from_fn(0, |x: i32| Ok(x + 1)).traced(collector.clone());

    assert_eq!(chain.next().await.unwrap(), 1);
    assert_eq!(chain.next().await.unwrap(), 2);

    assert_eq!(
        collector.take(),
        vec![
            ChainEvent::NextStart {
                kind: ChainKind::Markov,
                step: 1
            },
            ChainEvent::Committed {
                kind: ChainKind::Markov,
                step: 1
            },
            ChainEvent::NextStart {
                kind: ChainKind::Markov,
                step: 2
            },
            ChainEvent::Committed {
                kind: ChainKind::Markov,
                step: 2
            },
        ]
    );
}

#[tokio::test]
async fn test_traced_failure_does_not_advance_step() {
    let collector = Arc::new(EventCollector::new());
    let mut chain = SimpleChain::from_iter(vec![1]).traced(collector.clone());

    chain.next().await.unwrap();
    assert!(chain.next().await.is_err());
    assert!(chain.next().await.is_err());

    let failures: Vec<u64> = collector
        .events()
        .into_iter()
        .filter_map(|event| match event {
            ChainEvent::GenerationFailed { step, .. } => Some(step),
            _ => None,
        })
        .collect();
    assert_eq!(failures, vec![2, 2]);
}

#[tokio::test]
async fn test_traced_forks() {
    let collector = Arc::new(EventCollector::new());

    let markov = MarkovChain::from_fn(0, |x: i32| Ok(x + 1)).traced(collector.clone());
    let mut fork = markov.fork().unwrap();
    fork.next().await.unwrap();

    let simple = SimpleChain::from_fn(|| Ok(1)).traced(collector.clone());
    let _ = simple.fork().unwrap();

    let stateful = StatefulChain::from_fn((), |_| Ok(0), |_, x| Ok(x)).traced(collector.clone());
    assert!(stateful.fork().is_err());

    let events = collector.events();
    assert!(events.contains(&ChainEvent::Forked {
        kind: ChainKind::Markov,
        isolation: ForkIsolation::Isolated
    }));
    assert!(events.contains(&ChainEvent::Committed {
        kind: ChainKind::Markov,
        step: 1
    }));
    assert!(events.contains(&ChainEvent::Forked {
        kind: ChainKind::Simple,
        isolation: ForkIsolation::Shared
    }));
    assert!(events.contains(&ChainEvent::ForkRefused {
        kind: ChainKind::Stateful
    }));
}

#[tokio::test]
async fn test_traced_is_transparent() {
    let mut chain = ConstantChain::new(3).map(|x| x * 2).traced(NoopTracer);
    assert_eq!(chain.kind(), ChainKind::Mapped);
    assert_eq!(chain.fork_isolation(), ForkIsolation::Shared);
    assert_eq!(chain.peek().unwrap(), Some(6));
    assert_eq!(chain.next().await.unwrap(), 6);
    assert_eq!(chain.observer().get(), Some(6));
    assert_eq!(chain.into_inner().into_parent().value(), &3);
}

#[cfg(feature = "tracing")]
#[tokio::test]
async fn test_log_tracer() {
    let mut chain = SimpleChain::from_iter(0..2).traced(lazy_chain::LogTracer);
    chain.next().await.unwrap();
    chain.next().await.unwrap();
    assert!(chain.next().await.unwrap_err().is_exhausted());
}
