use std::time::Duration;

use proptest::prelude::*;

use paloma::dispatch::batch::partition;
use paloma::dispatch::{DeliveryOutcome, Recipient, Tally};
use paloma::pacer::FixedWindowPacer;

proptest! {
    #[test]
    fn partition_batch_count_is_ceiling_division(
        n in 0usize..500,
        batch_size in 1usize..50
    ) {
        let items: Vec<usize> = (0..n).collect();
        let batches = partition(&items, batch_size);
        prop_assert_eq!(batches.len(), (n + batch_size - 1) / batch_size);
    }

    #[test]
    fn partition_sizes_are_full_except_possibly_last(
        n in 0usize..500,
        batch_size in 1usize..50
    ) {
        let items: Vec<usize> = (0..n).collect();
        let batches = partition(&items, batch_size);
        if let Some((last, full)) = batches.split_last() {
            for batch in full {
                prop_assert_eq!(batch.len(), batch_size);
            }
            prop_assert!(!last.is_empty());
            prop_assert!(last.len() <= batch_size);
        }
    }

    #[test]
    fn partition_covers_everything_in_order(
        n in 0usize..500,
        batch_size in 1usize..50
    ) {
        let items: Vec<usize> = (0..n).collect();
        let flattened: Vec<usize> = partition(&items, batch_size)
            .into_iter()
            .flatten()
            .collect();
        prop_assert_eq!(flattened, items);
    }

    #[test]
    fn pacer_budget_never_exceeds_capacity(
        ops in proptest::collection::vec(any::<bool>(), 0..100),
        capacity in 1u32..50
    ) {
        let pacer = FixedWindowPacer::new(capacity, Duration::from_secs(60));
        for acquire in ops {
            if acquire {
                let _ = pacer.try_acquire();
            } else {
                pacer.reset();
            }
            prop_assert!(pacer.remaining() <= capacity);
        }
    }

    #[test]
    fn tally_counts_always_sum_to_total(
        outcomes in proptest::collection::vec(any::<bool>(), 0..100)
    ) {
        let tally = Tally::new(outcomes.len() as u32);
        for (i, delivered) in outcomes.iter().enumerate() {
            let recipient = Recipient {
                id: format!("r{}", i),
                address: String::new(),
            };
            let outcome = if *delivered {
                DeliveryOutcome::delivered(&recipient)
            } else {
                DeliveryOutcome::failed(&recipient, "declined".to_string())
            };
            tally.record(&outcome);
            let snap = tally.snapshot();
            prop_assert_eq!(snap.success + snap.fail + snap.pending, snap.total);
        }
    }
}
